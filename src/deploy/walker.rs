use std::path::Path;

use anyhow::Result;
use walkdir::WalkDir;

use super::task::{DeployTask, TaskList};
use crate::error::DeployError;
use crate::session::RemoteFs;
use crate::stats::PhaseStats;

/// 把相对路径拼接到远端基路径上；远端路径统一使用 '/'。
pub(crate) fn join_remote(base: &str, rel: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), rel.replace('\\', "/"))
}

/// Walk the local tree rooted at `local_root` and produce the upload task
/// lists plus statistics. Directory tasks are appended before descending into
/// their children, so parents always precede descendants in `directories`.
pub fn walk_local(local_root: &Path, remote_root: &str) -> Result<(TaskList, PhaseStats)> {
    if !local_root.is_dir() {
        return Err(DeployError::LocalReadFailed(
            local_root.display().to_string(),
            "本地目录不存在或不是目录".to_string(),
        )
        .into());
    }

    let mut list = TaskList::default();
    let mut stats = PhaseStats::default();
    for entry in WalkDir::new(local_root).into_iter().flatten() {
        let path = entry.path();
        let rel = path.strip_prefix(local_root).unwrap_or(path).to_string_lossy().to_string();
        if rel.is_empty() {
            // 根目录本身由 DirectoryEnsurer 负责
            continue;
        }
        let remote = join_remote(remote_root, &rel);
        if entry.file_type().is_dir() {
            let bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
            stats.record_dir(bytes);
            list.directories.push(DeployTask::mkdir(remote));
        } else if entry.file_type().is_file() {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            stats.record_file(size);
            list.files.push(DeployTask::put_file(path.to_path_buf(), remote, size));
        }
        // 符号链接等特殊条目不参与部署
    }
    Ok((list, stats))
}

/// Walk the remote tree rooted at `remote_root` and produce the delete task
/// lists plus statistics. Directory tasks are appended **after** the
/// recursion returns, so children always precede their parents in
/// `directories` — draining `files` then `directories` in order removes only
/// empty directories.
pub fn walk_remote(fs: &dyn RemoteFs, remote_root: &str) -> Result<(TaskList, PhaseStats)> {
    let mut list = TaskList::default();
    let mut stats = PhaseStats::default();
    walk_remote_into(fs, remote_root, &mut list, &mut stats)
        .map_err(|e| DeployError::RemoteReadFailed(remote_root.to_string(), e))?;
    Ok((list, stats))
}

fn walk_remote_into(
    fs: &dyn RemoteFs,
    dir: &str,
    list: &mut TaskList,
    stats: &mut PhaseStats,
) -> Result<(), String> {
    for entry in fs.readdir(dir)? {
        let full = join_remote(dir, &entry.name);
        if entry.is_dir {
            walk_remote_into(fs, &full, list, stats)?;
            stats.record_dir(entry.size);
            list.directories.push(DeployTask::rmdir(full));
        } else {
            stats.record_file(entry.size);
            list.files.push(DeployTask::unlink(full, entry.size));
        }
    }
    Ok(())
}
