use std::path::PathBuf;

use crate::session::RemoteFs;

/// The four filesystem mutations a deployment performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKind {
    /// 创建远端目录（幂等：已存在则视为成功）
    MkDir,
    /// 上传单个文件，覆盖远端同名文件
    PutFile,
    /// 删除单个远端文件
    Unlink,
    /// 删除一个（届时应为空的）远端目录
    RmDir,
}

/// One unit of work as plain data — operation kind plus source/target paths.
/// Execution happens in [`execute_task`], which maps kind to the matching
/// `RemoteFs` operation.
#[derive(Clone, Debug)]
pub struct DeployTask {
    pub kind: TaskKind,
    /// PutFile 的本地源；其余操作为 None
    pub local: Option<PathBuf>,
    pub remote: String,
    pub size: u64,
}

impl DeployTask {
    pub fn mkdir(remote: String) -> Self {
        Self { kind: TaskKind::MkDir, local: None, remote, size: 0 }
    }

    pub fn put_file(local: PathBuf, remote: String, size: u64) -> Self {
        Self { kind: TaskKind::PutFile, local: Some(local), remote, size }
    }

    pub fn unlink(remote: String, size: u64) -> Self {
        Self { kind: TaskKind::Unlink, local: None, remote, size }
    }

    pub fn rmdir(remote: String) -> Self {
        Self { kind: TaskKind::RmDir, local: None, remote, size: 0 }
    }
}

/// Success/failure record for one task. Never thrown as a fault.
#[derive(Clone, Debug)]
pub struct TaskOutcome {
    pub success: bool,
    pub path: String,
}

/// Output of a tree walk. Invariants: for upload, `directories` lists parents
/// before descendants; for delete, `directories` lists children before
/// parents. Draining one list completely before the other (directories→files
/// on upload, files→directories on delete) therefore never violates a
/// filesystem precondition.
#[derive(Debug, Default)]
pub struct TaskList {
    pub directories: Vec<DeployTask>,
    pub files: Vec<DeployTask>,
}

impl TaskList {
    pub fn len(&self) -> usize {
        self.directories.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }
}

/// 逐级确保远端目录存在（mkdir -p 语义）。
/// 每一级：已存在 -> 跳过；不存在 -> mkdir，失败后复查一次 stat 再决定是否
/// 报错（同一块内的并发任务可能刚创建了同一级）。
fn ensure_remote_dir_all(fs: &dyn RemoteFs, path: &str) -> Result<(), String> {
    let normalized = path.replace('\\', "/");
    let absolute = normalized.starts_with('/');
    let mut accum = String::new();
    for seg in normalized.split('/').filter(|s| !s.is_empty()) {
        if accum.is_empty() && seg.ends_with(':') {
            // Windows 盘符段不可创建，直接作为前缀
            accum = seg.to_string();
            continue;
        }
        accum = if accum.is_empty() && absolute {
            format!("/{}", seg)
        } else if accum.is_empty() {
            seg.to_string()
        } else {
            format!("{}/{}", accum, seg)
        };
        if fs.exists(&accum) {
            continue;
        }
        if let Err(e) = fs.mkdir(&accum)
            && !fs.exists(&accum)
        {
            return Err(e);
        }
    }
    Ok(())
}

/// Run one task against the remote filesystem. Errors are folded into the
/// outcome; this function never propagates a fault.
pub fn execute_task(fs: &dyn RemoteFs, task: &DeployTask) -> TaskOutcome {
    let result = match task.kind {
        TaskKind::MkDir => ensure_remote_dir_all(fs, &task.remote),
        TaskKind::PutFile => match &task.local {
            Some(local) => fs.put_file(local, &task.remote),
            None => Err("上传任务缺少本地源".to_string()),
        },
        TaskKind::Unlink => fs.unlink(&task.remote),
        TaskKind::RmDir => fs.rmdir(&task.remote),
    };
    match result {
        Ok(()) => TaskOutcome { success: true, path: task.remote.clone() },
        Err(e) => {
            tracing::debug!("任务失败 {:?} {}: {}", task.kind, task.remote, e);
            TaskOutcome { success: false, path: task.remote.clone() }
        }
    }
}
