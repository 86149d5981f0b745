// deploy module: deployment decision protocol and tree synchronization engine
pub mod backup;
pub mod ensure;
pub mod executor;
pub mod task;
pub mod walker;

pub use ensure::RemotePathState;
pub use executor::{DEFAULT_CHUNK_SIZE, run_batched};
pub use task::{DeployTask, TaskKind, TaskList, TaskOutcome};

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::config::DeployTarget;
use crate::error::DeployError;
use crate::prompt::Confirmation;
use crate::session::{RemoteFs, Transport};
use crate::util::is_deploy_path;

/// Per-run knobs resolved by the CLI layer.
pub struct RunOptions {
    pub chunk_size: usize,
    /// 远端备份归档文件名（由外层基于时间戳+随机后缀生成）
    pub backup_name: String,
}

/// Terminal result of one deployment run.
#[derive(Debug, PartialEq, Eq)]
pub enum DeployOutcome {
    Completed,
    Aborted(&'static str),
}

/// 一次部署的完整状态机：
/// `Init → DirectoryCheck → {Aborted | BackupDecision} → DeleteDecision → Upload → Closed`。
///
/// 路径形态校验在发起任何网络交互之前完成；`connect` 只在校验与连接确认都
/// 通过后才被调用，且凡是离开 Init 的路径都会在返回前关闭会话。
pub fn launch<T: Transport>(
    target: &DeployTarget,
    prompt: &dyn Confirmation,
    opts: &RunOptions,
    connect: impl FnOnce() -> Result<T>,
) -> Result<DeployOutcome> {
    if !is_deploy_path(&target.remote_path) {
        return Err(DeployError::InvalidRemotePath(target.remote_path.clone()).into());
    }
    if !prompt.confirm_connect() {
        return Ok(DeployOutcome::Aborted("连接未确认"));
    }
    let transport = connect()?;
    let result = drive(&transport, target, prompt, opts);
    transport.close();
    result
}

fn drive<T: Transport>(
    transport: &T,
    target: &DeployTarget,
    prompt: &dyn Confirmation,
    opts: &RunOptions,
) -> Result<DeployOutcome> {
    let fs = transport.fs();
    match ensure::ensure_remote_dir(fs, prompt, &target.remote_path) {
        RemotePathState::Declined => return Ok(DeployOutcome::Aborted("远程目录不可用")),
        RemotePathState::Created => {
            // 刚创建的目录必然为空，备份与删除阶段整体跳过
            tracing::debug!("远程目录为新建，跳过备份与删除");
        }
        RemotePathState::Existing => {
            backup::maybe_backup(transport, prompt, &opts.backup_name, &target.remote_path);
            if prompt.confirm_delete() {
                delete_remote_tree(fs, &target.remote_path, opts.chunk_size);
            }
        }
    }
    upload_tree(fs, &target.local_path, &target.remote_path, opts.chunk_size)?;
    Ok(DeployOutcome::Completed)
}

/// 删除阶段：全量清空 `files` 之后才触碰 `directories`，
/// 保证每个目录的删除任务运行时目录已空。单项失败只记录不中断。
fn delete_remote_tree(fs: &dyn RemoteFs, remote_root: &str, chunk_size: usize) {
    let spinner = ProgressBar::new_spinner().with_message("正在统计...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    let walked = walker::walk_remote(fs, remote_root);
    spinner.finish_and_clear();
    let (list, stats) = match walked {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", format!("远端目录枚举失败，跳过删除: {}", e).red());
            return;
        }
    };
    if list.is_empty() {
        println!("{}", "远程目录为空，无需删除".green());
        return;
    }
    stats.print("待删除");

    let start = Instant::now();
    let pb = phase_bar(list.len() as u64);
    let file_outcomes = run_batched(&list.files, chunk_size, fs, Some(&pb));
    let dir_outcomes = run_batched(&list.directories, chunk_size, fs, Some(&pb));
    pb.finish_and_clear();

    report_failures(&file_outcomes, "文件", "删除失败");
    report_failures(&dir_outcomes, "目录", "删除失败");
    println!("{}", format!("删除结束 耗时:{:.2} 秒", start.elapsed().as_secs_f64()).green());
}

/// 上传阶段：先建目录（父先于子）再传文件。
fn upload_tree(
    fs: &dyn RemoteFs,
    local_root: &Path,
    remote_root: &str,
    chunk_size: usize,
) -> Result<()> {
    let (list, stats) = walker::walk_local(local_root, remote_root)?;
    stats.print("待上传");

    let start = Instant::now();
    let pb = phase_bar(list.len() as u64);
    let dir_outcomes = run_batched(&list.directories, chunk_size, fs, Some(&pb));
    let file_outcomes = run_batched(&list.files, chunk_size, fs, Some(&pb));
    pb.finish_and_clear();

    report_failures(&dir_outcomes, "文件夹", "创建失败");
    report_failures(&file_outcomes, "文件", "上传失败");
    println!("{}", format!("上传结束 耗时:{:.2} 秒", start.elapsed().as_secs_f64()).green());
    Ok(())
}

fn report_failures(outcomes: &[TaskOutcome], noun: &str, verb: &str) {
    for outcome in outcomes.iter().filter(|o| !o.success) {
        eprintln!("{}", format!("{}:{} {}", noun, outcome.path, verb).red());
    }
}

fn phase_bar(len: u64) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
    )
    .expect("valid progress template")
    .progress_chars("=> ");
    ProgressBar::new(len).with_style(style)
}
