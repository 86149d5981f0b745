use owo_colors::OwoColorize;

use crate::prompt::Confirmation;
use crate::session::RemoteFs;

/// Outcome of the remote target directory check. Produced once per run and
/// drives every subsequent branch; `Declined` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemotePathState {
    /// 目录原本不存在，本次运行刚刚创建
    Created,
    /// 目录已经存在（可能持有上一次部署的内容）
    Existing,
    /// 操作员拒绝创建，或创建失败；部署终止
    Declined,
}

/// 单次 stat + 必要时单次 mkdir，不做重试：一次性部署工具不处理存在性竞争。
pub fn ensure_remote_dir(
    fs: &dyn RemoteFs,
    prompt: &dyn Confirmation,
    remote_path: &str,
) -> RemotePathState {
    if fs.exists(remote_path) {
        return RemotePathState::Existing;
    }
    if !prompt.confirm_mkdir() {
        println!("{}", "已取消：远程目录不存在".yellow());
        return RemotePathState::Declined;
    }
    match fs.mkdir(remote_path) {
        Ok(()) => {
            tracing::info!("已创建远程目录 {}", remote_path);
            println!("{}", format!("已创建远程目录: {}", remote_path).green());
            RemotePathState::Created
        }
        Err(e) => {
            // 操作员明确要求创建却创建不了，继续部署没有意义
            eprintln!("{}", format!("创建远程目录失败: {} — {}", remote_path, e).red());
            RemotePathState::Declined
        }
    }
}
