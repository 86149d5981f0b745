use indicatif::ProgressBar;
use owo_colors::OwoColorize;

use crate::prompt::Confirmation;
use crate::session::Transport;

/// Remote backup archive name: pure composition over a pre-formatted
/// timestamp and random token so it stays independently testable.
pub fn archive_file_name(app_name: &str, environment: &str, timestamp: &str, token: &str) -> String {
    format!("backups_{}_{}_{}_{}.tar.gz", app_name, environment, timestamp, token)
}

/// 把远端目标路径拆成（父目录，末级目录名）。归档命令在父目录里执行，
/// 归档内容是末级目录本身。
pub(crate) fn split_remote_target(remote_path: &str) -> (String, String) {
    let trimmed = remote_path.trim_end_matches(['/', '\\']);
    match trimmed.rfind(['/', '\\']) {
        Some(0) => ("/".to_string(), trimmed[1..].to_string()),
        Some(i) => (trimmed[..i].to_string(), trimmed[i + 1..].to_string()),
        None => ("/".to_string(), trimmed.to_string()),
    }
}

pub(crate) fn backup_command(file_name: &str, remote_path: &str) -> String {
    let (parent, leaf) = split_remote_target(remote_path);
    format!("cd {} && tar -czf {} {}", parent, file_name, leaf)
}

/// Archive the existing remote content before any destructive step. Only
/// invoked when the target directory pre-existed. A declined prompt returns
/// immediately; a failed tar command is logged and the deployment still
/// proceeds — forward progress is never blocked on a missing safety net, so
/// a silent backup failure followed by deletion is a documented data-loss
/// risk of this tool.
pub fn maybe_backup(
    transport: &dyn Transport,
    prompt: &dyn Confirmation,
    file_name: &str,
    remote_path: &str,
) {
    if !prompt.confirm_backup() {
        return;
    }
    let command = backup_command(file_name, remote_path);
    tracing::debug!("执行远端备份命令: {}", command);
    let spinner = ProgressBar::new_spinner().with_message("服务器正在备份...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    match transport.execute(&command) {
        Ok(out) if out.exit_code == 0 => {
            spinner.finish_and_clear();
            println!("{}", format!("备份成功: {}", file_name).green());
        }
        Ok(out) => {
            spinner.finish_and_clear();
            eprintln!("{}", format!("备份失败，退出码: {}", out.exit_code).red());
            tracing::warn!("备份命令退出码 {}: {}", out.exit_code, out.output.trim());
        }
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{}", format!("备份失败: {}", e).red());
        }
    }
}
