use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use owo_colors::OwoColorize;

use deploypilot::cli::{Cli, Commands};
use deploypilot::deploy::{self, DeployOutcome, RunOptions};
use deploypilot::prompt::{Confirmation, TermPrompt};
use deploypilot::{compress, config, session, util};

fn main() -> Result<()> {
    let cli = Cli::parse();
    // Keep the appender guard alive for the whole run so buffered log lines flush on exit.
    let _log_guard = if cli.verbose { Some(init_file_logging()?) } else { None };
    let _ = util::try_enable_ansi_on_windows();

    let config_path =
        cli.config.clone().unwrap_or_else(|| PathBuf::from(config::DEFAULT_CONFIG_FILE));

    if let Some(Commands::Init {}) = cli.command {
        config::write_template(&config_path)?;
        println!(
            "{}",
            format!("已生成配置文件模板: {}，请填写后重新运行", config_path.display()).green()
        );
        return Ok(());
    }

    if !config_path.exists() {
        // 首次使用：落一份模板引导填写，而不是直接报错
        let spinner = spinner("正在生成配置文件...");
        config::write_template(&config_path)?;
        spinner.finish_and_clear();
        println!(
            "{}",
            format!("已生成配置文件模板: {}，请填写后重新运行", config_path.display()).green()
        );
        return Ok(());
    }

    let targets = config::load_targets(&config_path)?;
    let prompt = TermPrompt;
    let labels: Vec<String> = targets.iter().map(|t| t.label()).collect();
    let Some(index) = prompt.select_target(&labels) else {
        println!("{}", "未选择部署目标，已退出".yellow());
        return Ok(());
    };
    let target = &targets[index];
    tracing::info!("已选择部署目标: {}", target.label());

    let backup_name = deploy::backup::archive_file_name(
        &target.app_name,
        &target.environment,
        &util::format_timestamp(chrono::Local::now()),
        &util::random_token(6),
    );

    if target.compress {
        let pb = spinner("正在压缩本地文件...");
        match compress::compress_local_tree(&target.local_path, &backup_name) {
            Ok(path) => {
                pb.finish_and_clear();
                println!("{}", "压缩成功".green());
                println!("{}", format!("保存路径:{}", path.display()).green());
            }
            Err(e) => {
                // 本地压缩只是附加产物，失败不阻断部署
                pb.finish_and_clear();
                eprintln!("{}", format!("压缩失败: {}", e).red());
            }
        }
    }

    let opts = RunOptions {
        chunk_size: cli.chunk_size.unwrap_or(deploy::DEFAULT_CHUNK_SIZE),
        backup_name,
    };
    let outcome = deploy::launch(target, &prompt, &opts, || {
        let pb = spinner("正在连接服务器...");
        let transport = session::connect(&target.server_options, &target.app_name);
        pb.finish_and_clear();
        if transport.is_ok() {
            println!("{}", "连接成功".green());
        }
        transport.map_err(Into::into)
    })?;

    match outcome {
        DeployOutcome::Completed => println!("{}", "部署完成".green()),
        DeployOutcome::Aborted(reason) => println!("{}", format!("部署已中止: {}", reason).yellow()),
    }
    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner().with_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn init_file_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = dirs::home_dir()
        .map(|h| h.join(".deploypilot").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("无法创建日志目录: {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::daily(&log_dir, "dp.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}
