use clap::Parser;
use colored::Colorize;
use env_logger::Builder;
use log::LevelFilter;
use std::process::ExitCode;

use pgm_stego::{
    cli::{Cli, Commands},
    constants::EXTRACTED_WRITE_FAILURE_EXIT_CODE,
    handler::{RunOutcome, handle_hide, handle_recover, handle_run},
};

/// 初始化日志，默认只输出警告及以上级别，可通过 `RUST_LOG` 覆盖。
fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据指定的子命令（`run`、`hide` 或 `recover`）
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<ExitCode> {
    init_logger();

    // 解析命令行参数
    let cli = Cli::parse();

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Run(args) => match handle_run(args)? {
            RunOutcome::Complete => Ok(ExitCode::SUCCESS),
            RunOutcome::ExtractedWriteFailed(err) => {
                eprintln!("{} {:?}", "Warning:".yellow().bold(), err);
                Ok(ExitCode::from(EXTRACTED_WRITE_FAILURE_EXIT_CODE))
            }
        },
        Commands::Hide(args) => handle_hide(args).map(|()| ExitCode::SUCCESS),
        Commands::Recover(args) => handle_recover(args).map(|()| ExitCode::SUCCESS),
    }
}
