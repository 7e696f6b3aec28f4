//! # Dockprobe CLI
//!
//! 可拆卸探针编排引擎的命令行前端，驱动一台仿真打印机。
//!
//! ## 双模式架构
//!
//! ### One-shot 模式（推荐用于 CI/脚本）
//!
//! ```bash
//! dockprobe-cli --config printer.toml check
//! dockprobe-cli --config printer.toml exec ATTACH_PROBE QUERY_DOCKABLE_PROBE DOCK_PROBE
//! ```
//!
//! ### REPL 模式（推荐用于调试）
//!
//! ```bash
//! $ dockprobe-cli --config printer.toml shell --fail-attach 1
//! dockprobe> ATTACH_PROBE
//! Probe attached!
//! dockprobe> SET_DOCKABLE_PROBE AUTO_ATTACH_DETACH=0
//! dockprobe> exit
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod modes;
mod session;

use commands::CheckCommand;
use modes::oneshot::OneShotMode;
use modes::repl::run_repl;
use session::SimArgs;

/// Dockprobe CLI - 可拆卸探针命令行工具
#[derive(Parser, Debug)]
#[command(name = "dockprobe-cli")]
#[command(about = "Attach/dock orchestration for dockable probes on a simulated printer", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件（需包含 [dockable_probe] 段）
    #[arg(short, long, global = true, default_value = "dockable_probe.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 校验配置文件
    Check {
        #[command(flatten)]
        args: CheckCommand,
    },

    /// 依次执行 G-code 命令后退出
    Exec {
        #[command(flatten)]
        sim: SimArgs,

        /// 每条命令后以 JSON 行输出事件
        #[arg(long)]
        events: bool,

        /// 命令（含参数时需加引号，例如 "SET_DOCKABLE_PROBE AUTO_ATTACH_DETACH=0"）
        #[arg(required = true)]
        commands: Vec<String>,
    },

    /// 启动交互式 Shell（REPL 模式）
    Shell {
        #[command(flatten)]
        sim: SimArgs,
    },
}

fn main() -> Result<()> {
    // 初始化日志（输出到 stderr，stdout 只输出命令响应）
    tracing_subscriber::fmt()
        .with_env_filter(
            // 未设置 RUST_LOG 时使用默认级别
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dockprobe_cli=info,dockprobe_client=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { args } => {
            // One-shot 模式：配置校验
            args.execute(&cli.config)
        },

        Commands::Exec {
            sim,
            events,
            commands,
        } => {
            // One-shot 模式：执行命令
            let mut mode = OneShotMode::new(&cli.config, &sim, events)?;
            mode.run(&commands)
        },

        Commands::Shell { sim } => {
            // REPL 模式：交互式 Shell
            run_repl(&cli.config, &sim)
        },
    }
}
