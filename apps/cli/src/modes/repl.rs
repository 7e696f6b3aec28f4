//! REPL 模式（交互式 Shell）
//!
//! 专用输入线程 + crossbeam 通道，保留历史记录。
//! 动作不可抢占：Ctrl+C 只取消当前输入行。

use anyhow::Result;
use crossbeam_channel::{Receiver, bounded};
use rustyline::Editor;
use std::path::Path;
use std::thread;
use tracing::{debug, error};

use crate::commands::GcodeCommand;
use crate::session::{ProbeSession, SimArgs};

/// 历史记录文件
const HISTORY_PATH: &str = ".dockprobe_history";

/// 输入线程发送的中断标记
const INTERRUPT: &str = "SIGINT";

/// REPL 输入（专用输入线程）
pub struct ReplInput {
    command_rx: Receiver<String>,
    _input_thread: thread::JoinHandle<Result<()>>,
}

impl ReplInput {
    /// 创建专用输入线程（保留历史记录）
    pub fn new() -> Self {
        let (command_tx, command_rx) = bounded::<String>(10);

        // 在专用线程内创建 Editor（生命周期 = REPL 会话）
        let input_thread = thread::spawn(move || {
            use rustyline::history::DefaultHistory;

            let mut rl = Editor::<(), DefaultHistory>::new()
                .map_err(|e| anyhow::anyhow!("Failed to initialize readline: {}", e))?;

            rl.load_history(HISTORY_PATH).ok(); // 首次运行没有历史文件

            loop {
                match rl.readline("dockprobe> ") {
                    Ok(line) => {
                        let line = line.trim().to_string();

                        if line.is_empty() {
                            continue;
                        }

                        let _ = rl.add_history_entry(line.clone());
                        let exit = line == "exit" || line == "quit";

                        if command_tx.send(line).is_err() || exit {
                            break; // 主线程已关闭
                        }
                    },

                    Err(rustyline::error::ReadlineError::Interrupted) => {
                        println!("^C");
                        let _ = command_tx.send(INTERRUPT.to_string());
                    },

                    Err(rustyline::error::ReadlineError::Eof) => break,

                    Err(err) => {
                        eprintln!("Error: {:?}", err);
                        break;
                    },
                }
            }

            rl.save_history(HISTORY_PATH).ok();
            Ok(())
        });

        Self {
            command_rx,
            _input_thread: input_thread,
        }
    }

    /// 阻塞等待用户输入，输入线程退出后返回 `None`
    pub fn recv_command(&self) -> Option<String> {
        self.command_rx.recv().ok()
    }
}

/// 运行 REPL 模式
pub fn run_repl(config: &Path, sim: &SimArgs) -> Result<()> {
    let mut session = ProbeSession::open(config, sim)?;

    println!("Dockprobe CLI v{} - 交互式 Shell", env!("CARGO_PKG_VERSION"));
    println!("输入 'help' 查看帮助，'exit' 退出");
    println!();

    let input = ReplInput::new();

    while let Some(line) = input.recv_command() {
        match line.as_str() {
            INTERRUPT => {
                println!("💡 动作不可中断；输入 'exit' 退出");
            },

            "exit" | "quit" => {
                println!("👋 再见！");
                break;
            },

            "help" => print_help(),

            "status" => {
                println!("{}", serde_json::to_string_pretty(&session.probe.status())?);
            },

            "events" => {
                for event in session.drain_events() {
                    println!("{}", serde_json::to_string(&event)?);
                }
            },

            "sim" => {
                println!(
                    "📍 {} | probe {:?} | {} moves",
                    session.sim.position(),
                    session.sim.probe_location(),
                    session.sim.move_count()
                );
            },

            _ => match GcodeCommand::parse(&line) {
                Ok(command) => {
                    debug!("Executing {}", command.name());
                    match command.execute(&mut session) {
                        Ok(response) => println!("{}", response),
                        Err(err) => error!("❌ {} failed: {:#}", command.name(), err),
                    }
                },
                Err(err) => {
                    eprintln!("❌ Error: {}", err);
                    println!("💡 输入 'help' 查看可用命令");
                },
            },
        }
    }

    Ok(())
}

/// 打印帮助信息
fn print_help() {
    println!("可用命令:");
    println!("  ATTACH_PROBE                           确保探针已附着");
    println!("  DOCK_PROBE                             确保探针已停靠");
    println!("  QUERY_DOCKABLE_PROBE                   查询探针状态");
    println!("  SET_DOCKABLE_PROBE [AUTO_ATTACH_DETACH=0|1]  设置/查询自动附着开关");
    println!("  PROBE                                  在自动附着策略下仿真一次测量");
    println!("  status                                 以 JSON 输出状态快照");
    println!("  events                                 输出待处理事件");
    println!("  sim                                    仿真打印机状态");
    println!("  help                                   显示帮助");
    println!("  exit                                   退出");
}
