//! One-shot 模式
//!
//! 每次调用独立执行：
//! 1. 读取配置
//! 2. 创建仿真会话
//! 3. 依次执行命令，遇到错误立即停止

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use crate::commands::GcodeCommand;
use crate::session::{ProbeSession, SimArgs};

/// One-shot 模式
pub struct OneShotMode {
    session: ProbeSession,
    /// 每条命令后输出事件
    print_events: bool,
}

impl OneShotMode {
    pub fn new(config: &Path, sim: &SimArgs, print_events: bool) -> Result<Self> {
        Ok(Self {
            session: ProbeSession::open(config, sim)?,
            print_events,
        })
    }

    /// 依次执行命令
    pub fn run(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            let result = GcodeCommand::parse(line).map_err(anyhow::Error::from).and_then(|command| {
                debug!("Executing {}", command.name());
                command.execute(&mut self.session)
            });

            self.flush_events()?;

            let response = result.with_context(|| format!("Command '{}' failed", line.trim()))?;
            println!("{}", response);
        }
        Ok(())
    }

    fn flush_events(&self) -> Result<()> {
        let events = self.session.drain_events();
        if self.print_events {
            for event in events {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
        Ok(())
    }
}
