//! G-code 风格命令
//!
//! 格式：`NAME [KEY=VALUE ...]`，命令名和参数名不区分大小写。
//!
//! | 命令 | 说明 |
//! |------|------|
//! | `ATTACH_PROBE` | 确保探针已附着 |
//! | `DOCK_PROBE` | 确保探针已停靠 |
//! | `QUERY_DOCKABLE_PROBE` | 查询探针状态 |
//! | `SET_DOCKABLE_PROBE [AUTO_ATTACH_DETACH=0\|1]` | 设置/查询自动附着开关（别名 `AUTO_ATTACH_DOCK`） |
//! | `PROBE` | 在自动附着策略下执行一次仿真测量 |

use crate::session::ProbeSession;
use anyhow::Result;
use dockprobe_driver::{MotionExecutor, MoveTarget, Position};
use thiserror::Error;

/// 命令解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Malformed parameter '{0}', expected KEY=VALUE")]
    MalformedParameter(String),

    #[error("Unknown parameter '{param}' for {command}")]
    UnknownParameter { command: &'static str, param: String },

    #[error("Invalid value '{value}' for {param}, expected 0 or 1")]
    InvalidValue { param: String, value: String },
}

/// 已解析的命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcodeCommand {
    AttachProbe,
    DockProbe,
    QueryDockableProbe,
    /// `None` 表示只查询当前值
    SetDockableProbe { auto_attach: Option<bool> },
    Probe,
}

impl GcodeCommand {
    /// 解析一行命令
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or(CommandError::Empty)?.to_ascii_uppercase();

        let mut params = Vec::new();
        for part in parts {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| CommandError::MalformedParameter(part.to_string()))?;
            params.push((key.to_ascii_uppercase(), value.to_string()));
        }

        let command = match name.as_str() {
            "ATTACH_PROBE" => GcodeCommand::AttachProbe,
            "DOCK_PROBE" => GcodeCommand::DockProbe,
            "QUERY_DOCKABLE_PROBE" => GcodeCommand::QueryDockableProbe,
            "PROBE" => GcodeCommand::Probe,
            "SET_DOCKABLE_PROBE" => {
                let mut auto_attach = None;
                for (key, value) in params.drain(..) {
                    match key.as_str() {
                        "AUTO_ATTACH_DETACH" | "AUTO_ATTACH_DOCK" => {
                            auto_attach = Some(parse_flag(&key, &value)?);
                        },
                        _ => {
                            return Err(CommandError::UnknownParameter {
                                command: "SET_DOCKABLE_PROBE",
                                param: key,
                            });
                        },
                    }
                }
                GcodeCommand::SetDockableProbe { auto_attach }
            },
            _ => return Err(CommandError::Unknown(name)),
        };

        if let Some((key, _)) = params.into_iter().next() {
            return Err(CommandError::UnknownParameter {
                command: command.name(),
                param: key,
            });
        }

        Ok(command)
    }

    /// 命令名
    pub fn name(&self) -> &'static str {
        match self {
            GcodeCommand::AttachProbe => "ATTACH_PROBE",
            GcodeCommand::DockProbe => "DOCK_PROBE",
            GcodeCommand::QueryDockableProbe => "QUERY_DOCKABLE_PROBE",
            GcodeCommand::SetDockableProbe { .. } => "SET_DOCKABLE_PROBE",
            GcodeCommand::Probe => "PROBE",
        }
    }

    /// 执行命令，返回响应文本
    pub fn execute(&self, session: &mut ProbeSession) -> Result<String> {
        let probe = &mut session.probe;
        let response = match self {
            GcodeCommand::AttachProbe => {
                probe.ensure_attached()?;
                "Probe attached!".to_string()
            },
            GcodeCommand::DockProbe => {
                probe.ensure_docked()?;
                "Probe docked!".to_string()
            },
            GcodeCommand::QueryDockableProbe => format!("Probe Status: {}", probe.query()),
            GcodeCommand::SetDockableProbe {
                auto_attach: Some(enabled),
            } => {
                probe.set_auto_attach(*enabled);
                format!("Auto attach/dock set to {}", u8::from(*enabled))
            },
            GcodeCommand::SetDockableProbe { auto_attach: None } => {
                format!("Auto attach/dock is {}", u8::from(probe.auto_attach_enabled()))
            },
            GcodeCommand::Probe => {
                let lift_speed = probe.config().speeds.lift;
                let position: Position = probe.with_probe(|ctx| {
                    let position = ctx.motion.current_position()?;
                    // 仿真中没有热床：在当前位置采样后回退
                    ctx.motion.move_to(
                        MoveTarget::z(position.z + ctx.settings.sample_retract_dist),
                        lift_speed,
                    )?;
                    Ok::<_, anyhow::Error>(position)
                })?;
                format!("probe at {:.3},{:.3} is z={:.6}", position.x, position.y, position.z)
            },
        };
        Ok(response)
    }
}

fn parse_flag(param: &str, value: &str) -> Result<bool, CommandError> {
    match value.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(CommandError::InvalidValue {
            param: param.to_string(),
            value: value.to_string(),
        }),
    }
}
