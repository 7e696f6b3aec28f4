//! 基础类型：探针状态与动作方向

use dockprobe_config::RouteKind;
use serde::Serialize;
use std::fmt;

/// 探针逻辑状态
///
/// `Unknown` 是唯一合法的初始值：新进程不能假设之前的物理状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum ProbeState {
    #[default]
    Unknown = 0,
    Attached = 1,
    Docked = 2,
}

impl ProbeState {
    /// 从 u8 转换，无效值视为 `Unknown`
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Attached,
            2 => Self::Docked,
            _ => Self::Unknown,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProbeState::Unknown => "UNKNOWN",
            ProbeState::Attached => "ATTACHED",
            ProbeState::Docked => "DOCKED",
        }
    }
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 动作方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// 附着
    Attach,
    /// 停靠（脱离）
    Detach,
}

impl Action {
    /// 对应的路线
    pub fn route_kind(self) -> RouteKind {
        match self {
            Action::Attach => RouteKind::Attach,
            Action::Detach => RouteKind::Dock,
        }
    }

    /// 成功后的状态
    pub fn target_state(self) -> ProbeState {
        match self {
            Action::Attach => ProbeState::Attached,
            Action::Detach => ProbeState::Docked,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Attach => f.write_str("attach"),
            Action::Detach => f.write_str("detach"),
        }
    }
}
