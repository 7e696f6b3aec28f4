//! 附着状态校验配置
//!
//! 三种独立、可组合的校验策略：
//!
//! - `OpenOnAttach`: 复用探针主触发引脚，按方向重新解读读数
//! - `AttachSense`: 独立的探针在位传感器
//! - `DockSense`: 底座在位传感器
//!
//! 附着侧最多一个（`OpenOnAttach` 优先于 `AttachSense`），停靠侧最多一个，
//! 两侧正交，按逻辑与组合。

use crate::pin::PinSpec;
use serde::Serialize;

/// 单个校验策略
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerificationCheck {
    /// 主触发引脚校验
    ///
    /// `open_when_attached = true`：附着后读数应为 Open，停靠后应为 Triggered。
    /// `false` 时两者反过来。
    OpenOnAttach { open_when_attached: bool },

    /// 探针在位引脚：Triggered 表示探针在工具头上
    AttachSense { pin: PinSpec },

    /// 底座在位引脚：Triggered 表示探针在底座中
    DockSense { pin: PinSpec },
}

impl VerificationCheck {
    /// 是否为附着侧校验
    pub fn is_attach_side(&self) -> bool {
        !matches!(self, VerificationCheck::DockSense { .. })
    }
}

/// 校验配置（0 到 2 个校验策略）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VerificationConfig {
    checks: Vec<VerificationCheck>,
}

impl VerificationConfig {
    /// 不做任何校验（尽力而为模式，信任运动指令）
    pub fn none() -> Self {
        Self::default()
    }

    /// 由各选项组合
    ///
    /// `check_open_attach` 存在时优先于 `probe_sense_pin`。
    pub fn from_options(
        check_open_attach: Option<bool>,
        probe_sense_pin: Option<PinSpec>,
        dock_sense_pin: Option<PinSpec>,
    ) -> Self {
        let mut checks = Vec::with_capacity(2);

        match (check_open_attach, probe_sense_pin) {
            (Some(open_when_attached), _) => {
                checks.push(VerificationCheck::OpenOnAttach { open_when_attached })
            },
            (None, Some(pin)) => checks.push(VerificationCheck::AttachSense { pin }),
            (None, None) => {},
        }

        if let Some(pin) = dock_sense_pin {
            checks.push(VerificationCheck::DockSense { pin });
        }

        Self { checks }
    }

    pub fn checks(&self) -> &[VerificationCheck] {
        &self.checks
    }

    /// 是否没有配置任何校验
    pub fn is_none(&self) -> bool {
        self.checks.is_empty()
    }

    /// 附着侧校验（如有）
    pub fn attach_side(&self) -> Option<&VerificationCheck> {
        self.checks.iter().find(|c| c.is_attach_side())
    }

    /// 底座在位引脚（如有）
    pub fn dock_sense_pin(&self) -> Option<&PinSpec> {
        self.checks.iter().find_map(|c| match c {
            VerificationCheck::DockSense { pin } => Some(pin),
            _ => None,
        })
    }
}
