//! 编排引擎错误类型定义
//!
//! 所有运行时错误只中止当前命令，并把探针状态置为 `Unknown`。

use crate::types::Action;
use dockprobe_config::RouteKind;
use dockprobe_driver::DriverError;
use thiserror::Error;

/// 附着/停靠错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DockError {
    /// 附着前底座中未检测到探针（未发出任何运动）
    #[error("Attach Probe: Probe not detected in dock, aborting")]
    Precondition,

    /// 重试次数用尽，校验仍未通过
    #[error("Probe {action} failed! Verification did not pass after {attempts} attempt(s)")]
    Verification { action: Action, attempts: u32 },

    /// 路线包含 Z 坐标，但 Z 轴未归零
    #[error("Cannot attach/detach probe, must home Z axis first ({route} route contains Z coordinates)")]
    HomingRequired { route: RouteKind },

    /// 运动执行器或传感器错误
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}
