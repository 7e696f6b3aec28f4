//! # Dockprobe Config
//!
//! 可拆卸探针（Dockable Probe）的配置数据层（无硬件依赖）
//!
//! ## 模块
//!
//! - `waypoint`: 路径点与附着/停靠路线
//! - `pin`: 引脚描述（上拉、反相、芯片前缀）
//! - `verification`: 附着状态校验策略
//! - `config`: TOML 加载与校验，生成不可变配置
//!
//! 所有类型在加载时完成校验，之后只读共享。

pub mod config;
pub mod error;
pub mod pin;
pub mod verification;
pub mod waypoint;

// 重新导出常用类型
pub use config::{DEFAULT_SPEED, DockableProbeConfig, ProbeSettings, RawDockableProbeConfig, SpeedConfig};
pub use error::ConfigError;
pub use pin::{PinPull, PinSpec};
pub use verification::{VerificationCheck, VerificationConfig};
pub use waypoint::{Route, RouteKind, Waypoint};
