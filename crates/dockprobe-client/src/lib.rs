//! # Dockprobe Client
//!
//! 可拆卸探针的附着/停靠编排引擎。
//!
//! # 架构
//!
//! 从底层到高层：
//!
//! - **路线模型** (`route`): 把路线展开为带速度的运动序列
//! - **校验策略** (`verify`): 统一的"已附着？/已停靠？"判定
//! - **重试控制器** (`retry`): 运动 → 校验 → 退回接近点 → 重试，次数有界
//! - **状态机** (`state`): 跟踪探针逻辑状态，只有校验通过的动作才能改变状态
//! - **自动附着策略** (`auto_attach`): 测量操作前后自动附着/停靠
//!
//! # 快速开始
//!
//! ```rust,ignore
//! use dockprobe_client::DockableProbe;
//!
//! let mut probe = DockableProbe::new(config, motion, sensors);
//! probe.ensure_attached()?;
//! // ... 测量 ...
//! probe.ensure_docked()?;
//! ```

pub mod auto_attach;
pub mod error;
pub mod hooks;
pub mod retry;
pub mod route;
pub mod state;
pub mod types;
pub mod verify;

// 重新导出常用类型
pub use auto_attach::{ProbeBatch, ProbeContext};
pub use error::DockError;
pub use hooks::{ChannelEventHook, DockEvent, DockEventCallback, HookManager};
pub use retry::{Maneuver, RetryController, RetryPhase};
pub use route::{MoveStage, PlannedMove, RoutePlanner};
pub use state::{DockStatus, DockableProbe, StatusHandle};
pub use types::{Action, ProbeState};
pub use verify::{VerificationPolicy, Verdict};
