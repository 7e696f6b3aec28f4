//! 探针状态机
//!
//! - [`DockableProbe`]: 顶层编排对象，独占探针状态和自动附着开关
//! - [`StatusHandle`]: 只读句柄，其他线程无锁读取快照

mod atomic;
mod machine;

pub use atomic::AtomicProbeState;
pub use machine::{DockStatus, DockableProbe, StatusHandle};
