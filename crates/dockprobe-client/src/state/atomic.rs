//! 探针状态（原子版本，用于线程间共享）

use crate::types::ProbeState;
use std::sync::atomic::{AtomicU8, Ordering};

/// 原子探针状态
///
/// 只有状态机所在线程写入，其他线程通过 `get` 读取快照。
///
/// # 示例
///
/// ```rust
/// use dockprobe_client::ProbeState;
/// use dockprobe_client::state::AtomicProbeState;
/// use std::sync::atomic::Ordering;
///
/// let state = AtomicProbeState::new(ProbeState::Unknown);
/// let previous = state.swap(ProbeState::Attached, Ordering::AcqRel);
/// assert_eq!(previous, ProbeState::Unknown);
/// assert_eq!(state.get(Ordering::Acquire), ProbeState::Attached);
/// ```
#[derive(Debug, Default)]
pub struct AtomicProbeState {
    inner: AtomicU8,
}

impl AtomicProbeState {
    pub fn new(state: ProbeState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
        }
    }

    /// 获取当前状态
    pub fn get(&self, ordering: Ordering) -> ProbeState {
        ProbeState::from_u8(self.inner.load(ordering))
    }

    /// 设置状态
    pub fn set(&self, state: ProbeState, ordering: Ordering) {
        self.inner.store(state.as_u8(), ordering);
    }

    /// 设置状态并返回旧值
    pub fn swap(&self, state: ProbeState, ordering: Ordering) -> ProbeState {
        ProbeState::from_u8(self.inner.swap(state.as_u8(), ordering))
    }
}

impl Clone for AtomicProbeState {
    fn clone(&self) -> Self {
        Self::new(self.get(Ordering::Acquire))
    }
}
