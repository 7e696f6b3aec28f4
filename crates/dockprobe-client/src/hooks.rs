//! 事件钩子（Hook System）
//!
//! 每次重试、失败、状态变化都会作为结构化事件发出，供操作员观察。
//! 除运动外，这是编排引擎唯一的副作用。
//!
//! # 设计原则
//!
//! - **即发即弃**: 回调不能阻塞编排流程，推荐使用 Channel 异步处理
//! - **与 tracing 并行**: 事件同时写入日志，钩子只是额外的结构化出口
//!
//! # 使用示例
//!
//! ```rust
//! use dockprobe_client::hooks::{ChannelEventHook, DockEventCallback, HookManager};
//! use std::sync::Arc;
//!
//! let mut hooks = HookManager::new();
//! let (hook, rx) = ChannelEventHook::new(64);
//! hooks.add_callback(Arc::new(hook) as Arc<dyn DockEventCallback>);
//!
//! std::thread::spawn(move || {
//!     while let Ok(event) = rx.recv() {
//!         println!("{:?}", event);
//!     }
//! });
//! ```

use crate::types::{Action, ProbeState};
use crossbeam_channel::{Receiver, Sender, bounded};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 附着/停靠事件
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DockEvent {
    /// 开始一次附着/停靠动作
    ManeuverStarted { action: Action },

    /// 校验失败，即将退回接近点后重试
    RetryScheduled {
        action: Action,
        /// 刚失败的是第几次尝试（从 1 计）
        attempt: u32,
        /// 剩余重试次数（不含即将进行的这次）
        remaining: u32,
    },

    /// 动作完成并通过校验
    ManeuverSucceeded { action: Action, attempts: u32 },

    /// 动作失败（致命）
    ManeuverFailed { action: Action, error: String },

    /// 逻辑状态变化
    StateChanged { from: ProbeState, to: ProbeState },

    /// 自动附着/停靠开关变化
    AutoAttachChanged { enabled: bool },
}

/// 事件回调 Trait
///
/// 实现必须非阻塞。
pub trait DockEventCallback: Send + Sync {
    fn on_event(&self, event: &DockEvent);
}

/// 钩子管理器
#[derive(Default)]
pub struct HookManager {
    callbacks: Vec<Arc<dyn DockEventCallback>>,
}

impl HookManager {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    pub fn add_callback(&mut self, callback: Arc<dyn DockEventCallback>) {
        self.callbacks.push(callback);
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// 触发所有回调
    pub fn emit(&self, event: &DockEvent) {
        for callback in &self.callbacks {
            callback.on_event(event);
        }
    }
}

impl std::fmt::Debug for HookManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookManager")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// 基于 Channel 的事件钩子
///
/// 使用 `try_send`，队列满时丢弃事件并计数，不阻塞编排流程。
pub struct ChannelEventHook {
    tx: Sender<DockEvent>,
    dropped_events: Arc<AtomicU64>,
}

impl ChannelEventHook {
    /// 创建钩子，返回接收端
    #[must_use]
    pub fn new(capacity: usize) -> (Self, Receiver<DockEvent>) {
        let (tx, rx) = bounded(capacity);
        let hook = Self {
            tx,
            dropped_events: Arc::new(AtomicU64::new(0)),
        };
        (hook, rx)
    }

    /// 丢弃事件计数器
    pub fn dropped_events(&self) -> &Arc<AtomicU64> {
        &self.dropped_events
    }
}

impl DockEventCallback for ChannelEventHook {
    fn on_event(&self, event: &DockEvent) {
        if self.tx.try_send(event.clone()).is_err() {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
        }
    }
}
