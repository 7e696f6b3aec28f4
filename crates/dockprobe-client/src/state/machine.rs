//! Dock State Machine
//!
//! 跟踪探针逻辑状态，决定何时为空操作，按顺序执行前置检查、路线、后置校验和状态提交。
//!
//! # 状态转换
//!
//! ```text
//!            ensure_attached (校验通过)
//! Unknown ────────────────────────────> Attached
//!    ^  \                                  │
//!    │   \ ensure_docked (校验通过)        │ ensure_docked
//!    │    v                                v
//!    └── 任何失败 ──────────────────── Docked
//! ```
//!
//! 状态离开 `Unknown` 的唯一途径是一次校验通过的动作。动作进行中状态为 `Unknown`。

use crate::error::DockError;
use crate::hooks::{DockEvent, HookManager};
use crate::retry::{Maneuver, RetryController};
use crate::state::atomic::AtomicProbeState;
use crate::types::{Action, ProbeState};
use crate::verify::VerificationPolicy;
use dockprobe_config::{DockableProbeConfig, VerificationConfig};
use dockprobe_driver::{MotionExecutor, SensorReader};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

// ==================== 共享状态 ====================

/// 状态机与只读句柄共享的状态
#[derive(Debug)]
struct SharedState {
    probe: AtomicProbeState,
    auto_attach: AtomicBool,
}

/// 状态快照（可序列化，用于查询命令和 JSON 输出）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DockStatus {
    pub state: ProbeState,
    pub auto_attach_dock: bool,
    pub dock_retries: u32,
    pub verification: VerificationConfig,
}

/// 只读状态句柄
///
/// 可克隆、可跨线程，读取无锁。
#[derive(Debug, Clone)]
pub struct StatusHandle {
    shared: Arc<SharedState>,
    config: Arc<DockableProbeConfig>,
}

impl StatusHandle {
    /// 当前探针状态
    pub fn query(&self) -> ProbeState {
        self.shared.probe.get(Ordering::Acquire)
    }

    pub fn auto_attach_enabled(&self) -> bool {
        self.shared.auto_attach.load(Ordering::Acquire)
    }

    /// 完整快照
    pub fn snapshot(&self) -> DockStatus {
        DockStatus {
            state: self.query(),
            auto_attach_dock: self.auto_attach_enabled(),
            dock_retries: self.config.dock_retries,
            verification: self.config.verification.clone(),
        }
    }
}

// ==================== 状态机 ====================

/// 可拆卸探针
///
/// 每台打印机一个实例，持有运动执行器和传感器。所有动作都需要 `&mut self`，
/// 保证同一时刻只有一个动作在执行。
pub struct DockableProbe<M, S> {
    pub(crate) config: Arc<DockableProbeConfig>,
    pub(crate) policy: VerificationPolicy,
    pub(crate) hooks: HookManager,
    pub(crate) motion: M,
    pub(crate) sensors: S,
    shared: Arc<SharedState>,
}

impl<M, S> DockableProbe<M, S>
where
    M: MotionExecutor,
    S: SensorReader,
{
    /// 创建实例，初始状态为 `Unknown`
    pub fn new(config: impl Into<Arc<DockableProbeConfig>>, motion: M, sensors: S) -> Self {
        let config = config.into();
        let policy = VerificationPolicy::new(&config);
        let shared = Arc::new(SharedState {
            probe: AtomicProbeState::new(ProbeState::Unknown),
            auto_attach: AtomicBool::new(config.auto_attach_dock),
        });

        Self {
            config,
            policy,
            hooks: HookManager::new(),
            motion,
            sensors,
            shared,
        }
    }

    /// 确保探针已附着
    ///
    /// 已附着时为空操作。
    ///
    /// # 错误
    ///
    /// 任何失败都会把状态置为 `Unknown` 并返回错误。
    pub fn ensure_attached(&mut self) -> Result<(), DockError> {
        self.ensure(Action::Attach)
    }

    /// 确保探针已停靠
    ///
    /// 已停靠时为空操作。
    pub fn ensure_docked(&mut self) -> Result<(), DockError> {
        self.ensure(Action::Detach)
    }

    fn ensure(&mut self, action: Action) -> Result<(), DockError> {
        let target = action.target_state();
        if self.query() == target {
            debug!("Probe already {}, nothing to do", target);
            return Ok(());
        }

        // 动作进行中物理状态不确定
        self.transition(ProbeState::Unknown);

        let controller = RetryController::new(&self.config, &self.policy, &self.hooks);
        let result: Result<Maneuver, DockError> =
            controller.attempt(action, &mut self.motion, &mut self.sensors);

        match result {
            Ok(_) => {
                self.transition(target);
                Ok(())
            },
            Err(e) => {
                self.transition(ProbeState::Unknown);
                Err(e)
            },
        }
    }

    fn transition(&self, to: ProbeState) {
        let from = self.shared.probe.swap(to, Ordering::AcqRel);
        if from != to {
            info!("Probe state: {} -> {}", from, to);
            self.hooks.emit(&DockEvent::StateChanged { from, to });
        }
    }
}

impl<M, S> DockableProbe<M, S> {
    /// 当前探针状态（纯读取）
    pub fn query(&self) -> ProbeState {
        self.shared.probe.get(Ordering::Acquire)
    }

    /// 自动附着/停靠是否启用
    pub fn auto_attach_enabled(&self) -> bool {
        self.shared.auto_attach.load(Ordering::Acquire)
    }

    /// 设置自动附着/停靠开关
    pub fn set_auto_attach(&mut self, enabled: bool) {
        let previous = self.shared.auto_attach.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            info!("Auto attach/dock {}", if enabled { "enabled" } else { "disabled" });
        }
        self.hooks.emit(&DockEvent::AutoAttachChanged { enabled });
    }

    /// 状态快照
    pub fn status(&self) -> DockStatus {
        self.status_handle().snapshot()
    }

    /// 只读状态句柄
    pub fn status_handle(&self) -> StatusHandle {
        StatusHandle {
            shared: self.shared.clone(),
            config: self.config.clone(),
        }
    }

    pub fn config(&self) -> &DockableProbeConfig {
        &self.config
    }

    /// 事件钩子（注册回调）
    pub fn hooks_mut(&mut self) -> &mut HookManager {
        &mut self.hooks
    }

    pub fn motion(&self) -> &M {
        &self.motion
    }

    pub fn motion_mut(&mut self) -> &mut M {
        &mut self.motion
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }
}

impl<M, S> std::fmt::Debug for DockableProbe<M, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockableProbe")
            .field("state", &self.query())
            .field("auto_attach", &self.auto_attach_enabled())
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
