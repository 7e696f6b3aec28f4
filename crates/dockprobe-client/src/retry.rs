//! 重试控制器
//!
//! 单次附着/停靠动作的有界重试驱动，显式状态机：
//!
//! ```text
//! Idle ──(前置检查)──> Moving ──> Verifying ──Ok──> 成功
//!                        ^            │
//!                        │        Mismatch，仍有预算
//!                        │            v
//!                        └──────  BackingOff
//! ```
//!
//! 预算用尽时返回 `DockError::Verification`。总尝试次数最多 `dock_retries + 1`。

use crate::error::DockError;
use crate::hooks::{DockEvent, HookManager};
use crate::route::{PlannedMove, RoutePlanner};
use crate::types::Action;
use crate::verify::{VerificationPolicy, Verdict};
use dockprobe_config::DockableProbeConfig;
use dockprobe_driver::{MotionExecutor, Position, SensorReader};
use tracing::{debug, error, info, trace, warn};

/// 重试状态机阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    /// 尚未开始运动（前置检查）
    Idle,
    /// 执行路线
    Moving,
    /// 读取校验
    Verifying,
    /// 退回接近点
    BackingOff,
}

/// 成功完成的动作
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Maneuver {
    pub action: Action,
    /// 实际执行的路线次数（≥ 1）
    pub attempts: u32,
    /// 动作开始前的位置（已恢复）
    pub start: Position,
}

/// 重试控制器
pub struct RetryController<'a> {
    config: &'a DockableProbeConfig,
    policy: &'a VerificationPolicy,
    hooks: &'a HookManager,
}

impl<'a> RetryController<'a> {
    pub fn new(config: &'a DockableProbeConfig, policy: &'a VerificationPolicy, hooks: &'a HookManager) -> Self {
        Self {
            config,
            policy,
            hooks,
        }
    }

    /// 执行一次附着/停靠动作
    ///
    /// 阻塞直到动作完成或失败。失败时工具头停在最后一次运动的位置，不做恢复。
    ///
    /// # 错误
    ///
    /// - `DockError::Precondition`: 附着前底座中没有探针（未发出运动）
    /// - `DockError::HomingRequired`: 路线需要 Z 轴但未归零（未发出运动）
    /// - `DockError::Verification`: 重试预算用尽
    /// - `DockError::Driver`: 运动或传感器错误
    pub fn attempt<M, S>(&self, action: Action, motion: &mut M, sensors: &mut S) -> Result<Maneuver, DockError>
    where
        M: MotionExecutor,
        S: SensorReader,
    {
        self.hooks.emit(&DockEvent::ManeuverStarted { action });

        match self.run(action, motion, sensors) {
            Ok(maneuver) => {
                info!("Probe {} succeeded after {} attempt(s)", action, maneuver.attempts);
                self.hooks.emit(&DockEvent::ManeuverSucceeded {
                    action,
                    attempts: maneuver.attempts,
                });
                Ok(maneuver)
            },
            Err(e) => {
                error!("Probe {} failed: {}", action, e);
                self.hooks.emit(&DockEvent::ManeuverFailed {
                    action,
                    error: e.to_string(),
                });
                Err(e)
            },
        }
    }

    fn run<M, S>(&self, action: Action, motion: &mut M, sensors: &mut S) -> Result<Maneuver, DockError>
    where
        M: MotionExecutor,
        S: SensorReader,
    {
        let kind = action.route_kind();
        let planner = RoutePlanner::new(self.config);
        let start = motion.current_position()?;

        let mut phase = RetryPhase::Idle;
        let mut attempts = 0u32;
        let mut remaining = self.config.dock_retries;

        loop {
            trace!("Probe {}: phase {:?}", action, phase);
            phase = match phase {
                RetryPhase::Idle => {
                    if action == Action::Attach && !self.policy.confirm_in_dock(sensors)?.is_ok() {
                        return Err(DockError::Precondition);
                    }
                    if self.config.route(kind).requires_z() && !motion.is_z_homed() {
                        return Err(DockError::HomingRequired { route: kind });
                    }
                    RetryPhase::Moving
                },
                RetryPhase::Moving => {
                    attempts += 1;
                    let plan = planner.plan(kind, motion.current_position()?, motion.is_z_homed());
                    Self::execute(motion, &plan)?;
                    RetryPhase::Verifying
                },
                RetryPhase::Verifying => match self.policy.confirm(action, sensors)? {
                    Verdict::Ok => break,
                    Verdict::Mismatch if remaining > 0 => {
                        remaining -= 1;
                        warn!(
                            "Probe {} verification failed (attempt {}), retrying from approach vector ({} retries left)",
                            action, attempts, remaining
                        );
                        self.hooks.emit(&DockEvent::RetryScheduled {
                            action,
                            attempt: attempts,
                            remaining,
                        });
                        RetryPhase::BackingOff
                    },
                    Verdict::Mismatch => {
                        return Err(DockError::Verification { action, attempts });
                    },
                },
                RetryPhase::BackingOff => {
                    Self::execute(motion, &[planner.backoff(kind)])?;
                    RetryPhase::Moving
                },
            };
        }

        let z_homed = motion.is_z_homed();
        if let Some(lift) = planner.lift(motion.current_position()?, z_homed) {
            Self::execute(motion, &[lift])?;
        }
        Self::execute(motion, &planner.restore(action, start, z_homed))?;

        Ok(Maneuver {
            action,
            attempts,
            start,
        })
    }

    fn execute<M: MotionExecutor>(motion: &mut M, moves: &[PlannedMove]) -> Result<(), DockError> {
        for planned in moves {
            debug!("{:?} move to {} @ {:.1}mm/s", planned.stage, planned.target, planned.speed);
            motion.move_to(planned.target, planned.speed)?;
        }
        Ok(())
    }
}
