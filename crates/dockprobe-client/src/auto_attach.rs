//! 自动附着/停靠策略
//!
//! 包装依赖探针的操作（测量、Z 归零等）：
//!
//! - 开关打开：操作前 `ensure_attached()`，操作后 `ensure_docked()`；附着失败则跳过操作
//! - 开关关闭：直接执行操作，由调用方通过显式命令保证探针状态
//!
//! 开关在每次操作开始时读取，不缓存。
//!
//! 批量模式（[`ProbeBatch`]）在多次操作之间保持探针附着，只在开始时附着一次、结束时停靠一次。

use crate::error::DockError;
use crate::state::DockableProbe;
use crate::types::ProbeState;
use dockprobe_config::ProbeSettings;
use dockprobe_driver::{MotionExecutor, SensorReader};
use tracing::{error, warn};

/// 操作上下文
///
/// 探针操作通过它访问运动执行器、传感器和探针选项。
pub struct ProbeContext<'a, M, S> {
    pub motion: &'a mut M,
    pub sensors: &'a mut S,
    pub settings: &'a ProbeSettings,
}

impl<M, S> DockableProbe<M, S>
where
    M: MotionExecutor,
    S: SensorReader,
{
    /// 在自动附着/停靠策略下执行一次探针操作
    ///
    /// 操作失败时仍会尝试停靠，然后返回操作本身的错误。
    ///
    /// # 示例
    ///
    /// ```rust,ignore
    /// let z = probe.with_probe(|ctx| run_probe_move(ctx.motion, ctx.sensors))?;
    /// ```
    pub fn with_probe<T, E, F>(&mut self, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut ProbeContext<'_, M, S>) -> Result<T, E>,
        E: From<DockError>,
    {
        let bracketed = self.auto_attach_enabled();
        if bracketed {
            self.ensure_attached()?;
        } else {
            self.warn_if_not_attached();
        }

        let result = op(&mut self.context());

        if bracketed { self.dock_after(result) } else { result }
    }

    /// 开始批量操作
    ///
    /// 开关打开时立即附着。
    pub fn begin_batch(&mut self) -> Result<ProbeBatch<'_, M, S>, DockError> {
        let bracketed = self.auto_attach_enabled();
        if bracketed {
            self.ensure_attached()?;
        } else {
            self.warn_if_not_attached();
        }

        Ok(ProbeBatch {
            probe: self,
            bracketed,
            finished: false,
        })
    }

    fn context(&mut self) -> ProbeContext<'_, M, S> {
        ProbeContext {
            motion: &mut self.motion,
            sensors: &mut self.sensors,
            settings: &self.config.probe,
        }
    }

    fn warn_if_not_attached(&self) {
        let state = self.query();
        if state != ProbeState::Attached {
            warn!("Auto attach/dock disabled and probe state is {}; running probe operation as-is", state);
        }
    }

    fn dock_after<T, E>(&mut self, result: Result<T, E>) -> Result<T, E>
    where
        E: From<DockError>,
    {
        match result {
            Ok(value) => {
                self.ensure_docked()?;
                Ok(value)
            },
            Err(e) => {
                if let Err(dock_err) = self.ensure_docked() {
                    error!("Failed to dock probe after failed probe operation: {}", dock_err);
                }
                Err(e)
            },
        }
    }
}

/// 批量探针操作
///
/// 必须调用 [`ProbeBatch::finish`] 结束，否则探针保持附着。
pub struct ProbeBatch<'p, M, S>
where
    M: MotionExecutor,
    S: SensorReader,
{
    probe: &'p mut DockableProbe<M, S>,
    /// 开始时开关是否打开
    bracketed: bool,
    finished: bool,
}

impl<M, S> ProbeBatch<'_, M, S>
where
    M: MotionExecutor,
    S: SensorReader,
{
    /// 在批量内执行一次操作（不单独附着/停靠）
    pub fn run<T, E, F>(&mut self, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut ProbeContext<'_, M, S>) -> Result<T, E>,
    {
        op(&mut self.probe.context())
    }

    /// 当前探针状态
    pub fn state(&self) -> ProbeState {
        self.probe.query()
    }

    /// 结束批量，开始时开关打开则停靠
    pub fn finish(mut self) -> Result<(), DockError> {
        self.finished = true;
        if self.bracketed { self.probe.ensure_docked() } else { Ok(()) }
    }
}

impl<M, S> Drop for ProbeBatch<'_, M, S>
where
    M: MotionExecutor,
    S: SensorReader,
{
    fn drop(&mut self) {
        if !self.finished && self.bracketed {
            warn!("Probe batch dropped without finish(), probe left {}", self.probe.query());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{ChannelEventHook, DockEvent};
    use crate::types::Action;
    use dockprobe_config::{DockableProbeConfig, PinSpec, Route, RouteKind, VerificationConfig, Waypoint};
    use dockprobe_driver::mock::{MockMotion, MockSensors};
    use dockprobe_driver::{PinState, Position};
    use std::cell::Cell;

    #[derive(Debug, PartialEq)]
    enum OpError {
        Dock(DockError),
        Probe,
    }

    impl From<DockError> for OpError {
        fn from(e: DockError) -> Self {
            OpError::Dock(e)
        }
    }

    fn config() -> DockableProbeConfig {
        DockableProbeConfig::new(
            PinSpec::new("probe"),
            Route::new(RouteKind::Attach, vec![Waypoint::new(150.0, 300.0), Waypoint::new(150.0, 330.0)]).unwrap(),
            Route::new(RouteKind::Dock, vec![Waypoint::new(150.0, 300.0), Waypoint::new(170.0, 330.0)]).unwrap(),
        )
    }

    fn new_probe(config: DockableProbeConfig) -> (DockableProbe<MockMotion, MockSensors>, MockMotion, MockSensors) {
        let motion = MockMotion::new(Position::new(0.0, 0.0, 10.0));
        let sensors = MockSensors::new();
        (DockableProbe::new(config, motion.clone(), sensors.clone()), motion, sensors)
    }

    #[test]
    fn test_bracketed_operation() {
        let (mut probe, _, _) = new_probe(config());
        let observed = Cell::new(ProbeState::Unknown);
        let handle = probe.status_handle();

        let value: Result<f64, OpError> = probe.with_probe(|ctx| {
            observed.set(handle.query());
            assert_eq!(ctx.settings.pin.name, "probe");
            Ok(1.25)
        });

        assert_eq!(value, Ok(1.25));
        assert_eq!(observed.get(), ProbeState::Attached);
        assert_eq!(probe.query(), ProbeState::Docked);
    }

    #[test]
    fn test_failed_attach_skips_operation() {
        let config = config().with_verification(VerificationConfig::from_options(
            None,
            None,
            Some(PinSpec::new("dock_sense")),
        ));
        let (mut probe, motion, sensors) = new_probe(config);
        sensors.set(&PinSpec::new("dock_sense"), PinState::Open);

        let ran = Cell::new(false);
        let result: Result<(), OpError> = probe.with_probe(|_| {
            ran.set(true);
            Ok(())
        });

        assert_eq!(result, Err(OpError::Dock(DockError::Precondition)));
        assert!(!ran.get());
        assert_eq!(motion.move_count(), 0);
    }

    #[test]
    fn test_failed_operation_still_docks() {
        let (mut probe, _, _) = new_probe(config());
        let result: Result<(), OpError> = probe.with_probe(|_| Err(OpError::Probe));

        assert_eq!(result, Err(OpError::Probe));
        assert_eq!(probe.query(), ProbeState::Docked);
    }

    /// 探针在位引脚保持 Triggered：附着通过，停靠校验失败
    fn stuck_probe() -> (DockableProbe<MockMotion, MockSensors>, crossbeam_channel::Receiver<DockEvent>) {
        let sense = PinSpec::new("probe_sense");
        let config = config().with_verification(VerificationConfig::from_options(None, Some(sense.clone()), None));
        let (mut probe, _, sensors) = new_probe(config);
        sensors.set(&sense, PinState::Triggered);

        let (hook, events) = ChannelEventHook::new(64);
        probe.hooks_mut().add_callback(std::sync::Arc::new(hook));
        (probe, events)
    }

    #[test]
    fn test_dock_failure_after_successful_operation() {
        let (mut probe, _) = stuck_probe();

        let result: Result<u32, OpError> = probe.with_probe(|_| Ok(1));

        assert_eq!(
            result,
            Err(OpError::Dock(DockError::Verification {
                action: Action::Detach,
                attempts: 1,
            }))
        );
        assert_eq!(probe.query(), ProbeState::Unknown);
    }

    #[test]
    fn test_operation_error_wins_over_dock_failure() {
        let (mut probe, events) = stuck_probe();

        let result: Result<u32, OpError> = probe.with_probe(|_| Err(OpError::Probe));

        assert_eq!(result, Err(OpError::Probe));
        assert_eq!(probe.query(), ProbeState::Unknown);
        assert!(events.try_iter().any(|e| matches!(
            e,
            DockEvent::ManeuverFailed {
                action: Action::Detach,
                ..
            }
        )));
    }

    #[test]
    fn test_disabled_flag_runs_without_bracketing() {
        let (mut probe, motion, _) = new_probe(config().with_auto_attach_dock(false));

        let result: Result<u32, DockError> = probe.with_probe(|_| Ok(7));

        assert_eq!(result, Ok(7));
        assert_eq!(motion.move_count(), 0);
        assert_eq!(probe.query(), ProbeState::Unknown);
    }

    #[test]
    fn test_batch_attaches_once() {
        let (mut probe, motion, _) = new_probe(config());

        let mut batch = probe.begin_batch().unwrap();
        assert_eq!(batch.state(), ProbeState::Attached);
        let after_attach = motion.move_count();

        for _ in 0..3 {
            let r: Result<(), DockError> = batch.run(|_| Ok(()));
            r.unwrap();
        }
        assert_eq!(motion.move_count(), after_attach);

        batch.finish().unwrap();
        assert_eq!(probe.query(), ProbeState::Docked);
    }

    #[test]
    fn test_batch_with_flag_disabled() {
        let (mut probe, motion, _) = new_probe(config().with_auto_attach_dock(false));

        let mut batch = probe.begin_batch().unwrap();
        let r: Result<(), DockError> = batch.run(|_| Ok(()));
        r.unwrap();
        batch.finish().unwrap();

        assert_eq!(motion.move_count(), 0);
        assert_eq!(probe.query(), ProbeState::Unknown);
    }
}
