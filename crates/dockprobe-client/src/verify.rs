//! 校验策略
//!
//! 把配置的校验组合成两个判定：`confirm_attached` 和 `confirm_docked`。
//! 同一方向上所有校验都通过才算 `Ok`。未配置任何校验时总是 `Ok`。

use crate::error::DockError;
use crate::types::Action;
use dockprobe_config::{DockableProbeConfig, PinSpec, VerificationCheck, VerificationConfig};
use dockprobe_driver::{PinState, SensorReader};
use tracing::debug;

/// 校验结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Mismatch,
}

impl Verdict {
    pub fn is_ok(self) -> bool {
        self == Verdict::Ok
    }

    fn and(self, other: Verdict) -> Verdict {
        if self.is_ok() && other.is_ok() { Verdict::Ok } else { Verdict::Mismatch }
    }
}

/// 校验策略
#[derive(Debug, Clone)]
pub struct VerificationPolicy {
    checks: VerificationConfig,
    /// 探针主触发引脚（`OpenOnAttach` 读取）
    primary_pin: PinSpec,
}

impl VerificationPolicy {
    pub fn new(config: &DockableProbeConfig) -> Self {
        Self {
            checks: config.verification.clone(),
            primary_pin: config.probe.pin.clone(),
        }
    }

    /// 尽力而为模式（无任何校验）
    pub fn is_best_effort(&self) -> bool {
        self.checks.is_none()
    }

    /// 探针是否已附着
    ///
    /// 只使用附着侧校验。
    pub fn confirm_attached<S: SensorReader>(&self, sensors: &mut S) -> Result<Verdict, DockError> {
        match self.checks.attach_side() {
            Some(check) => self.evaluate(check, Action::Attach, sensors),
            None => Ok(Verdict::Ok),
        }
    }

    /// 探针是否已停靠
    ///
    /// 附着侧校验按反方向解读，并且底座在位引脚必须为 Triggered。
    pub fn confirm_docked<S: SensorReader>(&self, sensors: &mut S) -> Result<Verdict, DockError> {
        let mut verdict = Verdict::Ok;
        for check in self.checks.checks() {
            // 逐个读取，不短路，方便排查
            verdict = verdict.and(self.evaluate(check, Action::Detach, sensors)?);
        }
        Ok(verdict)
    }

    /// 按动作方向选择判定
    pub fn confirm<S: SensorReader>(&self, action: Action, sensors: &mut S) -> Result<Verdict, DockError> {
        match action {
            Action::Attach => self.confirm_attached(sensors),
            Action::Detach => self.confirm_docked(sensors),
        }
    }

    /// 附着前置条件：底座中有探针
    ///
    /// 未配置底座在位引脚时总是 `Ok`。
    pub fn confirm_in_dock<S: SensorReader>(&self, sensors: &mut S) -> Result<Verdict, DockError> {
        match self.checks.dock_sense_pin() {
            Some(pin) => Ok(Self::expect(sensors.read(pin)?, PinState::Triggered, pin)),
            None => Ok(Verdict::Ok),
        }
    }

    fn evaluate<S: SensorReader>(
        &self,
        check: &VerificationCheck,
        action: Action,
        sensors: &mut S,
    ) -> Result<Verdict, DockError> {
        let attaching = action == Action::Attach;
        let verdict = match check {
            VerificationCheck::OpenOnAttach { open_when_attached } => {
                // 附着后期望的读数，停靠后取反
                let attached_reading = if *open_when_attached { PinState::Open } else { PinState::Triggered };
                let expected = if attaching { attached_reading } else { attached_reading.inverted() };
                Self::expect(sensors.read(&self.primary_pin)?, expected, &self.primary_pin)
            },
            VerificationCheck::AttachSense { pin } => {
                let expected = PinState::from_triggered(attaching);
                Self::expect(sensors.read(pin)?, expected, pin)
            },
            VerificationCheck::DockSense { pin } => {
                Self::expect(sensors.read(pin)?, PinState::Triggered, pin)
            },
        };
        Ok(verdict)
    }

    fn expect(actual: PinState, expected: PinState, pin: &PinSpec) -> Verdict {
        if actual == expected {
            Verdict::Ok
        } else {
            debug!("Pin '{}' reads {}, expected {}", pin, actual, expected);
            Verdict::Mismatch
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockprobe_config::{Route, RouteKind, Waypoint};
    use dockprobe_driver::mock::MockSensors;

    fn config(verification: VerificationConfig) -> DockableProbeConfig {
        DockableProbeConfig::new(
            PinSpec::new("probe"),
            Route::new(RouteKind::Attach, vec![Waypoint::new(0.0, 0.0)]).unwrap(),
            Route::new(RouteKind::Dock, vec![Waypoint::new(0.0, 0.0)]).unwrap(),
        )
        .with_verification(verification)
    }

    #[test]
    fn test_best_effort_always_ok() {
        let policy = VerificationPolicy::new(&config(VerificationConfig::none()));
        let mut sensors = MockSensors::new();

        assert!(policy.is_best_effort());
        assert_eq!(policy.confirm_attached(&mut sensors).unwrap(), Verdict::Ok);
        assert_eq!(policy.confirm_docked(&mut sensors).unwrap(), Verdict::Ok);
        assert_eq!(policy.confirm_in_dock(&mut sensors).unwrap(), Verdict::Ok);
        assert_eq!(sensors.total_reads(), 0);
    }

    #[test]
    fn test_open_on_attach_polarity() {
        let probe = PinSpec::new("probe");
        let mut sensors = MockSensors::new();

        let policy = VerificationPolicy::new(&config(VerificationConfig::from_options(Some(true), None, None)));
        sensors.set(&probe, PinState::Open);
        assert_eq!(policy.confirm_attached(&mut sensors).unwrap(), Verdict::Ok);
        assert_eq!(policy.confirm_docked(&mut sensors).unwrap(), Verdict::Mismatch);

        sensors.set(&probe, PinState::Triggered);
        assert_eq!(policy.confirm_attached(&mut sensors).unwrap(), Verdict::Mismatch);
        assert_eq!(policy.confirm_docked(&mut sensors).unwrap(), Verdict::Ok);

        // 极性为 false 时两者反过来
        let policy = VerificationPolicy::new(&config(VerificationConfig::from_options(Some(false), None, None)));
        assert_eq!(policy.confirm_attached(&mut sensors).unwrap(), Verdict::Ok);
        assert_eq!(policy.confirm_docked(&mut sensors).unwrap(), Verdict::Mismatch);
    }

    #[test]
    fn test_attach_sense_pin() {
        let sense = PinSpec::new("probe_sense");
        let policy = VerificationPolicy::new(&config(VerificationConfig::from_options(None, Some(sense.clone()), None)));
        let mut sensors = MockSensors::new();

        sensors.set(&sense, PinState::Triggered);
        assert_eq!(policy.confirm(Action::Attach, &mut sensors).unwrap(), Verdict::Ok);
        assert_eq!(policy.confirm(Action::Detach, &mut sensors).unwrap(), Verdict::Mismatch);

        sensors.set(&sense, PinState::Open);
        assert_eq!(policy.confirm(Action::Detach, &mut sensors).unwrap(), Verdict::Ok);
    }

    #[test]
    fn test_combined_checks_are_anded() {
        let sense = PinSpec::new("probe_sense");
        let dock = PinSpec::new("dock_sense");
        let policy = VerificationPolicy::new(&config(VerificationConfig::from_options(
            None,
            Some(sense.clone()),
            Some(dock.clone()),
        )));
        let mut sensors = MockSensors::new();

        // 探针已离开工具头，但底座未检测到
        sensors.set(&sense, PinState::Open);
        sensors.set(&dock, PinState::Open);
        assert_eq!(policy.confirm_docked(&mut sensors).unwrap(), Verdict::Mismatch);
        assert_eq!(policy.confirm_in_dock(&mut sensors).unwrap(), Verdict::Mismatch);
        // 两个引脚都被读取
        assert_eq!(sensors.read_count(&sense), 1);
        assert_eq!(sensors.read_count(&dock), 2);

        sensors.set(&dock, PinState::Triggered);
        assert_eq!(policy.confirm_docked(&mut sensors).unwrap(), Verdict::Ok);

        // 附着判定不读取底座引脚
        sensors.set(&sense, PinState::Triggered);
        assert_eq!(policy.confirm_attached(&mut sensors).unwrap(), Verdict::Ok);
        assert_eq!(sensors.read_count(&dock), 3);
    }

    #[test]
    fn test_inverted_dock_sense_pin() {
        let dock = PinSpec::new("dock_sense").inverted();
        let policy = VerificationPolicy::new(&config(VerificationConfig::from_options(None, None, Some(dock.clone()))));
        let mut sensors = MockSensors::new();

        // 物理电平 Open，反相后为 Triggered
        sensors.set(&dock, PinState::Open);
        assert_eq!(policy.confirm_in_dock(&mut sensors).unwrap(), Verdict::Ok);
    }

    #[test]
    fn test_sensor_error_propagates() {
        let policy = VerificationPolicy::new(&config(VerificationConfig::from_options(Some(true), None, None)));
        let mut sensors = MockSensors::new();
        assert!(matches!(policy.confirm_attached(&mut sensors), Err(DockError::Driver(_))));
    }
}
