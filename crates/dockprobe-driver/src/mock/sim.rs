//! 简易打印机仿真
//!
//! 只模拟探针的位置，不模拟运动学：
//!
//! - 工具头到达 `dock_position` 且探针在底座中 → 探针吸附到工具头
//! - 工具头到达 `release_position` 且探针在工具头上 → 探针留在底座中
//!
//! 可注入失败次数，模拟磁铁未吸合或底座未卡住。

use super::pin_key;
use crate::error::DriverError;
use crate::motion::{MotionExecutor, MoveTarget, Position};
use crate::sensor::{PinState, SensorReader};
use dockprobe_config::PinSpec;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// 位置比较容差（mm）
const POSITION_TOLERANCE: f64 = 0.01;

/// 探针物理位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimProbeLocation {
    /// 在底座中
    InDock,
    /// 在工具头上
    OnCarrier,
    /// 不在任何地方（被取走或掉落）
    Missing,
}

/// 仿真配置
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// 拾取点（XY）
    pub dock_position: (f64, f64),
    /// 释放点（XY）
    pub release_position: (f64, f64),
    /// 探针主触发引脚
    pub primary_pin: PinSpec,
    /// 附着后主引脚读数为 Open
    pub open_when_attached: bool,
    pub probe_sense_pin: Option<PinSpec>,
    pub dock_sense_pin: Option<PinSpec>,
    /// 初始位置
    pub start: Position,
    pub z_homed: bool,
}

#[derive(Debug)]
struct SimState {
    config: SimConfig,
    position: Position,
    z_homed: bool,
    probe: SimProbeLocation,
    attach_failures: u32,
    dock_failures: u32,
    move_count: usize,
}

impl SimState {
    fn at(&self, (x, y): (f64, f64)) -> bool {
        (self.position.x - x).abs() < POSITION_TOLERANCE && (self.position.y - y).abs() < POSITION_TOLERANCE
    }

    fn settle(&mut self) {
        if self.probe == SimProbeLocation::InDock && self.at(self.config.dock_position) {
            if self.attach_failures > 0 {
                self.attach_failures -= 1;
                debug!("sim: probe failed to seat on carrier ({} failures left)", self.attach_failures);
            } else {
                self.probe = SimProbeLocation::OnCarrier;
                debug!("sim: probe picked up");
            }
        } else if self.probe == SimProbeLocation::OnCarrier && self.at(self.config.release_position) {
            if self.dock_failures > 0 {
                self.dock_failures -= 1;
                debug!("sim: probe failed to release ({} failures left)", self.dock_failures);
            } else {
                self.probe = SimProbeLocation::InDock;
                debug!("sim: probe released into dock");
            }
        }
    }

    fn read(&self, pin: &PinSpec) -> Result<PinState, DriverError> {
        let key = pin_key(pin);
        let attached = self.probe == SimProbeLocation::OnCarrier;
        let config = &self.config;

        // (逻辑电平, 接线时的引脚描述)
        let (level, wired) = if key == pin_key(&config.primary_pin) {
            // 附着时主引脚读数由极性决定，未附着时相反
            (PinState::from_triggered(attached != config.open_when_attached), &config.primary_pin)
        } else if let Some(wired) = config.probe_sense_pin.as_ref().filter(|p| pin_key(p) == key) {
            (PinState::from_triggered(attached), wired)
        } else if let Some(wired) = config.dock_sense_pin.as_ref().filter(|p| pin_key(p) == key) {
            (PinState::from_triggered(self.probe == SimProbeLocation::InDock), wired)
        } else {
            return Err(DriverError::PinUnavailable {
                pin: key,
                reason: "not wired in simulation".to_string(),
            });
        };

        // 物理电平按接线反相，读取时再按请求的引脚描述反相
        Ok(level.apply_invert(wired).apply_invert(pin))
    }
}

/// 仿真打印机
#[derive(Debug, Clone)]
pub struct SimulatedPrinter {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedPrinter {
    /// 创建仿真，探针初始在底座中
    pub fn new(config: SimConfig) -> Self {
        let position = config.start;
        let z_homed = config.z_homed;
        Self {
            state: Arc::new(Mutex::new(SimState {
                config,
                position,
                z_homed,
                probe: SimProbeLocation::InDock,
                attach_failures: 0,
                dock_failures: 0,
                move_count: 0,
            })),
        }
    }

    /// 运动执行器句柄
    pub fn motion(&self) -> SimMotion {
        SimMotion {
            state: self.state.clone(),
        }
    }

    /// 传感器句柄
    pub fn sensors(&self) -> SimSensors {
        SimSensors {
            state: self.state.clone(),
        }
    }

    pub fn probe_location(&self) -> SimProbeLocation {
        self.state.lock().probe
    }

    pub fn set_probe_location(&self, location: SimProbeLocation) {
        self.state.lock().probe = location;
    }

    /// 接下来 `n` 次拾取失败
    pub fn inject_attach_failures(&self, n: u32) {
        self.state.lock().attach_failures = n;
    }

    /// 接下来 `n` 次释放失败
    pub fn inject_dock_failures(&self, n: u32) {
        self.state.lock().dock_failures = n;
    }

    pub fn set_z_homed(&self, homed: bool) {
        self.state.lock().z_homed = homed;
    }

    pub fn position(&self) -> Position {
        self.state.lock().position
    }

    pub fn move_count(&self) -> usize {
        self.state.lock().move_count
    }
}

/// 仿真运动执行器
#[derive(Debug, Clone)]
pub struct SimMotion {
    state: Arc<Mutex<SimState>>,
}

impl MotionExecutor for SimMotion {
    fn move_to(&mut self, target: MoveTarget, speed: f64) -> Result<(), DriverError> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(DriverError::MoveRejected(format!("invalid speed {}", speed)));
        }

        let mut state = self.state.lock();
        state.position = target.resolve(state.position);
        state.move_count += 1;
        debug!("sim: move {} @ {:.1}mm/s", target, speed);
        state.settle();
        Ok(())
    }

    fn current_position(&self) -> Result<Position, DriverError> {
        Ok(self.state.lock().position)
    }

    fn is_z_homed(&self) -> bool {
        self.state.lock().z_homed
    }
}

/// 仿真传感器
#[derive(Debug, Clone)]
pub struct SimSensors {
    state: Arc<Mutex<SimState>>,
}

impl SensorReader for SimSensors {
    fn read(&mut self, pin: &PinSpec) -> Result<PinState, DriverError> {
        self.state.lock().read(pin)
    }
}
