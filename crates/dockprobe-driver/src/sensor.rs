//! 传感器读取抽象
//!
//! 引脚驱动层负责去抖和反相（`PinSpec::invert`），对上只报告二值状态。

use crate::error::DriverError;
use dockprobe_config::PinSpec;
use std::fmt;

/// 引脚状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinState {
    /// 触发
    Triggered,
    /// 断开
    Open,
}

impl PinState {
    /// 由电平构造（`true` 为触发）
    pub const fn from_triggered(triggered: bool) -> Self {
        if triggered { PinState::Triggered } else { PinState::Open }
    }

    /// 反相
    pub const fn inverted(self) -> Self {
        match self {
            PinState::Triggered => PinState::Open,
            PinState::Open => PinState::Triggered,
        }
    }

    /// 按引脚描述应用反相
    pub fn apply_invert(self, pin: &PinSpec) -> Self {
        if pin.invert { self.inverted() } else { self }
    }
}

impl fmt::Display for PinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinState::Triggered => f.write_str("TRIGGERED"),
            PinState::Open => f.write_str("open"),
        }
    }
}

/// 传感器读取器
///
/// 按需同步读取，不做缓存。
pub trait SensorReader {
    fn read(&mut self, pin: &PinSpec) -> Result<PinState, DriverError>;
}

impl<T: SensorReader + ?Sized> SensorReader for Box<T> {
    fn read(&mut self, pin: &PinSpec) -> Result<PinState, DriverError> {
        (**self).read(pin)
    }
}
