//! # Dockprobe Driver
//!
//! 编排引擎依赖的外部协作方抽象：
//!
//! - [`MotionExecutor`]: 运动执行器（阻塞直到运动完成）
//! - [`SensorReader`]: 传感器/引脚读取（同步、已去抖）
//!
//! 真实的运动学执行器和 MCU 引脚驱动不在本 crate 中。
//! 启用 `mock` feature 可获得记录型 Mock 和一个简易的打印机仿真，
//! 用于测试和 CLI 演示。

pub mod error;
pub mod motion;
pub mod sensor;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// 重新导出常用类型
pub use error::DriverError;
pub use motion::{MotionExecutor, MoveTarget, Position};
pub use sensor::{PinState, SensorReader};
