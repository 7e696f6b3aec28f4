//! Mock 协作方
//!
//! - [`MockMotion`] / [`MockSensors`]: 记录所有调用、按脚本返回读数，用于测试
//! - [`SimulatedPrinter`]: 简易物理仿真，工具头经过底座位置时拾取/放下探针
//!
//! 所有 Mock 都是共享句柄（内部 `Arc<Mutex<_>>`），克隆后可在测试中检查状态。

mod recording;
mod sim;

pub use recording::{MockMotion, MockSensors, RecordedMove};
pub use sim::{SimConfig, SimMotion, SimProbeLocation, SimSensors, SimulatedPrinter};

use dockprobe_config::PinSpec;

/// 引脚查找键（忽略上拉和反相修饰）
pub(crate) fn pin_key(pin: &PinSpec) -> String {
    match &pin.chip {
        Some(chip) => format!("{}:{}", chip, pin.name),
        None => pin.name.clone(),
    }
}
