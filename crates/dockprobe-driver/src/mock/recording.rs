//! 记录型 Mock

use super::pin_key;
use crate::error::DriverError;
use crate::motion::{MotionExecutor, MoveTarget, Position};
use crate::sensor::{PinState, SensorReader};
use dockprobe_config::PinSpec;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// 已执行的运动
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedMove {
    pub target: MoveTarget,
    pub speed: f64,
    /// 运动完成后的位置
    pub position: Position,
}

#[derive(Debug)]
struct MotionState {
    position: Position,
    z_homed: bool,
    moves: Vec<RecordedMove>,
    /// 第 N 次运动（从 0 计）返回错误
    fail_at: Option<usize>,
}

/// 记录型运动执行器
#[derive(Debug, Clone)]
pub struct MockMotion {
    inner: Arc<Mutex<MotionState>>,
}

impl MockMotion {
    /// 在给定位置创建，Z 轴已归零
    pub fn new(position: Position) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MotionState {
                position,
                z_homed: true,
                moves: Vec::new(),
                fail_at: None,
            })),
        }
    }

    pub fn set_z_homed(&self, homed: bool) {
        self.inner.lock().z_homed = homed;
    }

    pub fn set_position(&self, position: Position) {
        self.inner.lock().position = position;
    }

    pub fn position(&self) -> Position {
        self.inner.lock().position
    }

    /// 让第 `index` 次运动（含已执行的）失败
    pub fn fail_at_move(&self, index: usize) {
        self.inner.lock().fail_at = Some(index);
    }

    /// 所有已执行的运动
    pub fn moves(&self) -> Vec<RecordedMove> {
        self.inner.lock().moves.clone()
    }

    pub fn move_count(&self) -> usize {
        self.inner.lock().moves.len()
    }

    /// 取出并清空运动记录
    pub fn take_moves(&self) -> Vec<RecordedMove> {
        std::mem::take(&mut self.inner.lock().moves)
    }
}

impl MotionExecutor for MockMotion {
    fn move_to(&mut self, target: MoveTarget, speed: f64) -> Result<(), DriverError> {
        let mut state = self.inner.lock();
        if state.fail_at == Some(state.moves.len()) {
            return Err(DriverError::MoveRejected(format!("injected failure at {}", target)));
        }

        state.position = target.resolve(state.position);
        let position = state.position;
        state.moves.push(RecordedMove {
            target,
            speed,
            position,
        });
        Ok(())
    }

    fn current_position(&self) -> Result<Position, DriverError> {
        Ok(self.inner.lock().position)
    }

    fn is_z_homed(&self) -> bool {
        self.inner.lock().z_homed
    }
}

#[derive(Debug)]
struct PinScript {
    queue: VecDeque<PinState>,
    steady: PinState,
}

#[derive(Debug, Default)]
struct SensorState {
    pins: HashMap<String, PinScript>,
    reads: Vec<String>,
}

/// 脚本化传感器
///
/// 每个引脚有一个读数队列和一个稳态值：队列读完后一直返回稳态值。
/// 存储的是物理电平，读取时按 `PinSpec::invert` 反相。
#[derive(Debug, Clone, Default)]
pub struct MockSensors {
    inner: Arc<Mutex<SensorState>>,
}

impl MockSensors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置引脚稳态值（清空脚本队列）
    pub fn set(&self, pin: &PinSpec, state: PinState) {
        self.inner.lock().pins.insert(
            pin_key(pin),
            PinScript {
                queue: VecDeque::new(),
                steady: state,
            },
        );
    }

    /// 设置读数脚本，读完后保持 `steady`
    pub fn script(&self, pin: &PinSpec, sequence: impl IntoIterator<Item = PinState>, steady: PinState) {
        self.inner.lock().pins.insert(
            pin_key(pin),
            PinScript {
                queue: sequence.into_iter().collect(),
                steady,
            },
        );
    }

    /// 某引脚被读取的次数
    pub fn read_count(&self, pin: &PinSpec) -> usize {
        let key = pin_key(pin);
        self.inner.lock().reads.iter().filter(|r| **r == key).count()
    }

    /// 总读取次数
    pub fn total_reads(&self) -> usize {
        self.inner.lock().reads.len()
    }
}

impl SensorReader for MockSensors {
    fn read(&mut self, pin: &PinSpec) -> Result<PinState, DriverError> {
        let key = pin_key(pin);
        let mut state = self.inner.lock();
        let script = state.pins.get_mut(&key).ok_or_else(|| DriverError::PinUnavailable {
            pin: key.clone(),
            reason: "not configured in mock".to_string(),
        })?;
        let level = script.queue.pop_front().unwrap_or(script.steady);
        state.reads.push(key);
        Ok(level.apply_invert(pin))
    }
}
