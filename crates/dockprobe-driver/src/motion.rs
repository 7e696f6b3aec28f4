//! 运动执行器抽象
//!
//! 执行器负责把工具头沿直线移动到目标点，并在运动**物理完成**后才返回。
//! 编排引擎依赖这一点保证"先运动、后校验"的顺序。

use crate::error::DriverError;
use dockprobe_config::Waypoint;
use std::fmt;

/// 工具头当前位置（mm）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{:.3} Y{:.3} Z{:.3}", self.x, self.y, self.z)
    }
}

/// 运动目标
///
/// 每个轴可选，`None` 表示该轴保持不动。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveTarget {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl MoveTarget {
    /// 仅 XY 移动
    pub const fn xy(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: None,
        }
    }

    /// 纯 Z 移动
    pub const fn z(z: f64) -> Self {
        Self {
            x: None,
            y: None,
            z: Some(z),
        }
    }

    /// 移动后的位置
    pub fn resolve(&self, from: Position) -> Position {
        Position {
            x: self.x.unwrap_or(from.x),
            y: self.y.unwrap_or(from.y),
            z: self.z.unwrap_or(from.z),
        }
    }

    /// 是否为纯 Z 移动
    pub fn is_z_only(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_some()
    }
}

impl From<&Waypoint> for MoveTarget {
    fn from(waypoint: &Waypoint) -> Self {
        Self {
            x: Some(waypoint.x),
            y: Some(waypoint.y),
            z: waypoint.z,
        }
    }
}

impl fmt::Display for MoveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (axis, value) in [('X', self.x), ('Y', self.y), ('Z', self.z)] {
            if let Some(v) = value {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{}{:.3}", axis, v)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// 运动执行器
///
/// # 阻塞语义
///
/// `move_to` 必须阻塞直到运动物理完成。无论底层是协作式调度还是多线程，
/// 返回 `Ok(())` 即表示工具头已到达目标。
pub trait MotionExecutor {
    /// 以给定速度（mm/s）移动到目标，阻塞直到到达
    fn move_to(&mut self, target: MoveTarget, speed: f64) -> Result<(), DriverError>;

    /// 当前工具头位置
    fn current_position(&self) -> Result<Position, DriverError>;

    /// Z 轴是否已归零
    fn is_z_homed(&self) -> bool;
}

impl<T: MotionExecutor + ?Sized> MotionExecutor for Box<T> {
    fn move_to(&mut self, target: MoveTarget, speed: f64) -> Result<(), DriverError> {
        (**self).move_to(target, speed)
    }

    fn current_position(&self) -> Result<Position, DriverError> {
        (**self).current_position()
    }

    fn is_z_homed(&self) -> bool {
        (**self).is_z_homed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_target_resolve() {
        let from = Position::new(1.0, 2.0, 3.0);
        assert_eq!(MoveTarget::xy(10.0, 20.0).resolve(from), Position::new(10.0, 20.0, 3.0));
        assert_eq!(MoveTarget::z(15.0).resolve(from), Position::new(1.0, 2.0, 15.0));
        assert!(MoveTarget::z(15.0).is_z_only());
        assert!(!MoveTarget::xy(0.0, 0.0).is_z_only());
    }

    #[test]
    fn test_move_target_from_waypoint() {
        let target = MoveTarget::from(&Waypoint::with_z(150.0, 330.0, 5.0));
        assert_eq!(target.z, Some(5.0));

        let target = MoveTarget::from(&Waypoint::new(150.0, 300.0));
        assert_eq!(target, MoveTarget::xy(150.0, 300.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(MoveTarget::z(15.0).to_string(), "Z15.000");
        assert_eq!(MoveTarget::xy(1.0, 2.0).to_string(), "X1.000 Y2.000");
        assert_eq!(Position::new(1.0, 2.0, 3.0).to_string(), "X1.000 Y2.000 Z3.000");
    }
}
