//! 驱动层错误类型定义

use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    /// 运动指令被执行器拒绝（超出行程、参数无效等）
    #[error("Move rejected: {0}")]
    MoveRejected(String),

    /// 运动执行中被中止（急停、关机）
    #[error("Motion aborted: {0}")]
    MotionAborted(String),

    /// 引脚不可读
    #[error("Pin '{pin}' unavailable: {reason}")]
    PinUnavailable { pin: String, reason: String },

    /// 执行器已关闭
    #[error("Executor shut down")]
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::DriverError;

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::MoveRejected("out of range".to_string());
        assert_eq!(err.to_string(), "Move rejected: out of range");

        let err = DriverError::PinUnavailable {
            pin: "PA4".to_string(),
            reason: "not configured".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("PA4") && msg.contains("not configured"));

        assert_eq!(DriverError::Shutdown.to_string(), "Executor shut down");
    }
}
