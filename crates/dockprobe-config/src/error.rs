//! 配置层错误类型定义

use crate::waypoint::RouteKind;
use thiserror::Error;

/// 配置错误（加载阶段，启动失败）
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML 解析失败（包括缺少必填项、类型错误）
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// 路线为空
    #[error("{route} route must contain at least one waypoint")]
    EmptyRoute { route: RouteKind },

    /// 路径点坐标数量不是 2 或 3
    #[error("Unable to parse {route} route waypoint {index}: expected 2 or 3 coordinates, got {count}")]
    InvalidWaypoint {
        route: RouteKind,
        index: usize,
        count: usize,
    },

    /// 路径点坐标不是有限值
    #[error("{route} route waypoint {index} has a non-finite coordinate")]
    NonFiniteCoordinate { route: RouteKind, index: usize },

    /// 速度必须为正数
    #[error("Option '{option}' must be above 0, got {value}")]
    InvalidSpeed { option: &'static str, value: f64 },

    /// 引脚描述无效
    #[error("Invalid pin '{pin}': {reason}")]
    InvalidPin { pin: String, reason: &'static str },

    /// 其他选项取值无效
    #[error("Invalid value for option '{option}': {reason}")]
    InvalidValue {
        option: &'static str,
        reason: String,
    },

    /// 探针作为 Z 虚拟限位时，不能要求 Z 方向移动
    #[error(
        "Using the probe as a Z virtual endstop is incompatible with z_hop or an attach/dock route containing a Z coordinate"
    )]
    VirtualEndstopConflict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::EmptyRoute {
            route: RouteKind::Attach,
        };
        assert_eq!(err.to_string(), "attach route must contain at least one waypoint");

        let err = ConfigError::InvalidWaypoint {
            route: RouteKind::Dock,
            index: 2,
            count: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("dock route waypoint 2"));
        assert!(msg.contains("got 4"));

        let err = ConfigError::InvalidSpeed {
            option: "travel_speed",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "Option 'travel_speed' must be above 0, got -1");
    }
}
