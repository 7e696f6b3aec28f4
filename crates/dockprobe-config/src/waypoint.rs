//! 路径点与路线
//!
//! 附着路线（attach route）和停靠路线（dock route）是两条独立的有序序列，
//! 不是彼此的镜像。非对称的停靠结构（例如 Euclid 风格）依赖这一点。

use crate::error::ConfigError;
use serde::Serialize;
use std::fmt;

/// 路径点
///
/// X、Y 必填；Z 可选，缺省表示保持当前 Z 高度。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Waypoint {
    /// 创建只有 XY 的路径点
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// 创建带 Z 的路径点
    pub const fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// 从坐标列表解析（2 或 3 个坐标）
    ///
    /// # 错误
    ///
    /// - `ConfigError::InvalidWaypoint`: 坐标数量不是 2 或 3
    /// - `ConfigError::NonFiniteCoordinate`: 坐标为 NaN 或无穷大
    pub fn from_coords(route: RouteKind, index: usize, coords: &[f64]) -> Result<Self, ConfigError> {
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::NonFiniteCoordinate { route, index });
        }

        match *coords {
            [x, y] => Ok(Self::new(x, y)),
            [x, y, z] => Ok(Self::with_z(x, y, z)),
            _ => Err(ConfigError::InvalidWaypoint {
                route,
                index,
                count: coords.len(),
            }),
        }
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.z {
            Some(z) => write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, z),
            None => write!(f, "({:.3}, {:.3})", self.x, self.y),
        }
    }
}

/// 路线类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    /// 附着路线
    Attach,
    /// 停靠路线
    Dock,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKind::Attach => f.write_str("attach"),
            RouteKind::Dock => f.write_str("dock"),
        }
    }
}

/// 已校验的路线（非空、有序）
///
/// 第一个路径点是入口点（approach/entry），按列出顺序执行。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    kind: RouteKind,
    waypoints: Vec<Waypoint>,
}

impl Route {
    /// 创建路线
    ///
    /// # 错误
    ///
    /// 空路线返回 `ConfigError::EmptyRoute`。空路线在加载时拒绝，而不是在使用时。
    pub fn new(kind: RouteKind, waypoints: Vec<Waypoint>) -> Result<Self, ConfigError> {
        if waypoints.is_empty() {
            return Err(ConfigError::EmptyRoute { route: kind });
        }
        Ok(Self { kind, waypoints })
    }

    /// 从坐标列表解析路线
    pub fn from_coord_lists(kind: RouteKind, lists: &[Vec<f64>]) -> Result<Self, ConfigError> {
        let waypoints = lists
            .iter()
            .enumerate()
            .map(|(index, coords)| Waypoint::from_coords(kind, index, coords))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(kind, waypoints)
    }

    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// 路线不可能为空，保留此方法仅为满足 clippy 的 `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// 入口点（第一个路径点）
    pub fn entry(&self) -> &Waypoint {
        &self.waypoints[0]
    }

    /// 最后一个路径点
    pub fn last(&self) -> &Waypoint {
        &self.waypoints[self.waypoints.len() - 1]
    }

    /// 接近向量：最后一个路径点之前的那个点
    ///
    /// 重试前退回到这里。只有一个路径点时退回入口点本身。
    pub fn approach_vector(&self) -> &Waypoint {
        let n = self.waypoints.len();
        if n >= 2 { &self.waypoints[n - 2] } else { self.entry() }
    }

    /// 是否有路径点带 Z 坐标（执行前需要 Z 轴已归零）
    pub fn requires_z(&self) -> bool {
        self.waypoints.iter().any(|w| w.z.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waypoint_from_coords() {
        let w = Waypoint::from_coords(RouteKind::Attach, 0, &[150.0, 300.0]).unwrap();
        assert_eq!(w, Waypoint::new(150.0, 300.0));

        let w = Waypoint::from_coords(RouteKind::Attach, 0, &[150.0, 300.0, 5.0]).unwrap();
        assert_eq!(w.z, Some(5.0));
    }

    #[test]
    fn test_waypoint_invalid_coordinate_count() {
        let err = Waypoint::from_coords(RouteKind::Dock, 3, &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidWaypoint {
                route: RouteKind::Dock,
                index: 3,
                count: 1
            }
        ));

        let err = Waypoint::from_coords(RouteKind::Dock, 0, &[1.0, 2.0, 3.0, 4.0]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWaypoint { count: 4, .. }));
    }

    #[test]
    fn test_waypoint_non_finite() {
        let err = Waypoint::from_coords(RouteKind::Attach, 1, &[f64::NAN, 2.0]).unwrap_err();
        assert!(matches!(err, ConfigError::NonFiniteCoordinate { index: 1, .. }));
    }

    #[test]
    fn test_empty_route_rejected() {
        let err = Route::new(RouteKind::Attach, vec![]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EmptyRoute {
                route: RouteKind::Attach
            }
        ));
    }

    #[test]
    fn test_route_accessors() {
        let route = Route::from_coord_lists(
            RouteKind::Attach,
            &[vec![150.0, 300.0, 5.0], vec![150.0, 330.0, 5.0], vec![150.0, 300.0]],
        )
        .unwrap();

        assert_eq!(route.len(), 3);
        assert_eq!(*route.entry(), Waypoint::with_z(150.0, 300.0, 5.0));
        assert_eq!(*route.last(), Waypoint::new(150.0, 300.0));
        assert_eq!(*route.approach_vector(), Waypoint::with_z(150.0, 330.0, 5.0));
        assert!(route.requires_z());
    }

    #[test]
    fn test_single_waypoint_route() {
        let route = Route::new(RouteKind::Dock, vec![Waypoint::new(10.0, 20.0)]).unwrap();
        assert_eq!(route.entry(), route.last());
        assert_eq!(route.approach_vector(), route.entry());
        assert!(!route.requires_z());
    }
}
