//! 路线模型：把路线展开为带速度的运动序列
//!
//! 单次尝试的运动序列：
//!
//! 1. Z 抬升（可选，`lift_speed`）
//! 2. 入口点（`travel_speed`）
//! 3. 后续路径点（`attach_speed` / `dock_speed`）
//!
//! 成功后恢复到动作开始前保存的位置（`travel_speed`）。

use dockprobe_config::{DockableProbeConfig, RouteKind};
use dockprobe_driver::{MoveTarget, Position};
use crate::types::Action;

/// 运动所属阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStage {
    /// Z 抬升
    ZHop,
    /// 路线入口点
    Entry,
    /// 路线后续路径点
    Route,
    /// 重试前退回接近点
    Backoff,
    /// 成功后恢复原位
    Restore,
}

/// 规划好的单次运动
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedMove {
    pub target: MoveTarget,
    /// 速度（mm/s）
    pub speed: f64,
    pub stage: MoveStage,
}

/// 路线规划器
///
/// 纯计算，不发出任何运动。
#[derive(Debug, Clone, Copy)]
pub struct RoutePlanner<'a> {
    config: &'a DockableProbeConfig,
}

impl<'a> RoutePlanner<'a> {
    pub fn new(config: &'a DockableProbeConfig) -> Self {
        Self { config }
    }

    /// 单次尝试的完整运动序列
    ///
    /// `current` 为当前工具头位置；`z_homed` 为 `false` 时 Z 坐标不可信，
    /// 配置了 `z_hop` 就无条件抬升。
    pub fn plan(&self, kind: RouteKind, current: Position, z_homed: bool) -> Vec<PlannedMove> {
        let route = self.config.route(kind);
        let mut moves = Vec::with_capacity(route.len() + 1);

        if let Some(hop) = self.z_hop_move(current, z_homed, true) {
            moves.push(hop);
        }

        moves.push(PlannedMove {
            target: MoveTarget::from(route.entry()),
            speed: self.config.speeds.travel,
            stage: MoveStage::Entry,
        });

        let speed = self.config.speeds.for_route(kind);
        moves.extend(route.waypoints()[1..].iter().map(|waypoint| PlannedMove {
            target: MoveTarget::from(waypoint),
            speed,
            stage: MoveStage::Route,
        }));

        moves
    }

    /// 成功后的 Z 抬升
    ///
    /// 只在 Z 已归零且低于 `z_hop` 时抬升。
    pub fn lift(&self, current: Position, z_homed: bool) -> Option<PlannedMove> {
        self.z_hop_move(current, z_homed, false)
    }

    /// 重试前退回接近向量
    pub fn backoff(&self, kind: RouteKind) -> PlannedMove {
        PlannedMove {
            target: MoveTarget::from(self.config.route(kind).approach_vector()),
            speed: self.config.speeds.for_route(kind),
            stage: MoveStage::Backoff,
        }
    }

    /// 成功后恢复到动作开始前的位置
    ///
    /// 附着后只恢复 XY：探针悬挂在工具头下方，降回原高度可能撞到热床。
    /// 停靠后先恢复 XY，Z 已归零时再恢复 Z。
    pub fn restore(&self, action: Action, saved: Position, z_homed: bool) -> Vec<PlannedMove> {
        let speed = self.config.speeds.travel;
        let mut moves = vec![PlannedMove {
            target: MoveTarget::xy(saved.x, saved.y),
            speed,
            stage: MoveStage::Restore,
        }];

        if action == Action::Detach && z_homed {
            moves.push(PlannedMove {
                target: MoveTarget::z(saved.z),
                speed,
                stage: MoveStage::Restore,
            });
        }

        moves
    }

    fn z_hop_move(&self, current: Position, z_homed: bool, force_when_unhomed: bool) -> Option<PlannedMove> {
        let hop = self.config.z_hop?;
        let needed = if z_homed { current.z < hop } else { force_when_unhomed };
        needed.then_some(PlannedMove {
            target: MoveTarget::z(hop),
            speed: self.config.speeds.lift,
            stage: MoveStage::ZHop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockprobe_config::{PinSpec, Route, SpeedConfig, Waypoint};

    fn config() -> DockableProbeConfig {
        let attach = Route::new(
            RouteKind::Attach,
            vec![
                Waypoint::with_z(150.0, 300.0, 5.0),
                Waypoint::with_z(150.0, 330.0, 5.0),
                Waypoint::new(150.0, 300.0),
            ],
        )
        .unwrap();
        let dock = Route::new(
            RouteKind::Dock,
            vec![Waypoint::new(150.0, 300.0), Waypoint::new(150.0, 330.0), Waypoint::new(170.0, 330.0)],
        )
        .unwrap();

        DockableProbeConfig::new(PinSpec::new("probe"), attach, dock).with_speeds(SpeedConfig {
            speed: 5.0,
            lift: 8.0,
            travel: 100.0,
            attach: 20.0,
            dock: 10.0,
        })
    }

    #[test]
    fn test_plan_speeds_and_order() {
        let config = config();
        let planner = RoutePlanner::new(&config);
        let plan = planner.plan(RouteKind::Attach, Position::new(0.0, 0.0, 10.0), true);

        let speeds: Vec<f64> = plan.iter().map(|m| m.speed).collect();
        assert_eq!(speeds, vec![100.0, 20.0, 20.0]);
        assert_eq!(plan[0].stage, MoveStage::Entry);
        assert_eq!(plan[1].target, MoveTarget::from(&Waypoint::with_z(150.0, 330.0, 5.0)));
        assert_eq!(plan[2].target, MoveTarget::xy(150.0, 300.0));

        let plan = planner.plan(RouteKind::Dock, Position::default(), true);
        assert_eq!(plan[2].speed, 10.0);
    }

    #[test]
    fn test_single_waypoint_route() {
        let config = DockableProbeConfig::new(
            PinSpec::new("probe"),
            Route::new(RouteKind::Attach, vec![Waypoint::new(1.0, 2.0)]).unwrap(),
            Route::new(RouteKind::Dock, vec![Waypoint::new(3.0, 4.0)]).unwrap(),
        );
        let plan = RoutePlanner::new(&config).plan(RouteKind::Attach, Position::default(), true);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].stage, MoveStage::Entry);
    }

    #[test]
    fn test_z_hop_rules() {
        let config = config().with_z_hop(15.0);
        let planner = RoutePlanner::new(&config);

        // 已归零且低于 z_hop
        let plan = planner.plan(RouteKind::Attach, Position::new(0.0, 0.0, 2.0), true);
        assert_eq!(plan.len(), 4);
        assert_eq!(plan[0].target, MoveTarget::z(15.0));
        assert_eq!(plan[0].speed, 8.0);

        // 已归零且足够高
        let plan = planner.plan(RouteKind::Attach, Position::new(0.0, 0.0, 20.0), true);
        assert_eq!(plan.len(), 3);

        // 未归零：无条件抬升
        let plan = planner.plan(RouteKind::Attach, Position::new(0.0, 0.0, 100.0), false);
        assert_eq!(plan[0].stage, MoveStage::ZHop);

        // 成功后的抬升只在已归零时进行
        assert!(planner.lift(Position::new(0.0, 0.0, 2.0), true).is_some());
        assert!(planner.lift(Position::new(0.0, 0.0, 2.0), false).is_none());
        assert!(planner.lift(Position::new(0.0, 0.0, 30.0), true).is_none());
    }

    #[test]
    fn test_backoff_targets_approach_vector() {
        let config = config();
        let planner = RoutePlanner::new(&config);

        let backoff = planner.backoff(RouteKind::Attach);
        assert_eq!(backoff.target, MoveTarget::from(&Waypoint::with_z(150.0, 330.0, 5.0)));
        assert_eq!(backoff.speed, 20.0);
        assert_eq!(backoff.stage, MoveStage::Backoff);

        assert_eq!(planner.backoff(RouteKind::Dock).target, MoveTarget::xy(150.0, 330.0));
    }

    #[test]
    fn test_restore() {
        let config = config();
        let planner = RoutePlanner::new(&config);
        let saved = Position::new(10.0, 20.0, 3.0);

        let moves = planner.restore(Action::Attach, saved, true);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].target, MoveTarget::xy(10.0, 20.0));
        assert_eq!(moves[0].speed, 100.0);

        let moves = planner.restore(Action::Detach, saved, true);
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[1].target, MoveTarget::z(3.0));

        assert_eq!(planner.restore(Action::Detach, saved, false).len(), 1);
    }
}
