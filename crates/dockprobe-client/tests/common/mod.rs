//! 测试辅助函数
//!
//! 提供快速创建测试环境的工具函数。

#![allow(dead_code)]

use dockprobe_client::{DockEvent, DockEventCallback, DockableProbe};
use dockprobe_config::{DockableProbeConfig, PinSpec, Route, RouteKind, Waypoint};
use dockprobe_driver::mock::{MockMotion, MockSensors, SimConfig, SimMotion, SimSensors, SimulatedPrinter};
use dockprobe_driver::{PinState, Position};
use std::sync::{Arc, Mutex};

/// 测试环境：探针实例 + 共享的 Mock 句柄
pub struct TestRig {
    pub probe: DockableProbe<MockMotion, MockSensors>,
    pub motion: MockMotion,
    pub sensors: MockSensors,
    pub events: Arc<EventLog>,
}

/// 事件记录回调
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<DockEvent>>,
}

impl EventLog {
    pub fn events(&self) -> Vec<DockEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn retries(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, DockEvent::RetryScheduled { .. }))
            .count()
    }
}

impl DockEventCallback for EventLog {
    fn on_event(&self, event: &DockEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// 场景 A 的附着路线
pub fn scenario_attach_route() -> Route {
    Route::new(
        RouteKind::Attach,
        vec![
            Waypoint::with_z(150.0, 300.0, 5.0),
            Waypoint::with_z(150.0, 330.0, 5.0),
            Waypoint::new(150.0, 300.0),
        ],
    )
    .unwrap()
}

/// 与附着路线不对称的停靠路线
pub fn scenario_dock_route() -> Route {
    Route::new(
        RouteKind::Dock,
        vec![
            Waypoint::with_z(150.0, 300.0, 5.0),
            Waypoint::with_z(150.0, 330.0, 5.0),
            Waypoint::new(170.0, 330.0),
        ],
    )
    .unwrap()
}

/// 基础配置：无校验、不重试
pub fn base_config() -> DockableProbeConfig {
    DockableProbeConfig::new(PinSpec::new("probe"), scenario_attach_route(), scenario_dock_route())
}

/// 在 (0, 0, 20) 创建测试环境，Z 已归零
pub fn setup_rig(config: DockableProbeConfig) -> TestRig {
    let motion = MockMotion::new(Position::new(0.0, 0.0, 20.0));
    let sensors = MockSensors::new();
    let events = Arc::new(EventLog::default());

    let mut probe = DockableProbe::new(config, motion.clone(), sensors.clone());
    probe.hooks_mut().add_callback(events.clone());

    TestRig {
        probe,
        motion,
        sensors,
        events,
    }
}

/// 设置引脚稳态值
pub fn set_pin(sensors: &MockSensors, name: &str, state: PinState) {
    sensors.set(&PinSpec::new(name), state);
}

/// 与场景路线匹配的仿真打印机
pub fn setup_sim(open_when_attached: bool) -> SimulatedPrinter {
    SimulatedPrinter::new(SimConfig {
        dock_position: (150.0, 330.0),
        release_position: (170.0, 330.0),
        primary_pin: PinSpec::new("probe"),
        open_when_attached,
        probe_sense_pin: Some(PinSpec::new("probe_sense")),
        dock_sense_pin: Some(PinSpec::new("dock_sense")),
        start: Position::new(100.0, 100.0, 20.0),
        z_homed: true,
    })
}

/// 连接仿真打印机的探针实例
pub fn sim_probe(config: DockableProbeConfig, sim: &SimulatedPrinter) -> DockableProbe<SimMotion, SimSensors> {
    DockableProbe::new(config, sim.motion(), sim.sensors())
}
