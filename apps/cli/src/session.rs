//! 仿真会话
//!
//! 把已校验的配置接到 [`SimulatedPrinter`] 上：拾取点默认取附着路线的接近向量，
//! 释放点默认取停靠路线的最后一个路径点，引脚按配置的校验方式接线。

use anyhow::{Context, Result};
use clap::Args;
use crossbeam_channel::Receiver;
use dockprobe_client::{ChannelEventHook, DockEvent, DockEventCallback, DockableProbe};
use dockprobe_config::{DockableProbeConfig, VerificationCheck};
use dockprobe_driver::Position;
use dockprobe_driver::mock::{SimConfig, SimMotion, SimProbeLocation, SimSensors, SimulatedPrinter};
use std::path::Path;
use std::sync::Arc;

/// 事件队列容量
const EVENT_QUEUE_CAPACITY: usize = 256;

/// 仿真参数
#[derive(Args, Debug, Clone, Default)]
pub struct SimArgs {
    /// 接下来 N 次拾取失败
    #[arg(long, default_value_t = 0)]
    pub fail_attach: u32,

    /// 接下来 N 次释放失败
    #[arg(long, default_value_t = 0)]
    pub fail_dock: u32,

    /// Z 轴未归零
    #[arg(long)]
    pub z_unhomed: bool,

    /// 探针不在底座中
    #[arg(long)]
    pub probe_missing: bool,

    /// 拾取点 X,Y（默认：附着路线的接近向量）
    #[arg(long, value_parser = parse_xy)]
    pub dock_position: Option<(f64, f64)>,

    /// 释放点 X,Y（默认：停靠路线的最后一个路径点）
    #[arg(long, value_parser = parse_xy)]
    pub release_position: Option<(f64, f64)>,

    /// 工具头初始位置 X,Y,Z
    #[arg(long, value_parser = parse_xyz, default_value = "0,0,20")]
    pub start: Position,
}

impl SimArgs {
    /// 按配置生成仿真接线
    pub fn sim_config(&self, config: &DockableProbeConfig) -> SimConfig {
        let approach = config.attach_route.approach_vector();
        let release = config.dock_route.last();

        let (open_when_attached, probe_sense_pin) = match config.verification.attach_side() {
            Some(VerificationCheck::OpenOnAttach { open_when_attached }) => (*open_when_attached, None),
            Some(VerificationCheck::AttachSense { pin }) => (true, Some(pin.clone())),
            _ => (true, None),
        };

        SimConfig {
            dock_position: self.dock_position.unwrap_or((approach.x, approach.y)),
            release_position: self.release_position.unwrap_or((release.x, release.y)),
            primary_pin: config.probe.pin.clone(),
            open_when_attached,
            probe_sense_pin,
            dock_sense_pin: config.verification.dock_sense_pin().cloned(),
            start: self.start,
            z_homed: !self.z_unhomed,
        }
    }
}

fn parse_coords(s: &str, count: usize) -> Result<Vec<f64>, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate in '{}': {}", s, e))?;
    if values.len() != count {
        return Err(format!("expected {} comma-separated values, got {}", count, values.len()));
    }
    Ok(values)
}

fn parse_xy(s: &str) -> Result<(f64, f64), String> {
    let v = parse_coords(s, 2)?;
    Ok((v[0], v[1]))
}

fn parse_xyz(s: &str) -> Result<Position, String> {
    let v = parse_coords(s, 3)?;
    Ok(Position::new(v[0], v[1], v[2]))
}

/// 会话：探针实例 + 仿真打印机 + 事件接收端
pub struct ProbeSession {
    pub probe: DockableProbe<SimMotion, SimSensors>,
    pub sim: SimulatedPrinter,
    events: Receiver<DockEvent>,
}

impl ProbeSession {
    /// 加载配置并创建会话
    pub fn open(path: &Path, args: &SimArgs) -> Result<Self> {
        let config = DockableProbeConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        Ok(Self::new(config, args))
    }

    pub fn new(config: DockableProbeConfig, args: &SimArgs) -> Self {
        let sim = SimulatedPrinter::new(args.sim_config(&config));
        sim.inject_attach_failures(args.fail_attach);
        sim.inject_dock_failures(args.fail_dock);
        if args.probe_missing {
            sim.set_probe_location(SimProbeLocation::Missing);
        }

        let (hook, events) = ChannelEventHook::new(EVENT_QUEUE_CAPACITY);
        let mut probe = DockableProbe::new(config, sim.motion(), sim.sensors());
        probe.hooks_mut().add_callback(Arc::new(hook) as Arc<dyn DockEventCallback>);

        Self { probe, sim, events }
    }

    /// 取出所有待处理事件
    pub fn drain_events(&self) -> Vec<DockEvent> {
        self.events.try_iter().collect()
    }
}
