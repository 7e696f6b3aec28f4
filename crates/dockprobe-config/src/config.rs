//! # 可拆卸探针配置
//!
//! 从 TOML 文件的 `[dockable_probe]` 段加载，校验后生成只读配置。
//!
//! ```toml
//! [dockable_probe]
//! pin = "^PB7"
//! z_offset = 1.2
//! attach_route = [[150, 300, 5], [150, 330, 5], [150, 300]]
//! dock_route = [[150, 300, 5], [150, 330, 5], [170, 330]]
//! dock_sense_pin = "PA4"
//! dock_retries = 2
//! ```

use crate::error::ConfigError;
use crate::pin::PinSpec;
use crate::verification::VerificationConfig;
use crate::waypoint::{Route, RouteKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// 默认基础速度（mm/s）
pub const DEFAULT_SPEED: f64 = 5.0;

/// 默认采样回退距离（mm）
const DEFAULT_SAMPLE_RETRACT_DIST: f64 = 2.0;

fn default_sample_retract_dist() -> f64 {
    DEFAULT_SAMPLE_RETRACT_DIST
}

fn default_true() -> bool {
    true
}

/// 配置文件顶层结构
#[derive(Debug, Deserialize)]
struct ConfigFile {
    dockable_probe: RawDockableProbeConfig,
}

/// 原始配置（未校验，直接对应 TOML 字段）
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDockableProbeConfig {
    /// 探针主触发引脚
    pub pin: String,
    /// 探针 Z 偏移（mm）
    pub z_offset: f64,
    #[serde(default = "default_sample_retract_dist")]
    pub sample_retract_dist: f64,

    pub speed: Option<f64>,
    pub lift_speed: Option<f64>,
    pub travel_speed: Option<f64>,
    pub attach_speed: Option<f64>,
    pub dock_speed: Option<f64>,

    pub attach_route: Vec<Vec<f64>>,
    pub dock_route: Vec<Vec<f64>>,
    pub z_hop: Option<f64>,

    pub check_open_attach: Option<bool>,
    pub probe_sense_pin: Option<String>,
    pub dock_sense_pin: Option<String>,

    #[serde(default)]
    pub dock_retries: u32,
    #[serde(default = "default_true", alias = "auto_attach_detach")]
    pub auto_attach_dock: bool,
    /// Z 限位使用探针本身（虚拟限位）
    #[serde(default)]
    pub z_virtual_endstop: bool,
}

/// 速度配置（mm/s）
///
/// 未设置的速度回落到基础速度：`attach`/`dock` 默认等于 `travel`，
/// `travel`/`lift` 默认等于 `speed`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeedConfig {
    /// 基础速度
    pub speed: f64,
    /// Z 抬升速度
    pub lift: f64,
    /// 移动到路线入口点的速度
    pub travel: f64,
    /// 附着路线后续路径点速度
    pub attach: f64,
    /// 停靠路线后续路径点速度
    pub dock: f64,
}

impl SpeedConfig {
    /// 所有速度相同
    pub fn uniform(speed: f64) -> Self {
        Self {
            speed,
            lift: speed,
            travel: speed,
            attach: speed,
            dock: speed,
        }
    }

    /// 路线后续路径点使用的速度
    pub fn for_route(&self, kind: RouteKind) -> f64 {
        match kind {
            RouteKind::Attach => self.attach,
            RouteKind::Dock => self.dock,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("speed", self.speed),
            ("lift_speed", self.lift),
            ("travel_speed", self.travel),
            ("attach_speed", self.attach),
            ("dock_speed", self.dock),
        ];
        for (option, value) in named {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidSpeed { option, value });
            }
        }
        Ok(())
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self::uniform(DEFAULT_SPEED)
    }
}

/// 通用探针选项（测量流程使用，编排引擎只透传）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeSettings {
    /// 主触发引脚
    pub pin: PinSpec,
    /// Z 偏移（mm）
    pub z_offset: f64,
    /// 采样回退距离（mm）
    pub sample_retract_dist: f64,
}

/// 已校验的可拆卸探针配置
///
/// 启动时加载一次，之后只读共享（通常放在 `Arc` 中）。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DockableProbeConfig {
    pub probe: ProbeSettings,
    pub speeds: SpeedConfig,
    pub attach_route: Route,
    pub dock_route: Route,
    /// Z 抬升高度（`None` 表示禁用）
    pub z_hop: Option<f64>,
    pub verification: VerificationConfig,
    /// 校验失败后的重试次数（0 表示不重试）
    pub dock_retries: u32,
    /// 自动附着/停靠开关的初始值
    pub auto_attach_dock: bool,
    /// Z 限位使用探针本身
    pub z_virtual_endstop: bool,
}

impl DockableProbeConfig {
    /// 使用默认选项创建配置
    ///
    /// 速度为 [`DEFAULT_SPEED`]，无校验、无 Z 抬升、不重试。
    pub fn new(pin: PinSpec, attach_route: Route, dock_route: Route) -> Self {
        Self {
            probe: ProbeSettings {
                pin,
                z_offset: 0.0,
                sample_retract_dist: DEFAULT_SAMPLE_RETRACT_DIST,
            },
            speeds: SpeedConfig::default(),
            attach_route,
            dock_route,
            z_hop: None,
            verification: VerificationConfig::none(),
            dock_retries: 0,
            auto_attach_dock: true,
            z_virtual_endstop: false,
        }
    }

    pub fn with_speeds(mut self, speeds: SpeedConfig) -> Self {
        self.speeds = speeds;
        self
    }

    pub fn with_z_hop(mut self, z_hop: f64) -> Self {
        self.z_hop = Some(z_hop);
        self
    }

    pub fn with_verification(mut self, verification: VerificationConfig) -> Self {
        self.verification = verification;
        self
    }

    pub fn with_dock_retries(mut self, dock_retries: u32) -> Self {
        self.dock_retries = dock_retries;
        self
    }

    pub fn with_auto_attach_dock(mut self, enabled: bool) -> Self {
        self.auto_attach_dock = enabled;
        self
    }

    /// 按类型获取路线
    pub fn route(&self, kind: RouteKind) -> &Route {
        match kind {
            RouteKind::Attach => &self.attach_route,
            RouteKind::Dock => &self.dock_route,
        }
    }

    /// 任一路线带 Z 坐标
    pub fn requires_z(&self) -> bool {
        self.attach_route.requires_z() || self.dock_route.requires_z()
    }

    /// 从文件加载
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 文本加载（必须包含 `[dockable_probe]` 段）
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Self::from_raw(file.dockable_probe)
    }

    /// 校验原始配置
    pub fn from_raw(raw: RawDockableProbeConfig) -> Result<Self, ConfigError> {
        let pin = PinSpec::parse(&raw.pin)?;
        let probe_sense_pin = raw.probe_sense_pin.as_deref().map(PinSpec::parse).transpose()?;
        let dock_sense_pin = raw.dock_sense_pin.as_deref().map(PinSpec::parse).transpose()?;

        let speed = raw.speed.unwrap_or(DEFAULT_SPEED);
        let travel = raw.travel_speed.unwrap_or(speed);
        let speeds = SpeedConfig {
            speed,
            lift: raw.lift_speed.unwrap_or(speed),
            travel,
            attach: raw.attach_speed.unwrap_or(travel),
            dock: raw.dock_speed.unwrap_or(travel),
        };

        if raw.check_open_attach.is_some() && probe_sense_pin.is_some() {
            warn!("Both check_open_attach and probe_sense_pin are set; check_open_attach takes precedence");
        }

        let config = Self {
            probe: ProbeSettings {
                pin,
                z_offset: raw.z_offset,
                sample_retract_dist: raw.sample_retract_dist,
            },
            speeds,
            attach_route: Route::from_coord_lists(RouteKind::Attach, &raw.attach_route)?,
            dock_route: Route::from_coord_lists(RouteKind::Dock, &raw.dock_route)?,
            z_hop: raw.z_hop,
            verification: VerificationConfig::from_options(
                raw.check_open_attach,
                probe_sense_pin,
                dock_sense_pin,
            ),
            dock_retries: raw.dock_retries,
            auto_attach_dock: raw.auto_attach_dock,
            z_virtual_endstop: raw.z_virtual_endstop,
        };

        config.validate()?;

        if config.verification.is_none() {
            warn!(
                "No probe attachment verification configured (check_open_attach, probe_sense_pin, dock_sense_pin); attach/dock results are trusted without checking"
            );
        }

        Ok(config)
    }

    /// 校验配置的一致性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.speeds.validate()?;

        if !self.probe.z_offset.is_finite() {
            return Err(ConfigError::InvalidValue {
                option: "z_offset",
                reason: "must be a finite number".to_string(),
            });
        }
        if !(self.probe.sample_retract_dist.is_finite() && self.probe.sample_retract_dist > 0.0) {
            return Err(ConfigError::InvalidValue {
                option: "sample_retract_dist",
                reason: format!("must be above 0, got {}", self.probe.sample_retract_dist),
            });
        }
        if let Some(z_hop) = self.z_hop
            && !(z_hop.is_finite() && z_hop > 0.0)
        {
            return Err(ConfigError::InvalidValue {
                option: "z_hop",
                reason: format!("must be above 0, got {}", z_hop),
            });
        }
        if self.z_virtual_endstop && (self.z_hop.is_some() || self.requires_z()) {
            return Err(ConfigError::VirtualEndstopConflict);
        }

        Ok(())
    }
}
