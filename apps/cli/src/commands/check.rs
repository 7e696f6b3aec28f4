//! 配置校验命令

use anyhow::{Context, Result};
use clap::Args;
use dockprobe_config::{DockableProbeConfig, Route, VerificationCheck};
use std::path::Path;

/// 配置校验参数
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// 以 JSON 输出校验后的配置
    #[arg(long)]
    pub json: bool,
}

impl CheckCommand {
    /// 加载并校验配置
    pub fn execute(&self, path: &Path) -> Result<()> {
        let config = DockableProbeConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            for line in summarize(&config) {
                println!("{}", line);
            }
            println!("✅ Config OK: {}", path.display());
        }

        Ok(())
    }
}

/// 配置摘要
fn summarize(config: &DockableProbeConfig) -> Vec<String> {
    let speeds = &config.speeds;
    let mut lines = vec![
        format!("pin: {} (z_offset {:.3})", config.probe.pin, config.probe.z_offset),
        format!(
            "speeds: travel {:.1}, attach {:.1}, dock {:.1}, lift {:.1} mm/s",
            speeds.travel, speeds.attach, speeds.dock, speeds.lift
        ),
        describe_route(&config.attach_route),
        describe_route(&config.dock_route),
    ];

    if let Some(z_hop) = config.z_hop {
        lines.push(format!("z_hop: {:.3}", z_hop));
    }

    if config.verification.is_none() {
        lines.push("verification: none (best effort)".to_string());
    }
    for check in config.verification.checks() {
        lines.push(match check {
            VerificationCheck::OpenOnAttach { open_when_attached } => {
                format!("verification: primary pin, open when attached = {}", open_when_attached)
            },
            VerificationCheck::AttachSense { pin } => format!("verification: probe sense pin {}", pin),
            VerificationCheck::DockSense { pin } => format!("verification: dock sense pin {}", pin),
        });
    }

    lines.push(format!("dock_retries: {}", config.dock_retries));
    lines.push(format!("auto_attach_dock: {}", u8::from(config.auto_attach_dock)));
    lines
}

fn describe_route(route: &Route) -> String {
    let points: Vec<String> = route.waypoints().iter().map(ToString::to_string).collect();
    format!("{} route: {}", route.kind(), points.join(" -> "))
}
