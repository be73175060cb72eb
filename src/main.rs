use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use auv_sim::config::{load_config, SimConfig};
use auv_sim::io::{csv, json, read_mission};
use auv_sim::mission;
use auv_sim::vehicle::{Torpedo, VehicleModel};

#[derive(Parser, Debug)]
#[command(name = "auv-sim")]
#[command(about = "Fly an AUV through a table of depth/heading/rpm legs", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Mission table (CSV)
    #[arg(long)]
    profile: Option<PathBuf>,
    /// Trajectory output (CSV)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Mission summary output (JSON)
    #[arg(long)]
    summary: Option<PathBuf>,
    /// Sample interval, s
    #[arg(long)]
    sample_time: Option<f64>,
    /// Steps of the seeding run (defaults to the first row's duration)
    #[arg(long)]
    initial_steps: Option<usize>,
    /// Control mode, e.g. depthHeadingAutopilot
    #[arg(long)]
    mode: Option<String>,
}

impl Args {
    fn resolve(self) -> Result<SimConfig> {
        let mut cfg = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SimConfig::default(),
        };
        if let Some(v) = self.profile { cfg.profile = v; }
        if let Some(v) = self.output { cfg.output = v; }
        if let Some(v) = self.summary { cfg.summary = Some(v); }
        if let Some(v) = self.sample_time { cfg.sample_time = v; }
        if let Some(v) = self.initial_steps { cfg.initial_steps = Some(v); }
        if let Some(v) = self.mode { cfg.control_mode = v; }
        cfg.validate().context("invalid configuration")?;
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = Args::parse().resolve()?;
    info!(?cfg, "configuration loaded");

    let mission = read_mission(&cfg.profile)
        .with_context(|| format!("reading mission table {}", cfg.profile.display()))?;
    let seed = mission
        .seed_leg()
        .context("mission table has no seeding row")?;

    let mut vehicle = Torpedo::new(cfg.mode()?, seed.setpoints(), seed.current);
    let trajectory = mission::fly(&mut vehicle, &mission, &cfg.plan())
        .with_context(|| format!("flying mission {}", mission.name))?;

    csv::write_trajectory_file(&cfg.output, &trajectory, &vehicle.actuator_names())
        .with_context(|| format!("writing {}", cfg.output.display()))?;
    info!(path = %cfg.output.display(), rows = trajectory.len(), "trajectory saved");

    if let Some(path) = &cfg.summary {
        let summary = json::MissionSummary::from_trajectory(&trajectory);
        json::write_summary_file(path, &mission, &summary)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(
            path = %path.display(),
            max_depth = summary.max_depth,
            distance = summary.horizontal_distance,
            "summary saved"
        );
    }

    Ok(())
}
