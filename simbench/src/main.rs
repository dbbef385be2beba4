use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use simbench::{Scenario, ScenarioConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "simbench",
    version,
    about = "tickwire synchronization tick benchmark harness"
)]
struct Cli {
    /// Number of simulated players (each is also an observer).
    #[arg(long, default_value_t = 16)]
    players: u16,
    /// Number of simulated NPCs.
    #[arg(long, default_value_t = 128)]
    npcs: u16,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 300)]
    ticks: u32,
    /// RNG seed for deterministic results.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Optional burst event cadence.
    #[arg(long)]
    burst_every: Option<u32>,
    /// Output directory for summary.json.
    #[arg(long, default_value = "target/simbench")]
    out_dir: PathBuf,
    /// Fail if the p95 tick time exceeds this many microseconds.
    #[arg(long)]
    max_p95_tick_us: Option<u64>,
    /// Fail if the p95 payload of a single observer exceeds this many bytes.
    #[arg(long)]
    max_p95_payload_bytes: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create output dir {}", cli.out_dir.display()))?;

    let config = ScenarioConfig {
        players: cli.players,
        npcs: cli.npcs,
        burst_every: cli.burst_every,
        seed: cli.seed,
        ..ScenarioConfig::default()
    };
    let defs = defs::load().context("load bundled definitions")?;
    let mut scenario = Scenario::new(config.clone(), defs)?;
    let mut summary = Summary::new(config, cli.ticks);

    for _ in 0..cli.ticks {
        let start = Instant::now();
        let (output, stats) = scenario.run_tick()?;
        let elapsed = start.elapsed();

        summary.tick_us.push(elapsed.as_micros() as u64);
        summary.updates_total += stats.updates as u64;
        summary.large_updates_total += stats.large_updates as u64;
        summary.inbound_total += stats.inbound as u64;
        summary.rejected_total += stats.rejected as u64;
        summary.bytes_total += stats.payload_bytes as u64;
        summary
            .payload_sizes
            .extend(output.payloads.values().map(|payload| payload.len() as u64));
    }

    summary.finalize();
    info!(
        ticks = summary.ticks,
        avg_tick_us = summary.avg_tick_us,
        p95_tick_us = summary.p95_tick_us,
        "simulation complete"
    );
    summary.assert_budgets(cli.max_p95_tick_us, cli.max_p95_payload_bytes)?;
    write_summary_json(&cli.out_dir, &summary)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serialize summary")?
    );
    Ok(())
}

fn write_summary_json(out_dir: &Path, summary: &Summary) -> Result<()> {
    let path = out_dir.join("summary.json");
    let contents = serde_json::to_string_pretty(summary).context("serialize summary")?;
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct Summary {
    scenario: ScenarioConfig,
    ticks: u32,
    updates_total: u64,
    large_updates_total: u64,
    inbound_total: u64,
    rejected_total: u64,
    bytes_total: u64,
    avg_bytes_per_tick: u64,
    avg_payload_bytes: u64,
    p95_payload_bytes: u64,
    avg_tick_us: u64,
    p95_tick_us: u64,
    #[serde(skip)]
    payload_sizes: Vec<u64>,
    #[serde(skip)]
    tick_us: Vec<u64>,
}

impl Summary {
    fn new(scenario: ScenarioConfig, ticks: u32) -> Self {
        Self {
            scenario,
            ticks,
            updates_total: 0,
            large_updates_total: 0,
            inbound_total: 0,
            rejected_total: 0,
            bytes_total: 0,
            avg_bytes_per_tick: 0,
            avg_payload_bytes: 0,
            p95_payload_bytes: 0,
            avg_tick_us: 0,
            p95_tick_us: 0,
            payload_sizes: Vec::new(),
            tick_us: Vec::new(),
        }
    }

    fn finalize(&mut self) {
        if self.ticks > 0 {
            self.avg_bytes_per_tick = self.bytes_total / u64::from(self.ticks);
        }
        if !self.payload_sizes.is_empty() {
            let total: u64 = self.payload_sizes.iter().sum();
            self.avg_payload_bytes = total / self.payload_sizes.len() as u64;
            self.p95_payload_bytes = p95(&mut self.payload_sizes);
        }
        if !self.tick_us.is_empty() {
            let total: u64 = self.tick_us.iter().sum();
            self.avg_tick_us = total / self.tick_us.len() as u64;
            self.p95_tick_us = p95(&mut self.tick_us);
        }
    }

    fn assert_budgets(&self, max_tick_us: Option<u64>, max_payload: Option<u64>) -> Result<()> {
        if let Some(max_tick_us) = max_tick_us {
            if self.p95_tick_us > max_tick_us {
                anyhow::bail!(
                    "p95 tick time {}us exceeds budget {}us",
                    self.p95_tick_us,
                    max_tick_us
                );
            }
        }
        if let Some(max_payload) = max_payload {
            if self.p95_payload_bytes > max_payload {
                anyhow::bail!(
                    "p95 payload bytes {} exceeds budget {}",
                    self.p95_payload_bytes,
                    max_payload
                );
            }
        }
        Ok(())
    }
}

fn p95(values: &mut [u64]) -> u64 {
    values.sort_unstable();
    let idx = ((values.len() as f64) * 0.95).ceil() as usize;
    let idx = idx.saturating_sub(1).min(values.len() - 1);
    values[idx]
}
