use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::Pattern;
use schema::ProtocolDefs;
use tickwire_tools::{decode_capture, format_decode_pretty, CheckReport, ToolsConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tickwire-tools",
    version,
    about = "tickwire definition checking and capture decoding"
)]
struct Cli {
    /// Optional tickwire.toml with definition paths and limits.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load definitions and print counts and the fingerprint.
    Check {
        /// Message definitions; overrides the config.
        #[arg(long, requires = "blocks")]
        messages: Option<PathBuf>,
        /// Update block definitions; overrides the config.
        #[arg(long, requires = "messages")]
        blocks: Option<PathBuf>,
    },
    /// Decode a captured client byte stream.
    Decode {
        /// Capture file, or a directory of captures.
        capture: PathBuf,
        /// Optional glob filter when decoding a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ToolsConfig::load(path)?,
        None => ToolsConfig::default(),
    };

    match cli.command {
        Command::Check { messages, blocks } => {
            let defs = match (messages, blocks) {
                (Some(messages), Some(blocks)) => ProtocolDefs::from_paths(&messages, &blocks)
                    .context("load protocol definitions")?,
                _ => config.load_defs()?,
            };
            let json = serde_json::to_string_pretty(&CheckReport::new(&defs))
                .context("serialize json")?;
            println!("{json}");
        }
        Command::Decode {
            capture,
            glob,
            format,
        } => {
            let registry = Arc::new(config.load_defs()?.messages);
            let paths = if capture.is_dir() {
                collect_captures(&capture, glob.as_deref())?
            } else {
                vec![capture]
            };
            for path in paths {
                let bytes = fs::read(&path)
                    .with_context(|| format!("read capture {}", path.display()))?;
                debug!(path = %path.display(), bytes = bytes.len(), "decoding capture");
                let report = decode_capture(&bytes, Arc::clone(&registry), &config.wire);
                match format {
                    DecodeFormat::Json => {
                        let json =
                            serde_json::to_string_pretty(&report).context("serialize json")?;
                        println!("{json}");
                    }
                    DecodeFormat::Pretty => {
                        println!("== {} ==", path.display());
                        println!("{}", format_decode_pretty(&report));
                    }
                }
            }
        }
    }
    Ok(())
}

fn collect_captures(dir: &Path, glob: Option<&str>) -> Result<Vec<PathBuf>> {
    let pattern = glob
        .map(Pattern::new)
        .transpose()
        .context("invalid glob pattern")?;

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}
