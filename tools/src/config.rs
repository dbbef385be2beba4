//! `tickwire.toml`: definition paths and runtime limits in one file.
//!
//! ```toml
//! [definitions]
//! messages = "defs/data/messages.toml"
//! blocks = "defs/data/blocks.toml"
//!
//! [wire]
//! max-frame-body = 40000
//!
//! [sync]
//! viewport-capacity = 255
//!
//! [queue]
//! capacity = 10000
//! ```
//!
//! Every section is optional. Without `[definitions]` the bundled
//! definitions are used.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use codec::QueueConfig;
use repgraph::SyncLimits;
use schema::ProtocolDefs;
use serde::{Deserialize, Serialize};
use wire::Limits;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ToolsConfig {
    pub definitions: Option<DefinitionPaths>,
    pub wire: Limits,
    pub sync: SyncLimits,
    pub queue: QueueConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DefinitionPaths {
    pub messages: PathBuf,
    pub blocks: PathBuf,
}

impl ToolsConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse config")
    }

    /// Reads a config file. Relative definition paths resolve against the
    /// file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let mut config = Self::from_toml_str(&text)
            .with_context(|| format!("load config {}", path.display()))?;
        if let (Some(paths), Some(base)) = (&mut config.definitions, path.parent()) {
            paths.messages = base.join(&paths.messages);
            paths.blocks = base.join(&paths.blocks);
        }
        Ok(config)
    }

    /// Loads the configured definitions, or the bundled ones.
    pub fn load_defs(&self) -> Result<ProtocolDefs> {
        match &self.definitions {
            Some(paths) => ProtocolDefs::from_paths(&paths.messages, &paths.blocks)
                .context("load protocol definitions"),
            None => defs::load().context("load bundled definitions"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        let config = ToolsConfig::from_toml_str("").unwrap();
        assert_eq!(config, ToolsConfig::default());
        assert!(config.load_defs().is_ok());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = ToolsConfig::from_toml_str(
            r#"
            [wire]
            max-frame-body = 5000

            [sync]
            viewport-capacity = 255
            "#,
        )
        .unwrap();
        assert_eq!(config.wire.max_frame_body, 5000);
        assert_eq!(
            config.wire.max_pending_bytes,
            Limits::default().max_pending_bytes
        );
        assert_eq!(config.sync.viewport_capacity, 255);
        assert_eq!(config.sync.max_npcs, SyncLimits::default().max_npcs);
        assert_eq!(config.queue, QueueConfig::default());
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert!(ToolsConfig::from_toml_str("[metrics]\nport = 1").is_err());
    }
}
