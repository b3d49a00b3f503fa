//! Configuration for hcompress

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CompressError, Result};

/// How the container header describes the alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderLayout {
    /// Presence bitmap followed by the true count of every present symbol.
    /// Both sides build the same tree and the decoder knows where the data ends.
    #[default]
    Counted,
    /// Presence bitmap only. The decoder rebuilds the tree with a zero
    /// placeholder frequency per symbol and reads until the payload runs out,
    /// so padding bits and differing tree shapes can corrupt the output.
    Presence,
}

impl fmt::Display for HeaderLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderLayout::Counted => f.write_str("counted"),
            HeaderLayout::Presence => f.write_str("presence"),
        }
    }
}

impl FromStr for HeaderLayout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "counted" => Ok(HeaderLayout::Counted),
            "presence" => Ok(HeaderLayout::Presence),
            other => Err(format!(
                "unknown header layout '{other}' (expected 'counted' or 'presence')"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub layout: HeaderLayout,
    pub max_input_size: Option<u64>,
    pub buffer_size: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            layout: HeaderLayout::Counted,
            max_input_size: None,
            buffer_size: 64 * 1024,
        }
    }
}

impl CompressionConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| CompressError::Config(e.to_string()))?;
        if config.buffer_size == 0 {
            return Err(CompressError::Config("buffer_size must be non-zero".into()));
        }
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CompressError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    pub fn with_layout(mut self, layout: HeaderLayout) -> Self {
        self.layout = layout;
        self
    }

    pub(crate) fn check_input_size(&self, size: u64) -> Result<()> {
        match self.max_input_size {
            Some(limit) if size > limit => Err(CompressError::InputTooLarge { size, limit }),
            _ => Ok(()),
        }
    }
}
