use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tilegrid_core as game;

/// On-disk settings, every section optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub slide: game::SlideConfig,
    pub swap: game::SwapConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Applies a seed override and clamps both sections.
    pub fn finish(mut self, seed: Option<u64>) -> Self {
        if let Some(seed) = seed {
            self.slide.seed = seed;
            self.swap.seed = seed;
        }
        Self {
            slide: self.slide.validated(),
            swap: self.swap.validated(),
        }
    }
}
