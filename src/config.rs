use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Per-contribution weights for the element tally
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TallyWeights {
    pub stem: f64,
    pub branch: f64,
    pub hidden_stem: f64,
}

impl Default for TallyWeights {
    fn default() -> Self {
        Self {
            stem: 1.0,
            branch: 0.5,
            hidden_stem: 0.3,
        }
    }
}

/// Day-master share (percent) boundaries: strictly above `strong_above` is
/// strong, strictly below `weak_below` is weak, anything between is medium.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrengthThresholds {
    pub strong_above: f64,
    pub weak_below: f64,
}

impl Default for StrengthThresholds {
    fn default() -> Self {
        Self {
            strong_above: 30.0,
            weak_below: 15.0,
        }
    }
}

/// Chat-completion endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1/chat/completions".into(),
            model: "gpt-3.5-turbo".into(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub weights: TallyWeights,
    pub thresholds: StrengthThresholds,
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Load from a JSON file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid config: {:?}", path))?;
        Ok(config)
    }

    /// Stem weight must be positive so every chart has a non-zero tally.
    /// Branch and hidden-stem weights may be zero but not negative.
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        for (name, value) in [
            ("stem", w.stem),
            ("branch", w.branch),
            ("hidden_stem", w.hidden_stem),
        ] {
            if !value.is_finite() {
                bail!("weight {} must be finite, got {}", name, value);
            }
        }
        if w.stem <= 0.0 {
            bail!("weight stem must be > 0, got {}", w.stem);
        }
        if w.branch < 0.0 {
            bail!("weight branch must be >= 0, got {}", w.branch);
        }
        if w.hidden_stem < 0.0 {
            bail!("weight hidden_stem must be >= 0, got {}", w.hidden_stem);
        }

        let t = &self.thresholds;
        if !(t.weak_below.is_finite() && t.strong_above.is_finite()) {
            bail!("strength thresholds must be finite");
        }
        if !(0.0 <= t.weak_below && t.weak_below <= t.strong_above) {
            bail!(
                "thresholds need 0 <= weak_below <= strong_above, got {} and {}",
                t.weak_below,
                t.strong_above
            );
        }
        Ok(())
    }
}
