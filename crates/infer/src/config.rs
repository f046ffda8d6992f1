use serde::Deserialize;

use crate::error::InferError;

/// Classifier sampling configuration.
///
/// The engine is stateless aside from these fixed knobs. Defaults match the
/// documented contract: 100-value sample for date/number scoring, 50-value
/// sample for string sub-typing, constant 0.8 string confidence.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_sample_cap")]
    pub sample_cap: usize,
    #[serde(default = "default_string_sample_cap")]
    pub string_sample_cap: usize,
    /// Fixed confidence reported for string verdicts regardless of evidence
    /// strength. Deliberately not a computed score.
    #[serde(default = "default_string_confidence")]
    pub string_confidence: f64,
}

fn default_sample_cap() -> usize {
    100
}

fn default_string_sample_cap() -> usize {
    50
}

fn default_string_confidence() -> f64 {
    0.8
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sample_cap: default_sample_cap(),
            string_sample_cap: default_string_sample_cap(),
            string_confidence: default_string_confidence(),
        }
    }
}

impl ClassifierConfig {
    pub fn from_toml(s: &str) -> Result<Self, InferError> {
        let config: Self = toml::from_str(s).map_err(|e| InferError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), InferError> {
        if self.sample_cap == 0 {
            return Err(InferError::ConfigValidation(
                "sample_cap must be at least 1".into(),
            ));
        }
        if self.string_sample_cap == 0 {
            return Err(InferError::ConfigValidation(
                "string_sample_cap must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.string_confidence) {
            return Err(InferError::ConfigValidation(format!(
                "string_confidence must be in [0, 1], got {}",
                self.string_confidence
            )));
        }
        Ok(())
    }
}
