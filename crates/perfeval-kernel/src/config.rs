//! Engine configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file is a valid
//! configuration:
//!
//! ```toml
//! validate_indicators = true
//! max_comment_len = 4000
//! audit_log = true
//!
//! [completion_weights]
//! admin_approved = 50
//! completed = 100
//! ```

use perfeval_model::EvaluationStatus;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Percent credit each status contributes to the completion percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionWeights {
    pub draft: u8,
    pub submitted: u8,
    pub director_approved: u8,
    pub admin_approved: u8,
    pub completed: u8,
}

impl CompletionWeights {
    /// Only completed evaluations count
    pub const COMPLETED_ONLY: CompletionWeights = CompletionWeights {
        draft: 0,
        submitted: 0,
        director_approved: 0,
        admin_approved: 0,
        completed: 100,
    };

    #[must_use]
    pub fn weight(&self, status: EvaluationStatus) -> u8 {
        match status {
            EvaluationStatus::Draft => self.draft,
            EvaluationStatus::Submitted => self.submitted,
            EvaluationStatus::DirectorApproved => self.director_approved,
            EvaluationStatus::AdminApproved => self.admin_approved,
            EvaluationStatus::Completed => self.completed,
        }
    }

    /// Weights must lie in `0..=100` and completion must earn full credit
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(status) = EvaluationStatus::ALL
            .into_iter()
            .find(|s| self.weight(*s) > 100)
        {
            return Err(ConfigError::Invalid(format!(
                "completion weight for {status} exceeds 100"
            )));
        }
        if self.completed != 100 {
            return Err(ConfigError::Invalid(
                "completed evaluations must carry a weight of 100".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CompletionWeights {
    fn default() -> Self {
        Self::COMPLETED_ONLY
    }
}

/// Workflow engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Refuse answers for indicators missing from the organization's catalog
    pub validate_indicators: bool,
    /// Upper bound on rejection comment length, in characters
    pub max_comment_len: usize,
    /// Record every committed action in the hash-chained audit log
    pub audit_log: bool,
    /// Weighting used by the progress aggregator. Kept last so it serializes
    /// as a trailing TOML table.
    pub completion_weights: CompletionWeights,
}

impl EngineConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_completion_weights(mut self, weights: CompletionWeights) -> Self {
        self.completion_weights = weights;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_indicator_validation(mut self, enabled: bool) -> Self {
        self.validate_indicators = enabled;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_comment_len(mut self, len: usize) -> Self {
        self.max_comment_len = len;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_audit_log(mut self, enabled: bool) -> Self {
        self.audit_log = enabled;
        self
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.completion_weights.validate()?;
        if self.max_comment_len == 0 {
            return Err(ConfigError::Invalid(
                "max_comment_len must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            completion_weights: CompletionWeights::default(),
            validate_indicators: true,
            max_comment_len: 4000,
            audit_log: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.completion_weights, CompletionWeights::COMPLETED_ONLY);
    }

    #[test]
    fn partial_weights_fill_in_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            validate_indicators = false

            [completion_weights]
            admin_approved = 50
            "#,
        )
        .unwrap();

        assert!(!config.validate_indicators);
        assert_eq!(config.completion_weights.admin_approved, 50);
        assert_eq!(config.completion_weights.completed, 100);
        assert_eq!(config.completion_weights.draft, 0);
    }

    #[test]
    fn oversized_weight_is_invalid() {
        let err = EngineConfig::from_toml_str("[completion_weights]\nsubmitted = 150\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn completion_must_earn_full_credit() {
        let err = EngineConfig::from_toml_str("[completion_weights]\ncompleted = 90\n").unwrap_err();
        assert!(err.to_string().contains("weight of 100"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = EngineConfig::from_toml_str("max_comment_len = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_comment_len = 280").unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.max_comment_len, 280);

        let missing = EngineConfig::load("/nonexistent/perfeval.toml").unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
