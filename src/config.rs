use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{error::Result, vectorizer::evaluate::scoring::TieBreak};

/// Number of related documents returned when the caller does not say
pub const DEFAULT_RELATED_COUNT: usize = 3;

/// Ranking options
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
/// ```
/// use related_tfidf::{RelatedConfig, TieBreak};
///
/// let json = r#"{ "count": 5, "tie_break": "document_id" }"#;
/// let config = RelatedConfig::from_json_str(json).unwrap();
/// assert_eq!(config.count, 5);
/// assert_eq!(config.tie_break, TieBreak::DocumentId);
/// assert!(!config.parallel);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelatedConfig {
    /// maximum number of results
    pub count: usize,
    /// ordering among exactly equal scores
    pub tie_break: TieBreak,
    /// score candidates on the rayon pool
    pub parallel: bool,
    /// reject collections with repeated document ids
    pub strict_ids: bool,
}

impl Default for RelatedConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_RELATED_COUNT,
            tie_break: TieBreak::default(),
            parallel: false,
            strict_ids: false,
        }
    }
}

impl RelatedConfig {
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}
