//! Emote vocabulary: the set of emotes valid for a channel.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EmotesError, Result};

/// An emote known to the channel at report time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoteVocabularyEntry {
    /// Catalog identifier, used for image and page links
    pub id: String,
    /// Chat shortcode, unique within a vocabulary
    pub name: String,
    /// When the emote was added to the channel's set
    pub added_at: DateTime<Utc>,
}

impl EmoteVocabularyEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, added_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            added_at,
        }
    }
}

/// Check that every name is non-empty and unique.
pub fn validate_vocabulary(entries: &[EmoteVocabularyEntry]) -> Result<()> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if entry.name.is_empty() {
            return Err(EmotesError::vocabulary(format!(
                "emote {} has an empty name",
                entry.id
            )));
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(EmotesError::vocabulary(format!(
                "duplicate emote name '{}'",
                entry.name
            )));
        }
    }
    Ok(())
}

/// Trait for emote catalog implementations.
#[async_trait]
pub trait VocabularySource: Send + Sync {
    /// Catalog name, used in logs.
    fn name(&self) -> &str;

    /// Fetch the current emote set for a user/channel identifier.
    async fn fetch(&self, user_id: &str) -> Result<Vec<EmoteVocabularyEntry>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> EmoteVocabularyEntry {
        EmoteVocabularyEntry::new(format!("id-{name}"), name, Utc::now())
    }

    #[test]
    fn test_valid_vocabulary() {
        let entries = vec![entry("PogChamp"), entry("Kappa"), entry("kappa")];
        assert!(validate_vocabulary(&entries).is_ok());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let entries = vec![entry("Kappa"), entry("PogChamp"), entry("Kappa")];
        let err = validate_vocabulary(&entries).unwrap_err();
        assert!(matches!(err, EmotesError::Vocabulary(_)));
        assert!(err.to_string().contains("Kappa"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let entries = vec![entry("")];
        assert!(validate_vocabulary(&entries).is_err());
    }
}
