//! Lexical membership gate.

use crate::category::{Category, Classification};
use crate::PromptGate;

/// Admits a query when any domain keyword occurs in it, ignoring case.
#[derive(Debug, Clone)]
pub struct KeywordGate {
    keywords: Vec<String>,
}

impl KeywordGate {
    /// Build a gate from a vocabulary. Keywords are trimmed and lowercased;
    /// blank entries are dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        keywords.sort();
        keywords.dedup();

        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// First keyword found in the query, if any.
    pub fn matched_keyword(&self, query: &str) -> Option<&str> {
        let lowered = query.to_lowercase();
        self.keywords
            .iter()
            .find(|keyword| lowered.contains(keyword.as_str()))
            .map(String::as_str)
    }

    /// Synchronous classification; never fails.
    pub fn classify_sync(&self, query: &str) -> Classification {
        match self.matched_keyword(query) {
            Some(keyword) => {
                tracing::trace!(keyword, "Keyword gate matched");
                Classification::Category(Category::InDomain)
            }
            None => Classification::Category(Category::OffTopic),
        }
    }
}

#[async_trait::async_trait]
impl PromptGate for KeywordGate {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn classify(&self, query: &str) -> Classification {
        self.classify_sync(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_normalized() {
        let gate = KeywordGate::new(["  Excavator ", "", "EXCAVATOR", "Spec Sheet"]);
        assert_eq!(gate.keywords(), &["excavator".to_string(), "spec sheet".to_string()]);
    }

    #[test]
    fn test_case_insensitive_substring() {
        let gate = KeywordGate::new(["bd850"]);
        assert!(gate.classify_sync("Is the BD850 available?").is_admitted());
        assert!(gate.classify_sync("models like xbd8505").is_admitted());
        assert!(!gate.classify_sync("bd 850").is_admitted());
    }

    #[test]
    fn test_empty_vocabulary_rejects_everything() {
        let gate = KeywordGate::new(Vec::<String>::new());
        assert_eq!(
            gate.classify_sync("excavator"),
            Classification::Category(Category::OffTopic)
        );
    }

    #[test]
    fn test_incidental_overlap_is_admitted() {
        // Lexical matching cannot see intent.
        let gate = KeywordGate::new(["engine"]);
        assert!(gate.classify_sync("your engine is garbage and so are you").is_admitted());
    }
}
