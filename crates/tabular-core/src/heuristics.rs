use serde::{Deserialize, Serialize};

// ── EnglishNameClassifier ─────────────────────────────────────────────────────

/// Heuristic classifier for English-looking name strings.
///
/// A name is classified English when the number of characters whose code
/// point exceeds 127 (non-ASCII) is at most the configured threshold. The
/// default threshold of 3 tolerates a few emoji or trademark symbols in an
/// otherwise-English name while rejecting names written in other scripts.
///
/// This is a heuristic, not a guarantee; misclassification at the boundary
/// is accepted behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnglishNameClassifier {
    max_non_ascii: usize,
}

impl Default for EnglishNameClassifier {
    fn default() -> Self {
        Self { max_non_ascii: 3 }
    }
}

impl EnglishNameClassifier {
    /// Classifier with the default threshold of 3 non-ASCII characters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifier with a custom non-ASCII tolerance.
    pub fn with_threshold(max_non_ascii: usize) -> Self {
        Self { max_non_ascii }
    }

    /// Count of characters outside the ASCII range.
    pub fn non_ascii_count(name: &str) -> usize {
        name.chars().filter(|c| (*c as u32) > 127).count()
    }

    /// `true` when `name` passes the heuristic.
    pub fn is_english(&self, name: &str) -> bool {
        Self::non_ascii_count(name) <= self.max_non_ascii
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ascii_is_english() {
        let classifier = EnglishNameClassifier::new();
        assert!(classifier.is_english("Instagram"));
        assert!(classifier.is_english("Facebook"));
    }

    #[test]
    fn test_few_symbols_tolerated() {
        let classifier = EnglishNameClassifier::new();
        assert!(classifier.is_english("Instachat 😜"));
        assert!(classifier.is_english("Docs To Go™ Free Office Suite"));
    }

    #[test]
    fn test_other_script_rejected() {
        let classifier = EnglishNameClassifier::new();
        assert!(!classifier.is_english("爱奇艺PPS -《欢乐颂2》电视剧热播"));
    }

    #[test]
    fn test_boundary_at_threshold() {
        let classifier = EnglishNameClassifier::new();
        // Exactly three non-ASCII characters passes; four does not.
        assert!(classifier.is_english("app 😜😜😜"));
        assert!(!classifier.is_english("app 😜😜😜😜"));
    }

    #[test]
    fn test_custom_threshold() {
        let strict = EnglishNameClassifier::with_threshold(0);
        assert!(!strict.is_english("Instachat 😜"));
        assert!(strict.is_english("Instachat"));
    }

    #[test]
    fn test_non_ascii_count() {
        assert_eq!(EnglishNameClassifier::non_ascii_count("abc"), 0);
        assert_eq!(EnglishNameClassifier::non_ascii_count("a😜b😜"), 2);
    }

    #[test]
    fn test_empty_name_is_english() {
        let classifier = EnglishNameClassifier::new();
        assert!(classifier.is_english(""));
    }
}
