use serde::Serialize;

/// Raw OCR output for one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlateCandidate {
    pub text: String,
    /// Mean engine confidence in `[0, 100]`, when the engine reports one.
    pub confidence: Option<f32>,
}

impl PlateCandidate {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Canonical plate key: uppercase alphanumerics, no separators.
///
/// The only way to build one is [`PlateIdentifier::normalize`], so every value
/// in circulation is already canonical and equality is plain string equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PlateIdentifier(String);

impl PlateIdentifier {
    /// Drops everything that is not alphanumeric, then uppercases.
    ///
    /// Uppercasing can expand a character (`ß` becomes `SS`), so the result is
    /// filtered once more to keep the output alphanumeric-only and idempotent.
    pub fn normalize(raw: &str) -> Self {
        let canonical = raw
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_uppercase)
            .filter(|c| c.is_alphanumeric())
            .collect();
        Self(canonical)
    }

    pub fn from_candidate(candidate: &PlateCandidate) -> Self {
        Self::normalize(&candidate.text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for PlateIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_separators_and_uppercases() {
        assert_eq!(PlateIdentifier::normalize("abc-123").as_str(), "ABC123");
        assert_eq!(PlateIdentifier::normalize(" XyZ 789\n").as_str(), "XYZ789");
        assert_eq!(PlateIdentifier::normalize("l.m.n_456").as_str(), "LMN456");
    }

    #[test]
    fn punctuation_only_is_empty() {
        assert!(PlateIdentifier::normalize("").is_empty());
        assert!(PlateIdentifier::normalize("-- ..\t|").is_empty());
        assert!(PlateIdentifier::from_candidate(&PlateCandidate::empty()).is_empty());
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["ABC-123", "qqq", "  ", "straße 9", "ǆ-01", "Ⅻ 12", "ab\u{301}c"] {
            let once = PlateIdentifier::normalize(raw);
            let twice = PlateIdentifier::normalize(once.as_str());
            assert_eq!(once, twice, "input {raw:?}");
        }
    }

    #[test]
    fn expanding_uppercase_stays_alphanumeric() {
        assert_eq!(PlateIdentifier::normalize("straße").as_str(), "STRASSE");
    }

    #[test]
    fn candidate_emptiness_ignores_whitespace() {
        assert!(PlateCandidate::new(" \n").is_empty());
        assert!(!PlateCandidate::new("A").with_confidence(90.0).is_empty());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = PlateIdentifier::normalize("abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ABC123\"");
    }
}
