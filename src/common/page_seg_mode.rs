use serde::{Deserialize, Serialize};

/// Tesseract page segmentation modes that make sense for a cropped plate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSegMode {
    SingleBlock,
    SingleLine,
    #[default] SingleWord,
}

// Hardcoded mode names. Storing the "proper" spelling and the lowercase version.
const SINGLE_BLOCK: [&str; 2] = ["SingleBlock", "single_block"];
const SINGLE_LINE: [&str; 2] = ["SingleLine", "single_line"];
const SINGLE_WORD: [&str; 2] = ["SingleWord", "single_word"];

impl PageSegMode {
    /// Accepts either a mode name or the numeric `--psm` value.
    pub fn from_str(mode: &str) -> Option<Self> {
        match mode.to_lowercase().as_str() {
            "single_block" | "block" | "6" => Some(PageSegMode::SingleBlock),
            "single_line" | "line" | "7" => Some(PageSegMode::SingleLine),
            "single_word" | "word" | "8" => Some(PageSegMode::SingleWord),
            _ => None,
        }
    }

    /// Value passed to `tesseract --psm`.
    pub fn psm(&self) -> u8 {
        match self {
            PageSegMode::SingleBlock => 6,
            PageSegMode::SingleLine => 7,
            PageSegMode::SingleWord => 8,
        }
    }

    pub fn str(&self) -> &'static str {
        match self {
            PageSegMode::SingleBlock => SINGLE_BLOCK[0],
            PageSegMode::SingleLine => SINGLE_LINE[0],
            PageSegMode::SingleWord => SINGLE_WORD[0],
        }
    }

    pub fn str_lowercase(&self) -> &'static str {
        match self {
            PageSegMode::SingleBlock => SINGLE_BLOCK[1],
            PageSegMode::SingleLine => SINGLE_LINE[1],
            PageSegMode::SingleWord => SINGLE_WORD[1],
        }
    }

    pub fn all_page_seg_modes() -> Vec<String> {
        vec![
            PageSegMode::SingleBlock.str_lowercase().to_string(),
            PageSegMode::SingleLine.str_lowercase().to_string(),
            PageSegMode::SingleWord.str_lowercase().to_string(),
        ]
    }
}

impl std::fmt::Display for PageSegMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (psm {})", self.str(), self.psm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_numbers() {
        assert_eq!(PageSegMode::from_str("SINGLE_LINE"), Some(PageSegMode::SingleLine));
        assert_eq!(PageSegMode::from_str("8"), Some(PageSegMode::SingleWord));
        assert_eq!(PageSegMode::from_str("block"), Some(PageSegMode::SingleBlock));
        assert_eq!(PageSegMode::from_str("13"), None);
    }

    #[test]
    fn default_matches_single_word_psm() {
        assert_eq!(PageSegMode::default().psm(), 8);
        for name in PageSegMode::all_page_seg_modes() {
            assert!(PageSegMode::from_str(&name).is_some());
        }
    }
}
