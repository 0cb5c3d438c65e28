use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    PtPt,
    En,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::PtPt, Locale::En];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::PtPt => "pt-PT",
            Locale::En => "en",
        }
    }

    /// Language tag handed to the speech recognizer.
    pub fn recognition_code(&self) -> &'static str {
        match self {
            Locale::PtPt => "pt-PT",
            Locale::En => "en-US",
        }
    }

    /// Short label for the header toggle.
    pub fn short_label(&self) -> &'static str {
        match self {
            Locale::PtPt => "PT",
            Locale::En => "EN",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "pt-PT" | "pt" => Some(Locale::PtPt),
            "en" | "en-US" => Some(Locale::En),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognition_codes_differ_from_ui_codes_for_english() {
        assert_eq!(Locale::PtPt.recognition_code(), "pt-PT");
        assert_eq!(Locale::En.recognition_code(), "en-US");
        assert_eq!(Locale::En.code(), "en");
    }

    #[test]
    fn from_code_accepts_both_tag_forms() {
        assert_eq!(Locale::from_code("pt-PT"), Some(Locale::PtPt));
        assert_eq!(Locale::from_code("en-US"), Some(Locale::En));
        assert_eq!(Locale::from_code("fr"), None);
    }
}
