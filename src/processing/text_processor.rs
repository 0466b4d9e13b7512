//! Text cleaning and sentence segmentation

use regex::Regex;

pub struct TextProcessor {
    disallowed_chars: Regex,
    whitespace: Regex,
    delimiters: Vec<char>,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new(".")
    }
}

impl TextProcessor {
    pub fn new(delimiters: &str) -> Self {
        // Keep word characters, whitespace and ordinary punctuation only
        let disallowed_chars = Regex::new(r#"[^\w\s.,;:!?()'"-]"#)
            .expect("Invalid character class regex");

        let whitespace = Regex::new(r"\s+").expect("Invalid whitespace regex");

        Self {
            disallowed_chars,
            whitespace,
            delimiters: delimiters.chars().collect(),
        }
    }

    /// Strip symbols from extracted resume text and flatten it to one line
    pub fn clean_resume_text(&self, text: &str) -> String {
        let cleaned = self.disallowed_chars.replace_all(text, " ");
        self.normalize_whitespace(&cleaned)
    }

    /// Collapse every whitespace run to a single space
    pub fn normalize_whitespace(&self, text: &str) -> String {
        self.whitespace.replace_all(text, " ").trim().to_string()
    }

    /// Split on the configured delimiters, dropping empty pieces
    pub fn split_segments(&self, text: &str) -> Vec<String> {
        text.split(|c: char| self.delimiters.contains(&c))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
