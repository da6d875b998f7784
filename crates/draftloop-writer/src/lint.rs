//! Post-hoc style check for drafts.
//!
//! The writer only asks the model to respect length and emoji limits; nothing
//! in the loop enforces them. `DraftLint` measures a draft against those limits
//! so a run can report drift. It never changes what the loop does.

use serde::Serialize;

pub const MIN_WORDS: usize = 160;
pub const MAX_WORDS: usize = 220;
pub const MAX_EMOJIS: usize = 2;
/// A hook is a short opening line the reader can take in at a glance
pub const MAX_HOOK_WORDS: usize = 20;

const PREAMBLE_OPENERS: [&str; 4] = ["here's", "here is", "sure", "certainly"];

/// Measurements of a single draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftLint {
    pub words: usize,
    pub emojis: usize,
    pub has_hook: bool,
    pub has_call_to_action: bool,
    pub has_preamble: bool,
}

impl DraftLint {
    pub fn check(text: &str) -> Self {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let first_line = lines.next().unwrap_or_default();
        let has_body = lines.next().is_some();
        let first_line_words = first_line.split_whitespace().count();
        let first_line = first_line.to_lowercase();

        Self {
            words: text.split_whitespace().count(),
            emojis: text.chars().filter(|c| is_emoji(*c)).count(),
            has_hook: has_body && (1..=MAX_HOOK_WORDS).contains(&first_line_words),
            has_call_to_action: text.to_lowercase().contains("follow"),
            has_preamble: PREAMBLE_OPENERS.iter().any(|p| first_line.starts_with(p)),
        }
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.words < MIN_WORDS {
            warnings.push(format!("{} words, below {}", self.words, MIN_WORDS));
        } else if self.words > MAX_WORDS {
            warnings.push(format!("{} words, above {}", self.words, MAX_WORDS));
        }
        if self.emojis > MAX_EMOJIS {
            warnings.push(format!("{} emojis, limit is {}", self.emojis, MAX_EMOJIS));
        }
        if !self.has_hook {
            warnings.push(format!(
                "no hook: first line should be {} words or fewer and stand apart from the body",
                MAX_HOOK_WORDS
            ));
        }
        if !self.has_call_to_action {
            warnings.push("no call to action to follow for more".to_string());
        }
        if self.has_preamble {
            warnings.push("opens with a preamble instead of the post".to_string());
        }
        warnings
    }

    pub fn is_clean(&self) -> bool {
        self.warnings().is_empty()
    }
}

/// Pictographic code points. ZWJ sequences count once per pictograph.
fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F300..=0x1F5FF   // symbols & pictographs
            | 0x1F600..=0x1F64F // emoticons
            | 0x1F680..=0x1F6FF // transport & map
            | 0x1F900..=0x1F9FF // supplemental symbols
            | 0x1FA70..=0x1FAFF // symbols & pictographs extended-A
            | 0x2600..=0x26FF   // misc symbols
            | 0x2700..=0x27BF // dingbats
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_clean_draft() {
        let text = format!("Git saved my weekend 🚀\n\n{}\n\nFollow me for more.", words(170));
        let lint = DraftLint::check(&text);
        assert_eq!(lint.emojis, 1);
        assert!(lint.has_hook);
        assert!(lint.has_call_to_action);
        assert!(lint.is_clean(), "{:?}", lint.warnings());
    }

    #[test]
    fn test_length_bounds() {
        let short = DraftLint::check(&format!("Hook\n{} follow", words(99)));
        assert_eq!(short.warnings(), vec!["101 words, below 160".to_string()]);

        let long = DraftLint::check(&format!("Hook\n{} follow", words(229)));
        assert_eq!(long.warnings(), vec!["231 words, above 220".to_string()]);
    }

    #[test]
    fn test_single_paragraph_has_no_hook() {
        let lint = DraftLint::check(&format!("{} follow", words(180)));
        assert!(!lint.has_hook);
        assert!(lint.warnings().iter().any(|w| w.contains("hook")));
    }

    #[test]
    fn test_long_opening_line_is_not_a_hook() {
        let text = format!("{}\n\n{} follow", words(30), words(150));
        assert!(!DraftLint::check(&text).has_hook);

        let text = format!("\n\nYour first commit\n{} follow", words(170));
        assert!(DraftLint::check(&text).has_hook);
    }

    #[test]
    fn test_too_many_emojis() {
        let text = format!("{} 🚀 💡 ✅ follow", words(170));
        let lint = DraftLint::check(&text);
        assert_eq!(lint.emojis, 3);
        assert!(lint.warnings().iter().any(|w| w.contains("emojis")));
    }

    #[test]
    fn test_preamble_detected() {
        let text = format!("Here's your post:\n\n{} follow", words(170));
        let lint = DraftLint::check(&text);
        assert!(lint.has_preamble);
        assert!(!lint.is_clean());
    }

    #[test]
    fn test_punctuation_is_not_emoji() {
        let lint = DraftLint::check("Git → commits, branches & merges — “simple”.");
        assert_eq!(lint.emojis, 0);
    }
}
