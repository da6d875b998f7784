use serde::Serialize;
use tracing::debug;

use crate::REVISE_DIRECTIVE;

/// A critique response broken into its directive and bullet-point fixes.
///
/// Parsing never fails: a response that ignores the requested format still
/// becomes the next user turn, it just reports `conforms == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixesList {
    /// Response opened with [`REVISE_DIRECTIVE`]
    pub conforms: bool,
    /// Bullet lines with their markers stripped
    pub bullets: Vec<String>,
}

impl FixesList {
    pub fn parse(critique: &str) -> Self {
        let trimmed = critique.trim_start().trim_start_matches(['"', '\'']);
        let conforms = trimmed.starts_with(REVISE_DIRECTIVE);

        let bullets: Vec<String> = critique
            .lines()
            .filter_map(strip_bullet)
            .map(str::to_string)
            .collect();

        debug!(conforms, bullets = bullets.len(), "Parsed fixes list");

        Self { conforms, bullets }
    }

    pub fn len(&self) -> usize {
        self.bullets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty()
    }
}

/// Return the text of a bullet line (`-`, `*`, `•`, or `1.` / `1)`)
fn strip_bullet(line: &str) -> Option<&str> {
    let line = line.trim();

    for marker in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return non_empty(rest);
        }
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return non_empty(rest);
        }
    }

    None
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}
