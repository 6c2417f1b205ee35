//! High score leaderboard
//!
//! One top-5 table per terminal size. Storage lives in [`crate::persistence`].

use serde::{Deserialize, Serialize};

use crate::sim::KeyPress;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// Maximum initials length
pub const MAX_INITIALS: usize = 3;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u32,
    /// Uppercased, 1-3 characters
    pub initials: String,
}

/// High score leaderboard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

/// Normalize player initials: uppercase, at most 3 chars. None when empty.
pub fn normalize_initials(raw: &str) -> Option<String> {
    let initials: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(MAX_INITIALS)
        .flat_map(char::to_uppercase)
        .collect();
    (!initials.is_empty()).then_some(initials)
}

/// Initials typed on the high-score prompt.
///
/// Letters only, uppercased. Entry finishes by itself at the third letter,
/// or on ENTER once at least one letter is in. ESC skips entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialsEntry {
    initials: String,
    done: bool,
}

impl InitialsEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one key press. Returns true once entry is finished.
    pub fn feed(&mut self, press: KeyPress) -> bool {
        if self.done {
            return true;
        }
        match press {
            KeyPress::Char(c) if c.is_ascii_alphabetic() => {
                self.initials.push(c.to_ascii_uppercase());
                self.done = self.initials.len() >= MAX_INITIALS;
            }
            KeyPress::Backspace => {
                self.initials.pop();
            }
            KeyPress::Enter => self.done = !self.initials.is_empty(),
            KeyPress::Escape => {
                self.initials.clear();
                self.done = true;
            }
            _ => {}
        }
        self.done
    }

    pub fn as_str(&self) -> &str {
        &self.initials
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(mut entries: Vec<HighScoreEntry>) -> Self {
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    /// Slot a score would take (0-indexed), if it makes the table.
    /// A score must strictly beat an entry to go above it.
    pub fn potential_slot(&self, score: u32) -> Option<usize> {
        match self.entries.iter().position(|e| score > e.score) {
            Some(i) => Some(i),
            None if self.entries.len() < MAX_HIGH_SCORES => Some(self.entries.len()),
            None => None,
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        self.potential_slot(score).is_some()
    }

    /// Add a new score (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(&mut self, score: u32, initials: &str) -> Option<usize> {
        let slot = self.potential_slot(score)?;
        let initials = normalize_initials(initials).unwrap_or_else(|| "???".to_string());
        self.entries.insert(slot, HighScoreEntry { score, initials });
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(slot + 1)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(scores: &[u32]) -> HighScores {
        HighScores::from_entries(
            scores
                .iter()
                .map(|&score| HighScoreEntry {
                    score,
                    initials: "AAA".to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_zero_fills_open_slots_only() {
        assert!(HighScores::new().qualifies(0));
        assert_eq!(table(&[50, 10]).potential_slot(0), Some(2));
        assert!(!table(&[500, 400, 300, 200, 100]).qualifies(0));
    }

    fn type_keys(entry: &mut InitialsEntry, keys: &str) -> bool {
        keys.chars().map(KeyPress::Char).fold(false, |_, k| entry.feed(k))
    }

    #[test]
    fn test_initials_accept_letters_only() {
        let mut entry = InitialsEntry::new();
        assert!(!type_keys(&mut entry, "a1 -b"));
        assert_eq!(entry.as_str(), "AB");
        assert!(!entry.is_done());
    }

    #[test]
    fn test_initials_finish_at_third_letter() {
        let mut entry = InitialsEntry::new();
        assert!(type_keys(&mut entry, "jdo"));
        assert_eq!(entry.as_str(), "JDO");
        // Further keys are ignored
        assert!(entry.feed(KeyPress::Char('e')));
        assert_eq!(entry.as_str(), "JDO");
    }

    #[test]
    fn test_initials_enter_needs_a_letter() {
        let mut entry = InitialsEntry::new();
        assert!(!entry.feed(KeyPress::Enter));
        entry.feed(KeyPress::Char('z'));
        entry.feed(KeyPress::Char('q'));
        entry.feed(KeyPress::Backspace);
        assert!(entry.feed(KeyPress::Enter));
        assert_eq!(entry.as_str(), "Z");
    }

    #[test]
    fn test_initials_escape_skips() {
        let mut entry = InitialsEntry::new();
        entry.feed(KeyPress::Char('x'));
        assert!(entry.feed(KeyPress::Escape));
        assert_eq!(entry.as_str(), "");
    }

    #[test]
    fn test_ties_keep_earlier_entry_ahead() {
        let mut scores = table(&[500, 300, 100]);
        assert_eq!(scores.add_score(300, "bob"), Some(3));
        assert_eq!(scores.entries[1].initials, "AAA");
        assert_eq!(scores.entries[2].initials, "BOB");
    }

    #[test]
    fn test_full_table_requires_beating_last() {
        let mut scores = table(&[500, 400, 300, 200, 100]);
        assert!(!scores.qualifies(100));
        assert_eq!(scores.add_score(100, "x"), None);
        assert_eq!(scores.add_score(450, "zed"), Some(2));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(200));
        assert_eq!(scores.top_score(), Some(500));
    }

    #[test]
    fn test_normalize_initials() {
        assert_eq!(normalize_initials("ab"), Some("AB".to_string()));
        assert_eq!(normalize_initials(" jdoe "), Some("JDO".to_string()));
        assert_eq!(normalize_initials("   "), None);
    }
}
