//! Transcript of the current listening span

use serde::{Deserialize, Serialize};

/// Recognized text split into committed (final) segments and the
/// current interim hypothesis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    committed: Vec<String>,
    interim: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a final segment. The interim hypothesis it replaces is dropped.
    pub fn push_final(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.committed.push(text.to_string());
        }
        self.interim.clear();
    }

    /// Replace the interim hypothesis
    pub fn set_interim(&mut self, text: &str) {
        self.interim = text.trim().to_string();
    }

    /// Promote the interim hypothesis to a committed segment.
    /// Returns the promoted text, if any.
    pub fn commit_interim(&mut self) -> Option<String> {
        if self.interim.is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.interim);
        self.committed.push(text.clone());
        Some(text)
    }

    /// Committed text joined by single spaces
    pub fn committed_text(&self) -> String {
        self.committed.join(" ")
    }

    /// Committed text followed by the interim hypothesis
    pub fn text(&self) -> String {
        if self.interim.is_empty() {
            return self.committed_text();
        }
        if self.committed.is_empty() {
            return self.interim.clone();
        }
        format!("{} {}", self.committed_text(), self.interim)
    }

    pub fn interim(&self) -> &str {
        &self.interim
    }

    pub fn has_interim(&self) -> bool {
        !self.interim.is_empty()
    }

    /// No committed text and no interim hypothesis
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty() && self.interim.is_empty()
    }

    pub fn clear(&mut self) {
        self.committed.clear();
        self.interim.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty() {
        assert!(Transcript::new().is_empty());
        assert_eq!(Transcript::new().text(), "");
    }

    #[test]
    fn final_segments_accumulate() {
        let mut t = Transcript::new();
        t.push_final("मुझे राशन");
        t.push_final(" कार्ड बनवाना है ");
        assert_eq!(t.committed_text(), "मुझे राशन कार्ड बनवाना है");
    }

    #[test]
    fn final_replaces_interim() {
        let mut t = Transcript::new();
        t.set_interim("hel");
        assert_eq!(t.text(), "hel");
        t.push_final("hello");
        assert!(!t.has_interim());
        assert_eq!(t.text(), "hello");
    }

    #[test]
    fn interim_shown_after_committed() {
        let mut t = Transcript::new();
        t.push_final("hello");
        t.set_interim("wor");
        assert_eq!(t.text(), "hello wor");
        assert_eq!(t.committed_text(), "hello");
    }

    #[test]
    fn commit_interim_promotes() {
        let mut t = Transcript::new();
        t.set_interim("pending words");
        assert_eq!(t.commit_interim().as_deref(), Some("pending words"));
        assert_eq!(t.committed_text(), "pending words");
        assert_eq!(t.commit_interim(), None);
    }

    #[test]
    fn blank_segments_are_ignored() {
        let mut t = Transcript::new();
        t.push_final("   ");
        t.set_interim("  ");
        assert!(t.is_empty());
    }

    #[test]
    fn clear_resets() {
        let mut t = Transcript::new();
        t.push_final("a");
        t.set_interim("b");
        t.clear();
        assert!(t.is_empty());
    }
}
