//! Emergency screening for user input.
//!
//! A pure text classifier that gates dispatch: input matching an emergency
//! phrase gets a fixed safety message instead of a model call. Matching is
//! case-insensitive substring, not tokenized, so "I don't have chest pain"
//! still triggers. Over-triggering is the acceptable failure mode here.

/// Phrases that indicate a possible medical emergency.
pub const EMERGENCY_PHRASES: &[&str] = &[
    "chest pain",
    "can't breathe",
    "suicidal",
    "overdose",
    "severe bleeding",
];

/// Fixed safety message shown when an emergency phrase is detected.
///
/// Ephemeral UI feedback, never persisted to the transcript.
pub const EMERGENCY_MESSAGE: &str = "This sounds like a medical emergency. \
    Please call your local emergency number immediately (e.g. 911 or 112) \
    or go to the nearest hospital.";

/// Screens user input for emergency phrases.
pub struct EmergencyScreen {
    phrases: Vec<String>,
}

impl EmergencyScreen {
    /// Create a screen over a custom phrase list.
    ///
    /// Phrases are lowercased once up front so checks stay a plain
    /// substring scan.
    pub fn new(phrases: &[&str]) -> Self {
        Self {
            phrases: phrases.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// Check whether the text contains any emergency phrase.
    pub fn is_emergency(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.phrases.iter().any(|p| lowered.contains(p.as_str()))
    }
}

impl Default for EmergencyScreen {
    fn default() -> Self {
        Self::new(EMERGENCY_PHRASES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_each_phrase() {
        let screen = EmergencyScreen::default();
        for phrase in EMERGENCY_PHRASES {
            assert!(screen.is_emergency(phrase), "missed phrase: {}", phrase);
        }
    }

    #[test]
    fn test_detects_phrase_inside_sentence() {
        let screen = EmergencyScreen::default();
        assert!(screen.is_emergency("I have severe bleeding from a cut"));
        assert!(screen.is_emergency("my friend took an overdose of pills"));
    }

    #[test]
    fn test_case_insensitive() {
        let screen = EmergencyScreen::default();
        assert!(screen.is_emergency("CHEST PAIN since this morning"));
        assert!(screen.is_emergency("I Can't Breathe properly"));
    }

    #[test]
    fn test_negated_phrase_still_matches() {
        // Substring match by design: false positives beat false negatives.
        let screen = EmergencyScreen::default();
        assert!(screen.is_emergency("I don't have chest pain"));
    }

    #[test]
    fn test_non_emergency_text() {
        let screen = EmergencyScreen::default();
        assert!(!screen.is_emergency("just a headache"));
        assert!(!screen.is_emergency("what causes a fever?"));
        assert!(!screen.is_emergency(""));
    }

    #[test]
    fn test_custom_phrase_list() {
        let screen = EmergencyScreen::new(&["stroke"]);
        assert!(screen.is_emergency("signs of a Stroke"));
        assert!(!screen.is_emergency("chest pain"));
    }
}
