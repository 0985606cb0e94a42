//! Hallucination filtering for Whisper output.
//!
//! On silence or near-silence the model tends to emit YouTube-outro
//! phrases, bracketed sound tags, and bare filler words. Those are
//! rejected before text ever reaches the clipboard.

/// Phrases the model is known to hallucinate on silent input. Seeds every
/// filter; the list grows over time as new stock phrases are reported.
const DEFAULT_DENY_LIST: &[&str] = &[
    "thank you for watching",
    "thanks for watching",
    "subscribe",
    "like and subscribe",
    "please subscribe",
    "thank you",
    "bye",
    "goodbye",
    "[music]",
    "[applause]",
    "(music)",
    "(applause)",
    "♪",
    "...",
    "you",
];

/// Filters transcription output that the model produced from silence
/// rather than speech.
///
/// Carries its deny list as data so new stock phrases can be added at
/// construction or at runtime without touching the defaults.
#[derive(Debug, Clone)]
pub struct HallucinationFilter {
    deny_list: Vec<String>,
}

impl Default for HallucinationFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl HallucinationFilter {
    /// A filter seeded with the default deny list.
    pub fn new() -> Self {
        Self {
            deny_list: DEFAULT_DENY_LIST.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// A filter seeded with the defaults plus additional phrases.
    pub fn with_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filter = Self::new();
        for phrase in phrases {
            filter.add_phrase(phrase);
        }
        filter
    }

    /// Add a phrase to the deny list, matched case-insensitively against
    /// the whole trimmed output.
    pub fn add_phrase(&mut self, phrase: impl Into<String>) {
        let phrase = phrase.into().trim().to_lowercase();
        if !phrase.is_empty() && !self.deny_list.contains(&phrase) {
            self.deny_list.push(phrase);
        }
    }

    /// Whether the text as a whole is a known hallucination.
    ///
    /// Rejects: output shorter than three characters after trimming, exact
    /// deny-list matches (case-insensitive), and output consisting entirely
    /// of punctuation, whitespace, and music notes.
    pub fn is_hallucination(&self, text: &str) -> bool {
        let trimmed = text.trim();

        if trimmed.chars().count() < 3 {
            return true;
        }

        let lowered = trimmed.to_lowercase();
        if self.deny_list.iter().any(|p| *p == lowered) {
            return true;
        }

        trimmed.chars().all(is_filler_glyph)
    }

    /// Clean raw model output: trims, and returns an empty string for
    /// anything the filter rejects. An empty result means "no speech", not
    /// an error.
    pub fn clean(&self, text: &str) -> String {
        let trimmed = text.trim();
        if self.is_hallucination(trimmed) {
            tracing::debug!(rejected = %trimmed, "Filtered hallucinated transcription");
            String::new()
        } else {
            trimmed.to_string()
        }
    }

    /// Clean each segment individually, then join the survivors with
    /// single spaces in emission order. Segment boundaries carry no
    /// whitespace guarantees from the model.
    pub fn join_segments<S: AsRef<str>>(&self, segments: &[S]) -> String {
        segments
            .iter()
            .map(|s| self.clean(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Glyphs that cannot carry speech on their own: whitespace, music notes,
/// ASCII punctuation, and the Unicode general (U+2000..U+206F, which holds
/// the horizontal ellipsis), supplemental (U+2E00..U+2E7F), and CJK
/// (U+3000..U+303F) punctuation blocks.
fn is_filler_glyph(c: char) -> bool {
    c.is_ascii_punctuation()
        || c.is_whitespace()
        || c == '♪'
        || matches!(c, '\u{2000}'..='\u{206F}' | '\u{2E00}'..='\u{2E7F}' | '\u{3000}'..='\u{303F}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_speech_passes() {
        let filter = HallucinationFilter::new();
        assert!(!filter.is_hallucination("Send the report by Friday."));
        assert_eq!(
            filter.clean("  Send the report by Friday.  "),
            "Send the report by Friday."
        );
    }

    #[test]
    fn test_deny_list_matches_case_insensitively() {
        let filter = HallucinationFilter::new();
        assert!(filter.is_hallucination("Thank you for watching"));
        assert!(filter.is_hallucination("THANK YOU FOR WATCHING"));
        assert!(filter.is_hallucination("thank you"));
        assert!(filter.is_hallucination("[Music]"));
        assert!(filter.is_hallucination("(applause)"));
        assert!(filter.is_hallucination("Goodbye"));
    }

    #[test]
    fn test_deny_phrase_inside_longer_text_passes() {
        let filter = HallucinationFilter::new();
        // The phrase must be the whole output, not merely contained.
        assert!(!filter.is_hallucination("I want to thank you for the help"));
    }

    #[test]
    fn test_short_output_rejected() {
        let filter = HallucinationFilter::new();
        assert!(filter.is_hallucination(""));
        assert!(filter.is_hallucination("a"));
        assert!(filter.is_hallucination("hi"));
        assert!(filter.is_hallucination("  x  "));
        assert!(!filter.is_hallucination("hey"));
    }

    #[test]
    fn test_pure_punctuation_rejected() {
        let filter = HallucinationFilter::new();
        assert!(filter.is_hallucination("..."));
        assert!(filter.is_hallucination(". . . !"));
        assert!(filter.is_hallucination("♪ ♪ ♪"));
    }

    #[test]
    fn test_unicode_punctuation_rejected() {
        let filter = HallucinationFilter::new();
        // Whisper emits horizontal ellipses on silence, not ASCII dots.
        assert!(filter.is_hallucination("………"));
        assert!(filter.is_hallucination("… … …"));
        assert!(filter.is_hallucination("—–—"));
        assert!(filter.is_hallucination("。。。"));
        // Unicode punctuation mixed with real words still passes.
        assert!(!filter.is_hallucination("wait… what?"));
    }

    #[test]
    fn test_added_phrases_extend_the_deny_list() {
        let mut filter = HallucinationFilter::new();
        assert!(!filter.is_hallucination("lorem ipsum"));

        filter.add_phrase("Lorem Ipsum");
        assert!(filter.is_hallucination("lorem ipsum"));
        assert!(filter.is_hallucination("  LOREM IPSUM  "));
        // Defaults survive extension.
        assert!(filter.is_hallucination("thank you for watching"));
    }

    #[test]
    fn test_with_phrases_seeds_defaults_plus_extras() {
        let filter = HallucinationFilter::with_phrases(["copyright blah"]);
        assert!(filter.is_hallucination("Copyright Blah"));
        assert!(filter.is_hallucination("[music]"));
        assert!(!filter.is_hallucination("a normal sentence"));
    }

    #[test]
    fn test_clean_returns_empty_for_rejected() {
        let filter = HallucinationFilter::new();
        assert_eq!(filter.clean("Thanks for watching"), "");
        assert_eq!(filter.clean("...."), "");
    }

    #[test]
    fn test_join_segments_single_spaces() {
        let filter = HallucinationFilter::new();
        let segments = vec![" Hello", "world, ", "", " how are you?"];
        assert_eq!(filter.join_segments(&segments), "Hello world, how are you?");
    }

    #[test]
    fn test_join_segments_drops_hallucinated_segments() {
        let filter = HallucinationFilter::new();
        let segments = vec!["Thank you", "hello world", "♪", ""];
        assert_eq!(filter.join_segments(&segments), "hello world");
    }

    #[test]
    fn test_join_segments_all_junk_yields_empty() {
        let filter = HallucinationFilter::new();
        let segments: Vec<&str> = vec!["..", " "];
        assert_eq!(filter.join_segments(&segments), "");
    }

    #[test]
    fn test_join_is_idempotent_on_clean_input() {
        let filter = HallucinationFilter::new();
        let once = filter.join_segments(&["Send the", "report by Friday."]);
        let twice = filter.join_segments(&[once.as_str()]);
        assert_eq!(once, twice);
    }
}
