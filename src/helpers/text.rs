//! Text helpers

/// Average reading speed used for estimates
const WORDS_PER_MINUTE: usize = 200;

/// Count whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Label used when there is no body at all
pub const DEFAULT_READING_TIME: &str = "5 min read";

/// Reading-time label for a body of plain text, never below one minute
pub fn reading_time(text: &str) -> String {
    let minutes = word_count(text).max(1).div_ceil(WORDS_PER_MINUTE);
    format!("{} min read", minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(""), "1 min read");
        assert_eq!(reading_time("just a few words"), "1 min read");
        let long = "word ".repeat(401);
        assert_eq!(reading_time(&long), "3 min read");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  one\ttwo\nthree  "), 3);
    }
}
