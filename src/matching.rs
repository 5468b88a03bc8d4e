// 🔎 Text Matching
// Whole-word and substring containment, both case-insensitive.
//
// A word boundary is the edge of the string or any char that is not
// alphanumeric (same classes as `char::is_alphanumeric`), so "Man" is found in
// "Man, OH" and "Man_OH" but not in "Manhattan" or "Oman".

use crate::error::{LookupError, LookupResult};
use regex::{Regex, RegexBuilder};

const NON_ALNUM: &str = r"[^\p{Alphabetic}\p{N}]";

/// Compiled whole-word matcher for one search term
#[derive(Debug, Clone)]
pub struct WordMatcher {
    term: String,
    regex: Regex,
}

impl WordMatcher {
    /// Compile a matcher. The term is taken literally (regex metacharacters
    /// in a city like "St. Louis" have no special meaning).
    pub fn new(term: &str) -> LookupResult<Self> {
        let pattern = format!(
            "(?:^|{NON_ALNUM})(?:{})(?:$|{NON_ALNUM})",
            regex::escape(term)
        );

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| LookupError::InvalidPattern {
                term: term.to_string(),
                message: e.to_string(),
            })?;

        Ok(WordMatcher {
            term: term.to_string(),
            regex,
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Does `text` contain the term as a separate word?
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// One-shot whole-word containment test
pub fn contains_word(text: &str, word: &str) -> LookupResult<bool> {
    Ok(WordMatcher::new(word)?.is_match(text))
}

/// Case-insensitive substring containment
pub fn contains_ignore_case(text: &str, needle: &str) -> bool {
    text.to_lowercase().contains(&needle.to_lowercase())
}
