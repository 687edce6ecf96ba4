//! Keyword sets used to classify modem responses.

use crate::network::error::Error;
use heapless::{String, Vec};
use serde::Deserialize;

/// Maximum length of a single keyword.
pub const MAX_KEYWORD_LEN: usize = 16;
/// Maximum number of keywords in a set.
pub const MAX_KEYWORDS: usize = 3;

/// Up to [`MAX_KEYWORDS`] short markers searched for as substrings of the response.
///
/// Empty entries are treated as unused slots, never as a match.
///
/// # Examples
///
/// ```rust
/// use libat::modem::KeywordSet;
///
/// let set = KeywordSet::new(&["OK", "ALREADY CONNECTED"]).unwrap();
/// assert!(set.matches(b"CONNECT\r\n\r\nOK\r\n"));
/// assert!(!set.matches(b"ERROR\r\n"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct KeywordSet(Vec<String<MAX_KEYWORD_LEN>, MAX_KEYWORDS>);

impl KeywordSet {
    /// Builds a set, rejecting too many or too long keywords.
    pub fn new(words: &[&str]) -> Result<Self, Error> {
        let mut set = Vec::new();
        for word in words {
            let word = String::try_from(*word).map_err(|_| Error::CapacityExceeded)?;
            set.push(word).map_err(|_| Error::CapacityExceeded)?;
        }
        Ok(Self(set))
    }

    /// An empty set that never matches.
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Builds a set from compile-time constants known to fit.
    ///
    /// Entries that do not fit are skipped.
    pub(crate) fn preset(words: &[&str]) -> Self {
        let mut set = Vec::new();
        for word in words {
            if let Ok(word) = String::try_from(*word) {
                let _ = set.push(word);
            }
        }
        Self(set)
    }

    /// `true` if any non-empty keyword occurs in `haystack`.
    pub fn matches(&self, haystack: &[u8]) -> bool {
        self.iter()
            .any(|word| super::buffer::find_slice(haystack, word.as_bytes()).is_some())
    }

    /// Iterates over the non-empty keywords.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0
            .iter()
            .map(|word| word.as_str())
            .filter(|word| !word.is_empty())
    }

    /// `true` if the set holds no usable keyword.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}
