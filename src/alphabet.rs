//! Typeable alphabet and character codes.
//!
//! The classifier sees characters as their index in the alphabet. The
//! lookup table is built once, so `code_of` is a single array access
//! instead of a scan over the alphabet string.

use tracing::warn;

use crate::error::{SensingError, SensingResult};

/// Fixed set of characters the classifier can answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeableAlphabet {
    chars: Vec<char>,
    /// ASCII byte -> alphabet index.
    codes: [Option<u8>; 128],
}

impl TypeableAlphabet {
    /// Build the table. Characters must be unique lowercase ASCII letters.
    pub fn new(alphabet: &str) -> SensingResult<Self> {
        if alphabet.is_empty() {
            return Err(SensingError::Config("alphabet must not be empty".to_string()));
        }
        let mut codes = [None; 128];
        let mut chars = Vec::with_capacity(alphabet.len());
        for c in alphabet.chars() {
            if !c.is_ascii_lowercase() {
                return Err(SensingError::Config(format!(
                    "alphabet must be lowercase ASCII letters, found {c:?}"
                )));
            }
            let slot = &mut codes[c as usize];
            if slot.is_some() {
                return Err(SensingError::Config(format!(
                    "alphabet contains {c:?} more than once"
                )));
            }
            *slot = Some(chars.len() as u8);
            chars.push(c);
        }
        Ok(Self { chars, codes })
    }

    /// Alphabet index of `c`.
    ///
    /// Returns `None` for a character outside the alphabet and logs a
    /// "not a typeable character" diagnostic. Callers skip the character.
    pub fn code_of(&self, c: char) -> Option<usize> {
        let code = self.lookup(c);
        if code.is_none() {
            warn!(character = ?c, "Not a typeable character");
        }
        code
    }

    /// Like [`code_of`](Self::code_of) without the diagnostic.
    pub fn contains(&self, c: char) -> bool {
        self.lookup(c).is_some()
    }

    pub fn char_at(&self, code: usize) -> Option<char> {
        self.chars.get(code).copied()
    }

    /// Characters in alphabet order.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    fn lookup(&self, c: char) -> Option<usize> {
        if !c.is_ascii() {
            return None;
        }
        self.codes[c as usize].map(usize::from)
    }
}

impl Default for TypeableAlphabet {
    fn default() -> Self {
        let mut codes = [None; 128];
        let chars: Vec<char> = ('a'..='z').collect();
        for (i, c) in chars.iter().enumerate() {
            codes[*c as usize] = Some(i as u8);
        }
        Self { chars, codes }
    }
}
