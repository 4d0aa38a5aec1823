//! Nickname gate. Runs before any store access on every authentication attempt.

use std::fmt;

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

pub const MAX_CHARS: usize = 20;
pub const MAX_BYTES: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NicknameRejection {
    #[error("nickname has leading or trailing whitespace")]
    Padded,

    #[error("nickname is empty")]
    Empty,

    #[error("nickname contains {0:?}, only letters, digits, spaces and hyphens are allowed")]
    Disallowed(char),

    #[error("nickname is longer than {MAX_CHARS} characters")]
    TooLong,

    #[error("nickname is larger than {MAX_BYTES} bytes")]
    TooManyBytes,
}

/// A nickname that passed every rule.
///
/// The name is kept exactly as submitted (case and diacritics included).
/// Only the character set is checked on the stripped ASCII form; both
/// length limits apply to the submitted string, since that is what gets stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nickname {
    raw: String,
}

impl Nickname {
    pub fn parse(raw: &str) -> Result<Self, NicknameRejection> {
        if raw != raw.trim() {
            return Err(NicknameRejection::Padded);
        }

        let normalized: String = raw.nfkd().filter(|c| !is_combining_mark(*c)).collect();

        if normalized.is_empty() {
            return Err(NicknameRejection::Empty);
        }
        if let Some(bad) = normalized
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == ' ' || *c == '-'))
        {
            return Err(NicknameRejection::Disallowed(bad));
        }
        if raw.chars().count() > MAX_CHARS {
            return Err(NicknameRejection::TooLong);
        }
        if raw.len() > MAX_BYTES {
            return Err(NicknameRejection::TooManyBytes);
        }

        Ok(Self { raw: raw.to_owned() })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_string(self) -> String {
        self.raw
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        for name in ["chef99", "Mary Jo", "anne-marie", "X"] {
            assert_eq!(Nickname::parse(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn keeps_diacritics_as_submitted() {
        assert_eq!(Nickname::parse("José").unwrap().as_str(), "José");
        // decomposed form passes the same character check
        assert_eq!(Nickname::parse("Jose\u{0301}").unwrap().as_str(), "Jose\u{0301}");
    }

    #[test]
    fn rejects_surrounding_whitespace() {
        assert_eq!(Nickname::parse(" chef"), Err(NicknameRejection::Padded));
        assert_eq!(Nickname::parse("chef\n"), Err(NicknameRejection::Padded));
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(Nickname::parse(""), Err(NicknameRejection::Empty));
        // a lone combining mark strips to nothing
        assert_eq!(Nickname::parse("\u{0301}"), Err(NicknameRejection::Empty));
    }

    #[test]
    fn rejects_characters_outside_the_ascii_set() {
        assert_eq!(Nickname::parse("chef_99"), Err(NicknameRejection::Disallowed('_')));
        assert!(matches!(Nickname::parse("Ω"), Err(NicknameRejection::Disallowed(_))));
        assert!(matches!(Nickname::parse("a\tb"), Err(NicknameRejection::Disallowed('\t'))));
        assert!(matches!(Nickname::parse("名前"), Err(NicknameRejection::Disallowed(_))));
    }

    #[test]
    fn enforces_length_limits() {
        assert!(Nickname::parse(&"a".repeat(20)).is_ok());
        assert_eq!(Nickname::parse(&"a".repeat(21)), Err(NicknameRejection::TooLong));
        assert_eq!(Nickname::parse(&"é".repeat(21)), Err(NicknameRejection::TooLong));
    }

    #[test]
    fn combining_marks_count_toward_the_character_limit() {
        // 12 letters, 24 characters as submitted
        let decomposed = "e\u{0301}".repeat(12);
        assert_eq!(Nickname::parse(&decomposed), Err(NicknameRejection::TooLong));

        // 10 letters, exactly 20 characters as submitted
        let decomposed = "e\u{0301}".repeat(10);
        assert_eq!(Nickname::parse(&decomposed).unwrap().as_str().chars().count(), 20);
    }
}
