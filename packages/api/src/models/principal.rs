use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrincipalError {
    #[error("principal is empty")]
    Empty,
    #[error("principal contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Textual principal issued by the identity provider, e.g. `"2vxsx-fae"`.
///
/// The client never inspects its contents beyond basic shape checks; it is compared,
/// displayed, and sent back to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    const ANONYMOUS: &'static str = "2vxsx-fae";

    /// Parse the textual form: lowercase base32 groups separated by dashes.
    pub fn from_text(text: &str) -> Result<Self, PrincipalError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PrincipalError::Empty);
        }
        if let Some(c) = text
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(PrincipalError::InvalidCharacter(c));
        }
        Ok(Self(text.to_string()))
    }

    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == Self::ANONYMOUS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First and last group only, for compact display: `"abcde…xyz"`.
    pub fn short(&self) -> String {
        match (self.0.split('-').next(), self.0.rsplit('-').next()) {
            (Some(first), Some(last)) if first != last => format!("{first}…{last}"),
            _ => self.0.clone(),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_principal() {
        let p = Principal::from_text(" rrkah-fqaaa-aaaaa-aaaaq-cai ").unwrap();
        assert_eq!(p.as_str(), "rrkah-fqaaa-aaaaa-aaaaq-cai");
        assert_eq!(p.short(), "rrkah…cai");
        assert!(!p.is_anonymous());
    }

    #[test]
    fn test_reject_bad_principal() {
        assert_eq!(Principal::from_text("  "), Err(PrincipalError::Empty));
        assert_eq!(
            Principal::from_text("ABC-def"),
            Err(PrincipalError::InvalidCharacter('A'))
        );
    }

    #[test]
    fn test_anonymous() {
        assert!(Principal::anonymous().is_anonymous());
        assert_eq!(Principal::anonymous().short(), "2vxsx…fae");
    }
}
