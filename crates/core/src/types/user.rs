//! Authenticated shopper identity.

use serde::{Deserialize, Serialize};

use crate::types::email::Email;
use crate::types::id::UserId;

/// A registered shopper, as returned by the backend after sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(alias = "fullname")]
    pub full_name: String,
    pub email: Email,
}

impl User {
    /// The first word of the shopper's name, used in greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.full_name
            .split_whitespace()
            .next()
            .unwrap_or(self.full_name.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_first_name() {
        let user: User = serde_json::from_str(
            r#"{"id": 1, "fullname": "Ada Lovelace", "email": "ada@example.com"}"#,
        )
        .unwrap();
        assert_eq!(user.first_name(), "Ada");
    }

    #[test]
    fn test_first_name_single_word() {
        let user = User {
            id: UserId::new(2),
            full_name: "Cher".to_string(),
            email: Email::parse("cher@example.com").unwrap(),
        };
        assert_eq!(user.first_name(), "Cher");
    }
}
