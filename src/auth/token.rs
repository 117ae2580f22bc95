//! Defines the token struct stored in the auth cookie and how to serialize/deserialize a token.

use serde::{Deserialize, Serialize};

use crate::{auth::UserID, timestamp::Timestamp};

/// A token for authorization and authentication.
///
/// The expiry is stored in the token as well as on the cookie because clients
/// control the cookie's attributes but cannot forge the encrypted value.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,
    pub expires_at: Timestamp,
}

impl Token {
    /// Whether the token has expired at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use uuid::uuid;

    use crate::{UserID, auth::token::Token, timestamp::Timestamp};

    fn test_token(expires_at: Timestamp) -> Token {
        Token {
            user_id: UserID::new(uuid!("67e55044-10b1-426f-9247-bb680e5fe0c8")),
            expires_at,
        }
    }

    #[test]
    fn serialise_token() {
        let token = test_token(Timestamp::from(datetime!(2025-12-21 03:54:00 UTC)));
        let expected = r#"{"user_id":"67e55044-10b1-426f-9247-bb680e5fe0c8","expires_at":"2025-12-21T03:54:00.000Z"}"#;

        let actual = serde_json::to_string(&token).unwrap();

        assert_eq!(expected, actual);
    }

    #[test]
    fn deserialise_token_with_midnight_expiry() {
        let expected = test_token(Timestamp::from(datetime!(2025-12-21 00:00:00 UTC)));
        let token_string = r#"{"user_id":"67e55044-10b1-426f-9247-bb680e5fe0c8","expires_at":"2025-12-21T00:00:00.000Z"}"#;

        let actual = serde_json::from_str(token_string).unwrap();

        assert_eq!(expected, actual);
    }

    #[test]
    fn token_expires_at_its_expiry() {
        let expires_at = Timestamp::from(datetime!(2025-12-21 00:00:00 UTC));
        let token = test_token(expires_at);

        assert!(!token.is_expired(Timestamp::from(datetime!(2025-12-20 23:59:59 UTC))));
        assert!(token.is_expired(expires_at));
    }
}
