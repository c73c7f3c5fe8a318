//! Google identity returned by the OpenID userinfo endpoint

use serde::{Deserialize, Serialize};

/// Subset of the OpenID Connect userinfo response used for access control
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleUser {
    /// Stable Google account identifier
    pub sub: String,

    /// Account email address
    pub email: String,

    /// Whether Google has verified ownership of the email
    #[serde(default)]
    pub email_verified: bool,

    /// Display name, if shared
    #[serde(default)]
    pub name: Option<String>,

    /// Avatar URL, if shared
    #[serde(default)]
    pub picture: Option<String>,
}

impl GoogleUser {
    /// The account email, but only when Google vouches for it
    pub fn verified_email(&self) -> Option<&str> {
        if self.email_verified {
            Some(&self.email)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verified_email() {
        let user = GoogleUser {
            sub: "1234567890".to_string(),
            email: "owner@rndpig.com".to_string(),
            email_verified: true,
            name: None,
            picture: None,
        };
        assert_eq!(user.verified_email(), Some("owner@rndpig.com"));
    }

    #[test]
    fn test_unverified_email_hidden() {
        let user = GoogleUser {
            sub: "1234567890".to_string(),
            email: "someone@example.com".to_string(),
            email_verified: false,
            name: None,
            picture: None,
        };
        assert_eq!(user.verified_email(), None);
    }

    #[test]
    fn test_deserializes_userinfo_payload() {
        let payload = r#"{
            "sub": "1234567890",
            "email": "owner@rndpig.com",
            "email_verified": true,
            "name": "Owner",
            "picture": "https://example.com/avatar.png"
        }"#;

        let user: GoogleUser = serde_json::from_str(payload).unwrap();
        assert_eq!(user.sub, "1234567890");
        assert_eq!(user.verified_email(), Some("owner@rndpig.com"));
        assert_eq!(user.name.as_deref(), Some("Owner"));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let payload = r#"{"sub": "1", "email": "a@b.c"}"#;
        let user: GoogleUser = serde_json::from_str(payload).unwrap();
        assert!(!user.email_verified);
        assert!(user.name.is_none());
        assert!(user.picture.is_none());
    }
}
