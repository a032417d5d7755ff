use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public client id used when the account carries none.
pub const CLIENT_ID_FALLBACK: &str = "00000000402B5328";

/// Identity the game is launched with.
///
/// Token acquisition happens elsewhere; this is only what the argument
/// templates consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationResult {
    pub name: String,
    pub uuid: String,
    /// `None` for offline play; substituted as `null`.
    #[serde(default)]
    pub access_token: Option<String>,
    pub user_type: String,
    #[serde(default = "default_xuid")]
    pub xuid: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
}

fn default_xuid() -> String {
    "0".into()
}

fn default_client_id() -> String {
    CLIENT_ID_FALLBACK.into()
}

impl AuthenticationResult {
    /// Offline identity with a fresh random UUID.
    pub fn offline(name: &str) -> Self {
        let name = match name.trim() {
            "" => "Player",
            trimmed => trimmed,
        };
        Self {
            name: name.to_string(),
            uuid: Uuid::new_v4().simple().to_string(),
            access_token: None,
            user_type: "mojang".into(),
            xuid: default_xuid(),
            client_id: default_client_id(),
        }
    }

    /// Value for `${auth_access_token}` and `${auth_session}`.
    pub fn token_or_null(&self) -> &str {
        self.access_token.as_deref().unwrap_or("null")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_identity() {
        let auth = AuthenticationResult::offline("  Steve ");
        assert_eq!(auth.name, "Steve");
        assert_eq!(auth.uuid.len(), 32);
        assert!(!auth.uuid.contains('-'));
        assert_eq!(auth.token_or_null(), "null");
        assert_ne!(auth.uuid, AuthenticationResult::offline("Steve").uuid);
    }

    #[test]
    fn blank_name_falls_back() {
        assert_eq!(AuthenticationResult::offline("").name, "Player");
    }

    #[test]
    fn deserializes_with_defaults() {
        let auth: AuthenticationResult = serde_json::from_str(
            r#"{"name": "Alex", "uuid": "abc", "access_token": "tok", "user_type": "msa"}"#,
        )
        .unwrap();
        assert_eq!(auth.token_or_null(), "tok");
        assert_eq!(auth.xuid, "0");
        assert_eq!(auth.client_id, CLIENT_ID_FALLBACK);
    }
}
