use nightlight_core::error::{NightlightError, Result};
use nightlight_core::ports::SecretsProvider;

/// Credentials the tile host is published under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileHostCredentials {
    pub username: String,
    pub token: String,
}

impl TileHostCredentials {
    /// Fetch credentials once, at tile host construction
    pub async fn from_secrets(secrets: &dyn SecretsProvider, key: &str) -> Result<Self> {
        let secret = secrets.get_secret(key).await?;

        let field = |name: &str| -> Result<String> {
            match secret.get(name) {
                Some(value) if !value.trim().is_empty() => Ok(value.clone()),
                _ => Err(NightlightError::ConfigInvalid {
                    key: format!("{}.{}", key, name),
                    reason: "secret field is missing or empty".to_string(),
                }),
            }
        };

        Ok(Self {
            username: field("username")?,
            token: field("token")?,
        })
    }

    /// Host-side identifier of a tileset published under `display_name`
    pub fn tileset_id(&self, display_name: &str) -> String {
        format!("{}.{}", self.username, display_name)
    }
}
