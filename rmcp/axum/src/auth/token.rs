//! Static shared-secret validator.

use crate::auth::Validator;
use std::sync::Arc;

/// Accepts exactly one credential, compared byte for byte.
#[derive(Clone)]
pub struct SharedToken {
    token: Arc<str>,
}

impl SharedToken {
    pub fn new(token: impl Into<Arc<str>>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for SharedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedToken").finish_non_exhaustive()
    }
}

impl Validator for SharedToken {
    type Claims = ();
    type Error = &'static str;

    async fn validate(&self, credential: &str) -> Result<(), &'static str> {
        if credential == &*self.token {
            Ok(())
        } else {
            Err("credential does not match")
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::{SharedToken, Validator};

    #[tokio::test]
    async fn matches_exactly() {
        let token = SharedToken::new("secret");
        assert!(token.validate("secret").await.is_ok());
        assert!(token.validate("Secret").await.is_err());
        assert!(token.validate("").await.is_err());
    }

    #[test]
    fn debug_hides_secret() {
        let token = SharedToken::new("secret");
        assert!(!format!("{token:?}").contains("secret"));
    }
}
