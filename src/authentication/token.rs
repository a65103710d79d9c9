use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token is malformed")]
    Malformed,
    #[error("Token signature does not match")]
    SignatureMismatch,
    #[error("Token is expired")]
    Expired,
    #[error("Token expiry is out of range")]
    ExpiryOutOfRange,
    #[error("Failed to encode token claims")]
    Encoding(#[from] serde_json::Error),
}

/// Payload carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    exp: i64,
}

/// Issues and verifies `<claims>.<signature>` access tokens, both parts
/// base64url encoded, signed with HMAC-SHA256.
#[derive(Clone)]
pub struct TokenSigner {
    key: HmacSha256,
    expires_in: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &Secret<String>, expires_in: Duration) -> Result<Self, anyhow::Error> {
        if expires_in <= Duration::ZERO {
            anyhow::bail!("Token expiry must be positive");
        }

        let key = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())?;
        Ok(Self { key, expires_in })
    }

    pub fn issue(&self, user_id: Uuid) -> Result<Secret<String>, TokenError> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    fn issue_at(&self, user_id: Uuid, now: OffsetDateTime) -> Result<Secret<String>, TokenError> {
        let exp = now
            .checked_add(self.expires_in)
            .ok_or(TokenError::ExpiryOutOfRange)?
            .unix_timestamp();

        let claims = serde_json::to_vec(&Claims { sub: user_id, exp })?;
        let signature = self.sign(&claims);

        Ok(Secret::new(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(claims),
            URL_SAFE_NO_PAD.encode(signature)
        )))
    }

    /// Returns the user id embedded in a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Uuid, TokenError> {
        let (claims, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let claims = URL_SAFE_NO_PAD
            .decode(claims)
            .map_err(|_| TokenError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        self.key
            .clone()
            .chain_update(&claims)
            .verify_slice(&signature)
            .map_err(|_| TokenError::SignatureMismatch)?;

        let claims: Claims = serde_json::from_slice(&claims).map_err(|_| TokenError::Malformed)?;
        if claims.exp <= now.unix_timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims.sub)
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.key
            .clone()
            .chain_update(message)
            .finalize()
            .into_bytes()
            .to_vec()
    }
}
