//! Signed Access Tokens
//!
//! Compact HS256 JWTs: `base64url(header).base64url(claims).base64url(mac)`.
//! Only `HS256` is accepted on verification; the signature is checked in
//! constant time before the claims are parsed, and expiry is checked last.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::{from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Unsupported token algorithm")]
    UnsupportedAlgorithm,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Invalid signing key")]
    InvalidKey,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims carried by an access token
///
/// `iat` and `exp` are Unix timestamps in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user id)
    pub sub: String,
    /// Role code of the subject at issue time
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(sub: impl Into<String>, role: impl Into<String>, issued_at: i64, ttl_secs: i64) -> Self {
        Self {
            sub: sub.into(),
            role: role.into(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.exp
    }
}

/// HS256 signer/verifier bound to one secret
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        };

        let header_json = serde_json::to_vec(&header).map_err(|_| TokenError::Malformed)?;
        let claims_json = serde_json::to_vec(claims).map_err(|_| TokenError::Malformed)?;

        let signing_input = format!(
            "{}.{}",
            to_base64url(&header_json),
            to_base64url(&claims_json)
        );
        let signature =
            hmac_sha256(&self.secret, signing_input.as_bytes()).map_err(|_| TokenError::InvalidKey)?;

        Ok(format!("{}.{}", signing_input, to_base64url(&signature)))
    }

    /// Verify structure, algorithm, signature, then expiry against `now`
    pub fn verify(&self, token: &str, now: i64) -> Result<TokenClaims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header: Header = from_base64url(header_b64)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or(TokenError::Malformed)?;

        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let signature = from_base64url(signature_b64).map_err(|_| TokenError::Malformed)?;
        let signing_input_len = header_b64.len() + 1 + claims_b64.len();
        let signing_input = &token.as_bytes()[..signing_input_len];

        if !verify_hmac_sha256(&self.secret, signing_input, &signature) {
            return Err(TokenError::InvalidSignature);
        }

        let claims: TokenClaims = from_base64url(claims_b64)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or(TokenError::Malformed)?;

        if claims.is_expired(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn claims() -> TokenClaims {
        TokenClaims::new("3f1c0e9a-8c53-4d0e-9d59-0c6a1b7a2f10", "USER", NOW, 3600)
    }

    #[test]
    fn test_sign_and_verify() {
        let signer = TokenSigner::new(b"secret".to_vec());
        let token = signer.sign(&claims()).unwrap();

        assert_eq!(token.split('.').count(), 3);
        let decoded = signer.verify(&token, NOW + 10).unwrap();
        assert_eq!(decoded, claims());
        assert_eq!(decoded.exp, NOW + 3600);
    }

    #[test]
    fn test_header_is_hs256_jwt() {
        let token = TokenSigner::new(b"secret".to_vec()).sign(&claims()).unwrap();
        let header_b64 = token.split('.').next().unwrap();
        let header: serde_json::Value =
            serde_json::from_slice(&from_base64url(header_b64).unwrap()).unwrap();
        assert_eq!(header["alg"], "HS256");
        assert_eq!(header["typ"], "JWT");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenSigner::new(b"secret".to_vec()).sign(&claims()).unwrap();
        let result = TokenSigner::new(b"other".to_vec()).verify(&token, NOW);
        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_claims_rejected() {
        let signer = TokenSigner::new(b"secret".to_vec());
        let token = signer.sign(&claims()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged = TokenClaims::new(claims().sub, "ADMIN", NOW, 3600);
        let forged_b64 = to_base64url(&serde_json::to_vec(&forged).unwrap());
        let tampered = format!("{}.{}.{}", parts[0], forged_b64, parts[2]);

        assert_eq!(signer.verify(&tampered, NOW), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_expired_rejected() {
        let signer = TokenSigner::new(b"secret".to_vec());
        let token = signer.sign(&claims()).unwrap();
        assert_eq!(signer.verify(&token, NOW + 3600), Err(TokenError::Expired));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let signer = TokenSigner::new(b"secret".to_vec());
        let token = signer.sign(&claims()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let none_header = to_base64url(br#"{"alg":"none","typ":"JWT"}"#);
        let forged = format!("{}.{}.{}", none_header, parts[1], parts[2]);

        assert_eq!(
            signer.verify(&forged, NOW),
            Err(TokenError::UnsupportedAlgorithm)
        );
    }

    #[test]
    fn test_malformed_rejected() {
        let signer = TokenSigner::new(b"secret".to_vec());
        assert_eq!(signer.verify("", NOW), Err(TokenError::Malformed));
        assert_eq!(signer.verify("a.b", NOW), Err(TokenError::Malformed));
        assert_eq!(signer.verify("a.b.c.d", NOW), Err(TokenError::Malformed));
        assert_eq!(signer.verify("!!!.b.c", NOW), Err(TokenError::Malformed));
    }
}
