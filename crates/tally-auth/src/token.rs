use chrono::{DateTime, Duration, Utc};
use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Serialize};
use tally_types::{Role, UserId};

use crate::error::AuthError;

/// Domain separation prefix for token signatures.
const TOKEN_CONTEXT: &[u8] = b"tally-token-v1:";

/// Claims carried by an access token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user.
    pub sub: UserId,
    /// Role claim; authorization decisions key off this.
    pub role: Role,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

/// Issues and verifies ed25519-signed access tokens.
///
/// Wire format is `claims-hex.signature-hex`: the hex-encoded JSON claims,
/// a dot, and the hex-encoded signature over `tally-token-v1: || claims`.
#[derive(Debug)]
pub struct TokenSigner {
    key: ed25519_dalek::SigningKey,
}

impl TokenSigner {
    /// Generate a fresh random signing key.
    pub fn generate() -> Self {
        let mut csprng = rand::thread_rng();
        Self {
            key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Build from a 32-byte seed, e.g. loaded from configuration so tokens
    /// survive a server restart.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            key: ed25519_dalek::SigningKey::from_bytes(&seed),
        }
    }

    /// Build from a hex-encoded 32-byte seed.
    pub fn from_seed_hex(seed_hex: &str) -> Result<Self, AuthError> {
        let bytes = hex::decode(seed_hex)
            .map_err(|e| AuthError::InvalidKey(format!("seed is not hex: {e}")))?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AuthError::InvalidKey("seed must be 32 bytes".into()))?;
        Ok(Self::from_seed(seed))
    }

    /// The public verifying key, for out-of-process verification.
    pub fn verifying_key_bytes(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    /// Issue a token for `user` acting as `role`, valid for `ttl`.
    pub fn issue(&self, user: UserId, role: Role, ttl: Duration) -> Result<String, AuthError> {
        self.issue_at(user, role, ttl, Utc::now())
    }

    /// Verify a token's signature and expiry, returning its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    fn issue_at(
        &self,
        user: UserId,
        role: Role,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user,
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        let encoded = serde_json::to_vec(&claims)
            .map_err(|e| AuthError::TokenMalformed(e.to_string()))?;
        let signature = self.key.sign(&signing_input(&encoded));
        Ok(format!(
            "{}.{}",
            hex::encode(&encoded),
            hex::encode(signature.to_bytes())
        ))
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let (claims_hex, sig_hex) = token
            .split_once('.')
            .ok_or_else(|| AuthError::TokenMalformed("missing separator".into()))?;

        let encoded = hex::decode(claims_hex)
            .map_err(|_| AuthError::TokenMalformed("claims are not hex".into()))?;
        let sig_bytes = hex::decode(sig_hex)
            .map_err(|_| AuthError::TokenMalformed("signature is not hex".into()))?;
        let sig_bytes: [u8; 64] = sig_bytes
            .try_into()
            .map_err(|_| AuthError::TokenMalformed("signature must be 64 bytes".into()))?;

        let signature = ed25519_dalek::Signature::from_bytes(&sig_bytes);
        self.key
            .verifying_key()
            .verify(&signing_input(&encoded), &signature)
            .map_err(|_| AuthError::InvalidSignature)?;

        let claims: Claims = serde_json::from_slice(&encoded)
            .map_err(|e| AuthError::TokenMalformed(e.to_string()))?;

        if claims.exp <= now.timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

fn signing_input(claims: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(TOKEN_CONTEXT.len() + claims.len());
    message.extend_from_slice(TOKEN_CONTEXT);
    message.extend_from_slice(claims);
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify() {
        let signer = TokenSigner::generate();
        let user = UserId::new();

        let token = signer.issue(user, Role::Vendor, Duration::hours(3)).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.sub, user);
        assert_eq!(claims.role, Role::Vendor);
        assert_eq!(claims.exp - claims.iat, 3 * 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = TokenSigner::generate();
        let issued = Utc::now() - Duration::hours(4);
        let token = signer
            .issue_at(UserId::new(), Role::Student, Duration::hours(3), issued)
            .unwrap();

        assert_eq!(signer.verify(&token).unwrap_err(), AuthError::TokenExpired);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let ours = TokenSigner::generate();
        let theirs = TokenSigner::generate();
        let token = theirs
            .issue(UserId::new(), Role::SuperAdmin, Duration::hours(1))
            .unwrap();

        assert_eq!(ours.verify(&token).unwrap_err(), AuthError::InvalidSignature);
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let signer = TokenSigner::generate();
        let token = signer
            .issue(UserId::new(), Role::Student, Duration::hours(1))
            .unwrap();

        // Flip one nibble in the claims half.
        let (claims_hex, sig_hex) = token.split_once('.').unwrap();
        let mut claims: String = claims_hex.into();
        let last = if claims.pop() == Some('0') { '1' } else { '0' };
        claims.push(last);
        let forged = format!("{claims}.{sig_hex}");

        assert_eq!(
            signer.verify(&forged).unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let signer = TokenSigner::generate();
        assert!(matches!(
            signer.verify("no-dot-here").unwrap_err(),
            AuthError::TokenMalformed(_)
        ));
        assert!(matches!(
            signer.verify("zz.zz").unwrap_err(),
            AuthError::TokenMalformed(_)
        ));
    }

    #[test]
    fn seed_round_trip_produces_same_key() {
        let a = TokenSigner::generate();
        let seed = a.key.to_bytes();
        let b = TokenSigner::from_seed(seed);
        let token = a
            .issue(UserId::new(), Role::Admin, Duration::hours(1))
            .unwrap();
        assert!(b.verify(&token).is_ok());
    }

    #[test]
    fn seed_hex_validation() {
        assert!(matches!(
            TokenSigner::from_seed_hex("not hex").unwrap_err(),
            AuthError::InvalidKey(_)
        ));
        assert!(matches!(
            TokenSigner::from_seed_hex("abcd").unwrap_err(),
            AuthError::InvalidKey(_)
        ));
        assert!(TokenSigner::from_seed_hex(&hex::encode([7u8; 32])).is_ok());
    }
}
