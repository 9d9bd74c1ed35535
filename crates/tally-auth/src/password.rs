use rand::RngCore;

/// Domain separation context for password digests.
const PASSWORD_CONTEXT: &str = "tally-password-v1";

const SALT_LEN: usize = 16;

/// Hash a password with a fresh random salt.
///
/// Storage format is `salt-hex$digest-hex`; the digest is keyed BLAKE3
/// over `salt || password` under the password context.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = digest_with_salt(&salt, password);
    format!("{}${}", hex::encode(salt), hex::encode(digest))
}

/// Verify a password against a stored `salt$digest` string.
///
/// Returns `false` for malformed stored values rather than erroring; a
/// corrupt hash should behave like a wrong password.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };
    let Ok(expected) = <[u8; blake3::OUT_LEN]>::try_from(expected.as_slice()) else {
        return false;
    };
    if salt.len() != SALT_LEN {
        return false;
    }

    let actual = digest_with_salt(&salt, password);
    // blake3::Hash compares in constant time.
    blake3::Hash::from_bytes(actual) == blake3::Hash::from_bytes(expected)
}

/// Generate a throwaway password for admin-created accounts.
///
/// Returned once in the account-creation response; only its hash is kept.
pub fn generate_password() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn digest_with_salt(salt: &[u8], password: &str) -> [u8; blake3::OUT_LEN] {
    let mut hasher = blake3::Hasher::new_derive_key(PASSWORD_CONTEXT);
    hasher.update(salt);
    hasher.update(password.as_bytes());
    *hasher.finalize().as_bytes()
}
