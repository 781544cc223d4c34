use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_LENGTH: usize = 16;

/// Hash a raw password with a fresh random salt. The stored credential is
/// `"<salt>:<hash>"`, both base64, with the hash computed over salt‖password.
pub fn encode(raw_password: &str) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt_b64 = BASE64.encode(salt);

    let hash = hash_with_salt(raw_password, &salt_b64);
    format!("{}:{}", salt_b64, hash)
}

pub fn matches(raw_password: &str, encoded: &str) -> bool {
    let parts: Vec<&str> = encoded.split(':').collect();
    if parts.len() != 2 {
        return false;
    }

    let salt_b64 = parts[0];
    let stored_hash = parts[1];

    hash_with_salt(raw_password, salt_b64) == stored_hash
}

fn hash_with_salt(password: &str, salt_b64: &str) -> String {
    let salt = BASE64.decode(salt_b64).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.as_bytes());

    BASE64.encode(hasher.finalize())
}
