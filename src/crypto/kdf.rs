//! Password encryption (C4): PBKDF2-HMAC-SHA256 key derivation and
//! AES-256-CTR encryption.
//!
//! Wire layout: `salt(16) ‖ counter(16) ‖ ciphertext`. Salt and counter are
//! drawn fresh from a cryptographic RNG on every encode. Decryption never
//! adds an authentication tag — a wrong password produces garbage bytes
//! that downstream decompression or UTF-8 decoding will almost always
//! reject (spec.md §4.4, §9).

use aes::Aes256;
use ctr::Ctr64BE;
use ctr::cipher::{KeyIvInit, StreamCipher};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;

use super::Password;
use crate::{Error, Result};

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const COUNTER_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Minimum length of a valid encrypted blob (`salt ‖ counter`, empty ciphertext).
pub const MIN_ENCRYPTED_LEN: usize = SALT_LEN + COUNTER_LEN;

type Aes256Ctr = Ctr64BE<Aes256>;

fn derive_key(password: &Password, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

/// Encrypts `data` under `password`, producing a fresh random salt and
/// counter block on every call.
///
/// Output layout: `salt(16) ‖ counter(16) ‖ ciphertext`.
pub fn encrypt(data: &[u8], password: &Password) -> Vec<u8> {
    let mut salt = [0u8; SALT_LEN];
    let mut counter = [0u8; COUNTER_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut counter);

    let key = derive_key(password, &salt);
    let mut buf = data.to_vec();
    let mut cipher = Aes256Ctr::new(&key.into(), &counter.into());
    cipher.apply_keystream(&mut buf);

    let mut out = Vec::with_capacity(SALT_LEN + COUNTER_LEN + buf.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&counter);
    out.extend_from_slice(&buf);
    out
}

/// Decrypts a `salt ‖ counter ‖ ciphertext` blob under `password`.
///
/// Fails with [`Error::InvalidArgument`] if `blob` is shorter than
/// [`MIN_ENCRYPTED_LEN`] (33 bytes is the minimum *valid* length, i.e.
/// non-empty ciphertext; 32 bytes of header alone is rejected as too
/// short per spec.md §4.4).
pub fn decrypt(blob: &[u8], password: &Password) -> Result<Vec<u8>> {
    if blob.len() < MIN_ENCRYPTED_LEN + 1 {
        return Err(Error::invalid(format!(
            "encrypted data too short: {} bytes (need at least {})",
            blob.len(),
            MIN_ENCRYPTED_LEN + 1
        )));
    }
    let salt = &blob[..SALT_LEN];
    let counter = &blob[SALT_LEN..SALT_LEN + COUNTER_LEN];
    let ciphertext = &blob[SALT_LEN + COUNTER_LEN..];

    let key = derive_key(password, salt);
    let mut buf = ciphertext.to_vec();
    let mut cipher = Aes256Ctr::new(&key.into(), counter.into());
    cipher.apply_keystream(&mut buf);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let password = Password::new("correct horse battery staple");
        let data = b"the secret is in the sauce".to_vec();
        let blob = encrypt(&data, &password);
        assert!(blob.len() >= MIN_ENCRYPTED_LEN);
        assert_eq!(decrypt(&blob, &password).unwrap(), data);
    }

    #[test]
    fn wrong_password_yields_garbage() {
        let data = b"the secret is in the sauce".to_vec();
        let blob = encrypt(&data, &Password::new("right"));
        let wrong = decrypt(&blob, &Password::new("wrong")).unwrap();
        assert_ne!(wrong, data);
    }

    #[test]
    fn short_blob_is_rejected() {
        let password = Password::new("p");
        let short = vec![0u8; MIN_ENCRYPTED_LEN];
        assert!(decrypt(&short, &password).is_err());
    }

    #[test]
    fn same_input_different_ciphertext_each_call() {
        let password = Password::new("p");
        let data = b"same plaintext".to_vec();
        let a = encrypt(&data, &password);
        let b = encrypt(&data, &password);
        // Random salt+counter on every call should (overwhelmingly) differ.
        assert_ne!(a, b);
    }

    #[test]
    fn different_passwords_yield_different_ciphertexts() {
        let data = b"same plaintext".to_vec();
        let a = encrypt(&data, &Password::new("password1"));
        let b = encrypt(&data, &Password::new("password2"));
        assert_ne!(a, b);
    }
}
