//! Password encryption and XOR keystream boundary cases (spec §8 boundary cases).

use veilcode::crypto::{kdf, xor};
use veilcode::{Error, Password};

#[test]
fn xor_empty_password_is_identity() {
    let data = b"hello world".to_vec();
    assert_eq!(xor::xor_encrypt(&data, &Password::new("")), data);
}

#[test]
fn xor_round_trips() {
    let data = b"the secret sauce".to_vec();
    let password = Password::new("key");
    let encrypted = xor::xor_encrypt(&data, &password);
    assert_eq!(xor::xor_decrypt(&encrypted, &password), data);
}

#[test]
fn kdf_round_trips() {
    let data = b"confidential payload".to_vec();
    let password = Password::new("correct horse battery staple");
    let blob = kdf::encrypt(&data, &password);
    assert_eq!(kdf::decrypt(&blob, &password).unwrap(), data);
}

#[test]
fn kdf_short_blob_fails_invalid_argument() {
    let short = vec![0u8; kdf::MIN_ENCRYPTED_LEN];
    let err = kdf::decrypt(&short, &Password::new("p")).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn kdf_different_passwords_yield_different_ciphertexts() {
    let data = b"same plaintext".to_vec();
    let a = kdf::encrypt(&data, &Password::new("password1"));
    let b = kdf::encrypt(&data, &Password::new("password2"));
    assert_ne!(a, b);
}
