//! Cyclic-key XOR keystream (C2).
//!
//! A lightweight obfuscator used by the image engines ahead of (or instead
//! of) PBKDF2/AES-CTR encryption. `xor_encrypt` and `xor_decrypt` are the
//! same operation: XOR is its own inverse.

use super::Password;

/// XORs `data` with the password bytes, cycling the key as needed.
///
/// With an empty password, `data` is returned unchanged.
pub fn xor_encrypt(data: &[u8], password: &Password) -> Vec<u8> {
    let key = password.as_bytes();
    if key.is_empty() {
        return data.to_vec();
    }
    data.iter()
        .enumerate()
        .map(|(i, &b)| b ^ key[i % key.len()])
        .collect()
}

/// Identical to [`xor_encrypt`]: XOR is its own inverse.
pub fn xor_decrypt(data: &[u8], password: &Password) -> Vec<u8> {
    xor_encrypt(data, password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_password_is_identity() {
        let data = b"hello world".to_vec();
        let password = Password::new("");
        assert_eq!(xor_encrypt(&data, &password), data);
    }

    #[test]
    fn decrypt_inverts_encrypt() {
        let data = b"the quick brown fox".to_vec();
        let password = Password::new("key");
        let enc = xor_encrypt(&data, &password);
        assert_ne!(enc, data);
        assert_eq!(xor_decrypt(&enc, &password), data);
    }

    #[test]
    fn key_cycles_across_longer_input() {
        let data = vec![0u8; 10];
        let password = Password::new("ab");
        let enc = xor_encrypt(&data, &password);
        assert_eq!(enc, vec![b'a', b'b', b'a', b'b', b'a', b'b', b'a', b'b', b'a', b'b']);
    }

    proptest! {
        #[test]
        fn round_trip_any_input(data in proptest::collection::vec(any::<u8>(), 0..256), key in "[ -~]{1,16}") {
            let password = Password::new(key);
            let enc = xor_encrypt(&data, &password);
            prop_assert_eq!(xor_decrypt(&enc, &password), data);
        }
    }
}
