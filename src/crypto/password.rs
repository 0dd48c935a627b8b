//! Password handling for the XOR keystream (C2) and PBKDF2/AES-CTR (C4) layers.

use zeroize::Zeroizing;

/// A password used for XOR obfuscation or PBKDF2-derived AES-256-CTR encryption.
///
/// Stores the password in UTF-8 (matching spec.md's wire definitions for
/// both C2 and C4) and zeroizes it on drop.
#[derive(Clone)]
pub struct Password {
    inner: Zeroizing<String>,
}

impl Password {
    /// Creates a new password from a string.
    pub fn new<S: Into<String>>(password: S) -> Self {
        Self {
            inner: Zeroizing::new(password.into()),
        }
    }

    /// Returns the password as UTF-8 bytes, as used by both the XOR
    /// keystream (C2) and the PBKDF2 key derivation input (C4).
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// Returns the password as a string slice.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns true if the password is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the length of the password in characters.
    pub fn len(&self) -> usize {
        self.inner.chars().count()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't expose the actual password in debug output
        f.debug_struct("Password")
            .field("len", &self.inner.len())
            .finish()
    }
}

impl From<&str> for Password {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Password {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_bytes_are_utf8() {
        let password = Password::new("test");
        assert_eq!(password.as_bytes(), b"test");
    }

    #[test]
    fn password_unicode_byte_length() {
        let password = Password::new("пароль"); // Russian "password"
        // Each Cyrillic codepoint is 2 bytes in UTF-8.
        assert_eq!(password.as_bytes().len(), 12);
        assert_eq!(password.len(), 6);
    }

    #[test]
    fn password_empty() {
        let password = Password::new("");
        assert!(password.as_bytes().is_empty());
        assert!(password.is_empty());
    }

    #[test]
    fn password_debug_hides_contents() {
        let password = Password::new("secret");
        let debug = format!("{:?}", password);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("len"));
    }

    #[test]
    fn password_from_str_and_string() {
        let p1: Password = "test".into();
        assert_eq!(p1.as_str(), "test");
        let p2: Password = String::from("test").into();
        assert_eq!(p2.as_str(), "test");
    }
}
