//! Password-based confidentiality for embedded payloads.
//!
//! Two independent mechanisms live here:
//! - [`xor`]: a cyclic-key XOR keystream (C2), used as a lightweight
//!   obfuscator by the image engines.
//! - [`kdf`]: PBKDF2-HMAC-SHA256 key derivation plus AES-256-CTR
//!   encryption (C4), used by the payload framing layer when a password
//!   is supplied.

mod password;
pub mod xor;

pub mod kdf;

pub use password::Password;
