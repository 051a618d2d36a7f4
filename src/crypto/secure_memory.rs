//! Zeroizing holders for the session password and decrypted plaintext
//!
//! Contents are wiped when the holder is dropped and are never printed by
//! `Debug`.

use std::fmt;
use std::ops::Deref;

use zeroize::Zeroizing;

/// Password kept in memory for the lifetime of a mounted session
pub struct SecureString(Zeroizing<String>);

impl SecureString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Zeroizing::new(s.into()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for SecureString {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureString(***)")
    }
}

/// Decrypted store bytes or a snapshot about to be encrypted
pub struct SecureBytes(Zeroizing<Vec<u8>>);

impl SecureBytes {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl Deref for SecureBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureBytes({} bytes)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_derefs_to_str() {
        let password = SecureString::new("Str0ng!Pass");
        assert_eq!(&*password, "Str0ng!Pass");
        assert_eq!(password.len(), 11);
    }

    #[test]
    fn test_debug_hides_contents() {
        let password = SecureString::new("Str0ng!Pass");
        assert!(!format!("{:?}", password).contains("Str0ng"));

        let plaintext = SecureBytes::new(b"{\"categories\":[]}".to_vec());
        let shown = format!("{:?}", plaintext);
        assert_eq!(shown, "SecureBytes(17 bytes)");
    }

    #[test]
    fn test_bytes_slice_access() {
        let plaintext = SecureBytes::new(vec![1u8, 2, 3]);
        assert_eq!(plaintext.as_bytes(), &[1, 2, 3]);
        assert_eq!(plaintext.first(), Some(&1));
    }
}
