use sha2::{Digest, Sha256};

/// Compute the SHA-256 fingerprint of a string's UTF-8 bytes as lowercase hex
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digests() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_shape() {
        let digest = sha256_hex("hello, how ' s your day going today ?");
        assert_eq!(digest.len(), 64);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_deterministic_and_distinct() {
        assert_eq!(sha256_hex("the quick brown fox"), sha256_hex("the quick brown fox"));
        assert_ne!(sha256_hex("the quick brown fox"), sha256_hex("the quick brown fox "));
        assert_ne!(sha256_hex("Here"), sha256_hex("here"));
    }

    #[test]
    fn test_multibyte_text() {
        // Hashes bytes, not chars
        assert_eq!(sha256_hex("café"), sha256_hex("caf\u{e9}"));
        assert_ne!(sha256_hex("café"), sha256_hex("cafe\u{301}"));
    }
}
