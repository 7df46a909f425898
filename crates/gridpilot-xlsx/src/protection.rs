//! Workbook password protection
//!
//! Protection is stored as `<workbookProtection workbookPassword="HHHH"/>` in
//! `xl/workbook.xml`, where `HHHH` is Excel's legacy 16-bit password hash.
//! The hash is a simple XOR scheme and is not cryptographically secure: it
//! locks the workbook structure, it does not encrypt cell data.

/// Hash a password with Excel's legacy workbook/worksheet protection algorithm
///
/// This is the 16-bit value stored in `workbookProtection workbookPassword`
/// and `sheetProtection password`.
#[must_use]
pub fn hash_password(password: &str) -> u16 {
    let mut hash: u16 = 0;
    let mut len: u16 = 0;

    // Excel truncates legacy passwords to 15 characters.
    for (i, ch) in password.encode_utf16().take(15).enumerate() {
        len = len.saturating_add(1);
        let shift = (i + 1) as u32;
        // Rotate within 15 bits.
        let rotated =
            (((ch as u32) << shift) & 0x7FFF) | ((ch as u32) >> (15u32.saturating_sub(shift)));
        hash ^= rotated as u16;
    }

    hash ^= len;
    hash ^= 0xCE4B;
    hash
}

#[must_use]
pub fn verify_password(password: &str, hash: u16) -> bool {
    hash_password(password) == hash
}

/// Format a hash the way `workbookPassword` stores it
#[must_use]
pub fn format_hash(hash: u16) -> String {
    format!("{:04X}", hash)
}

/// Parse a `workbookPassword` attribute value; `0000` means unprotected
#[must_use]
pub fn parse_hash(value: &str) -> Option<u16> {
    u16::from_str_radix(value.trim(), 16)
        .ok()
        .filter(|hash| *hash != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_hashes() {
        assert_eq!(format_hash(hash_password("password")), "83AF");
        assert_eq!(format_hash(hash_password("test")), "CBEB");
        assert_eq!(hash_password(""), 0xCE4B);
    }

    #[test]
    fn test_truncates_to_15_characters() {
        assert_eq!(
            hash_password("abcdefghijklmno"),
            hash_password("abcdefghijklmnopqrst")
        );
    }

    #[test]
    fn test_rotation_stays_within_15_bits() {
        for ch in ['a', 'Z', '~', '\u{7FFF}', '\u{FFFF}'] {
            let mixed = hash_password(&ch.to_string()) ^ 1 ^ 0xCE4B;
            assert!(mixed <= 0x7FFF, "{ch:?} leaked into bit 15");
        }
    }

    #[test]
    fn test_verify() {
        let hash = hash_password("secret");
        assert!(verify_password("secret", hash));
        assert!(!verify_password("Secret", hash));
    }

    #[test]
    fn test_parse_hash() {
        assert_eq!(parse_hash("83AF"), Some(0x83AF));
        assert_eq!(parse_hash("83af"), Some(0x83AF));
        assert_eq!(parse_hash("0000"), None);
        assert_eq!(parse_hash("zz"), None);
    }
}
