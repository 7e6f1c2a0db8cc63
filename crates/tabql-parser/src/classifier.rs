//! Constant-time character classification.
//!
//! The lexer dispatches on the class of the character under the cursor, so
//! every byte of every query passes through [`classify_byte`].

/// Coarse character category used for scan-routine dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    Whitespace,
    IdentStart,
    Digit,
    /// `'`
    Quote,
    /// Operators and punctuation that never combine with the next character.
    Single,
    /// `<`, `>`, `=`, `!`: may start a two-character operator.
    Ambiguous,
    /// `#`
    Hash,
    /// `-`
    Dash,
    /// `/`
    Slash,
    /// `.`
    Dot,
    /// `[`
    Bracket,
    /// `:`
    Colon,
    Unknown,
}

#[rustfmt::skip]
const CHAR_CLASSES: [CharClass; 128] = {
    let mut t = [CharClass::Unknown; 128];
    t[b' ' as usize] = CharClass::Whitespace;
    t[b'\t' as usize] = CharClass::Whitespace;
    t[b'\n' as usize] = CharClass::Whitespace;
    t[b'\r' as usize] = CharClass::Whitespace;
    t[0x0B] = CharClass::Whitespace;
    t[0x0C] = CharClass::Whitespace;
    let mut i = b'a'; while i <= b'z' { t[i as usize] = CharClass::IdentStart; i += 1; }
    let mut i = b'A'; while i <= b'Z' { t[i as usize] = CharClass::IdentStart; i += 1; }
    t[b'_' as usize] = CharClass::IdentStart;
    let mut i = b'0'; while i <= b'9' { t[i as usize] = CharClass::Digit; i += 1; }
    t[b'\'' as usize] = CharClass::Quote;
    t[b'+' as usize] = CharClass::Single;
    t[b'*' as usize] = CharClass::Single;
    t[b'%' as usize] = CharClass::Single;
    t[b'&' as usize] = CharClass::Single;
    t[b'|' as usize] = CharClass::Single;
    t[b'^' as usize] = CharClass::Single;
    t[b',' as usize] = CharClass::Single;
    t[b';' as usize] = CharClass::Single;
    t[b'(' as usize] = CharClass::Single;
    t[b')' as usize] = CharClass::Single;
    t[b'{' as usize] = CharClass::Single;
    t[b'}' as usize] = CharClass::Single;
    t[b']' as usize] = CharClass::Single;
    t[b'<' as usize] = CharClass::Ambiguous;
    t[b'>' as usize] = CharClass::Ambiguous;
    t[b'=' as usize] = CharClass::Ambiguous;
    t[b'!' as usize] = CharClass::Ambiguous;
    t[b'#' as usize] = CharClass::Hash;
    t[b'-' as usize] = CharClass::Dash;
    t[b'/' as usize] = CharClass::Slash;
    t[b'.' as usize] = CharClass::Dot;
    t[b'[' as usize] = CharClass::Bracket;
    t[b':' as usize] = CharClass::Colon;
    t
};

/// Classify an ASCII byte. Bytes of multi-byte characters map to
/// [`CharClass::Unknown`]; use [`classify`] for those.
#[inline]
#[must_use]
pub const fn classify_byte(b: u8) -> CharClass {
    if b < 128 {
        CHAR_CLASSES[b as usize]
    } else {
        CharClass::Unknown
    }
}

/// Classify any character. Non-ASCII letters start identifiers and
/// non-ASCII whitespace is whitespace.
#[inline]
#[must_use]
pub fn classify(ch: char) -> CharClass {
    if ch.is_ascii() {
        classify_byte(ch as u8)
    } else if ch.is_alphabetic() {
        CharClass::IdentStart
    } else if ch.is_whitespace() {
        CharClass::Whitespace
    } else {
        CharClass::Unknown
    }
}

/// Whether `ch` may continue an identifier.
#[inline]
#[must_use]
pub fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || (!ch.is_ascii() && ch.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_categories() {
        assert_eq!(classify_byte(b' '), CharClass::Whitespace);
        assert_eq!(classify_byte(b'\n'), CharClass::Whitespace);
        assert_eq!(classify_byte(b'a'), CharClass::IdentStart);
        assert_eq!(classify_byte(b'Z'), CharClass::IdentStart);
        assert_eq!(classify_byte(b'_'), CharClass::IdentStart);
        assert_eq!(classify_byte(b'7'), CharClass::Digit);
        assert_eq!(classify_byte(b'\''), CharClass::Quote);
        assert_eq!(classify_byte(b'<'), CharClass::Ambiguous);
        assert_eq!(classify_byte(b'!'), CharClass::Ambiguous);
        assert_eq!(classify_byte(b'#'), CharClass::Hash);
        assert_eq!(classify_byte(b'-'), CharClass::Dash);
        assert_eq!(classify_byte(b'/'), CharClass::Slash);
        assert_eq!(classify_byte(b'.'), CharClass::Dot);
        assert_eq!(classify_byte(b'['), CharClass::Bracket);
        assert_eq!(classify_byte(b']'), CharClass::Single);
        assert_eq!(classify_byte(b':'), CharClass::Colon);
        assert_eq!(classify_byte(b'?'), CharClass::Unknown);
        assert_eq!(classify_byte(b'"'), CharClass::Unknown);
    }

    #[test]
    fn test_non_ascii_fallback() {
        assert_eq!(classify('é'), CharClass::IdentStart);
        assert_eq!(classify('Ж'), CharClass::IdentStart);
        assert_eq!(classify('\u{00A0}'), CharClass::Whitespace);
        assert_eq!(classify('→'), CharClass::Unknown);
        assert_eq!(classify_byte(0xC3), CharClass::Unknown);
    }

    #[test]
    fn test_ident_continue() {
        assert!(is_ident_continue('a'));
        assert!(is_ident_continue('9'));
        assert!(is_ident_continue('_'));
        assert!(is_ident_continue('ö'));
        assert!(!is_ident_continue('.'));
        assert!(!is_ident_continue('['));
    }
}
