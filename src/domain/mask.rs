//! Deterministic masking of sensitive values for reports and logs.
//!
//! Masking is a pure function of the value. Counting is done in `char`s so
//! multi-byte text never splits inside a code point.

/// Character used for obscured positions.
pub const MASK_CHAR: char = '*';

/// Fixed run inserted between the visible boundary characters.
const MASK_RUN: &str = "***";

/// Values shorter than this are masked completely.
const MIN_PARTIAL_LEN: usize = 5;

/// Email fragments shorter than this are masked completely.
const MIN_FRAGMENT_LEN: usize = 4;

/// Masks a sensitive value.
///
/// - email-shaped values mask local part and domain name separately,
///   keeping the `@` and the final `.tld`
/// - values of 5+ characters keep the first 2 and last 2 characters
/// - shorter values are fully masked, length preserved
///
/// ```
/// use redactai::domain::mask;
///
/// assert_eq!(mask("John Doe"), "Jo***oe");
/// assert_eq!(mask("john@email.com"), "jo***n@em***l.com");
/// assert_eq!(mask("ab"), "**");
/// ```
pub fn mask(value: &str) -> String {
    if let Some((local, domain)) = split_email(value) {
        return mask_email(local, domain);
    }

    let chars: Vec<char> = value.chars().collect();
    if chars.len() < MIN_PARTIAL_LEN {
        return full_mask(chars.len());
    }

    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{MASK_RUN}{tail}")
}

/// Returns `(local, domain)` if the value has exactly one `@` with
/// non-empty parts on both sides.
pub fn split_email(value: &str) -> Option<(&str, &str)> {
    if value.matches('@').count() != 1 {
        return None;
    }
    let (local, domain) = value.split_once('@')?;
    if local.is_empty() || domain.is_empty() {
        return None;
    }
    Some((local, domain))
}

fn mask_email(local: &str, domain: &str) -> String {
    let masked_domain = match domain.rsplit_once('.') {
        Some((name, tld)) if !name.is_empty() && !tld.is_empty() => {
            format!("{}.{}", mask_fragment(name), tld)
        }
        _ => mask_fragment(domain),
    };
    format!("{}@{}", mask_fragment(local), masked_domain)
}

fn mask_fragment(fragment: &str) -> String {
    let chars: Vec<char> = fragment.chars().collect();
    if chars.len() < MIN_FRAGMENT_LEN {
        return full_mask(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    format!("{head}{MASK_RUN}{}", chars[chars.len() - 1])
}

fn full_mask(len: usize) -> String {
    std::iter::repeat(MASK_CHAR).take(len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_masking() {
        assert_eq!(mask("John Doe"), "Jo***oe");
        assert_eq!(mask("555-123-4567"), "55***67");
        assert_eq!(mask("abcde"), "ab***de");
    }

    #[test]
    fn test_short_values_fully_masked() {
        assert_eq!(mask("ab"), "**");
        assert_eq!(mask("abcd"), "****");
        assert_eq!(mask(""), "");
    }

    #[test]
    fn test_email_masking() {
        assert_eq!(mask("john@email.com"), "jo***n@em***l.com");
        assert_eq!(mask("sarah.johnson@company.co.uk"), "sa***n@co***o.uk");
    }

    #[test]
    fn test_email_short_fragments() {
        assert_eq!(mask("al@x.io"), "**@*.io");
        assert_eq!(mask("john@localhost"), "jo***n@lo***t");
    }

    #[test]
    fn test_not_email_shaped() {
        // Two '@' falls back to the generic rule
        assert_eq!(mask("a@b@example"), "a@***le");
        assert_eq!(mask("@handle"), "@h***le");
        assert!(split_email("name@").is_none());
    }

    #[test]
    fn test_multibyte_values() {
        assert_eq!(mask("Zoë Ångström"), "Zo***öm");
        assert_eq!(mask("Ñuño"), "****");
    }
}
