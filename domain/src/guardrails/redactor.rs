//! PII redaction
//!
//! Patterns run in a fixed order, SSN then card number then email then phone,
//! so the looser phone pattern never eats part of an SSN or card number.

use regex::Regex;
use std::sync::LazyLock;

pub const SSN_PLACEHOLDER: &str = "[SSN]";
pub const CC_PLACEHOLDER: &str = "[CC]";
pub const EMAIL_PLACEHOLDER: &str = "[EMAIL]";
pub const PHONE_PLACEHOLDER: &str = "[PHONE]";

static SSN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("SSN is a compile-time constant")
});

static CREDIT_CARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{4}[-\s]?){3}\d{4}\b").expect("CREDIT_CARD is a compile-time constant")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
        .expect("EMAIL is a compile-time constant")
});

// Area code plus seven digits. Digit boundaries are checked in `redact_phones`
// since the regex crate has no lookaround.
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]\d{3}[-.\s]?\d{4}")
        .expect("PHONE is a compile-time constant")
});

/// Replace SSNs, card numbers, email addresses and phone numbers with
/// placeholder tokens.
pub fn redact(text: &str) -> String {
    let text = SSN.replace_all(text, SSN_PLACEHOLDER);
    let text = CREDIT_CARD.replace_all(&text, CC_PLACEHOLDER);
    let text = EMAIL.replace_all(&text, EMAIL_PLACEHOLDER);
    redact_phones(&text)
}

fn redact_phones(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut pos = 0;

    while let Some(m) = PHONE.find_at(text, pos) {
        let digit_before = text[..m.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit());
        let digit_after = text[m.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit());
        if digit_before || digit_after {
            // A shorter number may still start inside the rejected span.
            // Every match starts with an ASCII char, so +1 stays on a boundary.
            pos = m.start() + 1;
            continue;
        }
        out.push_str(&text[last..m.start()]);
        out.push_str(PHONE_PLACEHOLDER);
        last = m.end();
        pos = m.end();
    }

    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_email_phone_and_ssn() {
        let input = "Email john.doe@example.com or call 555-123-4567. SSN 123-45-6789.";
        let output = redact(input);
        assert_eq!(output, "Email [EMAIL] or call [PHONE]. SSN [SSN].");
    }

    #[test]
    fn test_seven_digit_product_code_untouched() {
        let input = "Product code 1234567, also SKU 555-1234";
        assert_eq!(redact(input), input);
    }

    #[test]
    fn test_credit_card_before_phone() {
        assert_eq!(redact("card 4111 1111 1111 1111 ok"), "card [CC] ok");
        assert_eq!(redact("card 4111-1111-1111-1111"), "card [CC]");
    }

    #[test]
    fn test_phone_shapes() {
        assert_eq!(redact("(555) 123-4567"), "[PHONE]");
        assert_eq!(redact("+1 555.123.4567"), "[PHONE]");
        assert_eq!(redact("call 555 1234567 now"), "call [PHONE] now");
    }

    #[test]
    fn test_phone_inside_longer_number_untouched() {
        let input = "order 9555-123-45678";
        assert_eq!(redact(input), input);
    }

    #[test]
    fn test_phone_after_number_ending_in_one() {
        assert_eq!(redact("Open 9-11 555-123-4567"), "Open 9-11 [PHONE]");
        assert_eq!(redact("Since 2021 555-123-4567"), "Since 2021 [PHONE]");
        assert_eq!(redact("Unit 11 (555) 123-4567"), "Unit 11 [PHONE]");
    }

    #[test]
    fn test_clean_text_unchanged() {
        let input = "Vintage leather jacket, size M, barely worn.";
        assert_eq!(redact(input), input);
    }
}
