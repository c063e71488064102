/// Render a US phone number as `(AAA) PPP-LLLL`.
///
/// Anything that does not reduce to ten US digits (emails, short codes,
/// international numbers) is returned untouched.
pub fn format_us_phone_display(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    if raw.chars().any(|c| c.is_alphabetic() || c == '@') {
        return raw.to_string();
    }

    if let Some(national) = raw.strip_prefix("+1")
        && national.len() == 10
        && national.bytes().all(|b| b.is_ascii_digit())
    {
        return group_digits(national);
    }

    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let national = match digits.strip_prefix('1') {
        Some(rest) if digits.len() == 11 => rest,
        _ => digits.as_str(),
    };

    if national.len() == 10 {
        group_digits(national)
    } else {
        raw.to_string()
    }
}

fn group_digits(national: &str) -> String {
    let (area, rest) = national.split_at(3);
    let (prefix, line) = rest.split_at(3);
    format!("({area}) {prefix}-{line}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_ten_digits() {
        assert_eq!(format_us_phone_display("5551234567"), "(555) 123-4567");
        assert_eq!(format_us_phone_display("555.123.4567"), "(555) 123-4567");
        assert_eq!(format_us_phone_display("555-123-4567"), "(555) 123-4567");
    }

    #[test]
    fn drops_leading_country_code() {
        assert_eq!(format_us_phone_display("15551234567"), "(555) 123-4567");
        assert_eq!(format_us_phone_display("1 (555) 123-4567"), "(555) 123-4567");
    }

    #[test]
    fn formats_e164() {
        assert_eq!(format_us_phone_display("+15551234567"), "(555) 123-4567");
    }

    #[test]
    fn leaves_non_phone_text_alone() {
        assert_eq!(format_us_phone_display("not-a-phone@x"), "not-a-phone@x");
        assert_eq!(format_us_phone_display("call me"), "call me");
        assert_eq!(format_us_phone_display("123"), "123");
        assert_eq!(format_us_phone_display("25551234567"), "25551234567");
        assert_eq!(format_us_phone_display("+445551234567"), "+445551234567");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(format_us_phone_display(""), "");
    }

    #[test]
    fn formatted_output_is_stable() {
        let once = format_us_phone_display("5551234567");
        assert_eq!(format_us_phone_display(&once), once);
    }
}
