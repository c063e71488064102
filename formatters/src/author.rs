use crate::ANONYMOUS_LABEL;

const SEPARATOR: char = '|';

/// Turn a stored `"<Name|Neighbor>|<Street>"` attribution into display text.
///
/// Labels that do not carry exactly one separator are returned as-is, so
/// already-formatted text passes through unchanged.
pub fn format_author_label(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
        return ANONYMOUS_LABEL.to_string();
    };

    let Some((name, street)) = raw.split_once(SEPARATOR) else {
        return raw.to_string();
    };
    if street.contains(SEPARATOR) {
        return raw.to_string();
    }

    let name = name.trim();
    let street = street.trim();

    let who = if name.is_empty() || name == ANONYMOUS_LABEL {
        ANONYMOUS_LABEL.to_string()
    } else {
        short_name(name)
    };

    if street.is_empty() {
        who
    } else {
        format!("{who} on {street}")
    }
}

fn short_name(name: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    match tokens.as_slice() {
        [first, .., last] => match last.chars().next() {
            Some(initial) => format!("{first} {initial}."),
            None => (*first).to_string(),
        },
        [only] => (*only).to_string(),
        [] => ANONYMOUS_LABEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_label_is_anonymous() {
        assert_eq!(format_author_label(None), "Neighbor");
        assert_eq!(format_author_label(Some("")), "Neighbor");
    }

    #[test]
    fn real_name_is_shortened_to_last_initial() {
        assert_eq!(
            format_author_label(Some("John Smith|Oak St")),
            "John S. on Oak St"
        );
        assert_eq!(
            format_author_label(Some("Mary Ann Lee|Birch Ln")),
            "Mary L. on Birch Ln"
        );
    }

    #[test]
    fn single_token_name_is_kept_whole() {
        assert_eq!(format_author_label(Some("Cher|Pine Ave")), "Cher on Pine Ave");
        assert_eq!(format_author_label(Some("Cher|")), "Cher");
    }

    #[test]
    fn anonymous_name_uses_street_when_present() {
        assert_eq!(
            format_author_label(Some("Neighbor|Elm St")),
            "Neighbor on Elm St"
        );
        assert_eq!(format_author_label(Some("|Elm St")), "Neighbor on Elm St");
        assert_eq!(format_author_label(Some("Neighbor|")), "Neighbor");
        assert_eq!(format_author_label(Some("|")), "Neighbor");
    }

    #[test]
    fn real_name_without_street_drops_suffix() {
        assert_eq!(format_author_label(Some("Jane Doe|")), "Jane D.");
    }

    #[test]
    fn labels_without_exactly_one_separator_pass_through() {
        assert_eq!(format_author_label(Some("NoSeparator")), "NoSeparator");
        assert_eq!(format_author_label(Some("a|b|c")), "a|b|c");
    }

    #[test]
    fn formatted_output_is_stable() {
        let once = format_author_label(Some("Jane Doe|Oak St"));
        assert_eq!(once, "Jane D. on Oak St");
        assert_eq!(format_author_label(Some(&once)), once);
    }
}
