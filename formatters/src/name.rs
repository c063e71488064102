use crate::ANONYMOUS_LABEL;

/// `"Jane Doe"` becomes `"Jane D."`; single names are returned unchanged.
pub fn format_name_with_last_initial(full_name: &str) -> String {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    match tokens.as_slice() {
        [] => ANONYMOUS_LABEL.to_string(),
        [only] => (*only).to_string(),
        [first, .., last] => match last.chars().next() {
            Some(initial) => format!("{first} {initial}."),
            None => (*first).to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_names_are_anonymous() {
        assert_eq!(format_name_with_last_initial(""), "Neighbor");
        assert_eq!(format_name_with_last_initial("   \t"), "Neighbor");
    }

    #[test]
    fn shortens_to_last_initial() {
        assert_eq!(format_name_with_last_initial("Jane Doe"), "Jane D.");
        assert_eq!(format_name_with_last_initial("  Jane   Q  Public "), "Jane P.");
    }

    #[test]
    fn single_token_is_unchanged() {
        assert_eq!(format_name_with_last_initial("Madonna"), "Madonna");
    }

    #[test]
    fn reformatting_is_a_no_op() {
        assert_eq!(format_name_with_last_initial("Jane D."), "Jane D.");
    }
}
