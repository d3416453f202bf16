//! Blank-field checks for manifest and binding declarations

/// Return the trimmed value, or `None` when blank
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank_trims() {
        assert_eq!(non_blank(Some("  queue.name ")), Some("queue.name"));
        assert_eq!(non_blank(Some(" ")), None);
        assert_eq!(non_blank(Some("\t\n")), None);
        assert_eq!(non_blank(None), None);
    }
}
