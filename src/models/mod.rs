pub mod certificate;
pub mod course;
pub mod newsletter;
pub mod progress;
pub mod service;
pub mod settings;
pub mod student;
pub mod user;

/// Case-insensitive substring match used by every list filter.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Query values such as `all`, `ALL` or an empty string mean "no filter".
pub fn filter_value(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_and_blank_disable_filter() {
        assert_eq!(filter_value(Some("ALL")), None);
        assert_eq!(filter_value(Some("  ")), None);
        assert_eq!(filter_value(None), None);
        assert_eq!(filter_value(Some("Hair")), Some("Hair"));
    }

    #[test]
    fn search_ignores_case() {
        assert!(contains_ignore_case("Bridal Makeup", "makeup"));
        assert!(!contains_ignore_case("Gel Manicure", "hair"));
    }
}
