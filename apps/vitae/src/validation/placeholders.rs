//! Placeholder deny-list. Template text that must never reach an emitted document.

const PLACEHOLDER_TOKENS: &[&str] = &[
    "your company name",
    "your city",
    "your full name",
    "professional title",
    "your website",
    "your linkedin",
    "your name",
    "company name",
    "your title",
    "your phone",
    "your email",
    "your address",
    "your job title",
    "your employment dates",
    "your location",
    "your responsibilities",
    "your achievements",
    "your skills",
    "your education",
    "your experience",
];

/// Returns the first deny-listed token found in `text`, case-insensitively.
pub fn find_placeholder(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    PLACEHOLDER_TOKENS
        .iter()
        .copied()
        .find(|token| lower.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_any_case() {
        assert_eq!(
            find_placeholder("YOUR Company Name, Austin, TX"),
            Some("your company name")
        );
    }

    #[test]
    fn test_detects_embedded_token() {
        assert_eq!(find_placeholder("Contact: your email here"), Some("your email"));
    }

    #[test]
    fn test_clean_text_passes() {
        assert_eq!(find_placeholder("Initech, Austin, TX"), None);
        assert_eq!(find_placeholder(""), None);
    }

    #[test]
    fn test_bare_company_name_caught() {
        assert_eq!(find_placeholder("Company Name Inc."), Some("company name"));
    }
}
