//! Client-side URL validation.
//!
//! Submissions are checked here before anything touches the network.

use url::Url;

use crate::ValidationError;

/// Validates user input as an absolute URL.
///
/// Leading and trailing whitespace is ignored. Blank input is
/// [`ValidationError::Empty`]; anything that does not parse as an absolute
/// URL is [`ValidationError::Invalid`].
///
/// ```rust
/// use urlsum_core::{ValidationError, validate_url};
///
/// assert!(validate_url("https://example.com").is_ok());
/// assert_eq!(validate_url("   "), Err(ValidationError::Empty));
/// assert_eq!(validate_url("not a url"), Err(ValidationError::Invalid));
/// ```
pub fn validate_url(input: &str) -> Result<Url, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    Url::parse(trimmed).map_err(|_| ValidationError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn test_blank_input_is_empty(#[case] input: &str) {
        assert_eq!(validate_url(input), Err(ValidationError::Empty));
    }

    #[rstest]
    #[case("not a url")]
    #[case("example.com")]
    #[case("http://")]
    #[case("/relative/path")]
    fn test_malformed_input_is_invalid(#[case] input: &str) {
        assert_eq!(validate_url(input), Err(ValidationError::Invalid));
    }

    #[rstest]
    #[case("https://example.com", "https://example.com/")]
    #[case("  https://news.ycombinator.com  ", "https://news.ycombinator.com/")]
    #[case("http://localhost:8000/a?b=c", "http://localhost:8000/a?b=c")]
    fn test_valid_input(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate_url(input).unwrap().as_str(), expected);
    }
}
