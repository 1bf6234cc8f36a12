use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Invalid link: {0}")]
    Invalid(#[from] url::ParseError),
    #[error("Refusing to open '{0}:' link")]
    UnsupportedScheme(String),
}

/// Parse an outbound record link, accepting only `http` and `https`.
///
/// Backend-supplied links go straight to the platform opener, so anything
/// else (`file:`, `javascript:`, custom handlers) is rejected.
pub fn validate_link(raw: &str) -> Result<Url, LinkError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(LinkError::UnsupportedScheme(scheme.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_links_accepted() {
        assert!(validate_link("https://remoteok.com/remote-jobs/1").is_ok());
        assert!(validate_link("http://localhost:5000/x").is_ok());
        assert!(validate_link("  https://example.com  ").is_ok());
    }

    #[test]
    fn test_other_schemes_rejected() {
        for raw in ["file:///etc/passwd", "javascript:alert(1)", "mailto:intel@example.com"] {
            assert!(
                matches!(validate_link(raw), Err(LinkError::UnsupportedScheme(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_placeholder_link_rejected() {
        assert!(matches!(validate_link("#"), Err(LinkError::Invalid(_))));
    }
}
