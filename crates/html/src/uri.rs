//! Link target checks.

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Returns true if `uri` is relative or uses an allowed scheme.
///
/// Control characters and whitespace inside the scheme are ignored before
/// checking, so `java\tscript:` is still rejected.
pub fn is_safe_uri(uri: &str) -> bool {
    let cleaned: String = uri
        .trim()
        .chars()
        .filter(|c| !c.is_control() && !c.is_whitespace())
        .collect();

    let Some(colon) = cleaned.find(':') else {
        return true;
    };
    // A ':' after the first path, query or fragment delimiter is not a scheme.
    if cleaned[..colon].contains(['/', '?', '#']) {
        return true;
    }
    let scheme = cleaned[..colon].to_ascii_lowercase();
    SAFE_SCHEMES.contains(&scheme.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed() {
        for uri in [
            "https://example.com",
            "HTTP://EXAMPLE.COM",
            "mailto:me@example.com",
            "tel:+15551234",
            "/projects/folio",
            "#contact",
            "?page=2",
            "docs/a:b",
        ] {
            assert!(is_safe_uri(uri), "{uri} should be allowed");
        }
    }

    #[test]
    fn test_rejected() {
        for uri in [
            "javascript:alert(1)",
            " JavaScript:alert(1)",
            "java\tscript:alert(1)",
            "data:text/html;base64,xyz",
            "vbscript:msgbox",
        ] {
            assert!(!is_safe_uri(uri), "{uri:?} should be rejected");
        }
    }
}
