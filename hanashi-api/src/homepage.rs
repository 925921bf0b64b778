use regex::Regex;

lazy_static::lazy_static! {
    static ref HOMEPAGE_RE: Regex = Regex::new(
        r"(?i)^(https?|ftps?)://([a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}(:[0-9]{1,5})?(/\S*)?$"
    )
    .expect("homepage regex is valid");
}

/// Syntactic check of the optional homepage field; the empty string is valid
pub fn is_valid_homepage(value: &str) -> bool {
    value.is_empty() || HOMEPAGE_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts() {
        assert!(is_valid_homepage(""));
        assert!(is_valid_homepage("https://example.com"));
        assert!(is_valid_homepage("http://a.example.org:8080/some/path?q=1"));
        assert!(is_valid_homepage("FTPS://Files.Example.COM/"));
        assert!(is_valid_homepage("ftp://x.io"));
        assert!(is_valid_homepage("https://my-site.co.uk"));
    }

    #[test]
    fn rejects() {
        assert!(!is_valid_homepage("example.com"));
        assert!(!is_valid_homepage("mailto://example.com"));
        assert!(!is_valid_homepage("https://localhost"));
        assert!(!is_valid_homepage("https://-bad.com"));
        assert!(!is_valid_homepage("https://bad-.com"));
        assert!(!is_valid_homepage("https://example.c"));
        assert!(!is_valid_homepage("https://example.com:123456"));
        assert!(!is_valid_homepage("https://example.com/with space"));
        assert!(!is_valid_homepage(&format!("https://{}.com", "a".repeat(64))));
    }
}
