//! URL handling against the configured backend origin

use url::Url;

/// Endpoint URL for `name` under the origin, keeping any origin path prefix.
///
/// `http://host:8000` + `convert` -> `http://host:8000/convert`
/// `http://host/api` + `convert` -> `http://host/api/convert`
pub fn endpoint(origin: &Url, name: &str) -> Result<Url, url::ParseError> {
    let mut base = origin.clone();
    base.set_query(None);
    base.set_fragment(None);
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(name)
}

/// Resolve a backend-returned download reference (RFC 3986 §5).
///
/// Returns `None` when the reference cannot be parsed or lands on a
/// different origin than the backend that issued it.
pub fn resolve_download(origin: &Url, download_path: &str) -> Option<Url> {
    let resolved = origin.join(download_path.trim()).ok()?;
    (resolved.origin() == origin.origin()).then_some(resolved)
}

/// Origin rendered without the trailing slash `Url` adds to bare hosts
pub fn origin_label(origin: &Url) -> String {
    origin.as_str().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_endpoint_on_bare_origin() {
        let origin = url("http://127.0.0.1:8000");
        assert_eq!(
            endpoint(&origin, "convert").unwrap().as_str(),
            "http://127.0.0.1:8000/convert"
        );
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        assert_eq!(
            endpoint(&url("https://example.com/api"), "convert").unwrap().as_str(),
            "https://example.com/api/convert"
        );
        assert_eq!(
            endpoint(&url("https://example.com/api/"), "convert").unwrap().as_str(),
            "https://example.com/api/convert"
        );
    }

    #[test]
    fn test_resolve_absolute_path() {
        let origin = url("http://127.0.0.1:8000");
        let resolved = resolve_download(&origin, "/files/abc.mp3").unwrap();
        assert_eq!(resolved.as_str(), "http://127.0.0.1:8000/files/abc.mp3");
    }

    #[test]
    fn test_resolve_absolute_path_replaces_origin_path() {
        let origin = url("https://example.com/api/");
        let resolved = resolve_download(&origin, "/download/42").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/download/42");
    }

    #[test]
    fn test_resolve_relative_path_merges() {
        let origin = url("https://example.com/api/");
        let resolved = resolve_download(&origin, "download/42?token=x").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/api/download/42?token=x");
    }

    #[test]
    fn test_resolve_same_origin_absolute_url() {
        let origin = url("http://127.0.0.1:8000");
        let resolved = resolve_download(&origin, "http://127.0.0.1:8000/download/1").unwrap();
        assert_eq!(resolved.path(), "/download/1");
    }

    #[test]
    fn test_resolve_rejects_foreign_origin() {
        let origin = url("http://127.0.0.1:8000");
        assert!(resolve_download(&origin, "https://cdn.example.com/a.mp3").is_none());
        assert!(resolve_download(&origin, "//cdn.example.com/a.mp3").is_none());
        assert!(resolve_download(&origin, "http://127.0.0.1:9000/a.mp3").is_none());
    }

    #[test]
    fn test_origin_label() {
        assert_eq!(origin_label(&url("http://127.0.0.1:8000")), "http://127.0.0.1:8000");
        assert_eq!(origin_label(&url("https://example.com/api/")), "https://example.com/api");
    }
}
