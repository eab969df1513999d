//! Path canonicalization.
//!
//! The gate and the application must agree on which path a request names.
//! Before any classification the path is reduced to one canonical spelling:
//!
//! ```text
//! /%61dmin/users         → /admin/users     (escaped unreserved bytes decoded)
//! //admin//users         → /admin/users     (empty segments collapsed)
//! /api/../admin/users    → /admin/users     (dot segments resolved)
//! /api/%2e%2e/admin      → /admin
//! /home/                 → /home/           (trailing slash kept)
//! ```
//!
//! Only unreserved characters and `/` are decoded, so the result never holds a
//! new escape and canonicalizing twice yields the same path.

use std::borrow::Cow;

/// Canonical spelling of `path`. Borrows when `path` is already canonical.
///
/// Paths not starting with `/` (e.g. `*` in `OPTIONS *`) are returned as is.
pub fn canonical_path(path: &str) -> Cow<'_, str> {
    if !path.starts_with('/') || is_canonical(path) {
        return Cow::Borrowed(path);
    }
    let decoded = decode_unreserved(path);
    Cow::Owned(remove_dot_segments(&decoded))
}

fn is_canonical(path: &str) -> bool {
    !path.contains('%')
        && !path.contains("//")
        && !path.split('/').any(|s| s == "." || s == "..")
}

/// Decode `%XX` escapes of unreserved characters and `/`. Everything else,
/// including malformed escapes, is kept verbatim.
fn decode_unreserved(path: &str) -> Cow<'_, str> {
    if !path.contains('%') {
        return Cow::Borrowed(path);
    }

    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                let byte = (hi << 4) | lo;
                if is_unreserved(byte) || byte == b'/' {
                    out.push(byte);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    // Only ASCII bytes were substituted, so the output stays valid UTF-8.
    match String::from_utf8(out) {
        Ok(decoded) => Cow::Owned(decoded),
        Err(_) => Cow::Borrowed(path),
    }
}

fn hex(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

/// Resolve `.` and `..`, drop empty segments. `..` never climbs above the root.
fn remove_dot_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let trailing = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    let mut out = String::with_capacity(path.len());
    for segment in &segments {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() || trailing {
        out.push('/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_paths_are_borrowed() {
        for path in ["/", "/admin/users", "/home/", "/_next/static/app.js", "*"] {
            assert!(matches!(canonical_path(path), Cow::Borrowed(p) if p == path));
        }
    }

    #[test]
    fn test_decodes_unreserved_escapes() {
        assert_eq!(canonical_path("/%61dmin/users"), "/admin/users");
        assert_eq!(canonical_path("/%41dmin"), "/Admin");
        assert_eq!(canonical_path("/admin%2Fusers"), "/admin/users");
        assert_eq!(canonical_path("/w%7Eord"), "/w~ord");
    }

    #[test]
    fn test_keeps_reserved_and_malformed_escapes() {
        assert_eq!(canonical_path("/caf%C3%A9"), "/caf%C3%A9");
        assert_eq!(canonical_path("/a%3Fb"), "/a%3Fb");
        assert_eq!(canonical_path("/a%252e%252e/b"), "/a%252e%252e/b");
        assert_eq!(canonical_path("/a%zz"), "/a%zz");
        assert_eq!(canonical_path("/a%2"), "/a%2");
        assert_eq!(canonical_path("/a%"), "/a%");
    }

    #[test]
    fn test_collapses_empty_segments() {
        assert_eq!(canonical_path("//admin/users"), "/admin/users");
        assert_eq!(canonical_path("/admin//users"), "/admin/users");
        assert_eq!(canonical_path("//"), "/");
    }

    #[test]
    fn test_resolves_dot_segments() {
        assert_eq!(canonical_path("/api/../admin/users"), "/admin/users");
        assert_eq!(canonical_path("/api/%2e%2e/admin/users"), "/admin/users");
        assert_eq!(canonical_path("/api/.%2E/admin"), "/admin");
        assert_eq!(canonical_path("/./home"), "/home");
        assert_eq!(canonical_path("/../../admin"), "/admin");
        assert_eq!(canonical_path("/home/.."), "/");
        assert_eq!(canonical_path("/home/a/.."), "/home/");
        assert_eq!(canonical_path("/home/."), "/home/");
    }

    #[test]
    fn test_is_idempotent() {
        for path in [
            "/%61dmin//users/",
            "/api/%2e%2e/admin",
            "/a%252e/b",
            "/x/%2F%2F/../y",
        ] {
            let once = canonical_path(path).into_owned();
            assert_eq!(canonical_path(&once), once.as_str());
        }
    }
}
