//! Source path resolution against an optional `sourceRoot`.
//!
//! Resolution is a pure function of its two inputs, applied on demand; the
//! raw `sources` array of a map always keeps its serialized form.
//!
//! Rules, in order:
//!
//! 1. No root (absent or empty), or the raw source already starts with the
//!    normalized root prefix: return the raw source unchanged (minus a
//!    leading `./`).
//! 2. A raw source that is itself absolute (leading `/`, a `proto://`
//!    scheme, or a protocol-relative `//host`) is never prefixed.
//! 3. Otherwise join: strip one trailing `/` from the root, strip a leading
//!    `./` from the raw source, concatenate with a single `/`.

/// Return true for paths that must never be prefixed with a `sourceRoot`.
///
/// Recognizes a leading `/` (which also covers protocol-relative `//host`
/// forms) and URL schemes such as `https://` or `webpack://`.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || has_scheme(path)
}

/// True if `path` begins with `scheme://` where `scheme` is a non-empty run
/// of ASCII alphanumerics, `+`, `-`, or `.`.
fn has_scheme(path: &str) -> bool {
    let Some(idx) = path.find("://") else {
        return false;
    };
    idx > 0
        && path[..idx]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Resolve one raw `sources` entry against the map's `sourceRoot`.
pub fn resolve_source(source_root: Option<&str>, raw_source: &str) -> String {
    let raw = strip_dot_slash(raw_source);

    let Some(root) = source_root.filter(|r| !r.is_empty()) else {
        return raw.to_string();
    };
    if is_absolute(raw) {
        return raw.to_string();
    }

    let root = root.strip_suffix('/').unwrap_or(root);

    // Already resolved against this root (idempotence).
    if raw == root || (raw.starts_with(root) && raw[root.len()..].starts_with('/')) {
        return raw.to_string();
    }

    format!("{root}/{raw}")
}

fn strip_dot_slash(s: &str) -> &str {
    s.strip_prefix("./").unwrap_or(s)
}
