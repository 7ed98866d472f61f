//! `/`-separated path handling for the container namespace.
//!
//! Paths are case-sensitive, rooted at `/`, and support `.` (self) and `..`
//! (parent) segments. `..` at the root saturates: `/..` resolves to `/`.

use crate::error::TypeError;

/// Resolve `path` against the canonical absolute path `base`.
///
/// An absolute `path` ignores `base` entirely. The result is canonical: it
/// starts with `/`, contains no `.`/`..`/empty segments, and has no trailing
/// slash (except the root itself).
///
/// # Examples
///
/// ```
/// use arca_types::path::normalize;
///
/// assert_eq!(normalize("/", "a/b"), "/a/b");
/// assert_eq!(normalize("/a/b", ".."), "/a");
/// assert_eq!(normalize("/a", "/x/./y"), "/x/y");
/// assert_eq!(normalize("/", "../.."), "/");
/// ```
pub fn normalize(base: &str, path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    let segments: Vec<&str> = if path.starts_with('/') {
        path.split('/').collect()
    } else {
        base.split('/').chain(path.split('/')).collect()
    };
    for seg in segments {
        match seg {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            s => stack.push(s),
        }
    }
    if stack.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", stack.join("/"))
    }
}

/// Split a canonical path into its non-empty segments.
pub fn split(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Validate a single entry name for use inside a group.
///
/// Names must be non-empty, must not contain `/`, and must not be the
/// reserved `.`/`..` segments.
pub fn validate_name(name: &str) -> Result<(), TypeError> {
    if name.is_empty() {
        return Err(TypeError::InvalidName {
            name: name.to_string(),
            reason: "name must not be empty".into(),
        });
    }
    if name.contains('/') {
        return Err(TypeError::InvalidName {
            name: name.to_string(),
            reason: "name must not contain '/'".into(),
        });
    }
    if name == "." || name == ".." {
        return Err(TypeError::InvalidName {
            name: name.to_string(),
            reason: "name must not be a relative segment".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn absolute_ignores_base() {
        assert_eq!(normalize("/deep/down", "/top"), "/top");
    }

    #[test]
    fn relative_appends_to_base() {
        assert_eq!(normalize("/a", "b/c"), "/a/b/c");
    }

    #[test]
    fn dot_segments_collapse() {
        assert_eq!(normalize("/a", "./b/./c/."), "/a/b/c");
    }

    #[test]
    fn dotdot_pops() {
        assert_eq!(normalize("/a/b/c", ".."), "/a/b");
        assert_eq!(normalize("/a/b", "../x"), "/a/x");
    }

    #[test]
    fn dotdot_saturates_at_root() {
        assert_eq!(normalize("/", ".."), "/");
        assert_eq!(normalize("/a", "../../.."), "/");
    }

    #[test]
    fn empty_segments_ignored() {
        assert_eq!(normalize("/", "a//b"), "/a/b");
        assert_eq!(normalize("/", ""), "/");
    }

    #[test]
    fn split_segments() {
        assert_eq!(split("/a/b/c"), vec!["a", "b", "c"]);
        assert!(split("/").is_empty());
    }

    #[test]
    fn name_validation() {
        assert!(validate_name("mean").is_ok());
        assert!(validate_name("with space").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name(".").is_err());
        assert!(validate_name("..").is_err());
    }

    proptest! {
        /// Normalization is idempotent: resolving a canonical path against
        /// the root yields the same path.
        #[test]
        fn normalize_idempotent(segs in prop::collection::vec("[a-z]{1,6}", 0..6)) {
            let path = format!("/{}", segs.join("/"));
            let once = normalize("/", &path);
            let twice = normalize("/", &once);
            prop_assert_eq!(once, twice);
        }

        /// A normalized path never contains relative or empty segments.
        #[test]
        fn normalize_canonical(
            base in "(/[a-z]{1,4}){0,3}",
            path in "\\.{0,2}(/?[a-z.]{0,4}){0,4}",
        ) {
            let base = if base.is_empty() { "/".to_string() } else { base };
            let out = normalize(&base, &path);
            prop_assert!(out.starts_with('/'));
            for seg in split(&out) {
                prop_assert!(!seg.is_empty());
                prop_assert_ne!(seg, ".");
                prop_assert_ne!(seg, "..");
            }
        }
    }
}
