// src/resolve.rs
// Request path to filesystem path translation

use std::path::{Component, Path, PathBuf};

/// Reserved prefix for static assets. The prefix segment is kept when
/// joining, so `/static/images/a.jpg` maps to `<root>/static/images/a.jpg`
/// and a real `static/` directory is expected in the document root.
pub const STATIC_PREFIX: &str = "/static/";

/// Outcome of translating a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Candidate filesystem path inside the document root. The file may or
    /// may not exist; existence is the handler's concern.
    File(PathBuf),
    /// The path would escape the document root.
    Forbidden,
}

/// Translate a raw request path into a filesystem path under `root`.
///
/// Rules, applied in order: percent-decode; a path under [`STATIC_PREFIX`]
/// joins the root literally (prefix preserved); anything else is normalized
/// component-wise. Both branches refuse paths that climb above the root.
pub fn resolve(root: &Path, raw_path: &str) -> Resolved {
    let decoded = percent_decode(raw_path);

    if decoded.starts_with(STATIC_PREFIX) {
        let relative = &decoded[1..];
        if contains_parent_segment(relative) {
            return Resolved::Forbidden;
        }
        return Resolved::File(root.join(relative));
    }

    match normalize_request_path(decoded.trim_start_matches('/')) {
        Some(relative) => Resolved::File(root.join(relative)),
        None => Resolved::Forbidden,
    }
}

fn percent_decode(path: &str) -> String {
    urlencoding::decode(path)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

fn contains_parent_segment(path: &str) -> bool {
    Path::new(path)
        .components()
        .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)))
}

/// Rebuild a request path from its components, popping on `..` and failing
/// once a pop would climb out of the (empty) root.
fn normalize_request_path(path: &str) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();

    for component in Path::new(path).components() {
        match component {
            Component::Prefix(_) => return None,
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return None;
                }
            }
            Component::Normal(segment) => normalized.push(segment),
        }
    }

    Some(normalized)
}
