//! URI rewriting against a route target.
//!
//! # Design Decisions
//! - Path join keeps exactly one slash between base path and request path
//! - Target query comes first, request query second
//! - Scheme and authority always come from the target

use axum::http::Uri;

use crate::routing::target::RouteTarget;

/// Join two path fragments with exactly one `/` between them.
pub fn single_joining_slash(a: &str, b: &str) -> String {
    let a_slash = a.ends_with('/');
    let b_slash = b.starts_with('/');
    match (a_slash, b_slash) {
        (true, true) => format!("{}{}", a, &b[1..]),
        (false, false) => format!("{}/{}", a, b),
        _ => format!("{}{}", a, b),
    }
}

/// Merge the target's fixed query with the request query.
pub fn merge_query(target: &str, request: &str) -> String {
    if target.is_empty() || request.is_empty() {
        format!("{}{}", target, request)
    } else {
        format!("{}&{}", target, request)
    }
}

/// Build the absolute URI for `uri` forwarded to `target`.
pub fn rewrite_uri(target: &RouteTarget, uri: &Uri) -> Result<Uri, axum::http::Error> {
    let path = single_joining_slash(target.base_path(), uri.path());
    let query = merge_query(target.query(), uri.query().unwrap_or(""));

    let path_and_query = if query.is_empty() {
        path
    } else {
        format!("{}?{}", path, query)
    };

    Uri::builder()
        .scheme(target.scheme())
        .authority(target.authority())
        .path_and_query(path_and_query)
        .build()
}
