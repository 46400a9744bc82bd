//! URL pattern construction from filesystem positions.
//!
//! # Responsibilities
//! - Rewrite `_name` segments as `:name` URL parameters
//! - Drop `index` segments and `index` route names from URLs
//! - Convert camel/Pascal route names to lower-kebab-case
//! - Normalize separators so every URL is an absolute, canonical path
//!
//! # Design Decisions
//! - Pure string functions; deterministic and idempotent
//! - Normalization goes through segment splitting, which collapses repeated
//!   separators and strips trailing ones in a single pass
//! - The empty URL is always the root `/`, never an empty string

/// Leading character that marks a segment as a named URL parameter.
pub const PARAM_MARKER: char = '_';

/// Reserved segment name that contributes nothing to the URL.
pub const INDEX_TOKEN: &str = "index";

/// Convert a camelCase or PascalCase name to lower-kebab-case.
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Rewrite a marker-prefixed segment (`_id`) as a parameter segment (`:id`).
pub fn convert_segment(segment: &str) -> String {
    match segment.strip_prefix(PARAM_MARKER) {
        Some(rest) => format!(":{rest}"),
        None => segment.to_string(),
    }
}

/// Normalize a raw path into a canonical absolute URL.
///
/// Backslashes become forward slashes, repeated separators collapse, any
/// trailing separator is stripped, and an empty result maps to `/`.
pub fn normalize_url(raw: &str) -> String {
    let segments: Vec<&str> = raw
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .collect();

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Build the URL pattern for a route file.
///
/// `module` is the first directory under the route root (absent for files
/// sitting directly in the root), `segments` are the remaining directories,
/// and `route_name` is the parsed name from the file's base name.
pub fn build_url_path(module: Option<&str>, segments: &[String], route_name: &str) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(segments.len() + 2);

    if let Some(module) = module {
        let converted = convert_segment(module);
        if converted != INDEX_TOKEN {
            parts.push(converted);
        }
    }

    for segment in segments {
        let converted = convert_segment(segment);
        if converted != INDEX_TOKEN {
            parts.push(converted);
        }
    }

    if route_name != INDEX_TOKEN {
        let converted = convert_segment(route_name);
        if converted.starts_with(':') {
            parts.push(converted);
        } else {
            parts.push(to_kebab_case(&converted));
        }
    }

    normalize_url(&format!("/{}", parts.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_case_conversion() {
        assert_eq!(to_kebab_case("getUserList"), "get-user-list");
        assert_eq!(to_kebab_case("Health"), "health");
        assert_eq!(to_kebab_case("plain"), "plain");
        assert_eq!(to_kebab_case(""), "");
    }

    #[test]
    fn marker_segments_become_parameters() {
        assert_eq!(convert_segment("_id"), ":id");
        assert_eq!(convert_segment("users"), "users");
    }

    #[test]
    fn normalization_collapses_and_strips() {
        assert_eq!(normalize_url("//users///:id/"), "/users/:id");
        assert_eq!(normalize_url("users\\profile"), "/users/profile");
        assert_eq!(normalize_url(""), "/");
        assert_eq!(normalize_url("///"), "/");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in ["//a//b/", "", "/x/y", "a\\b\\c/"] {
            let once = normalize_url(raw);
            assert_eq!(normalize_url(&once), once);
        }
    }

    #[test]
    fn normalized_urls_have_no_double_or_trailing_separator() {
        for raw in ["//a//b/", "a/b//c///", "/"] {
            let url = normalize_url(raw);
            assert!(!url.contains("//"), "double separator in {url:?}");
            assert!(url == "/" || !url.ends_with('/'), "trailing separator in {url:?}");
            assert!(url.starts_with('/'));
        }
    }

    #[test]
    fn url_from_module_and_route_name() {
        assert_eq!(build_url_path(Some("users"), &[], "list"), "/users/list");
        assert_eq!(
            build_url_path(Some("users"), &["profile".into()], "getAvatar"),
            "/users/profile/get-avatar"
        );
    }

    #[test]
    fn index_tokens_contribute_nothing() {
        assert_eq!(build_url_path(Some("index"), &[], "index"), "/");
        assert_eq!(build_url_path(None, &[], "index"), "/");
        assert_eq!(
            build_url_path(Some("users"), &["index".into()], "index"),
            "/users"
        );
    }

    #[test]
    fn parameter_route_name_becomes_url_parameter() {
        assert_eq!(build_url_path(Some("users"), &[], "_id"), "/users/:id");
        assert_eq!(
            build_url_path(Some("orders"), &["_orderId".into()], "items"),
            "/orders/:orderId/items"
        );
    }

    #[test]
    fn building_twice_yields_the_same_url() {
        let segments = vec!["_teamId".into(), "members".into()];
        let first = build_url_path(Some("orgs"), &segments, "invite");
        let second = build_url_path(Some("orgs"), &segments, "invite");
        assert_eq!(first, second);
        assert_eq!(first, "/orgs/:teamId/members/invite");
    }
}
