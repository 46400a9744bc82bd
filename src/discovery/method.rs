//! HTTP method parsing from route file names.
//!
//! # Responsibilities
//! - Define the closed set of supported HTTP methods
//! - Parse `<routeName>.<method>` base names (no extension)
//! - Default to GET when no method suffix is present
//!
//! # Design Decisions
//! - Pure functions, no filesystem access
//! - The method suffix must be letters only; anything else is treated as
//!   part of the route name, not a malformed method
//! - An alphabetic suffix outside the fixed set is an error, so typos like
//!   `users.gte.rs` fail loudly instead of silently becoming GET routes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The fixed set of HTTP methods a route file may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    Connect,
}

impl HttpMethod {
    /// All members of the fixed set, in a stable order.
    pub const ALL: [HttpMethod; 9] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Trace,
        HttpMethod::Connect,
    ];

    /// Upper-case wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file name declared a method outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            "TRACE" => Ok(HttpMethod::Trace),
            "CONNECT" => Ok(HttpMethod::Connect),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

/// Parse a route file base name (no extension) into `(method, route name)`.
///
/// `users.post` parses to `(POST, "users")`. A base name without an
/// alphabetic method suffix, such as `users` or `report.v2`, defaults to
/// `(GET, <full base name>)`.
pub fn parse_base_name(base_name: &str) -> Result<(HttpMethod, &str), UnknownMethod> {
    if let Some((route_name, suffix)) = base_name.rsplit_once('.') {
        let looks_like_method = !route_name.is_empty()
            && !suffix.is_empty()
            && suffix.chars().all(|c| c.is_ascii_alphabetic())
            && !route_name.contains(['[', ' ', '\t']);

        if looks_like_method {
            return Ok((suffix.parse()?, route_name));
        }
    }

    Ok((HttpMethod::Get, base_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fixed_method_parses_case_insensitively() {
        for method in HttpMethod::ALL {
            let lower = format!("users.{}", method.as_str().to_ascii_lowercase());
            assert_eq!(parse_base_name(&lower).unwrap(), (method, "users"));

            let upper = format!("users.{}", method.as_str());
            assert_eq!(parse_base_name(&upper).unwrap(), (method, "users"));
        }
    }

    #[test]
    fn no_suffix_defaults_to_get() {
        assert_eq!(parse_base_name("users").unwrap(), (HttpMethod::Get, "users"));
        assert_eq!(parse_base_name("index").unwrap(), (HttpMethod::Get, "index"));
    }

    #[test]
    fn non_alphabetic_suffix_is_part_of_the_name() {
        assert_eq!(
            parse_base_name("report.v2").unwrap(),
            (HttpMethod::Get, "report.v2")
        );
    }

    #[test]
    fn alphabetic_suffix_outside_set_is_an_error() {
        let err = parse_base_name("users.fetch").unwrap_err();
        assert_eq!(err, UnknownMethod("FETCH".to_string()));
    }

    #[test]
    fn dotted_route_name_keeps_the_last_segment_as_method() {
        assert_eq!(
            parse_base_name("api.users.delete").unwrap(),
            (HttpMethod::Delete, "api.users")
        );
    }

    #[test]
    fn parameter_route_names_pass_through() {
        assert_eq!(parse_base_name("_id.get").unwrap(), (HttpMethod::Get, "_id"));
    }
}
