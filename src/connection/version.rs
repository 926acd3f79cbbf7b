//! Server version handling.
//!
//! The cluster's REST protocol changed shape at 3.5.0, so the driver needs a
//! properly ordered version value rather than a string comparison.

use crate::error::ConnectionError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A dotted-numeric server version such as `3.5.0`.
///
/// Segments are compared left to right as integers; missing trailing segments
/// count as zero, so `3.5` equals `3.5.0` and `3.10.0` orders above `3.5.0`.
#[derive(Debug, Clone)]
pub struct ServerVersion {
    segments: Vec<u64>,
}

impl PartialEq for ServerVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ServerVersion {}

/// Shape of the token-acquisition request, decided once from the version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRequestStyle {
    /// Graph name travels as a URL query parameter; the body is empty.
    /// Used by servers older than 3.5.0.
    QueryParameter,
    /// Graph name travels as a JSON body `{"graph": "<name>"}`.
    /// Used by servers at 3.5.0 and newer.
    JsonBody,
}

impl ServerVersion {
    /// The protocol baseline at which the token request switched to a JSON body.
    pub const BASELINE: &'static str = "3.5.0";

    /// The version assumed when the configuration does not specify one.
    pub fn baseline() -> Self {
        Self {
            segments: vec![3, 5, 0],
        }
    }

    /// Select the token-request strategy for this version.
    pub fn token_request_style(&self) -> TokenRequestStyle {
        if *self < Self::baseline() {
            TokenRequestStyle::QueryParameter
        } else {
            TokenRequestStyle::JsonBody
        }
    }

    /// The numeric segments of this version.
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }
}

impl Default for ServerVersion {
    fn default() -> Self {
        Self::baseline()
    }
}

impl FromStr for ServerVersion {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ConnectionError::InvalidParameter {
                parameter: "version".to_string(),
                message: "Version must not be empty".to_string(),
            });
        }

        let segments = trimmed
            .split('.')
            .map(|segment| {
                segment
                    .parse::<u64>()
                    .map_err(|_| ConnectionError::InvalidParameter {
                        parameter: "version".to_string(),
                        message: format!("Invalid version segment '{}' in '{}'", segment, trimmed),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }
}

impl PartialOrd for ServerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServerVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ServerVersion {
        s.parse().unwrap()
    }

    #[test]
    fn test_equal_versions() {
        assert_eq!(v("3.5.0"), v("3.5.0"));
        assert_eq!(v("3.5.0").cmp(&v("3.5.0")), Ordering::Equal);
    }

    #[test]
    fn test_less_than_baseline() {
        assert!(v("3.4.9") < v("3.5.0"));
        assert!(v("2.6.3") < v("3.5.0"));
    }

    #[test]
    fn test_numeric_not_lexical_comparison() {
        // "3.10.0" sorts below "3.5.0" lexically; numerically it is greater.
        assert!(v("3.10.0") > v("3.5.0"));
    }

    #[test]
    fn test_missing_trailing_segments_are_zero() {
        assert_eq!(v("3.5"), v("3.5.0"));
        assert!(v("3") < v("3.5"));
        assert!(v("3.5.0.1") > v("3.5"));
    }

    #[test]
    fn test_default_is_baseline() {
        assert_eq!(ServerVersion::default(), v(ServerVersion::BASELINE));
    }

    #[test]
    fn test_token_request_style_branching() {
        assert_eq!(
            v("3.4.9").token_request_style(),
            TokenRequestStyle::QueryParameter
        );
        assert_eq!(v("3.5.0").token_request_style(), TokenRequestStyle::JsonBody);
        assert_eq!(v("3.5.1").token_request_style(), TokenRequestStyle::JsonBody);
        assert_eq!(v("4.1").token_request_style(), TokenRequestStyle::JsonBody);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<ServerVersion>().is_err());
        assert!("3.5.x".parse::<ServerVersion>().is_err());
        assert!("latest".parse::<ServerVersion>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(v("3.10.0").to_string(), "3.10.0");
        assert_eq!(v("3.5").to_string(), "3.5");
    }
}
