//! Address parsing and route classification.
//!
//! # Responsibility
//! - Parse `content://<authority>/<path>` addresses into a canonical form.
//! - Classify an address as collection, item or unrecognized.
//!
//! # Invariants
//! - A `RouteTable` is immutable once handed to the provider.
//! - Classification is total and deterministic: the first registered pattern
//!   that matches wins, otherwise the address is `Route::Unrecognized`.

use crate::contract::{CONTENT_SCHEME, PATH_PETS};
use crate::model::pet::PetId;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Parsed, canonical content address.
///
/// Query strings, fragments and empty path segments are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentAddress {
    authority: String,
    segments: Vec<String>,
}

impl ContentAddress {
    /// Parses `raw`. Returns `None` for a foreign scheme or empty authority.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let (scheme, rest) = trimmed.split_once("://")?;
        if !scheme.eq_ignore_ascii_case(CONTENT_SCHEME) {
            return None;
        }

        let rest = rest
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        if authority.is_empty() {
            return None;
        }

        Some(Self {
            authority: authority.to_string(),
            segments: path
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Path segments joined with `/`, without a leading slash.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// Returns whether `self` equals, contains or is contained by `other`.
    ///
    /// Used to scope change notifications: `pets` and `pets/4` are related,
    /// `pets/4` and `pets/5` are not.
    pub fn is_related_to(&self, other: &ContentAddress) -> bool {
        if self.authority != other.authority {
            return false;
        }
        let shared = self.segments.len().min(other.segments.len());
        self.segments[..shared] == other.segments[..shared]
    }
}

impl Display for ContentAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{CONTENT_SCHEME}://{}", self.authority)?;
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Shape a registered pattern resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Collection,
    Item,
}

/// Classification result for one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Collection,
    Item(PetId),
    Unrecognized,
}

/// Route registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    InvalidAuthority(String),
    InvalidPattern { pattern: String, message: String },
}

impl Display for RouteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAuthority(value) => write!(f, "route authority is invalid: `{value}`"),
            Self::InvalidPattern { pattern, message } => {
                write!(f, "route pattern `{pattern}` is invalid: {message}")
            }
        }
    }
}

impl Error for RouteError {}

#[derive(Debug)]
struct RoutePattern {
    authority: String,
    matcher: Regex,
    kind: RouteKind,
}

/// Ordered set of address patterns.
///
/// Pattern syntax follows path segments: `#` matches one numeric segment,
/// everything else matches literally.
#[derive(Debug, Default)]
pub struct RouteTable {
    patterns: Vec<RoutePattern>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the standard table: `pets` (collection) and `pets/#` (item).
    pub fn for_authority(authority: &str) -> Result<Self, RouteError> {
        let mut table = Self::new();
        table.register(authority, PATH_PETS, RouteKind::Collection)?;
        table.register(authority, &format!("{PATH_PETS}/#"), RouteKind::Item)?;
        Ok(table)
    }

    /// Registers one pattern.
    ///
    /// `Item` patterns must contain exactly one `#` segment carrying the id.
    pub fn register(
        &mut self,
        authority: &str,
        pattern: &str,
        kind: RouteKind,
    ) -> Result<(), RouteError> {
        let authority = authority.trim();
        if authority.is_empty() || authority.contains(['/', '?', '#']) {
            return Err(RouteError::InvalidAuthority(authority.to_string()));
        }

        let matcher = compile_pattern(pattern, kind)?;
        self.patterns.push(RoutePattern {
            authority: authority.to_string(),
            matcher,
            kind,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Classifies a parsed address.
    pub fn classify(&self, address: &ContentAddress) -> Route {
        let path = address.path();
        for pattern in &self.patterns {
            if pattern.authority != address.authority() {
                continue;
            }
            let Some(captures) = pattern.matcher.captures(&path) else {
                continue;
            };
            match pattern.kind {
                RouteKind::Collection => return Route::Collection,
                RouteKind::Item => {
                    // Digits that overflow the id type fall through to later patterns.
                    if let Some(id) = captures
                        .get(1)
                        .and_then(|value| value.as_str().parse::<PetId>().ok())
                    {
                        return Route::Item(id);
                    }
                }
            }
        }
        Route::Unrecognized
    }

    /// Parses and classifies a raw address string.
    pub fn classify_str(&self, raw: &str) -> Route {
        ContentAddress::parse(raw).map_or(Route::Unrecognized, |address| self.classify(&address))
    }
}

fn compile_pattern(pattern: &str, kind: RouteKind) -> Result<Regex, RouteError> {
    let invalid = |message: &str| RouteError::InvalidPattern {
        pattern: pattern.to_string(),
        message: message.to_string(),
    };

    let segments = pattern
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>();
    if segments.is_empty() {
        return Err(invalid("pattern has no path segments"));
    }

    let id_segments = segments.iter().filter(|segment| **segment == "#").count();
    match kind {
        RouteKind::Item if id_segments != 1 => {
            return Err(invalid("item routes need exactly one `#` segment"));
        }
        RouteKind::Collection if id_segments != 0 => {
            return Err(invalid("collection routes cannot capture an id"));
        }
        _ => {}
    }

    let body = segments
        .iter()
        .map(|segment| match *segment {
            "#" => "([0-9]+)".to_string(),
            literal => regex::escape(literal),
        })
        .collect::<Vec<_>>()
        .join("/");

    Regex::new(&format!("^{body}$")).map_err(|err| invalid(&err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{ContentAddress, Route, RouteError, RouteKind, RouteTable};

    fn table() -> RouteTable {
        RouteTable::for_authority("com.example.petstore").expect("standard routes compile")
    }

    #[test]
    fn parse_drops_query_fragment_and_empty_segments() {
        let address = ContentAddress::parse("content://com.example.petstore//pets/4/?x=1#top")
            .expect("address should parse");
        assert_eq!(address.authority(), "com.example.petstore");
        assert_eq!(address.path(), "pets/4");
        assert_eq!(address.to_string(), "content://com.example.petstore/pets/4");
    }

    #[test]
    fn parse_rejects_foreign_scheme_and_missing_authority() {
        assert!(ContentAddress::parse("https://com.example.petstore/pets").is_none());
        assert!(ContentAddress::parse("content:///pets").is_none());
        assert!(ContentAddress::parse("pets").is_none());
    }

    #[test]
    fn classify_matches_collection_and_item() {
        let routes = table();
        assert_eq!(
            routes.classify_str("content://com.example.petstore/pets"),
            Route::Collection
        );
        assert_eq!(
            routes.classify_str("content://com.example.petstore/pets/42"),
            Route::Item(42)
        );
    }

    #[test]
    fn classify_rejects_unknown_shapes() {
        let routes = table();
        for raw in [
            "content://com.example.petstore",
            "content://com.example.petstore/owners",
            "content://com.example.petstore/pets/abc",
            "content://com.example.petstore/pets/-1",
            "content://com.example.petstore/pets/1/toys",
            "content://com.example.petstore/pets/99999999999999999999",
            "content://other.authority/pets",
            "not an address",
        ] {
            assert_eq!(routes.classify_str(raw), Route::Unrecognized, "{raw}");
        }
    }

    #[test]
    fn related_addresses_share_a_path_prefix() {
        let collection = ContentAddress::parse("content://a/pets").expect("parse");
        let item = ContentAddress::parse("content://a/pets/4").expect("parse");
        let other_item = ContentAddress::parse("content://a/pets/5").expect("parse");
        let other_authority = ContentAddress::parse("content://b/pets/4").expect("parse");

        assert!(collection.is_related_to(&item));
        assert!(item.is_related_to(&collection));
        assert!(!item.is_related_to(&other_item));
        assert!(!item.is_related_to(&other_authority));
    }

    #[test]
    fn register_validates_authority_and_pattern_shape() {
        let mut routes = RouteTable::new();
        assert!(matches!(
            routes.register("", "pets", RouteKind::Collection),
            Err(RouteError::InvalidAuthority(_))
        ));
        assert!(matches!(
            routes.register("a", "pets", RouteKind::Item),
            Err(RouteError::InvalidPattern { .. })
        ));
        assert!(matches!(
            routes.register("a", "pets/#", RouteKind::Collection),
            Err(RouteError::InvalidPattern { .. })
        ));
        assert!(routes.is_empty());
    }
}
