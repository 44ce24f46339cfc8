//! Key-naming transform for error-map path segments
//!
//! Hosts usually serialize their types with a naming convention (`camelCase`
//! JSON, `snake_case` forms). Error keys should use the same spelling the
//! client sent, so every member segment passes through a [`KeyNaming`] before
//! it is appended to the error path. Index segments (`[2]`) are never renamed.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Custom segment transform.
pub type NamingFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Naming convention applied to member segments of error paths.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyNaming {
    /// Use member names exactly as declared.
    #[default]
    AsDeclared,
    /// `firstName`
    CamelCase,
    /// `first_name`
    SnakeCase,
    /// `first-name`
    KebabCase,
    /// `FirstName`
    PascalCase,
    /// Host-supplied transform. Not serializable.
    #[serde(skip)]
    Custom(NamingFn),
}

impl KeyNaming {
    /// Wraps a closure as a custom transform.
    pub fn custom(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Applies the convention to one member segment.
    #[must_use]
    pub fn apply(&self, segment: &str) -> String {
        match self {
            Self::AsDeclared => segment.to_owned(),
            Self::CamelCase => join_capitalized(&split_words(segment), false),
            Self::PascalCase => join_capitalized(&split_words(segment), true),
            Self::SnakeCase => join_lower(&split_words(segment), '_'),
            Self::KebabCase => join_lower(&split_words(segment), '-'),
            Self::Custom(f) => f(segment),
        }
    }

    /// Returns true if segments are used unchanged.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::AsDeclared)
    }
}

impl fmt::Debug for KeyNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AsDeclared => f.write_str("AsDeclared"),
            Self::CamelCase => f.write_str("CamelCase"),
            Self::SnakeCase => f.write_str("SnakeCase"),
            Self::KebabCase => f.write_str("KebabCase"),
            Self::PascalCase => f.write_str("PascalCase"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Splits an identifier into words at separators and case boundaries.
///
/// `"HTTPServerURL2"` becomes `["HTTP", "Server", "URL2"]`.
fn split_words(ident: &str) -> Vec<&str> {
    let mut words = Vec::new();
    for part in ident.split(['_', '-', ' ', '.']) {
        if part.is_empty() {
            continue;
        }
        let chars: Vec<(usize, char)> = part.char_indices().collect();
        let mut start = 0;
        for i in 1..chars.len() {
            let (idx, c) = chars[i];
            let prev = chars[i - 1].1;
            let next_is_lower = chars.get(i + 1).is_some_and(|(_, n)| n.is_lowercase());
            let boundary = c.is_uppercase()
                && (prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower));
            if boundary {
                words.push(&part[start..idx]);
                start = idx;
            }
        }
        words.push(&part[start..]);
    }
    words
}

fn join_lower(words: &[&str], sep: char) -> String {
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

fn join_capitalized(words: &[&str], capitalize_first: bool) -> String {
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        let mut chars = word.chars();
        let Some(first) = chars.next() else { continue };
        if i == 0 && !capitalize_first {
            out.extend(first.to_lowercase());
        } else {
            out.extend(first.to_uppercase());
        }
        out.extend(chars.flat_map(char::to_lowercase));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        let naming = KeyNaming::CamelCase;
        assert_eq!(naming.apply("FirstName"), "firstName");
        assert_eq!(naming.apply("first_name"), "firstName");
        assert_eq!(naming.apply("Zip"), "zip");
        assert_eq!(naming.apply("HTTPServer"), "httpServer");
    }

    #[test]
    fn test_snake_and_kebab_case() {
        assert_eq!(KeyNaming::SnakeCase.apply("BillingAddress"), "billing_address");
        assert_eq!(KeyNaming::KebabCase.apply("BillingAddress"), "billing-address");
        assert_eq!(KeyNaming::SnakeCase.apply("line2Text"), "line2_text");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(KeyNaming::PascalCase.apply("zip_code"), "ZipCode");
        assert_eq!(KeyNaming::PascalCase.apply("name"), "Name");
    }

    #[test]
    fn test_as_declared_and_custom() {
        assert_eq!(KeyNaming::AsDeclared.apply("Zip_Code"), "Zip_Code");
        let upper = KeyNaming::custom(str::to_uppercase);
        assert_eq!(upper.apply("zip"), "ZIP");
        assert_eq!(format!("{upper:?}"), "Custom(..)");
    }

    #[test]
    fn test_deserializes_from_snake_case_tag() {
        let naming: KeyNaming = serde_json::from_str("\"camel_case\"").unwrap();
        assert_eq!(naming.apply("ZipCode"), "zipCode");
    }
}
