//! Category domain entity and slug derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Course category.
///
/// The slug is never supplied by clients; it is derived from the name at
/// write time so renames keep slug and name consistent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    #[schema(example = "Web Development")]
    pub name: String,
    /// URL-safe identifier derived from the name
    #[schema(example = "web-development")]
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Derive a URL-safe slug from a category name.
///
/// Lowercases the input, collapses every run of non-alphanumeric characters
/// into a single hyphen, and strips leading/trailing hyphens.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_lowercased() {
        assert_eq!(slugify("Web Development"), "web-development");
    }

    #[test]
    fn non_alphanumeric_runs_collapse_to_one_hyphen() {
        assert_eq!(slugify("Rust  &  Systems!! Programming"), "rust-systems-programming");
    }

    #[test]
    fn leading_and_trailing_separators_are_stripped() {
        assert_eq!(slugify("  --Data Science--  "), "data-science");
    }

    #[test]
    fn slug_contains_only_allowed_characters() {
        let inputs = ["C++ / CS 101", "Déjà Vu", "___", "A!B@C#D"];
        for input in inputs {
            let slug = slugify(input);
            assert!(
                slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "bad slug {:?} for {:?}",
                slug,
                input
            );
            assert!(!slug.starts_with('-'), "leading hyphen in {:?}", slug);
            assert!(!slug.ends_with('-'), "trailing hyphen in {:?}", slug);
        }
    }

    #[test]
    fn all_symbol_input_yields_empty_slug() {
        assert_eq!(slugify("!!!"), "");
    }
}
