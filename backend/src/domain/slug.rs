//! Slug derivation for list names.
//!
//! Slugs appear in list URLs next to the short id. They are always derived
//! from the list name and never set independently, so the derivation must stay
//! byte-for-byte stable.

use std::sync::OnceLock;

use regex::Regex;

static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();
static HYPHEN_RUN_RE: OnceLock<Regex> = OnceLock::new();
static DISALLOWED_RE: OnceLock<Regex> = OnceLock::new();

fn compile(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("slug regex {pattern} failed to compile: {error}"))
    })
}

/// Derive a URL-safe slug from a list name.
///
/// Lowercases the name, replaces whitespace runs with a hyphen, collapses
/// hyphen runs, then strips anything that is not a lowercase ASCII letter,
/// digit or hyphen.
///
/// # Examples
/// ```
/// use lists::domain::slugify;
///
/// assert_eq!(slugify("My  New List!!"), "my-new-list");
/// ```
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let hyphenated = compile(&WHITESPACE_RE, r"\s+").replace_all(&lowered, "-");
    let collapsed = compile(&HYPHEN_RUN_RE, r"-+").replace_all(&hyphenated, "-");
    compile(&DISALLOWED_RE, r"[^0-9a-z-]+")
        .replace_all(&collapsed, "")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("My  New List!!", "my-new-list")]
    #[case("Groceries", "groceries")]
    #[case("Weekend -- chores", "weekend-chores")]
    #[case("Café run", "caf-run")]
    #[case("  padded  ", "-padded-")]
    #[case("2024 Plans", "2024-plans")]
    fn derives_expected_slugs(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(slugify(name), expected);
    }

    #[rstest]
    fn stripping_after_collapse_can_leave_adjacent_hyphens() {
        // Punctuation is removed after hyphen runs collapse.
        assert_eq!(slugify("a - ! - b"), "a--b");
    }
}
