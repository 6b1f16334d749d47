//! Identifier mangling.
//!
//! Turns arbitrary names ("Example, Inc!!", "root.test", "*.example.com") into
//! lowercase, filesystem-safe tokens. The same function names trust store files
//! and distinguished-name sections, so it is the join key between a CA name
//! given on the command line and the files on disk.

use regex::Regex;
use std::sync::LazyLock;

static NON_WORD_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("Invalid regex"));
static LEADING_NON_LETTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^A-Za-z]+").expect("Invalid regex"));
static TRAILING_NON_LETTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z]+$").expect("Invalid regex"));

/// Mangle a name into a storage identifier.
///
/// Runs of non-word characters collapse to a single underscore, then any
/// leading and trailing non-letters are trimmed and the result is lowercased.
///
/// # Example
///
/// ```
/// use certiffix::template::mangle::mangle;
///
/// assert_eq!(mangle("root.test"), "root_test");
/// assert_eq!(mangle("Example, Inc!!"), "example_inc");
/// ```
pub fn mangle(name: &str) -> String {
    let collapsed = NON_WORD_RUN.replace_all(name, "_");
    let trimmed = LEADING_NON_LETTERS.replace(&collapsed, "");
    let trimmed = TRAILING_NON_LETTERS.replace(&trimmed, "");
    trimmed.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mangle_dns_name() {
        assert_eq!(mangle("root.test"), "root_test");
        assert_eq!(mangle("svc.test"), "svc_test");
        assert_eq!(mangle("api.dev.example.com"), "api_dev_example_com");
    }

    #[test]
    fn test_mangle_is_deterministic() {
        let first = mangle("Example, Inc!!");
        for _ in 0..10 {
            assert_eq!(mangle("Example, Inc!!"), first);
        }
        assert_eq!(first, "example_inc");
    }

    #[test]
    fn test_mangle_trims_non_letters() {
        assert_eq!(mangle("*.example.com"), "example_com");
        assert_eq!(mangle("123abc456"), "abc");
        assert_eq!(mangle("__name__"), "name");
    }

    #[test]
    fn test_mangle_keeps_inner_digits_and_underscores() {
        assert_eq!(mangle("web01.local"), "web01_local");
        assert_eq!(mangle("my_host.test"), "my_host_test");
    }

    #[test]
    fn test_mangle_composite_master_name() {
        assert_eq!(mangle("Acme Corp:svc.test"), "acme_corp_svc_test");
    }

    #[test]
    fn test_mangle_empty_and_symbol_only() {
        assert_eq!(mangle(""), "");
        assert_eq!(mangle("!!!"), "");
        assert_eq!(mangle("127.0.0.1"), "");
    }
}
