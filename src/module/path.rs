//! Import path validation
//!
//! An import path is a slash-separated list of elements:
//! - no leading or trailing slash, no empty elements
//! - elements use ASCII letters, digits and `-._~+`
//! - elements may not start or end with a dot, or consist only of dots
//! - elements may not be reserved Windows device names (`con`, `nul`, `com1`, ...)

use thiserror::Error;

/// Error type for import path validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportPathError {
    #[error("empty string")]
    Empty,

    #[error("leading slash")]
    LeadingSlash,

    #[error("leading dash")]
    LeadingDash,

    #[error("trailing slash")]
    TrailingSlash,

    #[error("double slash")]
    DoubleSlash,

    #[error("invalid char {ch:?} in element {elem:?}")]
    InvalidChar { ch: char, elem: String },

    #[error("element {0:?} is all dots")]
    DotsOnly(String),

    #[error("leading dot in path element {0:?}")]
    LeadingDot(String),

    #[error("trailing dot in path element {0:?}")]
    TrailingDot(String),

    #[error("{0:?} disallowed as path element component on Windows")]
    Reserved(String),

    #[error("trailing tilde and digits in path element {0:?}")]
    ShortName(String),
}

const RESERVED_WINDOWS_NAMES: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Checks that `path` is a well-formed import path.
pub fn check_import_path(path: &str) -> Result<(), ImportPathError> {
    if path.is_empty() {
        return Err(ImportPathError::Empty);
    }
    if path.starts_with('/') {
        return Err(ImportPathError::LeadingSlash);
    }
    if path.starts_with('-') {
        return Err(ImportPathError::LeadingDash);
    }
    if path.contains("//") {
        return Err(ImportPathError::DoubleSlash);
    }
    if path.ends_with('/') {
        return Err(ImportPathError::TrailingSlash);
    }

    path.split('/').try_for_each(check_element)
}

fn is_import_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '+')
}

fn check_element(elem: &str) -> Result<(), ImportPathError> {
    if elem.chars().all(|c| c == '.') {
        return Err(ImportPathError::DotsOnly(elem.to_string()));
    }
    if elem.starts_with('.') {
        return Err(ImportPathError::LeadingDot(elem.to_string()));
    }
    if elem.ends_with('.') {
        return Err(ImportPathError::TrailingDot(elem.to_string()));
    }
    if let Some(ch) = elem.chars().find(|c| !is_import_path_char(*c)) {
        return Err(ImportPathError::InvalidChar {
            ch,
            elem: elem.to_string(),
        });
    }

    // Windows disallows device names even with an extension (e.g. "con.txt")
    let short = elem.split('.').next().unwrap_or(elem);
    if RESERVED_WINDOWS_NAMES
        .iter()
        .any(|name| short.eq_ignore_ascii_case(name))
    {
        return Err(ImportPathError::Reserved(elem.to_string()));
    }

    // 8.3 short names such as "PROGRA~1"
    if let Some(tilde) = short.rfind('~') {
        let suffix = &short[tilde + 1..];
        if tilde > 0 && !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
            return Err(ImportPathError::ShortName(elem.to_string()));
        }
    }

    Ok(())
}

/// Splits a trailing major-version suffix off `path`.
///
/// Returns `(prefix, path_major, ok)`:
/// - `example.com/foo/v2` -> `("example.com/foo", "/v2", true)`
/// - `example.com/foo` -> `("example.com/foo", "", true)`
/// - `gopkg.in/yaml.v2` -> `("gopkg.in/yaml", ".v2", true)`
///
/// `ok` is false when the suffix looks like a major version but is not a
/// legal one (`/v1`, `/v0`, `/v02`, `/v2.1`); the path is then returned whole.
pub fn split_path_version(path: &str) -> (&str, &str, bool) {
    if path.starts_with("gopkg.in/") {
        return split_gopkg_in(path);
    }

    let bytes = path.as_bytes();
    let mut i = bytes.len();
    let mut dot = false;
    while i > 0 && (bytes[i - 1].is_ascii_digit() || bytes[i - 1] == b'.') {
        if bytes[i - 1] == b'.' {
            dot = true;
        }
        i -= 1;
    }
    if i <= 1 || i == bytes.len() || bytes[i - 1] != b'v' || bytes[i - 2] != b'/' {
        return (path, "", true);
    }

    let (prefix, path_major) = path.split_at(i - 2);
    if dot || path_major.len() <= 2 || path_major.as_bytes()[2] == b'0' || path_major == "/v1" {
        return (path, "", false);
    }
    (prefix, path_major, true)
}

fn split_gopkg_in(path: &str) -> (&str, &str, bool) {
    let bytes = path.as_bytes();
    let mut i = path.strip_suffix("-unstable").unwrap_or(path).len();
    while i > 0 && bytes[i - 1].is_ascii_digit() {
        i -= 1;
    }
    if i <= 1 || bytes[i - 1] != b'v' || bytes[i - 2] != b'.' {
        return (path, "", false);
    }

    let (prefix, path_major) = path.split_at(i - 2);
    if path_major.len() <= 2 || (path_major.as_bytes()[2] == b'0' && path_major != ".v0") {
        return (path, "", false);
    }
    (prefix, path_major, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("github.com/user/repo")]
    #[case("golang.org/x/text")]
    #[case("fmt")]
    #[case("example.com/foo/v2")]
    #[case("gopkg.in/yaml.v2")]
    #[case("example.com/a-b_c~d+e")]
    fn check_import_path_accepts_valid_paths(#[case] path: &str) {
        assert_eq!(check_import_path(path), Ok(()));
    }

    #[rstest]
    #[case("", ImportPathError::Empty)]
    #[case("/foo", ImportPathError::LeadingSlash)]
    #[case("-foo", ImportPathError::LeadingDash)]
    #[case("foo/", ImportPathError::TrailingSlash)]
    #[case("foo//bar", ImportPathError::DoubleSlash)]
    #[case("foo/../bar", ImportPathError::DotsOnly("..".to_string()))]
    #[case("foo/.git", ImportPathError::LeadingDot(".git".to_string()))]
    #[case("foo/bar.", ImportPathError::TrailingDot("bar.".to_string()))]
    #[case("foo/b@r", ImportPathError::InvalidChar { ch: '@', elem: "b@r".to_string() })]
    #[case("foo/b r", ImportPathError::InvalidChar { ch: ' ', elem: "b r".to_string() })]
    #[case("foo/CON", ImportPathError::Reserved("CON".to_string()))]
    #[case("foo/nul.txt", ImportPathError::Reserved("nul.txt".to_string()))]
    #[case("foo/PROGRA~1", ImportPathError::ShortName("PROGRA~1".to_string()))]
    fn check_import_path_rejects_invalid_paths(
        #[case] path: &str,
        #[case] expected: ImportPathError,
    ) {
        assert_eq!(check_import_path(path), Err(expected));
    }

    #[rstest]
    #[case("example.com/foo", ("example.com/foo", "", true))]
    #[case("example.com/foo/v2", ("example.com/foo", "/v2", true))]
    #[case("example.com/foo/v10", ("example.com/foo", "/v10", true))]
    #[case("example.com/foo/v1", ("example.com/foo/v1", "", false))]
    #[case("example.com/foo/v0", ("example.com/foo/v0", "", false))]
    #[case("example.com/foo/v02", ("example.com/foo/v02", "", false))]
    #[case("example.com/foo/v2.1", ("example.com/foo/v2.1", "", false))]
    #[case("example.com/foov2", ("example.com/foov2", "", true))]
    #[case("gopkg.in/yaml.v2", ("gopkg.in/yaml", ".v2", true))]
    #[case("gopkg.in/yaml.v0", ("gopkg.in/yaml", ".v0", true))]
    #[case("gopkg.in/check.v1-unstable", ("gopkg.in/check", ".v1-unstable", true))]
    #[case("gopkg.in/yaml", ("gopkg.in/yaml", "", false))]
    fn split_path_version_returns_expected(
        #[case] path: &str,
        #[case] expected: (&str, &str, bool),
    ) {
        assert_eq!(split_path_version(path), expected);
    }
}
