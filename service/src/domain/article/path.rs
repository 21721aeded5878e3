use std::sync::LazyLock;

use nutype::nutype;
use regex::Regex;

/// Stored path of the site home page.
pub const ROOT_PATH: &str = "root";

const PATH_SEPARATOR: char = '/';

/// Lower-cased, slash-trimmed page path. Empty input and `/` become [`ROOT_PATH`].
#[nutype(
    sanitize(with = |raw: String| normalize_url_path(&raw)),
    derive(
        Clone,
        Debug,
        Display,
        AsRef,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct UrlPath(String);

impl UrlPath {
    pub fn root() -> Self {
        Self::new(ROOT_PATH)
    }

    pub fn is_root(&self) -> bool {
        self.as_ref() == ROOT_PATH
    }
}

fn normalize_url_path(raw: &str) -> String {
    let trimmed = raw
        .trim_matches(|c| c == ' ' || c == PATH_SEPARATOR)
        .to_lowercase();
    if trimmed.is_empty() {
        ROOT_PATH.to_owned()
    } else {
        trimmed
    }
}

/// Path prefix of a table of contents query. The root prefix is empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPrefix(String);

impl PathPrefix {
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.to_lowercase().replace("%20", "_");
        let decoded = percent_decode(&lowered).replace(' ', "_");
        Self(decoded.trim_matches(PATH_SEPARATOR).to_owned())
    }

    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading text shared by every path below this prefix.
    pub fn descendant_start(&self) -> String {
        if self.is_root() {
            String::new()
        } else {
            format!("{}{}", self.0, PATH_SEPARATOR)
        }
    }

    /// True when `path` sits exactly one segment below this prefix.
    pub fn is_parent_of(&self, path: &UrlPath) -> bool {
        if path.is_root() {
            return false;
        }
        let prefix_segments = self.segments();
        let path_segments: Vec<&str> = path.as_ref().split(PATH_SEPARATOR).collect();
        path_segments.len() == prefix_segments.len() + 1
            && path_segments.starts_with(&prefix_segments)
    }

    fn segments(&self) -> Vec<&str> {
        if self.is_root() {
            Vec::new()
        } else {
            self.0.split(PATH_SEPARATOR).collect()
        }
    }
}

// form decoding splits on '&' and '=', so those are escaped first
fn percent_decode(raw: &str) -> String {
    let guarded = raw.replace('&', "%26").replace('=', "%3D");
    url::form_urlencoded::parse(guarded.as_bytes())
        .next()
        .map(|(decoded, _)| decoded.into_owned())
        .unwrap_or_default()
}

static LANGUAGE_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$")
        .expect("LANGUAGE_CODE_REGEX must be a valid regex")
});

fn is_language_code(code: &str) -> bool {
    LANGUAGE_CODE_REGEX.is_match(code)
}

/// BCP 47 style language tag such as `fr` or `en-US`.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 35, predicate = is_language_code),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn same_language(&self, other: &str) -> bool {
        self.as_ref().eq_ignore_ascii_case(other)
    }
}
