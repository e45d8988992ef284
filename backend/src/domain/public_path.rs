//! Canonical language-prefixed public paths.
//!
//! Every public page lives under `/en/...` or `/id/...`. Links shared in chat
//! apps and old bookmarks arrive in many broken shapes (`/en/en/market`,
//! `/idmarket`, `//id//faq/`), so the frontend asks for the canonical form and
//! redirects when it differs.
//!
//! ## Invariants
//! - Normalisation is idempotent: feeding a canonical path back in returns the
//!   same [`NormalizedPath`].
//! - The first language prefix found wins; later duplicates are dropped.
//! - Paths without a language default to English.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::Language;

/// Route slugs that may appear glued to a language prefix (`/idmarket`).
pub const PUBLIC_ROUTE_SLUGS: &[&str] = &[
    "market",
    "presale",
    "dao",
    "transparency",
    "faq",
    "whitepaper",
    "roadmap",
    "tokenomics",
    "legal",
    "privacy",
    "terms",
    "login",
    "signup",
    "member",
    "admin",
    "verified",
    "fund",
    "news",
    "docs",
];

static SLASH_RUNS: OnceLock<Regex> = OnceLock::new();
static LANGUAGE_SEGMENT: OnceLock<Regex> = OnceLock::new();
static GLUED_PREFIX: OnceLock<Regex> = OnceLock::new();

fn slash_runs() -> &'static Regex {
    SLASH_RUNS.get_or_init(|| compile(r"/{2,}"))
}

fn language_segment() -> &'static Regex {
    LANGUAGE_SEGMENT.get_or_init(|| compile(r"(?i)^/(en|id)(?:/|$)"))
}

fn glued_prefix() -> &'static Regex {
    GLUED_PREFIX.get_or_init(|| compile(r"(?i)^/(en|id)([a-z0-9-]+)(/.*)?$"))
}

#[expect(
    clippy::expect_used,
    reason = "patterns are compile-time literals covered by unit tests"
)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("public path pattern must compile")
}

/// Result of normalising a raw pathname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPath {
    language: Language,
    rest: String,
    canonical: String,
}

impl NormalizedPath {
    /// Language taken from the path, or English when none was present.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Path below the language prefix; empty or starting with `/`.
    pub fn rest(&self) -> &str {
        self.rest.as_str()
    }

    /// Canonical `/{lang}{rest}` form.
    pub fn canonical(&self) -> &str {
        self.canonical.as_str()
    }

    /// Same page in another language.
    ///
    /// # Examples
    /// ```
    /// use tpc_backend::domain::{Language, normalize_public_path};
    ///
    /// let path = normalize_public_path("/en/market");
    /// assert_eq!(path.with_language(Language::Id), "/id/market");
    /// ```
    pub fn with_language(&self, language: Language) -> String {
        format!("/{}{}", language.code(), self.rest)
    }
}

/// Normalise a raw pathname into its canonical language-prefixed form.
///
/// # Examples
/// ```
/// use tpc_backend::domain::normalize_public_path;
///
/// assert_eq!(normalize_public_path("/en/en/market").canonical(), "/en/market");
/// assert_eq!(normalize_public_path("/idmarket").canonical(), "/id/market");
/// assert_eq!(normalize_public_path("/").canonical(), "/en");
/// ```
pub fn normalize_public_path(raw: &str) -> NormalizedPath {
    let mut rest = clean(raw);
    let mut language = None;

    loop {
        if let Some((found, remainder)) = strip_language_segment(&rest) {
            language.get_or_insert(found);
            rest = remainder;
            continue;
        }
        if let Some((found, remainder)) = split_glued_prefix(&rest) {
            language.get_or_insert(found);
            rest = remainder;
            continue;
        }
        break;
    }

    let language = language.unwrap_or_default();
    let canonical = format!("/{}{}", language.code(), rest);
    NormalizedPath {
        language,
        rest,
        canonical,
    }
}

/// Whether `raw` must be redirected to its canonical form.
///
/// Query strings and fragments are ignored for the comparison.
pub fn needs_redirect(raw: &str) -> bool {
    path_only(raw) != normalize_public_path(raw).canonical()
}

fn path_only(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.find(['?', '#']) {
        Some(index) => trimmed.get(..index).unwrap_or(trimmed),
        None => trimmed,
    }
}

/// Collapse slashes, force a leading slash and drop the trailing one.
///
/// Trailing whitespace and slashes are stripped together: `/market /` would
/// otherwise keep a blank last segment that a second pass trims away. The
/// root path becomes the empty string so the remainder invariant (empty or
/// `/`-prefixed) holds from the start.
fn clean(raw: &str) -> String {
    let path = path_only(raw);
    let with_leading = format!("/{path}");
    let collapsed = slash_runs().replace_all(&with_leading, "/");
    collapsed
        .trim_end_matches(|c: char| c == '/' || c.is_whitespace())
        .to_owned()
}

fn parse_language(code: &str) -> Option<Language> {
    code.parse().ok()
}

fn strip_language_segment(path: &str) -> Option<(Language, String)> {
    let captures = language_segment().captures(path)?;
    let language = parse_language(captures.get(1)?.as_str())?;
    let consumed = captures.get(0)?.end();
    let after = path.get(consumed..).unwrap_or_default();
    let remainder = if after.is_empty() {
        String::new()
    } else {
        format!("/{after}")
    };
    Some((language, remainder))
}

fn split_glued_prefix(path: &str) -> Option<(Language, String)> {
    let captures = glued_prefix().captures(path)?;
    let slug = captures.get(2)?.as_str();
    if !PUBLIC_ROUTE_SLUGS.contains(&slug.to_ascii_lowercase().as_str()) {
        return None;
    }
    let language = parse_language(captures.get(1)?.as_str())?;
    let tail = captures.get(3).map_or("", |m| m.as_str());
    Some((language, format!("/{slug}{tail}")))
}
