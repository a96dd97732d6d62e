//! Page normalization and the tagged page representation.
//!
//! # Responsibility
//! - Zero-pad the numeric prefix of a page so that string order matches
//!   numeric order.
//! - Distinguish real page references from "moved to" redirect markers.
//!
//! # Invariants
//! - `normalize_page` is stable: normalizing a normalized page is a no-op.
//! - Everything after the numeric prefix is preserved verbatim.
//! - A stored numeric prefix never has more digits than its width, so string
//!   order matches numeric order.
//! - Redirect text is always `"moved to "` followed by the uppercased target.

use crate::config::PageFormatConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Prefix of every redirect marker's stored text.
pub const REDIRECT_PREFIX: &str = "moved to ";

const KIND_PAGE: &str = "page";
const KIND_REDIRECT: &str = "redirect";

static PAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^([0-9]+)(.*)$").expect("valid page regex"));

/// Errors raised when a raw page cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFormatError {
    /// Input was empty after trimming.
    Empty,
    /// Input does not start with a digit.
    MissingNumber(String),
    /// Numeric prefix does not fit in `u64`.
    NumberOutOfRange(String),
    /// Numeric prefix has more significant digits than the notebook type's
    /// page width.
    NumberTooWide { page: String, width: usize },
}

impl Display for PageFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "page cannot be empty"),
            Self::MissingNumber(raw) => {
                write!(f, "page `{raw}` does not start with a page number")
            }
            Self::NumberOutOfRange(raw) => write!(f, "page number in `{raw}` is too large"),
            Self::NumberTooWide { page, width } => {
                write!(f, "page `{page}` does not fit in {width} digits")
            }
        }
    }
}

impl Error for PageFormatError {}

/// A page reference as stored on an occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Page {
    /// A normalized page, e.g. `"012"`, `"012-14"`, `"012a"`.
    Number {
        /// Numeric prefix, used as the sort key.
        number: u64,
        /// Zero-padded text as stored and compared.
        text: String,
    },
    /// Breadcrumb left on an entry that was coalesced into another one.
    Redirect {
        /// Uppercased name of the entry the occurrences moved to.
        target: String,
        text: String,
    },
}

impl Page {
    /// Builds the redirect marker pointing at `target_name`.
    pub fn redirect_to(target_name: &str) -> Self {
        let target = target_name.to_uppercase();
        let text = format!("{REDIRECT_PREFIX}{target}");
        Self::Redirect { target, text }
    }

    /// Text stored in `occurrences.page`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Number { text, .. } | Self::Redirect { text, .. } => text.as_str(),
        }
    }

    /// Numeric sort key; `None` for redirect markers.
    pub fn number(&self) -> Option<u64> {
        match self {
            Self::Number { number, .. } => Some(*number),
            Self::Redirect { .. } => None,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    /// Value stored in `occurrences.page_kind`.
    pub(crate) fn kind_to_db(&self) -> &'static str {
        match self {
            Self::Number { .. } => KIND_PAGE,
            Self::Redirect { .. } => KIND_REDIRECT,
        }
    }

    /// Rebuilds a page from its stored columns.
    ///
    /// Returns `None` when the row does not describe a valid page.
    pub(crate) fn from_db(kind: &str, text: String) -> Option<Self> {
        match kind {
            KIND_PAGE => {
                let number = PAGE_RE
                    .captures(&text)
                    .and_then(|caps| caps.get(1))
                    .and_then(|digits| digits.as_str().parse::<u64>().ok())?;
                Some(Self::Number { number, text })
            }
            KIND_REDIRECT => {
                let target = text
                    .strip_prefix(REDIRECT_PREFIX)
                    .unwrap_or(text.as_str())
                    .to_string();
                Some(Self::Redirect { target, text })
            }
            _ => None,
        }
    }
}

impl Display for Page {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalizes a raw page identifier for `notebook_type`.
///
/// Leading zeros of the numeric prefix are dropped and the prefix is
/// left-padded to the configured width. The suffix (range end,
/// parenthetical, letters) is copied as is.
///
/// # Errors
/// - [`PageFormatError::Empty`] for blank input.
/// - [`PageFormatError::MissingNumber`] when the page has no numeric prefix.
/// - [`PageFormatError::NumberOutOfRange`] when the prefix overflows `u64`.
/// - [`PageFormatError::NumberTooWide`] when the prefix needs more digits
///   than the configured width.
pub fn normalize_page(
    raw_page: &str,
    notebook_type: &str,
    config: &PageFormatConfig,
) -> Result<Page, PageFormatError> {
    let trimmed = raw_page.trim();
    if trimmed.is_empty() {
        return Err(PageFormatError::Empty);
    }

    let caps = PAGE_RE
        .captures(trimmed)
        .ok_or_else(|| PageFormatError::MissingNumber(trimmed.to_string()))?;
    let digits = caps.get(1).map_or("", |m| m.as_str());
    let suffix = caps.get(2).map_or("", |m| m.as_str());

    let number = digits
        .parse::<u64>()
        .map_err(|_| PageFormatError::NumberOutOfRange(trimmed.to_string()))?;

    let significant = match digits.trim_start_matches('0') {
        "" => "0",
        rest => rest,
    };
    let width = config.width_for(notebook_type);
    if significant.len() > width {
        return Err(PageFormatError::NumberTooWide {
            page: trimmed.to_string(),
            width,
        });
    }
    let text = format!("{significant:0>width$}{suffix}");

    Ok(Page::Number { number, text })
}

/// Normalizes an integer page for `notebook_type`.
///
/// # Errors
/// - [`PageFormatError::NumberTooWide`] when `number` exceeds
///   [`max_page_number`].
pub fn normalize_page_number(
    number: u64,
    notebook_type: &str,
    config: &PageFormatConfig,
) -> Result<Page, PageFormatError> {
    let width = config.width_for(notebook_type);
    if number > max_page_number(notebook_type, config) {
        return Err(PageFormatError::NumberTooWide {
            page: number.to_string(),
            width,
        });
    }
    Ok(Page::Number {
        number,
        text: format!("{number:0>width$}"),
    })
}

/// Largest page number that fits the width configured for `notebook_type`.
pub fn max_page_number(notebook_type: &str, config: &PageFormatConfig) -> u64 {
    let width = config.width_for(notebook_type);
    u32::try_from(width)
        .ok()
        .and_then(|width| 10u64.checked_pow(width))
        .map_or(u64::MAX, |limit| limit - 1)
}

#[cfg(test)]
mod tests {
    use super::{max_page_number, normalize_page, normalize_page_number, Page, PageFormatError};
    use crate::config::PageFormatConfig;

    fn text(raw: &str) -> String {
        normalize_page(raw, "CB", &PageFormatConfig::default())
            .unwrap()
            .as_str()
            .to_string()
    }

    #[test]
    fn pads_plain_numbers_to_configured_width() {
        assert_eq!(text("9"), "009");
        assert_eq!(text("10"), "010");
        assert_eq!(text("123"), "123");
    }

    #[test]
    fn padded_pages_sort_numerically_as_strings() {
        assert!(text("9") < text("10"));
        assert!(text("99") < text("100"));
    }

    #[test]
    fn keeps_suffixes_verbatim() {
        assert_eq!(text("12-14"), "012-14");
        assert_eq!(text("12a"), "012a");
        assert_eq!(text("7 (see note)"), "007 (see note)");
    }

    #[test]
    fn normalization_is_stable() {
        for raw in ["5", "12-14", "0007", "0999", "3b"] {
            let once = text(raw);
            assert_eq!(text(&once), once, "unstable for `{raw}`");
        }
    }

    #[test]
    fn numbers_wider_than_the_width_are_rejected() {
        let config = PageFormatConfig::default();
        assert_eq!(text("999"), "999");
        assert_eq!(
            normalize_page("1000", "CB", &config),
            Err(PageFormatError::NumberTooWide {
                page: "1000".to_string(),
                width: 3
            })
        );
        assert!(matches!(
            normalize_page("1234-40", "CB", &config),
            Err(PageFormatError::NumberTooWide { .. })
        ));
        assert!(matches!(
            normalize_page_number(1000, "CB", &config),
            Err(PageFormatError::NumberTooWide { .. })
        ));
    }

    #[test]
    fn leading_zeros_do_not_count_toward_the_width() {
        assert_eq!(text("000042"), "042");
    }

    #[test]
    fn max_page_number_follows_width() {
        let config = PageFormatConfig::default().with_width("TB", 5);
        assert_eq!(max_page_number("CB", &config), 999);
        assert_eq!(max_page_number("TB", &config), 99_999);
    }

    #[test]
    fn zero_pads_to_all_zeros() {
        assert_eq!(text("0"), "000");
        assert_eq!(text("000"), "000");
    }

    #[test]
    fn width_follows_notebook_type() {
        let config = PageFormatConfig::default().with_width("TB", 5);
        let page = normalize_page("42", "TB", &config).unwrap();
        assert_eq!(page.as_str(), "00042");
        assert_eq!(page.number(), Some(42));
        assert_eq!(
            normalize_page_number(42, "TB", &config).unwrap().as_str(),
            "00042"
        );
    }

    #[test]
    fn rejects_pages_without_numeric_prefix() {
        let config = PageFormatConfig::default();
        assert_eq!(normalize_page("  ", "CB", &config), Err(PageFormatError::Empty));
        assert!(matches!(
            normalize_page("iv", "CB", &config),
            Err(PageFormatError::MissingNumber(_))
        ));
        assert!(matches!(
            normalize_page("99999999999999999999999", "CB", &config),
            Err(PageFormatError::NumberOutOfRange(_))
        ));
    }

    #[test]
    fn redirect_marker_uppercases_target() {
        let page = Page::redirect_to("Bar");
        assert_eq!(page.as_str(), "moved to BAR");
        assert!(page.is_redirect());
        assert_eq!(page.number(), None);
    }

    #[test]
    fn stored_rows_round_trip_through_kind_column() {
        let page = Page::from_db("page", "012-14".to_string()).unwrap();
        assert_eq!(page.number(), Some(12));

        let redirect = Page::from_db("redirect", "moved to BAR".to_string()).unwrap();
        assert_eq!(redirect, Page::redirect_to("bar"));

        assert!(Page::from_db("page", "moved to BAR".to_string()).is_none());
        assert!(Page::from_db("bogus", "001".to_string()).is_none());
    }
}
