//! Numeric extraction from free-text detection/quantification limits.
//!
//! Limits are stored as the laboratory writes them (`"0.5 ug/kg"`,
//! `"<1,0 µg/L"`, `"no detectado"`). For display, the first decimal number
//! in each string is extracted and the numbers of a group are summarised
//! as a range.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

#[allow(clippy::expect_used)]
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("Invalid limit number regex"));

/// Extract the first decimal number in `raw`.
///
/// A comma is accepted as the decimal separator. Returns `None` when the
/// string contains no digits.
///
/// # Examples
///
/// ```
/// use farmavet_content::methodology::limits::first_number;
///
/// assert_eq!(first_number("0.5 ug/kg"), Some(0.5));
/// assert_eq!(first_number("<1,25 µg/L"), Some(1.25));
/// assert_eq!(first_number("LD: 10 - 20"), Some(10.0));
/// assert_eq!(first_number("no detectado"), None);
/// ```
pub fn first_number(raw: &str) -> Option<f64> {
    let found = NUMBER_RE.find(raw)?;
    found.as_str().replace(',', ".").parse().ok()
}

/// Smallest and largest extracted limit of a group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitRange {
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
}

impl LimitRange {
    /// Summarise `values`; `None` when there are none.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(LimitRange { min: v, max: v }),
            Some(r) => Some(LimitRange {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }

    /// Extract the first number of each raw string and summarise.
    ///
    /// Strings without a number contribute nothing.
    pub fn from_raw<'a, I>(raw: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::from_values(raw.into_iter().filter_map(first_number))
    }

    /// Whether the range collapses to a single value.
    pub fn is_single(&self) -> bool {
        self.min == self.max
    }
}

impl fmt::Display for LimitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}–{}", self.min, self.max)
        }
    }
}

impl Serialize for LimitRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ------------------------------------------------------------------------
    // first_number tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_first_number_integer() {
        assert_eq!(first_number("10 ug/kg"), Some(10.0));
    }

    #[test]
    fn test_first_number_leading_text() {
        assert_eq!(first_number("LD < 0.05 mg/kg"), Some(0.05));
    }

    #[test]
    fn test_first_number_comma_decimal() {
        assert_eq!(first_number("0,2"), Some(0.2));
    }

    #[test]
    fn test_first_number_none() {
        assert_eq!(first_number(""), None);
        assert_eq!(first_number("N/A"), None);
    }

    #[test]
    fn test_first_number_trailing_dot_is_ignored() {
        assert_eq!(first_number("5. ug"), Some(5.0));
    }

    // ------------------------------------------------------------------------
    // LimitRange tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_range_collapses_equal_values() {
        let range = LimitRange::from_raw(["0.2", "0.2 ug/kg"]).unwrap();
        assert!(range.is_single());
        assert_eq!(range.to_string(), "0.2");
    }

    #[test]
    fn test_range_min_max() {
        let range = LimitRange::from_raw(["1.5", "0.5 ug/kg", "1,0"]).unwrap();
        assert_eq!(range, LimitRange { min: 0.5, max: 1.5 });
        assert_eq!(range.to_string(), "0.5–1.5");
    }

    #[test]
    fn test_range_skips_unparseable() {
        let range = LimitRange::from_raw(["no detectado", "0.2"]).unwrap();
        assert_eq!(range.to_string(), "0.2");
    }

    #[test]
    fn test_range_empty() {
        assert_eq!(LimitRange::from_raw(["", "n/d"]), None);
        assert_eq!(LimitRange::from_values(std::iter::empty()), None);
    }

    #[test]
    fn test_range_serializes_as_display() {
        let range = LimitRange { min: 1.0, max: 2.5 };
        assert_eq!(serde_json::to_string(&range).unwrap(), "\"1–2.5\"");
    }

    proptest! {
        #[test]
        fn prop_range_bounds_every_value(values in prop::collection::vec(0.0f64..1e6, 1..20)) {
            let range = LimitRange::from_values(values.iter().copied()).unwrap();
            for v in &values {
                prop_assert!(range.min <= *v && *v <= range.max);
            }
        }
    }
}
