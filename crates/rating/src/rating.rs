use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

/// Highest star rating, and the only one that gets a photo copied.
pub const MAX_STARS: u8 = 5;

/// Star rating as stored in `Xmp.xmp.Rating`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Rating {
    /// No rating property, or an explicit `0`.
    #[default]
    Unrated,
    /// Marked as a reject (`-1`) in Lightroom/Bridge.
    Rejected,
    /// One to five stars. Parsing never produces anything outside that
    /// range; a hand-built out-of-range value displays its raw number.
    Stars(u8),
}
impl Rating {
    /// Returns `true` for five stars.
    pub fn is_selected(&self) -> bool {
        *self == Self::Stars(MAX_STARS)
    }

    fn from_number(value: i64, raw: &str) -> Result<Self, Error> {
        Ok(match value {
            -1 => Self::Rejected,
            0 => Self::Unrated,
            // Infallible: the range guarantees it fits.
            1..=5 => Self::Stars(u8::try_from(value).unwrap_or(MAX_STARS)),
            _ => exn::bail!(ErrorKind::ParseError { field: "rating", value: raw.to_string() }),
        })
    }
}
impl TryFrom<String> for Rating {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}
impl FromStr for Rating {
    type Err = Error;
    /// Tools disagree on how to write the number: `5`, ` 5 `, and `5.0` all
    /// turn up in the wild and all mean five stars.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::Unrated);
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return Self::from_number(value, s);
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.fract() == 0.0 && value.is_finite() => Self::from_number(value as i64, s),
            _ => exn::bail!(ErrorKind::ParseError { field: "rating", value: s.to_string() }),
        }
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        // Written the way XMP stores it, `0` when unrated.
        match self {
            Rating::Unrated => f.write_str("0"),
            Rating::Rejected => f.write_str("-1"),
            Rating::Stars(stars) => write!(f, "{stars}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("5", Rating::Stars(5))]
    #[case(" 5 ", Rating::Stars(5))]
    #[case("5.0", Rating::Stars(5))]
    #[case("3", Rating::Stars(3))]
    #[case("1", Rating::Stars(1))]
    #[case("0", Rating::Unrated)]
    #[case("", Rating::Unrated)]
    #[case("-1", Rating::Rejected)]
    fn test_parse(#[case] input: &str, #[case] expected: Rating) {
        assert_eq!(input.parse::<Rating>().unwrap(), expected);
    }

    #[rstest]
    #[case("6")]
    #[case("-2")]
    #[case("4.5")]
    #[case("five")]
    #[case("NaN")]
    fn test_parse_invalid(#[case] input: &str) {
        let err = input.parse::<Rating>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::ParseError { field: "rating", .. }));
    }

    #[test]
    fn test_only_five_stars_is_selected() {
        assert!(Rating::Stars(5).is_selected());
        assert!(!Rating::Stars(4).is_selected());
        assert!(!Rating::Unrated.is_selected());
        assert!(!Rating::Rejected.is_selected());
    }

    #[test]
    fn test_display_round_trips_sentinel() {
        assert_eq!(Rating::default().to_string(), "0");
        assert_eq!(Rating::Stars(5).to_string(), "5");
        assert_eq!(Rating::Rejected.to_string(), "-1");
    }

    #[rstest]
    #[case(Rating::Stars(1), "1")]
    #[case(Rating::Stars(4), "4")]
    #[case(Rating::Stars(9), "9")]
    #[case(Rating::Stars(0), "0")]
    fn test_display_never_inflates_to_five(#[case] rating: Rating, #[case] expected: &str) {
        assert_eq!(rating.to_string(), expected);
        assert!(!rating.is_selected());
    }
}
