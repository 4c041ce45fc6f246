use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::domain::format_day;
use crate::error::MirrorError;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"));

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, MirrorError> {
    let trimmed = value.trim();
    if !DATE_PATTERN.is_match(trimmed) {
        return Err(MirrorError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| MirrorError::InvalidDate(value.to_string()))
}

/// Inclusive range of whole days. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

/// Reported when the configured end date lies in the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EndDateClamp {
    #[serde(serialize_with = "serialize_day")]
    pub configured: NaiveDate,
    #[serde(serialize_with = "serialize_day")]
    pub effective: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub range: DateRange,
    pub clamp: Option<EndDateClamp>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, MirrorError> {
        if start > end {
            return Err(MirrorError::InvalidRange {
                start: format_day(start),
                end: format_day(end),
            });
        }
        Ok(Self { start, end })
    }

    /// Builds the effective range, capping the end at `today`.
    ///
    /// A missing end means "up to today". Parsing happens before any clamping,
    /// so an unparsable end date is an error even if it would be clamped away.
    pub fn resolve(
        start: &str,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<ResolvedRange, MirrorError> {
        let start = parse_date(start)?;
        let configured_end = end.map(parse_date).transpose()?;

        let (end, clamp) = match configured_end {
            Some(configured) if configured > today => (
                today,
                Some(EndDateClamp {
                    configured,
                    effective: today,
                }),
            ),
            Some(configured) => (configured, None),
            None => (today, None),
        };

        if let Some(clamp) = &clamp {
            tracing::warn!(
                configured = %format_day(clamp.configured),
                effective = %format_day(clamp.effective),
                "end date is in the future, clamping to today"
            );
        }

        Ok(ResolvedRange {
            range: Self::new(start, end)?,
            clamp,
        })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn days(&self) -> Days {
        iterate(self.start, self.end)
    }

    pub fn day_count(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }
}

/// Ascending days from `start` to `end`, both inclusive.
pub fn iterate(start: NaiveDate, end: NaiveDate) -> Days {
    Days {
        next: (start <= end).then_some(start),
        end,
    }
}

#[derive(Debug, Clone)]
pub struct Days {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for Days {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.succ_opt().filter(|day| *day <= self.end);
        Some(current)
    }
}

fn serialize_day<S: serde::Serializer>(day: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_day(*day))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn day(value: &str) -> NaiveDate {
        parse_date(value).unwrap()
    }

    #[test]
    fn parse_rejects_loose_forms() {
        assert_matches!(parse_date("2020-1-01"), Err(MirrorError::InvalidDate(_)));
        assert_matches!(parse_date("2020-02-30"), Err(MirrorError::InvalidDate(_)));
        assert_matches!(parse_date("yesterday"), Err(MirrorError::InvalidDate(_)));
    }

    #[test]
    fn iterate_single_day() {
        let days: Vec<_> = iterate(day("2024-06-15"), day("2024-06-15")).collect();
        assert_eq!(days, vec![day("2024-06-15")]);
    }

    #[test]
    fn iterate_crosses_year_boundary() {
        let days: Vec<_> = iterate(day("2019-12-31"), day("2020-01-01")).collect();
        assert_eq!(days, vec![day("2019-12-31"), day("2020-01-01")]);
    }

    #[test]
    fn reversed_bounds_yield_nothing() {
        assert_eq!(iterate(day("2020-01-02"), day("2020-01-01")).count(), 0);
    }

    #[test]
    fn day_count_includes_both_ends() {
        let range = DateRange::new(day("2020-02-27"), day("2020-03-01")).unwrap();
        assert_eq!(range.day_count(), 4);
    }
}
