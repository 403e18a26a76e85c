//! Relative time expressions for the reporting window.
//!
//! An expression is an anchor optionally followed by one signed offset:
//! `today-7d`, `lastmonth`, `now-90m`, `thismonth+1M`.
//!
//! Anchors: `now` (or nothing), `today`, `yesterday`, `tomorrow`,
//! `thismonth`, `lastmonth`, `nextmonth`. Units: `d` days, `h` hours,
//! `m` minutes, `M` months, `y` years.

use anyhow::{anyhow, bail, Result};
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};

/// Format of date-time report parameters (sortable ISO 8601)
pub const PARAMETER_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Format of `ReportLongDate` (e.g. `16 October 2026`)
pub const LONG_DATE_FORMAT: &str = "%-d %B %Y";

/// Resolve a relative time expression against `now`
pub fn parse_relative(expr: &str, now: NaiveDateTime) -> Result<NaiveDateTime> {
    let expr = expr.trim();
    let (anchor, offset) = match expr.find(|c: char| c == '+' || c == '-') {
        Some(i) => (&expr[..i], Some(&expr[i..])),
        None => (expr, None),
    };

    let base = resolve_anchor(anchor, now)?;
    match offset {
        Some(offset) => apply_offset(base, offset, expr),
        None => Ok(base),
    }
}

fn resolve_anchor(anchor: &str, now: NaiveDateTime) -> Result<NaiveDateTime> {
    let midnight = |date: NaiveDate| {
        date.and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("invalid date {}", date))
    };
    let first_of_month = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .ok_or_else(|| anyhow!("invalid month in {}", now))?;
    let today = now.date();

    match anchor {
        "" | "now" => Ok(now),
        "today" => midnight(today),
        "yesterday" => midnight(today - Duration::days(1)),
        "tomorrow" => midnight(today + Duration::days(1)),
        "thismonth" => midnight(first_of_month),
        "lastmonth" => midnight(
            first_of_month
                .checked_sub_months(Months::new(1))
                .ok_or_else(|| anyhow!("month out of range"))?,
        ),
        "nextmonth" => midnight(
            first_of_month
                .checked_add_months(Months::new(1))
                .ok_or_else(|| anyhow!("month out of range"))?,
        ),
        other => bail!("unknown time anchor '{}'", other),
    }
}

fn apply_offset(base: NaiveDateTime, offset: &str, expr: &str) -> Result<NaiveDateTime> {
    let negative = offset.starts_with('-');
    let body = &offset[1..];
    if body.contains(|c: char| c == '+' || c == '-') {
        bail!("'{}' has more than one offset", expr);
    }

    let digits = body.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        bail!("offset in '{}' has no amount", expr);
    }
    let amount: u32 = body[..digits]
        .parse()
        .map_err(|_| anyhow!("offset in '{}' is too large", expr))?;
    let unit = &body[digits..];

    let shifted = match unit {
        "d" => shift(base, Duration::days(amount.into()), negative),
        "h" => shift(base, Duration::hours(amount.into()), negative),
        "m" => shift(base, Duration::minutes(amount.into()), negative),
        "M" => shift_months(base, amount, negative),
        "y" => shift_months(base, amount.saturating_mul(12), negative),
        other => bail!("unknown time unit '{}' in '{}'", other, expr),
    };
    shifted.ok_or_else(|| anyhow!("'{}' is out of range", expr))
}

fn shift(base: NaiveDateTime, delta: Duration, negative: bool) -> Option<NaiveDateTime> {
    if negative {
        base.checked_sub_signed(delta)
    } else {
        base.checked_add_signed(delta)
    }
}

fn shift_months(base: NaiveDateTime, months: u32, negative: bool) -> Option<NaiveDateTime> {
    if negative {
        base.checked_sub_months(Months::new(months))
    } else {
        base.checked_add_months(Months::new(months))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, PARAMETER_FORMAT).unwrap()
    }

    fn resolve(expr: &str) -> String {
        parse_relative(expr, at("2026-03-15T13:45:10"))
            .unwrap()
            .format(PARAMETER_FORMAT)
            .to_string()
    }

    #[test]
    fn test_anchors() {
        assert_eq!(resolve("now"), "2026-03-15T13:45:10");
        assert_eq!(resolve(""), "2026-03-15T13:45:10");
        assert_eq!(resolve("today"), "2026-03-15T00:00:00");
        assert_eq!(resolve("yesterday"), "2026-03-14T00:00:00");
        assert_eq!(resolve("tomorrow"), "2026-03-16T00:00:00");
        assert_eq!(resolve("thismonth"), "2026-03-01T00:00:00");
        assert_eq!(resolve("lastmonth"), "2026-02-01T00:00:00");
        assert_eq!(resolve("nextmonth"), "2026-04-01T00:00:00");
    }

    #[test]
    fn test_offsets() {
        assert_eq!(resolve("today-7d"), "2026-03-08T00:00:00");
        assert_eq!(resolve("now-90m"), "2026-03-15T12:15:10");
        assert_eq!(resolve("now+2h"), "2026-03-15T15:45:10");
        assert_eq!(resolve("thismonth+1M"), "2026-04-01T00:00:00");
        assert_eq!(resolve("lastmonth-1y"), "2025-02-01T00:00:00");
        assert_eq!(resolve("-1d"), "2026-03-14T13:45:10");
    }

    #[test]
    fn test_rejects_bad_expressions() {
        let now = at("2026-03-15T13:45:10");
        assert!(parse_relative("today-1d-2h", now).is_err());
        assert!(parse_relative("soon", now).is_err());
        assert!(parse_relative("now-d", now).is_err());
        assert!(parse_relative("now-3w", now).is_err());
    }

    #[test]
    fn test_long_date_format() {
        assert_eq!(at("2026-03-05T00:00:00").format(LONG_DATE_FORMAT).to_string(), "5 March 2026");
    }
}
