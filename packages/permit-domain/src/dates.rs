use time::{Date, Duration, macros::format_description};

/// Parses a `YYYY-MM-DD` date. Month and day may omit the leading zero and surrounding
/// whitespace is ignored.
pub fn parse_date(raw: &str) -> Option<Date> {
	Date::parse(raw.trim(), format_description!("[year]-[month padding:none]-[day padding:none]"))
		.ok()
}

pub fn format_date(date: Date) -> String {
	format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

/// Signed number of calendar days from `from` to `to`.
pub fn days_between(from: Date, to: Date) -> i64 {
	(to - from).whole_days()
}

/// Signed day delta between two `YYYY-MM-DD` strings, or `None` when either is malformed.
pub fn days_between_str(from: &str, to: &str) -> Option<i64> {
	Some(days_between(parse_date(from)?, parse_date(to)?))
}

/// Last day of a look-ahead window starting at `today`. Saturates at the maximum date.
pub fn window_end(today: Date, days: u32) -> Date {
	today.saturating_add(Duration::days(i64::from(days)))
}
