use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday,
};
use serde_json::Value;

use crate::domain::entities::column::{ColumnDescriptor, TextFormat, ValueType};

/// Placeholder shown when a cell has no meaningful value.
pub const DASH: &str = "-";

const DATE_DISPLAY_PATTERN: &str = "%m/%d/%Y";
const TIME_DISPLAY_PATTERN: &str = "%I:%M %p";

pub fn format_cell(value: Option<&Value>, column: &ColumnDescriptor) -> String {
    format_value(value, column.value_type, column.format)
}

pub fn format_value(value: Option<&Value>, value_type: ValueType, format: TextFormat) -> String {
    format_value_at(value, value_type, format, Utc::now())
}

/// Formats a raw value for display. `now` only matters for
/// [`ValueType::LocalTime`].
pub fn format_value_at(
    value: Option<&Value>,
    value_type: ValueType,
    format: TextFormat,
    now: DateTime<Utc>,
) -> String {
    let Some(value) = value.filter(|value| !is_blank(value)) else {
        return DASH.to_string();
    };

    match value_type {
        ValueType::Number => match numeric_value(value) {
            Some(number) if number >= 0.0 => raw_text(value),
            _ => DASH.to_string(),
        },
        ValueType::Phone => format_phone(&raw_text(value)),
        ValueType::Currency => match numeric_value(value) {
            Some(number) if number >= 0.0 => format_usd(number),
            _ => DASH.to_string(),
        },
        ValueType::Date => format_date(value),
        ValueType::LocalTime => {
            local_time_for_zip(&raw_text(value), now).unwrap_or_else(|| DASH.to_string())
        }
        ValueType::Text => apply_text_format(&raw_text(value), format),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

fn raw_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

pub fn apply_text_format(text: &str, format: TextFormat) -> String {
    match format {
        TextFormat::TitleCase => title_case(text),
        TextFormat::Uppercase => text.to_uppercase(),
        TextFormat::Lowercase => text.to_lowercase(),
        TextFormat::Capitalize => capitalize(text),
        TextFormat::None => text.to_string(),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            word_start = true;
            out.push(ch);
        } else if word_start {
            word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// `(XXX) XXX-XXXX` for ten-digit numbers (a leading country code 1 is
/// dropped); anything else is shown as given.
pub fn format_phone(text: &str) -> String {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    let digits = match digits.len() {
        11 if digits.starts_with('1') => &digits[1..],
        _ => digits.as_str(),
    };
    if digits.len() != 10 {
        return text.to_string();
    }
    format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..10])
}

pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u128;
    let dollars = group_thousands(&(cents / 100).to_string());
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${dollars}.{:02}", cents % 100)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn format_date(value: &Value) -> String {
    let parsed = match value {
        Value::Number(number) => number
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        Value::String(text) => parse_date(text.trim()),
        _ => None,
    };

    match parsed {
        Some(date) => date.format(DATE_DISPLAY_PATTERN).to_string(),
        None => raw_text(value),
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(dt.date());
        }
    }
    ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"]
        .iter()
        .find_map(|pattern| NaiveDate::parse_from_str(text, pattern).ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsZone {
    Eastern,
    Central,
    Mountain,
    Arizona,
    Pacific,
    Alaska,
    Hawaii,
}

impl UsZone {
    fn standard_offset_hours(self) -> i64 {
        match self {
            UsZone::Eastern => -5,
            UsZone::Central => -6,
            UsZone::Mountain | UsZone::Arizona => -7,
            UsZone::Pacific => -8,
            UsZone::Alaska => -9,
            UsZone::Hawaii => -10,
        }
    }

    fn observes_dst(self) -> bool {
        !matches!(self, UsZone::Arizona | UsZone::Hawaii)
    }

    fn abbreviation(self, dst: bool) -> &'static str {
        match (self, dst) {
            (UsZone::Eastern, false) => "EST",
            (UsZone::Eastern, true) => "EDT",
            (UsZone::Central, false) => "CST",
            (UsZone::Central, true) => "CDT",
            (UsZone::Mountain, false) | (UsZone::Arizona, _) => "MST",
            (UsZone::Mountain, true) => "MDT",
            (UsZone::Pacific, false) => "PST",
            (UsZone::Pacific, true) => "PDT",
            (UsZone::Alaska, false) => "AKST",
            (UsZone::Alaska, true) => "AKDT",
            (UsZone::Hawaii, _) => "HST",
        }
    }
}

/// Time zone of a US ZIP code, keyed on its three-digit prefix.
pub fn zone_for_zip(zip: &str) -> Option<UsZone> {
    let zip = zip.trim();
    let five = zip.get(0..5)?;
    if !five.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let prefix: u16 = five[0..3].parse().ok()?;

    let zone = match prefix {
        0..=349 => UsZone::Eastern,
        350..=399 => UsZone::Central,
        400..=427 | 430..=499 => UsZone::Eastern,
        500..=589 => UsZone::Central,
        590..=599 => UsZone::Mountain,
        600..=797 => UsZone::Central,
        798..=847 => UsZone::Mountain,
        850..=865 => UsZone::Arizona,
        870..=884 => UsZone::Mountain,
        889..=961 => UsZone::Pacific,
        967..=968 => UsZone::Hawaii,
        970..=994 => UsZone::Pacific,
        995..=999 => UsZone::Alaska,
        _ => return None,
    };
    Some(zone)
}

fn dst_active(now: DateTime<Utc>, standard_offset_hours: i64) -> Option<bool> {
    let local_standard = now.naive_utc() + Duration::hours(standard_offset_hours);
    let year = local_standard.year();
    let start = NaiveDate::from_weekday_of_month_opt(year, 3, Weekday::Sun, 2)?.and_hms_opt(2, 0, 0)?;
    // 02:00 daylight time is 01:00 standard time.
    let end = NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Sun, 1)?.and_hms_opt(1, 0, 0)?;
    Some(local_standard >= start && local_standard < end)
}

pub fn local_time_for_zip(zip: &str, now: DateTime<Utc>) -> Option<String> {
    let zone = zone_for_zip(zip)?;
    let dst = zone.observes_dst() && dst_active(now, zone.standard_offset_hours())?;
    let offset_hours = zone.standard_offset_hours() + i64::from(dst);
    let offset = FixedOffset::east_opt((offset_hours * 3600) as i32)?;
    let local = offset.from_utc_datetime(&now.naive_utc());
    Some(format!(
        "{} {}",
        local.format(TIME_DISPLAY_PATTERN),
        zone.abbreviation(dst)
    ))
}
