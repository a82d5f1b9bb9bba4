// CSV rendering of a trip log, one block of four columns per leg
use crate::domain::trip::{DataPoint, TripLog};
use anyhow::Context;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::fmt::{self, Write};
use std::path::{Path, PathBuf};

/// en-US `toLocaleString` layout, e.g. `10/19/2026, 3:45:12 PM`.
const LOCALE_TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

pub fn render_csv<Tz>(log: &TripLog, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut csv = String::from("Data Point");

    for leg in log.legs() {
        for column in ["Maps (mi)", "EV (mi)", "Diff (mi)", "Timestamp"] {
            csv.push(',');
            push_quoted(&mut csv, &format!("{} - {}", leg.name, column));
        }
    }
    csv.push('\n');

    for row in 0..log.max_leg_len() {
        let _ = write!(csv, "{}", row + 1);
        for leg in log.legs() {
            match leg.data_points.get(row) {
                Some(point) => push_point(&mut csv, point, tz),
                None => csv.push_str(",,,,"),
            }
        }
        csv.push('\n');
    }

    csv
}

pub fn format_locale_timestamp<Tz>(timestamp: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    timestamp
        .with_timezone(tz)
        .format(LOCALE_TIMESTAMP_FORMAT)
        .to_string()
}

/// Shortest round-trip form, so whole miles print without a fraction.
/// Magnitudes from 1e21 up and below 1e-6 switch to exponent form (`1e+21`,
/// `1e-7`), the way a browser prints numbers.
pub fn format_miles(value: f64) -> String {
    if value == 0.0 {
        // Avoid printing "-0".
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let exp = format!("{:e}", value);
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exp,
        };
    }
    value.to_string()
}

/// Two decimals with exact ties rounded away from zero (`0.125` -> `0.13`),
/// where `{:.2}` would round them to even.
pub fn format_difference(value: f64) -> String {
    if value == 0.0 {
        return "0.00".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 {
        return format_miles(value);
    }

    // A binary f64 sits exactly on a third-decimal 5 only when it is an odd
    // number of eighths.
    let eighths = magnitude * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        let cents = (magnitude * 100.0).round() as u64;
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{}{}.{:02}", sign, cents / 100, cents % 100);
    }
    format!("{:.2}", value)
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("ev-range-data-{}.csv", date.format("%Y-%m-%d"))
}

/// Writes an export into `dir`, replacing any export from the same day.
pub fn write_export(dir: &Path, date: NaiveDate, csv: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
    let path = dir.join(export_file_name(date));
    std::fs::write(&path, csv)
        .with_context(|| format!("Failed to write export {}", path.display()))?;
    Ok(path)
}

fn push_point<Tz>(csv: &mut String, point: &DataPoint, tz: &Tz)
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let _ = write!(
        csv,
        ",{},{},{},",
        format_miles(point.maps_estimate),
        format_miles(point.ev_estimate),
        format_difference(point.difference)
    );
    push_quoted(csv, &format_locale_timestamp(&point.timestamp, tz));
}

fn push_quoted(csv: &mut String, text: &str) {
    csv.push('"');
    csv.push_str(&text.replace('"', "\"\""));
    csv.push('"');
}
