//! Date/time pattern formatting
//!
//! Route authors write patterns with the familiar letter vocabulary used by
//! ISO 20022 tooling (`yyyy-MM-dd'T'HH:mm:ss.SSS'Z'`). Letters are pattern
//! fields, text inside single quotes is literal, `''` is a literal quote and
//! every other character is copied through.

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::fmt::Write;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Format `instant` with a letter pattern.
///
/// # Errors
///
/// Returns a description of the problem when the pattern uses an unknown
/// letter, an unsupported field width, or an unterminated quote.
pub fn format_pattern(instant: &DateTime<Utc>, pattern: &str) -> Result<String, String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            loop {
                match chars.get(i) {
                    None => return Err(format!("unterminated quote in pattern '{pattern}'")),
                    Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                        out.push('\'');
                        i += 2;
                    }
                    Some('\'') => {
                        i += 1;
                        break;
                    }
                    Some(&literal) => {
                        out.push(literal);
                        i += 1;
                    }
                }
            }
            continue;
        }

        if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i] == c {
                i += 1;
            }
            write_field(&mut out, instant, c, i - start)
                .map_err(|e| format!("{e} in pattern '{pattern}'"))?;
            continue;
        }

        if matches!(c, '{' | '}' | '#') {
            return Err(format!("reserved character '{c}' in pattern '{pattern}'"));
        }

        // Optional-section brackets produce no output.
        if !matches!(c, '[' | ']') {
            out.push(c);
        }
        i += 1;
    }

    Ok(out)
}

fn write_field(out: &mut String, t: &DateTime<Utc>, letter: char, count: usize) -> Result<(), String> {
    let too_many = || Err(format!("too many pattern letters '{letter}'"));

    match letter {
        'y' | 'u' => {
            if count == 2 {
                pad(out, i64::from(t.year().rem_euclid(100)), 2);
            } else {
                pad(out, i64::from(t.year()), count);
            }
        }
        'M' | 'L' => match count {
            1 | 2 => pad(out, i64::from(t.month()), count),
            3 => out.push_str(&month_name(t)[..3]),
            4 => out.push_str(month_name(t)),
            5 => out.push_str(&month_name(t)[..1]),
            _ => return too_many(),
        },
        'd' if count <= 2 => pad(out, i64::from(t.day()), count),
        'D' if count <= 3 => pad(out, i64::from(t.ordinal()), count),
        'H' if count <= 2 => pad(out, i64::from(t.hour()), count),
        'k' if count <= 2 => {
            let hour = if t.hour() == 0 { 24 } else { t.hour() };
            pad(out, i64::from(hour), count);
        }
        'h' if count <= 2 => pad(out, i64::from(t.hour12().1), count),
        'K' if count <= 2 => pad(out, i64::from(t.hour() % 12), count),
        'm' if count <= 2 => pad(out, i64::from(t.minute()), count),
        's' if count <= 2 => pad(out, i64::from(t.second()), count),
        'S' if count <= 9 => {
            let nanos = format!("{:09}", t.nanosecond() % 1_000_000_000);
            out.push_str(&nanos[..count]);
        }
        'n' => pad(out, i64::from(t.nanosecond() % 1_000_000_000), count),
        'a' if count == 1 => out.push_str(if t.hour12().0 { "PM" } else { "AM" }),
        'E' => match count {
            1..=3 => out.push_str(&weekday_name(t)[..3]),
            4 => out.push_str(weekday_name(t)),
            5 => out.push_str(&weekday_name(t)[..1]),
            _ => return too_many(),
        },
        'G' => match count {
            1..=3 => out.push_str(if t.year() > 0 { "AD" } else { "BC" }),
            4 => out.push_str(if t.year() > 0 { "Anno Domini" } else { "Before Christ" }),
            5 => out.push_str(if t.year() > 0 { "A" } else { "B" }),
            _ => return too_many(),
        },
        'Q' | 'q' => {
            let quarter = (t.month0() / 3) + 1;
            match count {
                1 | 2 => pad(out, i64::from(quarter), count),
                3 => {
                    let _ = write!(out, "Q{quarter}");
                }
                4 => {
                    let ordinal = ["1st", "2nd", "3rd", "4th"][(quarter - 1) as usize];
                    let _ = write!(out, "{ordinal} quarter");
                }
                _ => return too_many(),
            }
        }
        // Instants are always UTC, so every offset field renders the zero offset.
        'Z' => match count {
            1..=3 => out.push_str("+0000"),
            4 => out.push_str("GMT"),
            5 => out.push('Z'),
            _ => return too_many(),
        },
        'X' if count <= 5 => out.push('Z'),
        'x' => match count {
            1 => out.push_str("+00"),
            2 | 4 => out.push_str("+0000"),
            3 | 5 => out.push_str("+00:00"),
            _ => return too_many(),
        },
        'z' => match count {
            1..=3 => out.push_str("UTC"),
            4 => out.push_str("Coordinated Universal Time"),
            _ => return too_many(),
        },
        'd' | 'D' | 'H' | 'k' | 'h' | 'K' | 'm' | 's' | 'S' | 'a' | 'X' => return too_many(),
        other => return Err(format!("unsupported pattern letter '{other}'")),
    }

    Ok(())
}

fn pad(out: &mut String, value: i64, width: usize) {
    if value < 0 {
        let _ = write!(out, "-{:0width$}", value.unsigned_abs(), width = width);
    } else {
        let _ = write!(out, "{value:0width$}");
    }
}

fn month_name(t: &DateTime<Utc>) -> &'static str {
    MONTHS[t.month0() as usize]
}

fn weekday_name(t: &DateTime<Utc>) -> &'static str {
    WEEKDAYS[t.weekday().num_days_from_monday() as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 14, 5, 9).unwrap()
            + chrono::Duration::milliseconds(42)
    }

    #[test]
    fn test_iso_timestamp() {
        let out = format_pattern(&instant(), "yyyy-MM-dd'T'HH:mm:ss.SSS'Z'").unwrap();
        assert_eq!(out, "2024-03-07T14:05:09.042Z");
    }

    #[test]
    fn test_compact_timestamp() {
        assert_eq!(format_pattern(&instant(), "yyyyMMddHHmmss").unwrap(), "20240307140509");
        assert_eq!(format_pattern(&instant(), "yyMMdd").unwrap(), "240307");
    }

    #[test]
    fn test_text_fields() {
        assert_eq!(
            format_pattern(&instant(), "EEE, d MMM yyyy h:mm a").unwrap(),
            "Thu, 7 Mar 2024 2:05 PM"
        );
        assert_eq!(format_pattern(&instant(), "EEEE MMMM").unwrap(), "Thursday March");
    }

    #[test]
    fn test_day_of_year_and_offsets() {
        assert_eq!(format_pattern(&instant(), "D").unwrap(), "67");
        assert_eq!(format_pattern(&instant(), "HHmmZ").unwrap(), "1405+0000");
        assert_eq!(format_pattern(&instant(), "xxx").unwrap(), "+00:00");
        assert_eq!(format_pattern(&instant(), "X").unwrap(), "Z");
    }

    #[test]
    fn test_quotes() {
        assert_eq!(format_pattern(&instant(), "'at' HH''mm").unwrap(), "at 14'05");
        assert_eq!(format_pattern(&instant(), "'it''s' yyyy").unwrap(), "it's 2024");
        assert!(format_pattern(&instant(), "'open").is_err());
    }

    #[test]
    fn test_invalid_letters() {
        assert!(format_pattern(&instant(), "yyyy-bb").is_err());
        assert!(format_pattern(&instant(), "ddd").is_err());
        assert!(format_pattern(&instant(), "yyyy#").is_err());
    }
}
