//! Lenient parsers for the loosely formatted values found on video pages.
//!
//! Every parser returns `None` for input it does not understand; callers decide
//! whether a missing value is fatal.

use time::{Date, Month};

use crate::consts::{self, ROOT_URL};
use crate::models::Quality;

/// Collapse runs of whitespace and trim.
pub(crate) fn clean_text(text: &str) -> String {
    consts::WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned()
}

/// Tag and category names are compared case-insensitively.
pub(crate) fn normalize_term(text: &str) -> Option<String> {
    let text = clean_text(text).to_lowercase();
    (!text.is_empty()).then_some(text)
}

/// `PT1H2M3S`, `1:02:03`, `2:03` or plain seconds.
pub(crate) fn parse_duration(value: &str) -> Option<u64> {
    let value = value.trim();
    if let Some(captures) = consts::ISO_DURATION_REGEX.captures(value) {
        if captures.iter().skip(1).all(|group| group.is_none()) {
            return None;
        }
        let number = |index: usize| -> Option<f64> {
            captures.get(index).map_or(Some(0.0), |m| m.as_str().parse::<f64>().ok())
        };
        let seconds = number(1)? * 3600.0 + number(2)? * 60.0 + number(3)?;
        return Some(seconds.round() as u64);
    }
    if let Some(captures) = consts::CLOCK_DURATION_REGEX.captures(value) {
        let parts = captures
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str().parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;
        return match parts.as_slice() {
            [minutes, seconds] => minutes.checked_mul(60)?.checked_add(*seconds),
            [hours, minutes, seconds] => hours
                .checked_mul(3600)?
                .checked_add(minutes.checked_mul(60)?)?
                .checked_add(*seconds),
            _ => None,
        };
    }
    value.parse::<u64>().ok()
}

/// `1,234`, `1 234`, `1.2K`, `3M` and friends.
pub(crate) fn parse_count(value: &str) -> Option<u64> {
    let value = value.replace([',', ' ', '\u{a0}'], "");
    let captures = consts::COUNT_REGEX.captures(&value)?;
    let number = captures.get(1)?.as_str().parse::<f64>().ok()?;
    let multiplier = match captures.get(2).map(|m| m.as_str().to_ascii_uppercase()).as_deref() {
        Some("K") => 1_000.0,
        Some("M") => 1_000_000.0,
        Some("B") => 1_000_000_000.0,
        _ => 1.0,
    };
    Some((number * multiplier).round() as u64)
}

fn month_from_name(name: &str) -> Option<Month> {
    let month = match name.get(..3)?.to_ascii_lowercase().as_str() {
        "jan" => Month::January,
        "feb" => Month::February,
        "mar" => Month::March,
        "apr" => Month::April,
        "may" => Month::May,
        "jun" => Month::June,
        "jul" => Month::July,
        "aug" => Month::August,
        "sep" => Month::September,
        "oct" => Month::October,
        "nov" => Month::November,
        "dec" => Month::December,
        _ => return None,
    };
    Some(month)
}

fn calendar_date(year: &str, month: Month, day: &str) -> Option<Date> {
    Date::from_calendar_date(year.parse().ok()?, month, day.parse().ok()?).ok()
}

/// Best-effort date recognition: `2024-01-15` (with or without a time part),
/// `15 Jan 2024` and `January 15, 2024`.
pub(crate) fn parse_date(value: &str) -> Option<Date> {
    if let Some(captures) = consts::ISO_DATE_REGEX.captures(value) {
        let month = Month::try_from(captures[2].parse::<u8>().ok()?).ok()?;
        return calendar_date(&captures[1], month, &captures[3]);
    }
    if let Some(captures) = consts::DAY_MONTH_DATE_REGEX.captures(value)
        && let Some(month) = month_from_name(&captures[2])
    {
        return calendar_date(&captures[3], month, &captures[1]);
    }
    if let Some(captures) = consts::MONTH_DAY_DATE_REGEX.captures(value)
        && let Some(month) = month_from_name(&captures[1])
    {
        return calendar_date(&captures[3], month, &captures[2]);
    }
    None
}

/// Turns player and markup URLs into absolute `https` URLs.
pub(crate) fn clean_url(url: &str) -> Option<String> {
    let url = url.trim();
    let url = consts::FUNCTION_PREFIX_REGEX.replace(url, "");
    let url = consts::REPEATED_SLASH_REGEX.replace_all(&url, "$1/");
    let url = if url.starts_with("http://") || url.starts_with("https://") {
        url.into_owned()
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else if url.starts_with('/') {
        format!("{ROOT_URL}{url}")
    } else {
        return None;
    };
    Some(url)
}

/// Infer the quality label of a file from names like `12345_720p.mp4`.
pub(crate) fn quality_from_url(url: &str) -> Option<Quality> {
    let captures = consts::URL_QUALITY_REGEX.captures(url)?;
    Quality::from_height(captures[1].parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::date;

    #[rstest]
    #[case("PT5M30S", Some(330))]
    #[case("PT1H23M45S", Some(5025))]
    #[case("pt45s", Some(45))]
    #[case("PT12.6S", Some(13))]
    #[case("5:30", Some(330))]
    #[case("1:23:45", Some(5025))]
    #[case(" 95 ", Some(95))]
    #[case("PT", None)]
    #[case("999999999999999999:00", None)]
    #[case("99999999999999999:00:00", None)]
    #[case("soon", None)]
    #[case("", None)]
    fn test_parse_duration(#[case] input: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_duration(input), expected);
    }

    #[rstest]
    #[case("1,234", Some(1234))]
    #[case("1 234", Some(1234))]
    #[case("1.2K", Some(1200))]
    #[case("1.5m", Some(1_500_000))]
    #[case("3M", Some(3_000_000))]
    #[case("87", Some(87))]
    #[case("many", None)]
    #[case("", None)]
    fn test_parse_count(#[case] input: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_count(input), expected);
    }

    #[rstest]
    #[case("2024-01-15", Some(date!(2024 - 01 - 15)))]
    #[case("2024-01-15T08:30:00+00:00", Some(date!(2024 - 01 - 15)))]
    #[case("2024-1-5 10:00", Some(date!(2024 - 01 - 05)))]
    #[case("15 Jan 2024", Some(date!(2024 - 01 - 15)))]
    #[case("Added: 3 September 2023", Some(date!(2023 - 09 - 03)))]
    #[case("Jan 15, 2024", Some(date!(2024 - 01 - 15)))]
    #[case("March 2nd 2022", Some(date!(2022 - 03 - 02)))]
    #[case("2024-02-30", None)]
    #[case("3 weeks ago", None)]
    #[case("", None)]
    fn test_parse_date(#[case] input: &str, #[case] expected: Option<Date>) {
        assert_eq!(parse_date(input), expected);
    }

    #[rstest]
    #[case(
        "function/0/https://cdn.example.com/get_file/1/abc/3055000/3055012/3055012_720p.mp4/",
        Some("https://cdn.example.com/get_file/1/abc/3055000/3055012/3055012_720p.mp4/")
    )]
    #[case("//cdn.example.com/a.mp4", Some("https://cdn.example.com/a.mp4"))]
    #[case("/get_file/a.mp4", Some("https://rule34video.com/get_file/a.mp4"))]
    #[case("https://cdn.example.com//a//b.mp4", Some("https://cdn.example.com/a/b.mp4"))]
    #[case("javascript:void(0)", None)]
    fn test_clean_url(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(clean_url(input).as_deref(), expected);
    }

    #[rstest]
    #[case("https://cdn.example.com/3055012_1080p.mp4", Some(Quality::P1080))]
    #[case("https://cdn.example.com/3055012/480.mp4?x=1", Some(Quality::P480))]
    #[case("https://cdn.example.com/3055012_999p.mp4", None)]
    #[case("https://cdn.example.com/3055012.mp4", None)]
    fn test_quality_from_url(#[case] input: &str, #[case] expected: Option<Quality>) {
        assert_eq!(quality_from_url(input), expected);
    }

    #[test]
    fn test_normalize_term() {
        assert_eq!(normalize_term("  Big   Tits \n").as_deref(), Some("big tits"));
        assert_eq!(normalize_term(" \t "), None);
    }
}
