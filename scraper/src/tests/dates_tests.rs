use chrono::NaiveDate;

use crate::dates::{
    month_number, normalize, normalize_tokens, parse_token, DateError, DateToken, RelativeDay,
};
use crate::extract::PostRecord;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn post(text: &str, token: &str) -> PostRecord {
    PostRecord {
        raw_text: text.to_string(),
        raw_date_token: token.to_string(),
        ticker: "SBER".to_string(),
    }
}

#[test]
fn test_month_table() {
    assert_eq!(month_number("января"), Some(1));
    assert_eq!(month_number("мая"), Some(5));
    assert_eq!(month_number("декабря"), Some(12));
    // Nominative forms never appear in labels
    assert_eq!(month_number("май"), None);
}

#[test]
fn test_parse_absolute_token() {
    assert_eq!(
        parse_token("08 февраля 2023 · 10:15"),
        Ok(DateToken::Absolute {
            date: date(2023, 2, 8),
            time: "10:15".to_string(),
        })
    );
}

#[test]
fn test_parse_token_with_non_breaking_spaces() {
    assert_eq!(
        parse_token("31\u{a0}декабря\u{a0}2022 · 23:59"),
        Ok(DateToken::Absolute {
            date: date(2022, 12, 31),
            time: "23:59".to_string(),
        })
    );
}

#[test]
fn test_parse_relative_tokens() {
    assert_eq!(
        parse_token("Вчера в 09:00"),
        Ok(DateToken::Relative {
            day: RelativeDay::Yesterday,
            time: "09:00".to_string(),
        })
    );
    assert_eq!(
        parse_token("Сегодня в 21:30"),
        Ok(DateToken::Relative {
            day: RelativeDay::Today,
            time: "21:30".to_string(),
        })
    );
}

#[test]
fn test_parse_errors() {
    assert_eq!(
        parse_token("08 фев 2023 · 10:15"),
        Err(DateError::UnknownMonth("фев".to_string()))
    );
    assert_eq!(
        parse_token("31 февраля 2023 · 10:15"),
        Err(DateError::InvalidDate("31 февраля 2023 · 10:15".to_string()))
    );
    assert_eq!(
        parse_token("Завтра в 10:00"),
        Err(DateError::UnknownRelativeDay("Завтра".to_string()))
    );
    assert_eq!(
        parse_token("2 часа назад"),
        Err(DateError::UnknownRelativeDay("2".to_string()))
    );
    assert_eq!(
        parse_token("только что"),
        Err(DateError::UnrecognizedToken("только что".to_string()))
    );
}

#[test]
fn test_yesterday_resolves_against_latest_absolute_date() {
    let columns = normalize_tokens(&["08 февраля 2023 · 10:15", "Вчера в 09:00"]).unwrap();

    assert_eq!(columns.dates, vec![date(2023, 2, 9), date(2023, 2, 8)]);
    assert_eq!(columns.times, vec!["09:00", "10:15"]);
}

#[test]
fn test_today_is_two_days_after_anchor() {
    let columns = normalize_tokens(&[
        "Сегодня в 12:00",
        "Вчера в 11:00",
        "05 февраля 2023 · 10:00",
        "07 февраля 2023 · 09:00",
    ])
    .unwrap();

    assert_eq!(
        columns.dates,
        vec![
            date(2023, 2, 9),
            date(2023, 2, 8),
            date(2023, 2, 7),
            date(2023, 2, 5),
        ]
    );
    // Relative times first, then absolute times, each in encounter order
    assert_eq!(columns.times, vec!["12:00", "11:00", "10:00", "09:00"]);
}

#[test]
fn test_times_are_not_repaired_with_sorted_dates() {
    let columns = normalize_tokens(&[
        "01 марта 2023 · 08:00",
        "Вчера в 07:00",
        "03 марта 2023 · 06:00",
    ])
    .unwrap();

    assert_eq!(
        columns.dates,
        vec![date(2023, 3, 4), date(2023, 3, 3), date(2023, 3, 1)]
    );
    assert_eq!(columns.times, vec!["07:00", "08:00", "06:00"]);
}

#[test]
fn test_anchor_crosses_year_boundary() {
    let columns = normalize_tokens(&["31 декабря 2022 · 10:00", "Сегодня в 00:05"]).unwrap();
    assert_eq!(columns.dates, vec![date(2023, 1, 2), date(2022, 12, 31)]);
}

#[test]
fn test_relative_only_batch_has_no_anchor() {
    let result = normalize_tokens(&["Вчера в 09:00", "Сегодня в 10:00"]);
    assert_eq!(result, Err(DateError::NoAnchor));
}

#[test]
fn test_empty_batch() {
    let columns = normalize_tokens::<&str>(&[]).unwrap();
    assert!(columns.dates.is_empty());
    assert!(columns.times.is_empty());
}

#[test]
fn test_normalize_builds_rows() {
    let rows = normalize(vec![
        post("first", "08 февраля 2023 · 10:15"),
        post("second", "Вчера в 09:00"),
    ])
    .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].posts, "first");
    assert_eq!(rows[0].date, date(2023, 2, 9));
    assert_eq!(rows[0].time, "09:00");
    assert_eq!(rows[1].posts, "second");
    assert_eq!(rows[1].date, date(2023, 2, 8));
    assert_eq!(rows[1].time, "10:15");
    assert!(rows.iter().all(|r| r.ticker == "SBER"));
}

#[test]
fn test_normalize_propagates_errors() {
    let result = normalize(vec![post("only", "Сегодня в 10:00")]);
    assert_eq!(result, Err(DateError::NoAnchor));
}
