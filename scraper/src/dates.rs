//! Turns Pulse date labels into calendar dates.
//!
//! Labels come in two shapes:
//!
//! * absolute: `08 февраля 2023 · 10:15`
//! * relative: `Вчера в 09:00` / `Сегодня в 09:00`
//!
//! Relative labels have no date of their own. They are resolved against the
//! latest absolute date in the same batch (the anchor): "yesterday" is the
//! anchor plus one day, "today" the anchor plus two.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::PostRecord;

const MONTHS: [(&str, u32); 12] = [
    ("января", 1),
    ("февраля", 2),
    ("марта", 3),
    ("апреля", 4),
    ("мая", 5),
    ("июня", 6),
    ("июля", 7),
    ("августа", 8),
    ("сентября", 9),
    ("октября", 10),
    ("ноября", 11),
    ("декабря", 12),
];

/// One row of a ticker dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub posts: String,
    pub date: NaiveDate,
    pub time: String,
    pub ticker: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("relative dates found but no absolute date to anchor them on")]
    NoAnchor,

    #[error("unknown month name: {0}")]
    UnknownMonth(String),

    #[error("unknown relative day: {0}")]
    UnknownRelativeDay(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("unrecognized date label: {0:?}")]
    UnrecognizedToken(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDay {
    Yesterday,
    Today,
}

impl RelativeDay {
    fn parse(word: &str) -> Result<Self, DateError> {
        match word {
            "Вчера" => Ok(RelativeDay::Yesterday),
            "Сегодня" => Ok(RelativeDay::Today),
            other => Err(DateError::UnknownRelativeDay(other.to_string())),
        }
    }

    /// Days after the anchor date.
    pub fn offset_days(self) -> u64 {
        match self {
            RelativeDay::Yesterday => 1,
            RelativeDay::Today => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateToken {
    Absolute { date: NaiveDate, time: String },
    Relative { day: RelativeDay, time: String },
}

pub fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(month, _)| *month == name)
        .map(|(_, number)| *number)
}

pub fn parse_token(token: &str) -> Result<DateToken, DateError> {
    let parts: Vec<&str> = token.split_whitespace().collect();
    match parts.as_slice() {
        [day, month, year, _, time] => {
            let month_num =
                month_number(month).ok_or_else(|| DateError::UnknownMonth(month.to_string()))?;
            let invalid = || DateError::InvalidDate(token.to_string());
            let day: u32 = day.parse().map_err(|_| invalid())?;
            let year: i32 = year.parse().map_err(|_| invalid())?;
            let date = NaiveDate::from_ymd_opt(year, month_num, day).ok_or_else(invalid)?;
            Ok(DateToken::Absolute {
                date,
                time: time.to_string(),
            })
        }
        [word, _, time] => Ok(DateToken::Relative {
            day: RelativeDay::parse(word)?,
            time: time.to_string(),
        }),
        _ => Err(DateError::UnrecognizedToken(token.to_string())),
    }
}

/// Date and time columns rebuilt from a batch of labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateColumns {
    /// Newest first.
    pub dates: Vec<NaiveDate>,
    /// Times of relative labels in encounter order, then those of absolute labels.
    pub times: Vec<String>,
}

/// Rebuilds the date and time columns for a batch of labels.
///
/// The columns are not re-paired: dates are sorted newest first while times
/// keep relative-then-absolute encounter order, and row `i` simply takes
/// `dates[i]` and `times[i]`. Existing datasets were written this way.
pub fn normalize_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<DateColumns, DateError> {
    let mut absolute_dates = Vec::new();
    let mut absolute_times = Vec::new();
    let mut relative = Vec::new();

    for token in tokens {
        match parse_token(token.as_ref())? {
            DateToken::Absolute { date, time } => {
                absolute_dates.push(date);
                absolute_times.push(time);
            }
            DateToken::Relative { day, time } => relative.push((day, time)),
        }
    }

    let mut dates = Vec::with_capacity(tokens.len());
    let mut times = Vec::with_capacity(tokens.len());

    if !relative.is_empty() {
        let anchor = absolute_dates
            .iter()
            .max()
            .copied()
            .ok_or(DateError::NoAnchor)?;
        for (day, time) in relative {
            let date = anchor
                .checked_add_days(Days::new(day.offset_days()))
                .ok_or_else(|| DateError::InvalidDate(format!("{} + {:?}", anchor, day)))?;
            dates.push(date);
            times.push(time);
        }
    }

    dates.extend(absolute_dates);
    times.extend(absolute_times);
    dates.sort_by(|a, b| b.cmp(a));

    Ok(DateColumns { dates, times })
}

pub fn normalize(posts: Vec<PostRecord>) -> Result<Vec<NormalizedRecord>, DateError> {
    let tokens: Vec<&str> = posts.iter().map(|p| p.raw_date_token.as_str()).collect();
    let DateColumns { dates, times } = normalize_tokens(&tokens)?;

    Ok(posts
        .into_iter()
        .zip(dates.into_iter().zip(times))
        .map(|(post, (date, time))| NormalizedRecord {
            posts: post.raw_text,
            date,
            time,
            ticker: post.ticker,
        })
        .collect())
}
