//! Event date and time display
//!
//! Dates are shown in the event's timezone. When the event starts and ends
//! on the same calendar day the end date is dropped and the end time is
//! shown instead, as a time range on its own line.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use keygate_core::EventError;
use serde::Serialize;

use crate::event::{Event, Ticket};

fn event_timezone(ticket: &Ticket) -> Result<Tz, EventError> {
    match ticket.event_timezone.as_deref() {
        None | Some("") => Ok(Tz::UTC),
        Some(name) => name.parse::<Tz>().map_err(|_| EventError::InvalidTimezone {
            timezone: name.to_string(),
        }),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, EventError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| EventError::InvalidDate {
        value: value.to_string(),
    })
}

fn parse_time(value: &str) -> Result<NaiveTime, EventError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| EventError::InvalidDate {
            value: value.to_string(),
        })
}

fn localize(
    tz: Tz,
    date: &str,
    time: Option<&str>,
) -> Result<DateTime<Tz>, EventError> {
    let date = parse_date(date)?;
    let time = match time.filter(|t| !t.is_empty()) {
        Some(time) => parse_time(time)?,
        None => NaiveTime::default(),
    };
    let naive = NaiveDateTime::new(date, time);
    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| EventError::InvalidDate {
            value: naive.to_string(),
        })
}

/// Start of the event in its timezone, if the ticket has a start date
pub fn get_event_date(ticket: &Ticket) -> Result<Option<DateTime<Tz>>, EventError> {
    let Some(date) = ticket.event_start_date.as_deref().filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    let tz = event_timezone(ticket)?;
    localize(tz, date, ticket.event_start_time.as_deref()).map(Some)
}

/// End of the event in its timezone. Without an end date the event ends on
/// its start date.
pub fn get_event_end_date(ticket: &Ticket) -> Result<Option<DateTime<Tz>>, EventError> {
    let date = ticket
        .event_end_date
        .as_deref()
        .filter(|d| !d.is_empty())
        .or_else(|| ticket.event_start_date.as_deref().filter(|d| !d.is_empty()));
    let Some(date) = date else {
        return Ok(None);
    };
    let tz = event_timezone(ticket)?;
    localize(tz, date, ticket.event_end_time.as_deref()).map(Some)
}

fn uses_12_hour_clock(locale: &str) -> bool {
    let locale = locale.to_ascii_lowercase();
    match locale.as_str() {
        "en-gb" | "en-ie" => false,
        "en" => true,
        other => other.starts_with("en-") || other == "es-mx" || other == "hi-in",
    }
}

fn format_date(date: &DateTime<Tz>) -> String {
    date.format("%A, %b %-d, %Y").to_string()
}

fn format_time(date: &DateTime<Tz>, locale: &str) -> String {
    if uses_12_hour_clock(locale) {
        date.format("%I:%M %p").to_string()
    } else {
        date.format("%H:%M").to_string()
    }
}

/// Display strings for the event's date block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSchedule {
    pub start_date: Option<String>,
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
}

impl EventSchedule {
    pub fn for_event(event: &Event, locale: &str) -> Result<Self, EventError> {
        let ticket = &event.ticket;
        let start = get_event_date(ticket)?;
        let end = get_event_end_date(ticket)?;

        let same_day = match (&start, &end) {
            (Some(start), Some(end)) => start.date_naive() == end.date_naive(),
            _ => false,
        };
        let has_start_time = ticket
            .event_start_time
            .as_deref()
            .is_some_and(|t| !t.is_empty());
        let has_end_time = ticket
            .event_end_time
            .as_deref()
            .is_some_and(|t| !t.is_empty());

        Ok(Self {
            start_date: start.as_ref().map(format_date),
            start_time: start
                .as_ref()
                .filter(|_| has_start_time)
                .map(|d| format_time(d, locale)),
            end_date: end.as_ref().filter(|_| !same_day).map(format_date),
            end_time: match (&start, &end) {
                (Some(_), Some(end)) if same_day && has_end_time => Some(format_time(end, locale)),
                _ => None,
            },
        })
    }

    pub fn has_date(&self) -> bool {
        self.start_date.is_some()
            || self.start_time.is_some()
            || self.end_date.is_some()
            || self.end_time.is_some()
    }

    /// "{start} to {end}", or just the start date
    pub fn date_line(&self) -> Option<String> {
        match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) => Some(format!("{} to {}", start, end)),
            (Some(start), None) => Some(start.clone()),
            (None, Some(end)) => Some(end.clone()),
            (None, None) => None,
        }
    }

    /// Time range, only when both ends are known
    pub fn time_line(&self) -> Option<String> {
        match (&self.start_time, &self.end_time) {
            (Some(start), Some(end)) => Some(format!("{} to {}", start, end)),
            _ => None,
        }
    }
}
