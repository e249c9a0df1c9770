//! Calendar tool: lists the events of one day from an iCalendar (ICS) feed.
//!
//! The feed is read from an http(s)/webcal URL or a local file and parsed
//! with the `ical` crate. Only `VEVENT` components and the handful of
//! properties a briefing needs are used. Recurrence rules are not expanded.
//!
//! Event start times are compared by calendar date. UTC times (`...Z`) use
//! the UTC date; floating and `TZID=` times use their wall-clock date.

use std::io::BufReader;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use ical::property::Property;
use ical::IcalParser;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{BriefError, Result};
use crate::log_component;
use crate::tools::{Tool, ToolContext};

const MAX_DESCRIPTION_CHARS: usize = 300;

/// Calendar tool backed by an ICS feed.
pub struct CalendarTool {
    source: String,
    client: Client,
}

impl CalendarTool {
    /// Create a calendar tool reading from `source` (URL or file path).
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent(concat!("good-morning/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    async fn fetch(&self) -> Result<String> {
        let source = self.source.trim();
        let url = match source.strip_prefix("webcal://") {
            Some(rest) => format!("https://{}", rest),
            None => source.to_string(),
        };

        if url.starts_with("http://") || url.starts_with("https://") {
            let response = self.client.get(&url).send().await?.error_for_status()?;
            Ok(response.text().await?)
        } else {
            let path = url.strip_prefix("file://").unwrap_or(&url);
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| BriefError::Tool(format!("cannot read calendar file {}: {}", path, e)))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CalendarInput {
    year: i64,
    month: i64,
    day: i64,
}

/// Validate tool input into a date. Missing fields count as zero.
fn parse_input(args: Value) -> Result<NaiveDate> {
    let input: CalendarInput = serde_json::from_value(args)
        .map_err(|_| BriefError::InvalidArguments("invalid JSON format".into()))?;

    if !(1900..=2100).contains(&input.year) {
        return Err(BriefError::InvalidArguments(
            "year must be between 1900 and 2100".into(),
        ));
    }
    if !(1..=12).contains(&input.month) {
        return Err(BriefError::InvalidArguments(
            "month must be between 1 and 12".into(),
        ));
    }
    if !(1..=31).contains(&input.day) {
        return Err(BriefError::InvalidArguments(
            "day must be between 1 and 31".into(),
        ));
    }

    NaiveDate::from_ymd_opt(input.year as i32, input.month as u32, input.day as u32)
        .ok_or_else(|| BriefError::InvalidArguments("invalid date".into()))
}

#[async_trait]
impl Tool for CalendarTool {
    fn name(&self) -> &str {
        "calendar"
    }

    fn description(&self) -> &str {
        "Get events from the calendar for a given day"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "year": { "type": "integer", "description": "The year to get events for" },
                "month": { "type": "integer", "description": "The month to get events for (1-12)" },
                "day": { "type": "integer", "description": "The day of the month to get events for" }
            },
            "required": ["year", "month", "day"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<String> {
        let date = parse_input(args)?;
        let raw = self.fetch().await?;

        let events = events_on(parse_events(&raw)?, date);
        log_component!(
            info,
            "calendar",
            "Calendar events loaded",
            run_id = ctx.run_id(),
            date = date.to_string(),
            events = events.len()
        );
        Ok(render(date, &events))
    }
}

// ============================================================================
// ICS parsing
// ============================================================================

/// Start or end of an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    /// All-day (`VALUE=DATE`)
    Date(NaiveDate),
    /// Absolute UTC time
    Utc(DateTime<Utc>),
    /// Floating or zoned wall-clock time
    Local {
        at: NaiveDateTime,
        tzid: Option<String>,
    },
}

impl EventTime {
    /// Calendar date used for day filtering.
    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::Date(d) => *d,
            EventTime::Utc(t) => t.date_naive(),
            EventTime::Local { at, .. } => at.date(),
        }
    }

    fn sort_key(&self) -> NaiveDateTime {
        match self {
            EventTime::Date(d) => d.and_time(chrono::NaiveTime::MIN),
            EventTime::Utc(t) => t.naive_utc(),
            EventTime::Local { at, .. } => *at,
        }
    }

    fn clock(&self) -> Option<String> {
        match self {
            EventTime::Date(_) => None,
            EventTime::Utc(t) => Some(format!("{} UTC", t.format("%H:%M"))),
            EventTime::Local { at, tzid } => Some(match tzid {
                Some(tz) => format!("{} {}", at.format("%H:%M"), tz),
                None => at.format("%H:%M").to_string(),
            }),
        }
    }
}

/// One calendar event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    pub summary: String,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub organizer: Option<String>,
    pub attendees: Vec<String>,
    pub url: Option<String>,
    pub status: Option<String>,
}

/// First value of a property parameter, without surrounding quotes.
fn param<'a>(prop: &'a Property, key: &str) -> Option<&'a str> {
    prop.params
        .as_ref()?
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .and_then(|(_, values)| values.first())
        .map(|v| v.trim_matches('"'))
}

fn prop_value(prop: &Property) -> &str {
    prop.value.as_deref().unwrap_or_default().trim()
}

/// Decode TEXT escapes (`\,`, `\;`, `\n`, `\\`).
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') | Some('N') => out.push('\n'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn parse_time(prop: &Property) -> Option<EventTime> {
    let value = prop_value(prop);
    let is_date = param(prop, "VALUE").is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
        || value.len() == 8;

    if is_date {
        return NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .map(EventTime::Date);
    }
    if let Some(utc) = value.strip_suffix('Z') {
        return NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S")
            .ok()
            .map(|at| EventTime::Utc(at.and_utc()));
    }
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
        .ok()
        .map(|at| EventTime::Local {
            at,
            tzid: param(prop, "TZID").map(String::from),
        })
}

/// `CN` parameter if present, else the address without `mailto:`.
fn person(prop: &Property) -> String {
    param(prop, "CN").map(String::from).unwrap_or_else(|| {
        let v = prop_value(prop);
        v.strip_prefix("mailto:")
            .or_else(|| v.strip_prefix("MAILTO:"))
            .unwrap_or(v)
            .to_string()
    })
}

fn event_from(properties: &[Property]) -> Event {
    let mut event = Event::default();
    for prop in properties {
        let value = prop_value(prop);
        match prop.name.to_ascii_uppercase().as_str() {
            "SUMMARY" => event.summary = unescape(value),
            "DTSTART" => event.start = parse_time(prop),
            "DTEND" => event.end = parse_time(prop),
            "LOCATION" if !value.is_empty() => event.location = Some(unescape(value)),
            "DESCRIPTION" if !value.is_empty() => event.description = Some(unescape(value)),
            "ORGANIZER" => event.organizer = Some(person(prop)),
            "ATTENDEE" => event.attendees.push(person(prop)),
            "URL" if !value.is_empty() => event.url = Some(value.to_string()),
            "STATUS" => event.status = Some(value.to_ascii_uppercase()),
            _ => {}
        }
    }
    event
}

/// Parse every `VEVENT` of an ICS document. Alarms and other nested
/// components are ignored.
pub fn parse_events(raw: &str) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for calendar in IcalParser::new(BufReader::new(raw.as_bytes())) {
        let calendar = calendar
            .map_err(|e| BriefError::Tool(format!("invalid calendar feed: {}", e)))?;
        events.extend(calendar.events.iter().map(|e| event_from(&e.properties)));
    }
    Ok(events)
}

/// Events starting on `date`, earliest first. Events without a parseable
/// start are dropped.
pub fn events_on(events: Vec<Event>, date: NaiveDate) -> Vec<Event> {
    let mut matching: Vec<Event> = events
        .into_iter()
        .filter(|e| e.start.as_ref().is_some_and(|s| s.date() == date))
        .collect();
    matching.sort_by_key(|e| e.start.as_ref().map(EventTime::sort_key));
    matching
}

fn render(date: NaiveDate, events: &[Event]) -> String {
    if events.is_empty() {
        return format!("No events scheduled for {}.", date);
    }

    let mut out = format!("{} event(s) on {}:\n", events.len(), date);
    for event in events {
        let when = match (
            event.start.as_ref().and_then(EventTime::clock),
            event.end.as_ref().and_then(EventTime::clock),
        ) {
            (Some(start), Some(end)) => format!("{} - {}", start, end),
            (Some(start), None) => start,
            _ => "All day".to_string(),
        };
        let title = if event.summary.is_empty() {
            "(no title)"
        } else {
            event.summary.as_str()
        };
        out.push_str(&format!("- {}: {}", when, title));
        if event.status.as_deref() == Some("CANCELLED") {
            out.push_str(" (cancelled)");
        }
        out.push('\n');

        if let Some(location) = &event.location {
            out.push_str(&format!("  Location: {}\n", location));
        }
        if let Some(organizer) = &event.organizer {
            out.push_str(&format!("  Organizer: {}\n", organizer));
        }
        if !event.attendees.is_empty() {
            out.push_str(&format!("  Attendees: {}\n", event.attendees.join(", ")));
        }
        if let Some(url) = &event.url {
            out.push_str(&format!("  Link: {}\n", url));
        }
        if let Some(description) = &event.description {
            let mut short: String = description
                .chars()
                .take(MAX_DESCRIPTION_CHARS)
                .collect::<String>()
                .replace('\n', " ");
            if description.chars().count() > MAX_DESCRIPTION_CHARS {
                short.push_str("...");
            }
            out.push_str(&format!("  Notes: {}\n", short));
        }
    }
    out
}
