use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::google::gcal;

/// Timed events are created in a fixed zone rather than per-user
/// timezone preferences.
pub const EVENT_TIME_ZONE: &str = "America/Los_Angeles";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub auth_subject: String,
    pub email: String,
}

/// One OAuth credential per user. `calendar_id` is the connected
/// Google account's email. `refresh_token` may be empty when the
/// provider omits it on a repeat consent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarToken {
    pub id: String,
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub calendar_id: String,
}

/// A validated event-creation request, typically produced by the chat
/// command parser.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub duration_hours: f64,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl NewEvent {
    /// Build the wire representation: a timed event spanning
    /// `duration_hours` from date+time, or an all-day event on the
    /// single given date when no time was supplied.
    pub fn to_calendar_event(&self) -> gcal::Event {
        let (start, end) = match self.time {
            Some(time) => {
                let start = NaiveDateTime::new(self.date, time);
                let end = start + Duration::minutes((self.duration_hours * 60.0).round() as i64);
                (
                    gcal::EventDateTime {
                        date_time: Some(start.format("%Y-%m-%dT%H:%M:%S").to_string()),
                        time_zone: Some(EVENT_TIME_ZONE.to_string()),
                        date: None,
                    },
                    gcal::EventDateTime {
                        date_time: Some(end.format("%Y-%m-%dT%H:%M:%S").to_string()),
                        time_zone: Some(EVENT_TIME_ZONE.to_string()),
                        date: None,
                    },
                )
            }
            None => (
                gcal::EventDateTime {
                    date: Some(self.date.to_string()),
                    ..Default::default()
                },
                gcal::EventDateTime {
                    date: Some(self.date.to_string()),
                    ..Default::default()
                },
            ),
        };

        gcal::Event {
            id: None,
            summary: Some(self.title.clone()),
            description: self.description.clone(),
            location: self.location.clone(),
            start,
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_event(date: &str, time: Option<&str>, duration_hours: f64) -> NewEvent {
        NewEvent {
            title: "X".to_string(),
            date: date.parse().unwrap(),
            time: time.map(|t| NaiveTime::parse_from_str(t, "%H:%M").unwrap()),
            duration_hours,
            location: None,
            description: None,
        }
    }

    #[test]
    fn test_all_day_event_spans_single_date() {
        let event = new_event("2024-03-20", None, 1.0).to_calendar_event();
        assert_eq!(event.start.date.as_deref(), Some("2024-03-20"));
        assert_eq!(event.end.date.as_deref(), Some("2024-03-20"));
        assert!(event.start.date_time.is_none());
        assert!(event.end.date_time.is_none());
    }

    #[test]
    fn test_timed_event_end_is_start_plus_duration() {
        let event = new_event("2024-03-20", Some("10:00"), 1.5).to_calendar_event();
        assert_eq!(
            event.start.date_time.as_deref(),
            Some("2024-03-20T10:00:00")
        );
        assert_eq!(event.end.date_time.as_deref(), Some("2024-03-20T11:30:00"));
        assert_eq!(event.start.time_zone.as_deref(), Some(EVENT_TIME_ZONE));

        let start: NaiveDateTime = event.start.date_time.unwrap().parse().unwrap();
        let end: NaiveDateTime = event.end.date_time.unwrap().parse().unwrap();
        assert_eq!(end - start, Duration::minutes(90));
    }

    #[test]
    fn test_timed_event_defaults_to_one_hour() {
        let event = new_event("2024-03-20", Some("23:30"), 1.0).to_calendar_event();
        // Crosses midnight into the next day
        assert_eq!(event.end.date_time.as_deref(), Some("2024-03-21T00:30:00"));
    }
}
