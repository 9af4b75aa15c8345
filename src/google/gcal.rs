//! Google Calendar API client for listing and inserting events

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Event time from the Calendar API: timed events carry `dateTime`
/// (plus an optional zone), all-day events carry `date` only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDateTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

#[derive(Debug, Deserialize)]
struct EventsListResponse {
    items: Option<Vec<Event>>,
}

/// List events in `[time_min, time_max]` ordered by start time, with
/// recurring events expanded to single instances.
pub async fn list_events(
    api_url: &str,
    access_token: &str,
    calendar_id: &str,
    time_min: DateTime<Utc>,
    time_max: DateTime<Utc>,
    max_results: u32,
) -> Result<Vec<Event>> {
    let url = format!(
        "{}/calendar/v3/calendars/{}/events?timeMin={}&timeMax={}&maxResults={}&singleEvents=true&orderBy=startTime",
        api_url.trim_end_matches('/'),
        urlencoding::encode(calendar_id),
        urlencoding::encode(&time_min.to_rfc3339_opts(SecondsFormat::Secs, true)),
        urlencoding::encode(&time_max.to_rfc3339_opts(SecondsFormat::Secs, true)),
        max_results,
    );
    let response = Client::new()
        .get(&url)
        .bearer_auth(access_token)
        .send()
        .await?
        .error_for_status()?;
    let body: EventsListResponse = response.json().await?;
    Ok(body.items.unwrap_or_default())
}

/// Insert a single event and return the created resource.
pub async fn insert_event(
    api_url: &str,
    access_token: &str,
    calendar_id: &str,
    event: &Event,
) -> Result<Event> {
    let url = format!(
        "{}/calendar/v3/calendars/{}/events",
        api_url.trim_end_matches('/'),
        urlencoding::encode(calendar_id),
    );
    let response = Client::new()
        .post(&url)
        .bearer_auth(access_token)
        .json(event)
        .send()
        .await?
        .error_for_status()?;
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_list_events() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock_resp = r#"{
            "items": [
                {
                    "id": "evt_1",
                    "summary": "Standup",
                    "start": {"dateTime": "2024-02-15T09:00:00-08:00", "timeZone": "America/Los_Angeles"},
                    "end": {"dateTime": "2024-02-15T09:15:00-08:00", "timeZone": "America/Los_Angeles"}
                },
                {
                    "id": "evt_2",
                    "summary": "Offsite",
                    "location": "Tahoe",
                    "start": {"date": "2024-02-16"},
                    "end": {"date": "2024-02-16"}
                }
            ]
        }"#;
        let _mock = server
            .mock("GET", "/calendar/v3/calendars/primary/events")
            .match_query(mockito::Matcher::Regex("singleEvents=true".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(mock_resp)
            .create();

        let time_min = Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap();
        let time_max = Utc.with_ymd_and_hms(2024, 2, 22, 0, 0, 0).unwrap();
        let events = list_events(&url, "test_token", "primary", time_min, time_max, 15)
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].summary.as_deref(), Some("Standup"));
        assert!(events[0].start.date_time.is_some());
        assert_eq!(events[1].start.date.as_deref(), Some("2024-02-16"));
    }

    #[tokio::test]
    async fn test_list_events_empty_items() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("GET", "/calendar/v3/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{}"#)
            .create();

        let time_min = Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap();
        let time_max = Utc.with_ymd_and_hms(2024, 2, 22, 0, 0, 0).unwrap();
        let events = list_events(&url, "test_token", "primary", time_min, time_max, 15)
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_insert_event() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("POST", "/calendar/v3/calendars/primary/events")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "summary": "Dentist",
                "start": {"date": "2024-03-20"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id": "evt_new", "summary": "Dentist", "start": {"date": "2024-03-20"}, "end": {"date": "2024-03-20"}}"#,
            )
            .create();

        let event = Event {
            id: None,
            summary: Some("Dentist".to_string()),
            description: None,
            location: None,
            start: EventDateTime {
                date: Some("2024-03-20".to_string()),
                ..Default::default()
            },
            end: EventDateTime {
                date: Some("2024-03-20".to_string()),
                ..Default::default()
            },
        };
        let created = insert_event(&url, "test_token", "primary", &event)
            .await
            .unwrap();
        assert_eq!(created.id.as_deref(), Some("evt_new"));
    }

    #[tokio::test]
    async fn test_insert_event_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("POST", "/calendar/v3/calendars/primary/events")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"code": 401, "message": "Invalid Credentials"}}"#)
            .create();

        let event = Event {
            id: None,
            summary: Some("Dentist".to_string()),
            description: None,
            location: None,
            start: EventDateTime {
                date: Some("2024-03-20".to_string()),
                ..Default::default()
            },
            end: EventDateTime {
                date: Some("2024-03-20".to_string()),
                ..Default::default()
            },
        };
        let result = insert_event(&url, "bad_token", "primary", &event).await;
        assert!(result.is_err());
    }
}
