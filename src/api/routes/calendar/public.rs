//! Public types for the calendar API
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct CalendarStatusResponse {
    pub connected: bool,
    #[serde(rename = "calendarId")]
    pub calendar_id: Option<String>,
}
