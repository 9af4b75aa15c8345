//! Extracts add-event commands the assistant embeds in its replies.
//!
//! Grammar (fields in fixed order; each may be omitted but never
//! reordered — a command with fields out of order is not recognized):
//!
//! ```text
//! command     = "[ADD_EVENT:" *SP fields *SP "]"
//! fields      = field *( "," *SP field )
//! field       = title / date / time / duration / location / description
//! title       = "title=" quoted
//! date        = "date=" quoted          ; YYYY-MM-DD
//! time        = "time=" quoted          ; HH:MM, 24-hour
//! duration    = "duration=" number      ; hours, fractional allowed
//! location    = "location=" quoted
//! description = "description=" quoted
//! quoted      = DQUOTE *( not-DQUOTE ) DQUOTE
//! number      = 1*( DIGIT / "." )
//! ```

use chrono::{NaiveDate, NaiveTime};

use crate::calendar::NewEvent;

const COMMAND_PREFIX: &str = "[ADD_EVENT:";

/// A recognized command as written by the model. Fields are unvalidated
/// text; [`EventCommand::to_new_event`] decides whether it is
/// executable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventCommand {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub duration: Option<f64>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl EventCommand {
    /// Validate into a creation request. Requires a non-empty title
    /// and a well-formed date; a malformed date or time makes the
    /// command inert (it is still stripped from the reply).
    pub fn to_new_event(&self) -> Option<NewEvent> {
        let title = self.title.as_deref().filter(|t| !t.is_empty())?;
        let date = NaiveDate::parse_from_str(self.date.as_deref()?, "%Y-%m-%d").ok()?;
        let time = match self.time.as_deref() {
            Some(t) => Some(NaiveTime::parse_from_str(t, "%H:%M").ok()?),
            None => None,
        };
        Some(NewEvent {
            title: title.to_string(),
            date,
            time,
            duration_hours: self.duration.unwrap_or(1.0),
            location: self.location.clone(),
            description: self.description.clone(),
        })
    }
}

/// Scan a reply for all non-overlapping commands. Returns the reply
/// with every recognized command span removed (and the result
/// trimmed) along with the commands in encounter order. Text that
/// merely resembles a command is left untouched.
pub fn extract_event_commands(reply: &str) -> (String, Vec<EventCommand>) {
    let mut cleaned = String::with_capacity(reply.len());
    let mut commands = Vec::new();
    let mut rest = reply;

    while let Some(idx) = rest.find(COMMAND_PREFIX) {
        let (before, candidate) = rest.split_at(idx);
        cleaned.push_str(before);
        match parse_command(candidate) {
            Some((command, consumed)) => {
                commands.push(command);
                rest = &candidate[consumed..];
            }
            None => {
                cleaned.push_str(COMMAND_PREFIX);
                rest = &candidate[COMMAND_PREFIX.len()..];
            }
        }
    }
    cleaned.push_str(rest);

    (cleaned.trim().to_string(), commands)
}

/// Parse one command at the start of `input` (which begins with the
/// command prefix). Returns the command and the number of bytes
/// consumed.
fn parse_command(input: &str) -> Option<(EventCommand, usize)> {
    let mut cursor = Cursor { input, pos: 0 };
    if !cursor.eat(COMMAND_PREFIX) {
        return None;
    }
    cursor.skip_spaces();

    let mut command = EventCommand::default();
    let mut first = true;
    command.title = cursor.quoted_field("title", &mut first);
    command.date = cursor.quoted_field("date", &mut first);
    command.time = cursor.quoted_field("time", &mut first);
    command.duration = cursor.number_field("duration", &mut first);
    command.location = cursor.quoted_field("location", &mut first);
    command.description = cursor.quoted_field("description", &mut first);

    cursor.skip_spaces();
    if first || !cursor.eat("]") {
        return None;
    }
    Some((command, cursor.pos))
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn eat(&mut self, literal: &str) -> bool {
        if self.input[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    fn skip_spaces(&mut self) {
        while self.input[self.pos..].starts_with(' ') {
            self.pos += 1;
        }
    }

    fn quoted(&mut self) -> Option<String> {
        if !self.eat("\"") {
            return None;
        }
        let rest = &self.input[self.pos..];
        let end = rest.find('"')?;
        let value = rest[..end].to_string();
        self.pos += end + 1;
        Some(value)
    }

    fn number(&mut self) -> Option<f64> {
        let rest = &self.input[self.pos..];
        let len = rest
            .bytes()
            .take_while(|b| b.is_ascii_digit() || *b == b'.')
            .count();
        if len == 0 {
            return None;
        }
        let value = rest[..len].parse().ok()?;
        self.pos += len;
        Some(value)
    }

    /// `name="value"` field at the current position, preceded by a
    /// comma separator unless it is the first field matched. Restores
    /// the cursor and returns None when the field is absent.
    fn quoted_field(&mut self, name: &str, first: &mut bool) -> Option<String> {
        let start = self.pos;
        if !*first && !self.separator() {
            return None;
        }
        if !self.eat(name) || !self.eat("=") {
            self.pos = start;
            return None;
        }
        match self.quoted() {
            Some(value) => {
                *first = false;
                Some(value)
            }
            None => {
                self.pos = start;
                None
            }
        }
    }

    fn number_field(&mut self, name: &str, first: &mut bool) -> Option<f64> {
        let start = self.pos;
        if !*first && !self.separator() {
            return None;
        }
        if !self.eat(name) || !self.eat("=") {
            self.pos = start;
            return None;
        }
        match self.number() {
            Some(value) => {
                *first = false;
                Some(value)
            }
            None => {
                self.pos = start;
                None
            }
        }
    }

    fn separator(&mut self) -> bool {
        if !self.eat(",") {
            return false;
        }
        self.skip_spaces();
        true
    }
}
