//! Stage spawn data and the delay-driven scheduler that replays it.
//!
//! Delays are deltas from the previous firing, not absolute stage time.
//! The scheduler fires at most one event per tick and restarts its timer
//! from zero after each firing; overshoot is not carried over.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::LANE_COUNT;
use crate::entities::EntityTag;
use crate::error::SpawnError;

// ── Records ──────────────────────────────────────────────────────────────────

/// Spawn record as it appears in stage data, before validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnRecord {
    #[serde(default)]
    pub delay: f32,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(alias = "lane", default)]
    pub point: i64,
}

/// A validated, immutable spawn request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnEvent {
    delay: f32,
    tag: EntityTag,
    lane: u8,
}

impl SpawnEvent {
    pub fn new(delay: f32, tag: EntityTag, lane: usize) -> Result<Self, SpawnError> {
        validate(0, delay, lane as i64)?;
        Ok(Self {
            delay,
            tag,
            lane: lane as u8,
        })
    }

    /// Validate one record; `line` is only used in error messages.
    pub fn from_record(line: usize, record: &SpawnRecord) -> Result<Self, SpawnError> {
        let name = record.kind.trim();
        if name.is_empty() {
            return Err(SpawnError::EmptyType { line });
        }
        let tag = EntityTag::from_name(name).ok_or_else(|| SpawnError::UnknownType {
            line,
            name: name.to_string(),
        })?;
        validate(line, record.delay, record.point)?;
        Ok(Self {
            delay: record.delay,
            tag,
            lane: record.point as u8,
        })
    }

    #[inline]
    pub fn delay(&self) -> f32 {
        self.delay
    }

    #[inline]
    pub fn tag(&self) -> EntityTag {
        self.tag
    }

    #[inline]
    pub fn lane(&self) -> usize {
        self.lane as usize
    }
}

fn validate(line: usize, delay: f32, lane: i64) -> Result<(), SpawnError> {
    if !(delay.is_finite() && delay >= 0.0) {
        return Err(SpawnError::InvalidDelay { line, delay });
    }
    if !(0..LANE_COUNT as i64).contains(&lane) {
        return Err(SpawnError::LaneOutOfRange { line, lane });
    }
    Ok(())
}

// ── Schedule ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpawnSchedule {
    events: Vec<SpawnEvent>,
}

impl SpawnSchedule {
    pub fn from_events(events: Vec<SpawnEvent>) -> Self {
        Self { events }
    }

    /// Keep the valid records and return the rejected ones alongside.
    pub fn from_records(records: &[SpawnRecord]) -> (Self, Vec<SpawnError>) {
        let numbered = records
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, record)| (i + 1, record))
            .collect();
        Self::collect(numbered, Vec::new())
    }

    /// Parse a JSON array of `{ "delay", "type", "point" }` objects.  Only a
    /// document that is not an array fails as a whole; a record with wrong
    /// field types is rejected on its own.
    pub fn from_json(text: &str) -> Result<(Self, Vec<SpawnError>), SpawnError> {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(text).map_err(|err| SpawnError::Json(err.to_string()))?;

        let mut records = Vec::with_capacity(values.len());
        let mut malformed = Vec::new();
        for (i, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<SpawnRecord>(value) {
                Ok(record) => records.push((i + 1, record)),
                Err(err) => malformed.push(SpawnError::Malformed {
                    line: i + 1,
                    reason: err.to_string(),
                }),
            }
        }
        Ok(Self::collect(records, malformed))
    }

    /// Parse the line format `delay,type,point`.  Blank lines and lines
    /// starting with `#` are skipped.
    pub fn from_text(text: &str) -> (Self, Vec<SpawnError>) {
        let mut records = Vec::new();
        let mut malformed = Vec::new();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_line(i + 1, line) {
                Ok(record) => records.push((i + 1, record)),
                Err(err) => malformed.push(err),
            }
        }
        Self::collect(records, malformed)
    }

    fn collect(
        records: Vec<(usize, SpawnRecord)>,
        mut rejected: Vec<SpawnError>,
    ) -> (Self, Vec<SpawnError>) {
        for err in &rejected {
            warn!(%err, "spawn record rejected");
        }
        let mut events = Vec::with_capacity(records.len());
        for (line, record) in &records {
            match SpawnEvent::from_record(*line, record) {
                Ok(event) => events.push(event),
                Err(err) => {
                    warn!(%err, "spawn record rejected");
                    rejected.push(err);
                }
            }
        }
        info!(accepted = events.len(), rejected = rejected.len(), "spawn schedule loaded");
        (Self { events }, rejected)
    }

    pub fn events(&self) -> &[SpawnEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn parse_line(line: usize, text: &str) -> Result<SpawnRecord, SpawnError> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    let [delay, kind, point] = fields.as_slice() else {
        return Err(SpawnError::Malformed {
            line,
            reason: format!("expected 3 fields, found {}", fields.len()),
        });
    };
    let delay = delay.parse::<f32>().map_err(|err| SpawnError::Malformed {
        line,
        reason: format!("delay: {err}"),
    })?;
    let point = point.parse::<i64>().map_err(|err| SpawnError::Malformed {
        line,
        reason: format!("point: {err}"),
    })?;
    Ok(SpawnRecord {
        delay,
        kind: kind.to_string(),
        point,
    })
}

// ── Scheduler ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct SpawnScheduler {
    schedule: SpawnSchedule,
    next: usize,
    elapsed_since_last: f32,
}

impl SpawnScheduler {
    pub fn new(schedule: SpawnSchedule) -> Self {
        Self {
            schedule,
            next: 0,
            elapsed_since_last: 0.0,
        }
    }

    /// Advance by `dt` and return the event that is due, if any.  The
    /// scheduler moves past a returned event whether or not the caller
    /// manages to place it.
    pub fn tick(&mut self, dt: f32) -> Option<SpawnEvent> {
        let event = *self.schedule.events.get(self.next)?;
        self.elapsed_since_last += dt;
        if self.elapsed_since_last < event.delay {
            return None;
        }
        self.elapsed_since_last = 0.0;
        self.next += 1;
        Some(event)
    }

    /// Rewind to the first event.
    pub fn reset(&mut self) {
        self.next = 0;
        self.elapsed_since_last = 0.0;
    }

    /// Swap in another stage's schedule and rewind.
    pub fn replace(&mut self, schedule: SpawnSchedule) {
        self.schedule = schedule;
        self.reset();
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.schedule.len()
    }

    /// Index of the next event to fire.
    pub fn next_index(&self) -> usize {
        self.next
    }

    pub fn elapsed_since_last(&self) -> f32 {
        self.elapsed_since_last
    }

    pub fn schedule(&self) -> &SpawnSchedule {
        &self.schedule
    }
}
