//! Audio sink contract and the built-in sinks.
//!
//! Sound inside a block program is fire-and-forget: the engine reports that
//! a sound should play and never waits on playback. Hosts inject a sink at
//! construction; tests read the recorded events back instead of listening.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kinds of audio event a sink can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioEventKind {
    PlaySound,
}

/// One recorded playback request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioEvent {
    pub kind: AudioEventKind,
    /// Clip id, when the block named one.
    pub id: Option<String>,
    /// Wall-clock time the request was recorded.
    pub ts: DateTime<Utc>,
}

/// Playback target injected into the engines.
///
/// `play` must not block. The event log is part of the contract so tests
/// can assert on emission without real audio hardware.
pub trait AudioSink: Send + Sync {
    /// Record (and, in real hosts, start) a playback request.
    fn play(&self, id: Option<&str>);
    /// Snapshot of every event recorded so far, oldest first.
    fn events(&self) -> Vec<AudioEvent>;
}

/// Sink that records events in memory. The default for runtimes and tests.
#[derive(Debug, Default)]
pub struct MemoryAudioSink {
    events: Mutex<Vec<AudioEvent>>,
}

impl MemoryAudioSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events recorded so far.
    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AudioSink for MemoryAudioSink {
    fn play(&self, id: Option<&str>) {
        let event = AudioEvent {
            kind: AudioEventKind::PlaySound,
            id: id.map(str::to_string),
            ts: Utc::now(),
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    fn events(&self) -> Vec<AudioEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

/// Sink that discards everything. For muted hosts and replay drivers that
/// must not double-play.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn play(&self, _id: Option<&str>) {}

    fn events(&self) -> Vec<AudioEvent> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemoryAudioSink::new();
        assert!(sink.is_empty());
        sink.play(None);
        sink.play(Some("chime"));
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, AudioEventKind::PlaySound);
        assert_eq!(events[0].id, None);
        assert_eq!(events[1].id.as_deref(), Some("chime"));
        assert!(events[0].ts <= events[1].ts);
    }

    #[test]
    fn null_sink_swallows_everything() {
        let sink = NullAudioSink;
        sink.play(Some("chime"));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn events_serialize_with_snake_case_kind() {
        let sink = MemoryAudioSink::new();
        sink.play(None);
        let json = serde_json::to_string(&sink.events()).unwrap();
        assert!(json.contains(r#""kind":"play_sound""#));
    }
}
