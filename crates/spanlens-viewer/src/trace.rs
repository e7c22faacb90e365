//! Trace events and the span state they build up.
//!
//! A trace file is a stream of JSON-encoded [`TraceEvent`]s. Start events open
//! a span, end events close it, and the style of a closed async span comes
//! from its outcome.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::spans::{Span, SpanId, SpanStyle};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum AsyncOutcome {
    Success,
    Cancelled,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum TraceEvent {
    AsyncStart {
        name: String,
        id: SpanId,
        parent_id: SpanId,
        ts: Duration,
        #[serde(default)]
        metadata: serde_json::Value,
    },
    AsyncOnCPU {
        id: SpanId,
        ts: Duration,
    },
    AsyncOffCPU {
        id: SpanId,
        ts: Duration,
    },
    AsyncEnd {
        id: SpanId,
        ts: Duration,
        outcome: AsyncOutcome,
    },

    SyncStart {
        name: String,
        id: SpanId,
        parent_id: SpanId,
        ts: Duration,
        #[serde(default)]
        metadata: serde_json::Value,
    },
    SyncEnd {
        id: SpanId,
        ts: Duration,
    },

    ThreadStart {
        name: String,
        id: SpanId,
        ts: Duration,
    },
    ThreadEnd {
        id: SpanId,
        ts: Duration,
    },

    Wakeup {
        waking_span: SpanId,
        parked_span: SpanId,
        ts: Duration,
    },
}

impl TraceEvent {
    pub fn ts(&self) -> Duration {
        use TraceEvent::*;
        match *self {
            AsyncStart { ts, .. }
            | AsyncOnCPU { ts, .. }
            | AsyncOffCPU { ts, .. }
            | AsyncEnd { ts, .. }
            | SyncStart { ts, .. }
            | SyncEnd { ts, .. }
            | ThreadStart { ts, .. }
            | ThreadEnd { ts, .. }
            | Wakeup { ts, .. } => ts,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SpanKind {
    Async,
    Sync,
    Thread,
}

impl SpanKind {
    fn in_progress(self) -> SpanStyle {
        match self {
            SpanKind::Async => SpanStyle::AsyncInProgress,
            SpanKind::Sync => SpanStyle::SyncInProgress,
            SpanKind::Thread => SpanStyle::ThreadInProgress,
        }
    }

    /// Style of a span of this kind closed by `end`; `None` if an async span
    /// is closed by anything but an async end.
    fn finished(self, end: &TraceEvent) -> Option<SpanStyle> {
        match (self, end) {
            (SpanKind::Async, TraceEvent::AsyncEnd { outcome, .. }) => Some(match outcome {
                AsyncOutcome::Success => SpanStyle::AsyncSuccess,
                AsyncOutcome::Cancelled => SpanStyle::AsyncCancel,
                AsyncOutcome::Error(_) => SpanStyle::AsyncError,
            }),
            (SpanKind::Async, _) => None,
            (SpanKind::Sync, _) => Some(SpanStyle::SyncFinished),
            (SpanKind::Thread, _) => Some(SpanStyle::ThreadFinished),
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveSpan {
    kind: SpanKind,
    name: String,
    parent_id: Option<SpanId>,
    start: Duration,
}

impl ActiveSpan {
    fn span(&self, id: SpanId, end: Duration, style: SpanStyle) -> Span {
        Span {
            id,
            parent_id: self.parent_id,
            name: self.name.clone(),
            start: self.start,
            end,
            style,
            row: 0,
        }
    }
}

fn label(name: &str, metadata: &serde_json::Value) -> String {
    if metadata.is_null() {
        name.to_string()
    } else {
        format!("{name} {metadata}")
    }
}

/// Open and closed spans of a trace.
#[derive(Debug, Default)]
pub struct TraceState {
    active: BTreeMap<SpanId, ActiveSpan>,
    finished: Vec<Span>,
    end_time: Duration,
}

impl TraceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest timestamp seen in any event.
    #[inline]
    pub fn end_time(&self) -> Duration {
        self.end_time
    }

    /// Open plus closed spans.
    pub fn len(&self) -> usize {
        self.active.len() + self.finished.len()
    }

    pub fn add_event(&mut self, event: TraceEvent) {
        self.end_time = self.end_time.max(event.ts());

        match event {
            TraceEvent::AsyncStart { name, id, parent_id, ts, metadata } => {
                self.open(id, SpanKind::Async, label(&name, &metadata), Some(parent_id), ts);
            }
            TraceEvent::SyncStart { name, id, parent_id, ts, metadata } => {
                self.open(id, SpanKind::Sync, label(&name, &metadata), Some(parent_id), ts);
            }
            TraceEvent::ThreadStart { name, id, ts } => {
                self.open(id, SpanKind::Thread, name, None, ts);
            }
            TraceEvent::AsyncOnCPU { .. } | TraceEvent::AsyncOffCPU { .. } => {}
            TraceEvent::AsyncEnd { id, ts, .. }
            | TraceEvent::SyncEnd { id, ts }
            | TraceEvent::ThreadEnd { id, ts } => {
                let Some(active) = self.active.remove(&id) else {
                    log::warn!("end event for unknown span id {id:?}");
                    return;
                };
                match active.kind.finished(&event) {
                    Some(style) => self.finished.push(active.span(id, ts, style)),
                    None => log::warn!("span {id:?} ({}) closed by {event:?}; dropped", active.name),
                }
            }
            TraceEvent::Wakeup { waking_span, parked_span, .. } => {
                if self.active.contains_key(&waking_span) {
                    log::trace!("{waking_span:?} woke {parked_span:?}");
                } else {
                    log::warn!("wakeup from unknown span id {waking_span:?}");
                }
            }
        }
    }

    fn open(&mut self, id: SpanId, kind: SpanKind, name: String, parent_id: Option<SpanId>, ts: Duration) {
        let span = ActiveSpan { kind, name, parent_id, start: ts };
        if let Some(previous) = self.active.insert(id, span) {
            log::warn!("span id {id:?} reopened; dropping open span {}", previous.name);
        }
    }

    /// Spans visible in `[start, end)`.
    ///
    /// Open spans that started before `end` are reported in progress up to
    /// `end`; closed spans are reported if they overlap the window.
    pub fn select(&self, start: Duration, end: Duration) -> Vec<Span> {
        let in_progress = self
            .active
            .iter()
            .filter(|(_, s)| s.start < end)
            .map(|(id, s)| s.span(*id, end, s.kind.in_progress()));
        let finished = self
            .finished
            .iter()
            .filter(|s| s.start < end && s.end > start)
            .cloned();
        in_progress.chain(finished).collect()
    }

    /// Reads a stream of JSON events; stops at the first malformed one.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let mut state = Self::new();
        let events = serde_json::Deserializer::from_slice(bytes).into_iter::<TraceEvent>();
        for (index, event) in events.enumerate() {
            let event = event.with_context(|| format!("malformed trace event #{index}"))?;
            state.add_event(event);
        }
        log::debug!("trace loaded: {} spans, ends at {:?}", state.len(), state.end_time);
        Ok(state)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read trace {}", path.display()))?;
        Self::from_json(&bytes).with_context(|| format!("failed to parse trace {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn async_start(id: u64, parent: u64, ts: u64) -> TraceEvent {
        TraceEvent::AsyncStart {
            name: format!("task{id}"),
            id: SpanId(id),
            parent_id: SpanId(parent),
            ts: ms(ts),
            metadata: serde_json::Value::Null,
        }
    }

    fn async_end(id: u64, ts: u64, outcome: AsyncOutcome) -> TraceEvent {
        TraceEvent::AsyncEnd { id: SpanId(id), ts: ms(ts), outcome }
    }

    fn style_of(spans: &[Span], id: u64) -> Option<SpanStyle> {
        spans.iter().find(|s| s.id == SpanId(id)).map(|s| s.style)
    }

    // ── styles ────────────────────────────────────────────────────────────

    #[test]
    fn async_outcome_selects_style() {
        let mut state = TraceState::new();
        for id in 1..=3 {
            state.add_event(async_start(id, 0, 0));
        }
        state.add_event(async_end(1, 10, AsyncOutcome::Success));
        state.add_event(async_end(2, 10, AsyncOutcome::Cancelled));
        state.add_event(async_end(3, 10, AsyncOutcome::Error("boom".into())));

        let spans = state.select(ms(0), ms(100));
        assert_eq!(style_of(&spans, 1), Some(SpanStyle::AsyncSuccess));
        assert_eq!(style_of(&spans, 2), Some(SpanStyle::AsyncCancel));
        assert_eq!(style_of(&spans, 3), Some(SpanStyle::AsyncError));
    }

    #[test]
    fn sync_and_thread_spans_finish() {
        let mut state = TraceState::new();
        state.add_event(TraceEvent::ThreadStart { name: "main".into(), id: SpanId(1), ts: ms(0) });
        state.add_event(TraceEvent::SyncStart {
            name: "parse".into(),
            id: SpanId(2),
            parent_id: SpanId(1),
            ts: ms(5),
            metadata: serde_json::json!({"file": "a.rs"}),
        });
        state.add_event(TraceEvent::SyncEnd { id: SpanId(2), ts: ms(8) });
        state.add_event(TraceEvent::ThreadEnd { id: SpanId(1), ts: ms(20) });

        let spans = state.select(ms(0), ms(100));
        assert_eq!(style_of(&spans, 1), Some(SpanStyle::ThreadFinished));
        assert_eq!(style_of(&spans, 2), Some(SpanStyle::SyncFinished));

        let parse = spans.iter().find(|s| s.id == SpanId(2)).unwrap();
        assert_eq!(parse.parent_id, Some(SpanId(1)));
        assert_eq!(parse.name, r#"parse {"file":"a.rs"}"#);
        assert_eq!((parse.start, parse.end), (ms(5), ms(8)));
    }

    #[test]
    fn open_spans_are_in_progress_until_window_end() {
        let mut state = TraceState::new();
        state.add_event(async_start(1, 0, 10));
        state.add_event(TraceEvent::ThreadStart { name: "t".into(), id: SpanId(2), ts: ms(50) });
        assert_eq!(state.end_time(), ms(50));

        let spans = state.select(ms(0), ms(40));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].style, SpanStyle::AsyncInProgress);
        assert_eq!(spans[0].end, ms(40));

        let spans = state.select(ms(0), ms(60));
        assert_eq!(style_of(&spans, 2), Some(SpanStyle::ThreadInProgress));
    }

    #[test]
    fn async_span_closed_by_sync_end_is_dropped() {
        let mut state = TraceState::new();
        state.add_event(async_start(1, 0, 0));
        state.add_event(TraceEvent::SyncEnd { id: SpanId(1), ts: ms(5) });
        assert_eq!(state.len(), 0);
    }

    // ── unknown ids ───────────────────────────────────────────────────────

    #[test]
    fn end_for_unknown_id_is_ignored() {
        let mut state = TraceState::new();
        state.add_event(async_start(1, 0, 0));
        state.add_event(async_end(7, 30, AsyncOutcome::Success));
        assert_eq!(state.len(), 1);
        assert_eq!(state.end_time(), ms(30));
        assert_eq!(state.select(ms(0), ms(30))[0].style, SpanStyle::AsyncInProgress);
    }

    #[test]
    fn wakeups_do_not_create_spans() {
        let mut state = TraceState::new();
        state.add_event(async_start(1, 0, 0));
        state.add_event(TraceEvent::Wakeup { waking_span: SpanId(1), parked_span: SpanId(2), ts: ms(3) });
        state.add_event(TraceEvent::Wakeup { waking_span: SpanId(9), parked_span: SpanId(1), ts: ms(4) });
        assert_eq!(state.len(), 1);
        assert_eq!(state.end_time(), ms(4));
    }

    // ── window ────────────────────────────────────────────────────────────

    #[test]
    fn select_keeps_finished_spans_overlapping_the_window() {
        let mut state = TraceState::new();
        for (id, start, end) in [(1, 0, 10), (2, 20, 30), (3, 40, 50)] {
            state.add_event(async_start(id, 0, start));
            state.add_event(async_end(id, end, AsyncOutcome::Success));
        }
        let ids: Vec<u64> = state.select(ms(10), ms(40)).iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![2]);
    }

    // ── json ──────────────────────────────────────────────────────────────

    #[test]
    fn reads_a_json_event_stream() {
        let json = br#"
            {"ThreadStart": {"name": "main", "id": 1, "ts": {"secs": 0, "nanos": 0}}}
            {"AsyncStart": {"name": "req", "id": 2, "parent_id": 1, "ts": {"secs": 0, "nanos": 5000000}}}
            {"AsyncEnd": {"id": 2, "ts": {"secs": 0, "nanos": 9000000}, "outcome": {"Error": "timeout"}}}
        "#;
        let state = TraceState::from_json(json).unwrap();
        assert_eq!(state.len(), 2);
        assert_eq!(state.end_time(), ms(9));

        let spans = state.select(Duration::ZERO, ms(10));
        assert_eq!(style_of(&spans, 1), Some(SpanStyle::ThreadInProgress));
        assert_eq!(style_of(&spans, 2), Some(SpanStyle::AsyncError));
    }

    #[test]
    fn malformed_event_is_an_error() {
        let json = br#"{"ThreadStart": {"name": "main", "id": 1, "ts": {"secs": 0, "nanos": 0}}} {"Bogus": {}}"#;
        let err = TraceState::from_json(json).unwrap_err();
        assert!(format!("{err:#}").contains("#1"), "{err:#}");
    }
}
