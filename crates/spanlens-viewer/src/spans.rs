//! Span model, hierarchical row assignment and a built-in demo trace.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use spanlens_engine::coords::ColorRgb;

/// Kind and state of a span; selects its box color.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SpanStyle {
    ThreadInProgress,
    ThreadFinished,
    SyncInProgress,
    SyncFinished,
    AsyncInProgress,
    AsyncSuccess,
    AsyncCancel,
    AsyncError,
}

impl SpanStyle {
    /// Draw order: one box draw per style, later styles on top.
    pub const DRAW_ORDER: [SpanStyle; 8] = [
        SpanStyle::AsyncCancel,
        SpanStyle::AsyncError,
        SpanStyle::AsyncSuccess,
        SpanStyle::AsyncInProgress,
        SpanStyle::SyncFinished,
        SpanStyle::SyncInProgress,
        SpanStyle::ThreadFinished,
        SpanStyle::ThreadInProgress,
    ];

    pub const fn color(self) -> ColorRgb {
        match self {
            SpanStyle::AsyncCancel => ColorRgb::new(0.3, 0.3, 0.7),
            SpanStyle::AsyncError => ColorRgb::new(0.4, 0.1, 0.9),
            SpanStyle::AsyncSuccess => ColorRgb::new(0.0, 0.0, 0.9),
            SpanStyle::AsyncInProgress => ColorRgb::new(0.0, 0.0, 0.7),
            SpanStyle::SyncFinished => ColorRgb::new(0.8, 0.8, 0.0),
            SpanStyle::SyncInProgress => ColorRgb::new(0.6, 0.6, 0.0),
            SpanStyle::ThreadFinished => ColorRgb::new(0.2, 0.8, 0.0),
            SpanStyle::ThreadInProgress => ColorRgb::new(0.1, 0.7, 0.0),
        }
    }
}

/// Identifier of a span within one trace.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize)]
pub struct SpanId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub id: SpanId,
    pub parent_id: Option<SpanId>,
    pub name: String,
    pub start: Duration,
    pub end: Duration,
    pub style: SpanStyle,
    pub row: u16,
}

impl Span {
    pub fn new(id: u64, name: &str, start_ms: u64, end_ms: u64, style: SpanStyle) -> Self {
        Self {
            id: SpanId(id),
            parent_id: None,
            name: name.to_string(),
            start: Duration::from_millis(start_ms),
            end: Duration::from_millis(end_ms.max(start_ms)),
            style,
            row: 0,
        }
    }

    pub fn child_of(mut self, parent: u64) -> Self {
        self.parent_id = Some(SpanId(parent));
        self
    }
}

/// Rows taken by a parent's children, in allocation order.
type RowPath = Vec<u16>;

/// Interval sweep over the children of one parent.
///
/// A row is reused once the span on it ended strictly before the new span
/// starts, lowest free row first.
#[derive(Debug, Default)]
struct Sweep {
    next_free: u32,
    free: BTreeSet<u16>,
    ends: BTreeSet<(Duration, u16)>,
}

impl Sweep {
    fn alloc(&mut self, span: &Span) -> Result<u16> {
        while let Some(&(end, row)) = self.ends.first() {
            if end >= span.start {
                break;
            }
            self.ends.pop_first();
            self.free.insert(row);
        }

        let row = match self.free.pop_first() {
            Some(row) => row,
            None => {
                let Ok(row) = u16::try_from(self.next_free) else {
                    bail!("more than {} overlapping siblings at {:?}", u16::MAX as u32 + 1, span.start);
                };
                self.next_free += 1;
                row
            }
        };
        self.ends.insert((span.end, row));
        Ok(row)
    }
}

/// Places spans on rows so that no two spans on a row overlap.
///
/// Children are laid out under their parent: each parent runs its own sweep
/// over its children, and rows are ordered by the resulting path, so a
/// parent's row is directly followed by its children's rows. Spans whose
/// parent is unknown are treated as roots. Returns the number of rows used.
pub fn assign_rows(spans: &mut [Span]) -> Result<u16> {
    // Parents sort before children that start at the same time.
    spans.sort_by_key(|s| (s.start, Reverse(s.end)));

    let mut paths: BTreeMap<SpanId, RowPath> = BTreeMap::new();
    let mut sweeps: BTreeMap<RowPath, Sweep> = BTreeMap::new();
    let mut span_paths: Vec<RowPath> = Vec::with_capacity(spans.len());

    for span in spans.iter() {
        let mut path = match span.parent_id {
            Some(parent) => paths.get(&parent).cloned().unwrap_or_else(|| {
                log::warn!("unknown parent span {parent:?} of {:?}", span.id);
                RowPath::new()
            }),
            None => RowPath::new(),
        };
        let row = sweeps.entry(path.clone()).or_default().alloc(span)?;
        path.push(row);
        paths.insert(span.id, path.clone());
        span_paths.push(path);
    }

    let mut rows: BTreeMap<&RowPath, u16> = span_paths.iter().map(|path| (path, 0)).collect();
    let total = u16::try_from(rows.len()).context("trace needs more than 65535 rows")?;
    for (index, row) in rows.values_mut().enumerate() {
        // `index < total`, which fits in u16.
        *row = index as u16;
    }
    for (span, path) in spans.iter_mut().zip(&span_paths) {
        span.row = rows[path];
    }

    Ok(total)
}

/// Visible time range `(start, end)` covering every span.
pub fn time_range(spans: &[Span]) -> Option<(Duration, Duration)> {
    let start = spans.iter().map(|s| s.start).min()?;
    let end = spans.iter().map(|s| s.end).max()?;
    Some((start, end))
}

/// Small synthetic trace: two threads, request handlers and their I/O.
pub fn demo_spans() -> Vec<Span> {
    use SpanStyle::*;
    vec![
        Span::new(1, "main", 0, 1000, ThreadInProgress),
        Span::new(2, "load config", 10, 120, SyncFinished).child_of(1),
        Span::new(3, "GET /index", 130, 420, AsyncSuccess).child_of(1),
        Span::new(4, "db query", 160, 300, AsyncSuccess).child_of(3),
        Span::new(5, "render", 310, 400, SyncFinished).child_of(3),
        Span::new(6, "GET /api/users", 200, 610, AsyncError).child_of(1),
        Span::new(7, "connect", 220, 330, AsyncCancel).child_of(6),
        Span::new(8, "retry", 340, 590, AsyncError).child_of(6),
        Span::new(9, "worker-1", 20, 940, ThreadFinished),
        Span::new(10, "GET /stream", 450, 1000, AsyncInProgress).child_of(9),
        Span::new(11, "encode", 480, 700, SyncInProgress).child_of(10),
        Span::new(12, "flush", 720, 860, SyncFinished).child_of(10),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(id: u64, start_ms: u64, end_ms: u64) -> Span {
        Span::new(id, &format!("s{id}"), start_ms, end_ms, SpanStyle::SyncFinished)
    }

    fn rows_of(spans: &[Span]) -> Vec<(u64, u16)> {
        spans.iter().map(|s| (s.id.0, s.row)).collect()
    }

    // ── flat rows ─────────────────────────────────────────────────────────

    #[test]
    fn disjoint_spans_share_a_row() {
        let mut spans = vec![span(1, 0, 10), span(2, 20, 30)];
        assert_eq!(assign_rows(&mut spans).unwrap(), 1);
        assert_eq!(rows_of(&spans), vec![(1, 0), (2, 0)]);
    }

    #[test]
    fn overlapping_spans_get_distinct_rows() {
        let mut spans = vec![span(2, 5, 15), span(1, 0, 10), span(3, 12, 20)];
        assert_eq!(assign_rows(&mut spans).unwrap(), 2);
        // Sorted by start; 3 reuses row 0 once 1 has ended.
        assert_eq!(rows_of(&spans), vec![(1, 0), (2, 1), (3, 0)]);
    }

    #[test]
    fn touching_spans_do_not_share_a_row() {
        let mut spans = vec![span(1, 0, 10), span(2, 10, 20)];
        assert_eq!(assign_rows(&mut spans).unwrap(), 2);
    }

    #[test]
    fn lowest_free_row_is_reused_first() {
        let mut spans = vec![span(1, 0, 10), span(2, 1, 5), span(3, 2, 4), span(4, 11, 12)];
        assign_rows(&mut spans).unwrap();
        assert_eq!(spans[3].row, 0);
    }

    #[test]
    fn longer_span_goes_first_on_equal_start() {
        let mut spans = vec![span(2, 0, 500), span(1, 0, 1000)];
        assign_rows(&mut spans).unwrap();
        assert_eq!(rows_of(&spans), vec![(1, 0), (2, 1)]);
    }

    #[test]
    fn sweep_reports_row_overflow() {
        let mut sweep = Sweep {
            next_free: u32::from(u16::MAX),
            ..Sweep::default()
        };
        assert_eq!(sweep.alloc(&span(1, 0, 10)).unwrap(), u16::MAX);
        assert!(sweep.alloc(&span(2, 0, 10)).is_err());
    }

    // ── hierarchy ─────────────────────────────────────────────────────────

    #[test]
    fn child_lands_directly_below_its_parent() {
        let mut spans = vec![
            span(1, 0, 100),
            span(2, 10, 50),
            span(3, 20, 30).child_of(1),
        ];
        assert_eq!(assign_rows(&mut spans).unwrap(), 3);
        assert_eq!(rows_of(&spans), vec![(1, 0), (2, 2), (3, 1)]);
    }

    #[test]
    fn siblings_sweep_independently_of_other_parents() {
        // Children of different parents never share a row; disjoint
        // siblings do.
        let mut spans = vec![
            span(1, 0, 100),
            span(2, 0, 90),
            span(10, 10, 20).child_of(1),
            span(11, 30, 40).child_of(1),
            span(20, 10, 20).child_of(2),
        ];
        assert_eq!(assign_rows(&mut spans).unwrap(), 4);
        let row = |id| spans.iter().find(|s| s.id.0 == id).map(|s| s.row);
        assert_eq!(row(1), Some(0));
        assert_eq!(row(10), Some(1));
        assert_eq!(row(11), Some(1));
        assert_eq!(row(2), Some(2));
        assert_eq!(row(20), Some(3));
    }

    #[test]
    fn unknown_parent_is_treated_as_root() {
        let mut spans = vec![span(1, 0, 10).child_of(99), span(2, 20, 30)];
        assert_eq!(assign_rows(&mut spans).unwrap(), 1);
        assert_eq!(rows_of(&spans), vec![(1, 0), (2, 0)]);
    }

    // ── demo ──────────────────────────────────────────────────────────────

    #[test]
    fn demo_rows_never_overlap() {
        let mut spans = demo_spans();
        let rows = assign_rows(&mut spans).unwrap();
        assert!(rows > 1);
        for (i, a) in spans.iter().enumerate() {
            for b in &spans[i + 1..] {
                if a.row == b.row {
                    assert!(a.end < b.start || b.end < a.start, "{} / {}", a.name, b.name);
                }
            }
        }
    }

    #[test]
    fn demo_children_sit_below_their_parents() {
        let mut spans = demo_spans();
        assign_rows(&mut spans).unwrap();
        for child in &spans {
            let Some(parent) = child.parent_id else { continue };
            let parent = spans.iter().find(|s| s.id == parent).unwrap();
            assert!(child.row > parent.row, "{} above {}", child.name, parent.name);
        }
    }

    #[test]
    fn time_range_covers_all_spans() {
        let spans = demo_spans();
        assert_eq!(
            time_range(&spans),
            Some((Duration::ZERO, Duration::from_millis(1000)))
        );
        assert_eq!(time_range(&[]), None);
    }

    #[test]
    fn every_style_has_a_distinct_color() {
        let colors: Vec<_> = SpanStyle::DRAW_ORDER.iter().map(|s| s.color()).collect();
        for (i, a) in colors.iter().enumerate() {
            assert!(!colors[i + 1..].contains(a));
        }
    }
}
