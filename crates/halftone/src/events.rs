//! Event types and sinks for observing renders.
//!
//! This module defines [`HalftoneEvent`] and a set of sinks to emit, collect, or forward
//! events while executing [`crate::engine::HalftoneEngine::render_with_events`] or
//! [`crate::engine::render`].
use glam::DVec2;

use crate::engine::RenderResult;
use crate::grid::GridLayout;

/// Describes events emitted during a render.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum HalftoneEvent {
    /// Emitted once the grid is resolved, before the first cell.
    RenderStarted {
        /// Resolved grid layout.
        layout: GridLayout,
    },

    /// Emitted every few rows and once at completion.
    Progress {
        /// Percent complete in `0..=100`, never decreasing within a render.
        percent: u8,
    },

    /// A brightness sample failed and the cell fell back to neutral gray.
    SampleFailed {
        col: usize,
        row: usize,
        /// Normalized sample position.
        uv: DVec2,
        message: String,
    },

    /// The renderer rejected a dot; the cell was skipped.
    EmitFailed {
        col: usize,
        row: usize,
        message: String,
    },

    /// Emitted when the render completes.
    RenderFinished {
        /// Summary of the render.
        result: RenderResult,
    },
}

/// Discriminant of [`HalftoneEvent`], used by [`EventSink::wants`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HalftoneEventKind {
    RenderStarted,
    Progress,
    SampleFailed,
    EmitFailed,
    RenderFinished,
}

impl HalftoneEvent {
    pub fn kind(&self) -> HalftoneEventKind {
        match self {
            HalftoneEvent::RenderStarted { .. } => HalftoneEventKind::RenderStarted,
            HalftoneEvent::Progress { .. } => HalftoneEventKind::Progress,
            HalftoneEvent::SampleFailed { .. } => HalftoneEventKind::SampleFailed,
            HalftoneEvent::EmitFailed { .. } => HalftoneEventKind::EmitFailed,
            HalftoneEvent::RenderFinished { .. } => HalftoneEventKind::RenderFinished,
        }
    }
}

/// A generic event sink that accepts [`HalftoneEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: HalftoneEvent);

    /// Returns `false` for kinds the sink ignores so the engine can skip building them.
    #[inline]
    fn wants(&self, _kind: HalftoneEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = HalftoneEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: HalftoneEvent) {}

    #[inline]
    fn wants(&self, _kind: HalftoneEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(HalftoneEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(HalftoneEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(HalftoneEvent),
{
    #[inline]
    fn send(&mut self, event: HalftoneEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<HalftoneEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
        }
    }

    pub fn into_inner(self) -> Vec<HalftoneEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[HalftoneEvent] {
        &self.events
    }

    /// Percentages of all collected progress events, in order.
    pub fn progress(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HalftoneEvent::Progress { percent } => Some(*percent),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: HalftoneEvent) {
        self.events.push(event);
    }
}

/// Forwards only progress percentages to a callback.
pub struct ProgressSink<F>
where
    F: FnMut(u8),
{
    f: F,
}

impl<F> ProgressSink<F>
where
    F: FnMut(u8),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for ProgressSink<F>
where
    F: FnMut(u8),
{
    fn send(&mut self, event: HalftoneEvent) {
        if let HalftoneEvent::Progress { percent } = event {
            (self.f)(percent);
        }
    }

    #[inline]
    fn wants(&self, kind: HalftoneEventKind) -> bool {
        kind == HalftoneEventKind::Progress
    }
}
