//! Animation playback: a synthetic timeline that reveals the document.
//!
//! Elements are revealed in store (insertion) order, not z-order, so
//! reordering layers after creation changes stacking but not reveal order.
//! Time is injected by the host as milliseconds.

use crate::elements::{Element, ElementKind};
use crate::engine::DrawingEngine;

/// Duration of the timeline of an empty document.
pub const EMPTY_DURATION_MS: f64 = 2000.0;
/// Shortest timeline of a non-empty document.
pub const MIN_DURATION_MS: f64 = 1000.0;
/// Longest timeline.
pub const MAX_DURATION_MS: f64 = 30000.0;
/// Cost of every non-stroke element.
pub const SHAPE_COST_MS: f64 = 800.0;
/// Per-point cost of a stroke.
pub const STROKE_POINT_COST_MS: f64 = 20.0;
/// Minimum cost of a stroke.
pub const MIN_STROKE_COST_MS: f64 = 500.0;

/// Playback state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// What the host should draw after a playback step.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameRequest {
    /// Draw only these elements, without selection outlines.
    Partial(Vec<Element>),
    /// Draw the full, non-animated document.
    Full,
}

/// Timeline cost of a single element.
pub fn element_cost(element: &Element) -> f64 {
    match &element.kind {
        ElementKind::Freedraw(stroke) => {
            (stroke.len() as f64 * STROKE_POINT_COST_MS).max(MIN_STROKE_COST_MS)
        }
        _ => SHAPE_COST_MS,
    }
}

/// Unclamped sum of element costs.
pub fn raw_duration(elements: &[Element]) -> f64 {
    elements.iter().map(element_cost).sum()
}

/// Total timeline length in milliseconds.
///
/// An empty document lasts 2000ms; otherwise the summed element costs are
/// clamped to `[1000, 30000]`.
pub fn calculate_duration(elements: &[Element]) -> f64 {
    if elements.is_empty() {
        EMPTY_DURATION_MS
    } else {
        raw_duration(elements).clamp(MIN_DURATION_MS, MAX_DURATION_MS)
    }
}

/// The elements visible at normalized progress `progress`.
///
/// The first `floor(p * n) + 1` elements (capped at `n`) are shown. A stroke
/// at index `i` owns the sub-interval `[i/n, (i+1)/n]` and reveals its points
/// proportionally within it, always at least one once started. Other
/// elements appear whole.
pub fn elements_at_progress(elements: &[Element], progress: f64) -> Vec<Element> {
    let total = elements.len();
    if total == 0 {
        return Vec::new();
    }
    let progress = progress.clamp(0.0, 1.0);
    let scaled = progress * total as f64;
    let visible = ((scaled.floor() as usize) + 1).min(total);

    elements
        .iter()
        .take(visible)
        .enumerate()
        .filter_map(|(index, element)| match &element.kind {
            ElementKind::Freedraw(stroke) => {
                if scaled < index as f64 {
                    return None;
                }
                if stroke.is_empty() {
                    return Some(element.clone());
                }
                let fraction = (scaled - index as f64).clamp(0.0, 1.0);
                let count = ((stroke.len() as f64 * fraction).floor() as usize).max(1);
                let mut partial = element.clone();
                partial.kind = ElementKind::Freedraw(stroke.truncated(count));
                Some(partial)
            }
            _ => Some(element.clone()),
        })
        .collect()
}

/// Frame times of a timeline sampled at a fixed rate, ending at `duration`.
pub fn sample_times(duration: f64, fps: f64) -> Vec<f64> {
    if duration <= 0.0 || fps <= 0.0 {
        return vec![0.0];
    }
    let count = (duration * fps / 1000.0 + 1e-9).floor() as usize + 1;
    let mut times: Vec<f64> = (0..count)
        .map(|i| (i as f64 * 1000.0 / fps).min(duration))
        .collect();
    if times.last().is_some_and(|&t| duration - t > 1e-6) {
        times.push(duration);
    }
    times
}

/// One sampled frame of the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledFrame {
    pub index: usize,
    pub time: f64,
    pub progress: f64,
    pub elements: Vec<Element>,
}

/// Iterates the timeline at a fixed frame rate, for external encoders.
#[derive(Debug, Clone)]
pub struct FrameSampler<'a> {
    elements: &'a [Element],
    duration: f64,
    times: Vec<f64>,
    next: usize,
}

impl<'a> FrameSampler<'a> {
    pub fn new(elements: &'a [Element], fps: f64) -> Self {
        let duration = calculate_duration(elements);
        Self {
            elements,
            duration,
            times: sample_times(duration, fps),
            next: 0,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn frame_count(&self) -> usize {
        self.times.len()
    }
}

impl Iterator for FrameSampler<'_> {
    type Item = SampledFrame;

    fn next(&mut self) -> Option<Self::Item> {
        let time = *self.times.get(self.next)?;
        let progress = time / self.duration;
        let frame = SampledFrame {
            index: self.next,
            time,
            progress,
            elements: elements_at_progress(self.elements, progress),
        };
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.times.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameSampler<'_> {}

/// Playback state machine over a document it only reads.
#[derive(Debug, Clone)]
pub struct AnimationEngine {
    state: PlaybackState,
    current_time: f64,
    total_duration: f64,
    start_time: f64,
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationEngine {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Stopped,
            current_time: 0.0,
            total_duration: EMPTY_DURATION_MS,
            start_time: 0.0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Normalized position in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.total_duration <= 0.0 {
            return 0.0;
        }
        (self.current_time / self.total_duration).clamp(0.0, 1.0)
    }

    /// Recompute the duration from the document.
    pub fn refresh_duration(&mut self, document: &DrawingEngine) -> f64 {
        self.total_duration = calculate_duration(document.elements());
        self.total_duration
    }

    /// Start or resume playback at host time `now`.
    pub fn play(&mut self, document: &DrawingEngine, now: f64) {
        if self.state == PlaybackState::Playing {
            return;
        }
        self.refresh_duration(document);
        if self.current_time >= self.total_duration {
            self.current_time = 0.0;
        }
        self.start_time = now - self.current_time;
        self.state = PlaybackState::Playing;
        log::info!(
            "Animation started at {:.0}ms of {:.0}ms",
            self.current_time,
            self.total_duration
        );
    }

    /// Halt playback, keeping the current time.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
            log::info!("Animation paused at {:.0}ms", self.current_time);
        }
    }

    /// Halt playback and rewind. The host should draw the full document.
    pub fn stop(&mut self) -> FrameRequest {
        self.state = PlaybackState::Stopped;
        self.current_time = 0.0;
        log::info!("Animation stopped");
        FrameRequest::Full
    }

    /// Jump to `time`, clamped to the timeline.
    ///
    /// Returns the frame to draw immediately unless playback is live, in
    /// which case the next tick draws it.
    pub fn scrub_to_time(&mut self, document: &DrawingEngine, time: f64) -> Option<FrameRequest> {
        if self.state != PlaybackState::Playing {
            self.refresh_duration(document);
        }
        let previous = self.current_time;
        self.current_time = time.clamp(0.0, self.total_duration);
        if self.state == PlaybackState::Playing {
            self.start_time += previous - self.current_time;
            return None;
        }
        Some(self.current_frame(document))
    }

    /// Jump to normalized progress `progress`.
    pub fn scrub_to_progress(
        &mut self,
        document: &DrawingEngine,
        progress: f64,
    ) -> Option<FrameRequest> {
        if self.state != PlaybackState::Playing {
            self.refresh_duration(document);
        }
        let time = progress.clamp(0.0, 1.0) * self.total_duration;
        self.scrub_to_time(document, time)
    }

    /// Advance playback to host time `now`.
    ///
    /// Returns `None` unless playing. Reaching the end stops playback and
    /// requests a full render.
    pub fn tick(&mut self, document: &DrawingEngine, now: f64) -> Option<FrameRequest> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        self.current_time = (now - self.start_time).max(0.0);
        if self.current_time >= self.total_duration {
            return Some(self.stop());
        }
        Some(self.current_frame(document))
    }

    /// The partial frame at the current time.
    pub fn current_frame(&self, document: &DrawingEngine) -> FrameRequest {
        FrameRequest::Partial(elements_at_progress(document.elements(), self.progress()))
    }
}
