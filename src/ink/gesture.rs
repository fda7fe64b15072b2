use std::time::Instant;

/// One coordinate sample inside a stroke. `t_ms` is measured from the start
/// of the stroke; it is kept for rendering but is not what goes over the
/// wire (see [`GestureRecorder::ink`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSample {
    pub x: f32,
    pub y: f32,
    pub t_ms: u64,
}

/// One continuous pointer-down-to-up path. Immutable once the contact ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stroke {
    pub samples: Vec<StrokeSample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Capturing,
}

/// Accumulates pointer strokes into a gesture for handwriting recognition.
///
/// Idle ⇄ Capturing: `begin_stroke` opens a stroke, `append_sample` feeds it,
/// `end_stroke` seals it onto the gesture. Calling `begin_stroke` while a
/// stroke is still open would lose data, so the open stroke is finalized
/// first.
#[derive(Debug, Default)]
pub struct GestureRecorder {
    strokes: Vec<Stroke>,
    current: Option<Stroke>,
    stroke_started: Option<Instant>,
}

impl GestureRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GesturePhase {
        if self.current.is_some() {
            GesturePhase::Capturing
        } else {
            GesturePhase::Idle
        }
    }

    pub fn begin_stroke(&mut self) {
        if self.current.is_some() {
            self.end_stroke();
        }
        self.current = Some(Stroke::default());
        self.stroke_started = Some(Instant::now());
    }

    /// Appends a sample to the open stroke. A no-op while idle, so stray
    /// pointer-move events cannot corrupt the gesture.
    pub fn append_sample(&mut self, x: f32, y: f32) {
        let started = self.stroke_started;
        if let Some(stroke) = &mut self.current {
            let t_ms = started
                .map(|at| at.elapsed().as_millis() as u64)
                .unwrap_or(0);
            stroke.samples.push(StrokeSample { x, y, t_ms });
        }
    }

    /// Seals the open stroke onto the gesture. Strokes with no samples (a tap
    /// that produced no move events) are dropped.
    pub fn end_stroke(&mut self) {
        self.stroke_started = None;
        if let Some(stroke) = self.current.take() {
            if !stroke.samples.is_empty() {
                self.strokes.push(stroke);
            }
        }
    }

    /// Discards the whole gesture, completed strokes and the open one alike.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.current = None;
        self.stroke_started = None;
    }

    /// True when no completed stroke has been recorded.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Serializes the gesture as the recognition service expects it: one
    /// `[xs, ys, ts]` triple of parallel arrays per stroke, coordinates
    /// rounded half-up. The "time" values are the zero-based sample index,
    /// not elapsed milliseconds — the service was tuned against index-based
    /// sequencing, so true timestamps would degrade its results.
    pub fn ink(&self) -> Vec<Vec<Vec<i64>>> {
        self.strokes
            .iter()
            .map(|stroke| {
                let xs = stroke
                    .samples
                    .iter()
                    .map(|sample| round_half_up(sample.x))
                    .collect();
                let ys = stroke
                    .samples
                    .iter()
                    .map(|sample| round_half_up(sample.y))
                    .collect();
                let ts = (0..stroke.samples.len() as i64).collect();
                vec![xs, ys, ts]
            })
            .collect()
    }
}

// Half-up (toward positive infinity), not Rust's half-away-from-zero.
fn round_half_up(value: f32) -> i64 {
    (value + 0.5).floor() as i64
}
