//! The cycle state machine.
//!
//! Each invocation moves a window to the candidate after the one it
//! currently occupies.  When the window sits on the last candidate (or on
//! none of them), the cycle wraps: the first time this happens the window's
//! rectangle is remembered as the *original*, and at the end of the next
//! full pass the window is put back there.
//!
//! The remembered originals live in a [`CycleMemory`], keyed first by the
//! target identifier the caller used (e.g. `"active"`) and then by the
//! resolved window.  Every binding that uses the same target identifier
//! shares one bucket, so cycling the active window with a different grid
//! still restores to the first original.

use crate::geometry::Rectangle;
use crate::traits::WindowHandle;
use log::debug;
use std::collections::HashMap;

/// The candidate list was empty when a cycle step was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no candidate positions to cycle through")]
pub struct NoCandidatesError;

/// What a [`CycleStep`] does to the memory once committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryUpdate {
    /// Leave the entry as it is.
    Keep,
    /// Remember this rectangle as the window's original.
    Record(Rectangle),
    /// The cycle is over; forget the window.
    Clear,
}

/// A decided but not yet applied cycle step.
///
/// Produced by [`CycleMemory::plan`], which never mutates; apply it with
/// [`CycleMemory::commit`] once the window has actually been moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleStep {
    pub target: String,
    pub window: WindowHandle,
    /// The rectangle the window should move to.
    pub next: Rectangle,
    pub update: MemoryUpdate,
}

/// Remembered pre-cycle rectangles, per target identifier and window.
///
/// The memory is an ordinary value owned by whoever drives the engine; it
/// lives as long as its owner and is never persisted.
#[derive(Debug, Clone, Default)]
pub struct CycleMemory {
    buckets: HashMap<String, HashMap<WindowHandle, Rectangle>>,
}

impl CycleMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The original rectangle recorded for `window` under `target`, if the
    /// window is mid-cycle.
    pub fn original(&self, target: &str, window: &WindowHandle) -> Option<Rectangle> {
        self.buckets.get(target)?.get(window).copied()
    }

    /// Whether no window is mid-cycle.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of `(target, window)` pairs that are mid-cycle.
    pub fn len(&self) -> usize {
        self.buckets.values().map(HashMap::len).sum()
    }

    /// Drop every remembered original for `target`.
    pub fn forget(&mut self, target: &str) {
        if self.buckets.remove(target).is_some() {
            debug!("forgot cycle memory for {:?}", target);
        }
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Decide the next rectangle for `window` without touching the memory.
    ///
    /// `current` must be in the same coordinate space (and carry the same
    /// viewport) as `candidates` for matching to work.
    pub fn plan(
        &self,
        target: &str,
        window: &WindowHandle,
        current: Rectangle,
        candidates: &[Rectangle],
    ) -> Result<CycleStep, NoCandidatesError> {
        let first = *candidates.first().ok_or(NoCandidatesError)?;
        let original = self.original(target, window);
        let matched = candidates.iter().position(|c| *c == current);

        let (next, update) = match matched {
            Some(i) if i + 1 < candidates.len() => {
                let update = match original {
                    Some(_) => MemoryUpdate::Keep,
                    None => MemoryUpdate::Record(current),
                };
                (candidates[i + 1], update)
            }
            // On the last candidate, or moved somewhere we don't know.
            _ => match original {
                Some(o) if o != current => (o, MemoryUpdate::Clear),
                Some(_) => (first, MemoryUpdate::Clear),
                None => (first, MemoryUpdate::Record(current)),
            },
        };

        debug!(
            "cycle {:?}/{}: match {:?} of {}, next {:?}, {:?}",
            target,
            window,
            matched,
            candidates.len(),
            next,
            update
        );

        Ok(CycleStep {
            target: target.to_string(),
            window: window.clone(),
            next,
            update,
        })
    }

    /// Apply the memory side of `step` and return the rectangle it moves to.
    pub fn commit(&mut self, step: CycleStep) -> Rectangle {
        match step.update {
            MemoryUpdate::Keep => {}
            MemoryUpdate::Record(original) => {
                self.buckets
                    .entry(step.target)
                    .or_default()
                    .insert(step.window, original);
            }
            MemoryUpdate::Clear => {
                if let Some(bucket) = self.buckets.get_mut(&step.target) {
                    bucket.remove(&step.window);
                    if bucket.is_empty() {
                        self.buckets.remove(&step.target);
                    }
                }
            }
        }
        step.next
    }

    /// [`plan`](Self::plan) and [`commit`](Self::commit) in one go.
    pub fn advance(
        &mut self,
        target: &str,
        window: &WindowHandle,
        current: Rectangle,
        candidates: &[Rectangle],
    ) -> Result<Rectangle, NoCandidatesError> {
        let step = self.plan(target, window, current, candidates)?;
        Ok(self.commit(step))
    }
}

//  Tests
