//! The candidate pipeline.
//!
//! After scaling, the candidate rectangles pass through a list of
//! [`Stage`]s, left to right.  Every stage has the same shape: it receives
//! the current list and returns a new one.
//!
//! # Empty means no-op
//!
//! A stage that returns an **empty** list leaves the running list
//! unchanged.  This is what makes optional stages possible: a
//! [`Stage::WhenModifier`] whose modifier is absent returns nothing, and a
//! [`Stage::MinimumWidth`] that would filter out every candidate has no
//! effect.  The convention only applies between stages; the final list may
//! still be empty if the grid spec produced no cells at all.

use crate::geometry::Rectangle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Candidates at most this wide (in pixels) are dropped by
/// [`Stage::MinimumWidth`].
pub const MINIMUM_WIDTH: i32 = 900;

/// Per-invocation context supplied by the trigger layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationContext {
    /// Modifier markers that were held when the trigger fired (e.g. `"shift"`).
    #[serde(default)]
    pub modifiers: BTreeSet<String>,
}

impl InvocationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a list of modifier names.
    pub fn with_modifiers<I, S>(modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modifiers: modifiers.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `modifier` is present.  Comparison is case-insensitive.
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers
            .iter()
            .any(|m| m.eq_ignore_ascii_case(modifier))
    }
}

/// A stage implemented by an arbitrary closure.
///
/// A supplier that produces a fixed list regardless of its input is simply a
/// closure that ignores its argument.  Two `StageFn`s are equal only if they
/// share the same closure.
#[derive(Clone)]
pub struct StageFn(Arc<dyn Fn(&[Rectangle]) -> Vec<Rectangle> + Send + Sync>);

impl StageFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Rectangle]) -> Vec<Rectangle> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// A stage that always yields `candidates`, whatever it receives.
    pub fn supplier(candidates: Vec<Rectangle>) -> Self {
        Self::new(move |_| candidates.clone())
    }
}

impl fmt::Debug for StageFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StageFn(..)")
    }
}

impl PartialEq for StageFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// One step of the candidate pipeline.
///
/// On the wire and in the config file, stages use serde's externally tagged
/// representation:
///
/// ```json
/// ["Reverse", "MinimumWidth", {"WhenModifier": {"modifier": "shift", "stage": "Reverse"}}]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stage {
    /// Reverse the candidate order.
    Reverse,

    /// Keep only candidates wider than [`MINIMUM_WIDTH`].
    MinimumWidth,

    /// Apply `stage` only when `modifier` is held; otherwise do nothing.
    WhenModifier { modifier: String, stage: Box<Stage> },

    /// A transform written in Rust.  Cannot be expressed in JSON.
    #[serde(skip)]
    Custom(StageFn),
}

impl Stage {
    /// Wrap `stage` so it only runs while `modifier` is held.
    pub fn when_modifier(modifier: impl Into<String>, stage: Stage) -> Self {
        Stage::WhenModifier {
            modifier: modifier.into(),
            stage: Box::new(stage),
        }
    }

    /// Run this stage on its own.  An empty result means "no change"; see
    /// [`run`] for how results are combined.
    pub fn transform(&self, candidates: &[Rectangle], ctx: &InvocationContext) -> Vec<Rectangle> {
        match self {
            Stage::Reverse => candidates.iter().rev().copied().collect(),
            Stage::MinimumWidth => candidates
                .iter()
                .filter(|r| r.width > MINIMUM_WIDTH)
                .copied()
                .collect(),
            Stage::WhenModifier { modifier, stage } => {
                if ctx.has_modifier(modifier) {
                    stage.transform(candidates, ctx)
                } else {
                    Vec::new()
                }
            }
            Stage::Custom(f) => (f.0)(candidates),
        }
    }
}

/// Run `candidates` through `stages` in order.
pub fn run(candidates: Vec<Rectangle>, stages: &[Stage], ctx: &InvocationContext) -> Vec<Rectangle> {
    stages.iter().fold(candidates, |current, stage| {
        let next = stage.transform(&current, ctx);
        if next.is_empty() {
            current
        } else {
            next
        }
    })
}

//  Tests
