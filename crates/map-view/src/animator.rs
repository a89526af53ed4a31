//! Stochastic per-cell reveal between two grids.
//!
//! During a transition every frame shows, for each cell, either the start
//! value or the target value. A cell shows the target with probability
//! `t`, the elapsed fraction of the transition, so the new year "dissolves"
//! in. Once `t` reaches 1 the exact target grid is returned and the
//! animator goes back to idle.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sahel_common::RasterGrid;

use crate::error::{ViewError, ViewResult};

/// An in-flight transition.
#[derive(Debug, Clone)]
pub struct AnimationState {
    pub start_grid: Arc<RasterGrid>,
    pub target_grid: Arc<RasterGrid>,
    pub start_time: Duration,
    pub duration: Duration,
}

impl AnimationState {
    /// Elapsed fraction at `now`, clamped to `[0, 1]`.
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start_time);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}

/// Result of advancing the animator by one frame.
#[derive(Debug, Clone)]
pub enum FrameOutcome {
    /// No transition is running.
    Idle,
    /// Partially revealed grid; more frames follow.
    InProgress { grid: RasterGrid, progress: f64 },
    /// The exact target grid; the animator is idle again.
    Complete(Arc<RasterGrid>),
}

/// `Idle → Animating → Idle` state machine.
pub struct TransitionAnimator {
    state: Option<AnimationState>,
    duration: Duration,
    rng: StdRng,
}

impl TransitionAnimator {
    /// `seed` makes the reveal pattern reproducible.
    pub fn new(duration: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: None,
            duration,
            rng,
        }
    }

    /// Begin a transition, replacing any running one.
    pub fn start(
        &mut self,
        start_grid: Arc<RasterGrid>,
        target_grid: Arc<RasterGrid>,
        now: Duration,
    ) -> ViewResult<()> {
        if start_grid.len() != target_grid.len() || !start_grid.same_shape(&target_grid) {
            return Err(ViewError::ShapeMismatch {
                left: start_grid.len(),
                right: target_grid.len(),
            });
        }

        self.state = Some(AnimationState {
            start_grid,
            target_grid,
            start_time: now,
            duration: self.duration,
        });
        Ok(())
    }

    /// Compute the frame for `now`.
    pub fn frame(&mut self, now: Duration) -> ViewResult<FrameOutcome> {
        let Some(state) = &self.state else {
            return Ok(FrameOutcome::Idle);
        };

        let t = state.progress(now);
        if t >= 1.0 {
            let target = Arc::clone(&state.target_grid);
            self.state = None;
            return Ok(FrameOutcome::Complete(target));
        }

        let rng = &mut self.rng;
        let values = state
            .start_grid
            .values()
            .iter()
            .zip(state.target_grid.values())
            .map(|(&start, &target)| if rng.gen::<f64>() < t { target } else { start })
            .collect();

        let grid = state.target_grid.derive(values)?;
        Ok(FrameOutcome::InProgress { grid, progress: t })
    }

    /// Stop the running transition. Returns whether one was running.
    pub fn cancel(&mut self) -> bool {
        self.state.take().is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&AnimationState> {
        self.state.as_ref()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}
