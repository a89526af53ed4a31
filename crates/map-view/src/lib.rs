//! Map view controller for Sahel rasters.
//!
//! # Architecture
//!
//! ```text
//! select_data_type(dt) ──► YearCache::ensure_loaded ──► paint now, report stats
//!
//! select_year(y)
//!      │
//!      ├─► interpolate(cache, dt, y) ─► target grid
//!      ├─► TransitionAnimator::start(visible, target, clock.now())
//!      └─► FrameScheduler::request_frame() ─► FrameId
//!
//! host ──► on_frame(id)
//!      │
//!      ├─► InProgress: paint reveal frame, request next frame
//!      └─► Complete:   paint target, aggregate stats, notify listeners
//! ```
//!
//! The view holds at most one pending frame. Selecting another year or
//! data type, disposing and dropping the view all cancel it.

pub mod animator;
pub mod clock;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod view;

pub use animator::{AnimationState, FrameOutcome, TransitionAnimator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ViewConfig;
pub use error::{ViewError, ViewResult};
pub use scheduler::{FrameId, FrameScheduler, QueuedScheduler};
pub use view::{MapView, StatsListener};
