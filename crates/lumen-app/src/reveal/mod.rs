//! # Reveal
//!
//! Entrance/exit animation schedules and easing curves. Schedules are data;
//! the host's animation driver plays them.

pub mod easing;
pub mod timeline;

pub use easing::Easing;
pub use timeline::{
    LayerAnimation, Motion, RevealLayer, RevealSchedule, RevealTimeline, RevealTimings,
    RevealTransition, ScheduleKind,
};
