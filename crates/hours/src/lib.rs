//! Timezone-aware weekly opening hours.
//!
//! - [`normalize`]: expand, validate, convert, split, merge and check ranges
//! - [`engine`]: compiled weekly schedule answering open-at / next-change
//! - [`compact`]: compact schedule string shared with the engine
//! - [`service`]: [`OpeningHours`], the canonical store and query facade

pub mod builder;
pub mod compact;
pub mod engine;
pub mod normalize;
pub mod service;
pub mod time_source;
pub mod tz;

pub use builder::OpeningHoursBuilder;
pub use engine::{ScheduleCompiler, ScheduleEngine, WeeklyCompiler, WeeklyEngine};
pub use normalize::{normalize, NormalizeOptions};
pub use service::{ChangeState, NextChange, OpeningHours, MINUTES_PER_WEEK};
pub use time_source::{FixedTimeSource, SystemTimeSource, TimeSource};
