//! # HEARTH Shared
//!
//! Plain-data math used by the entity storage core and by whatever sits around
//! it (sprite tables, renderers, physics).
//!
//! Every type here is `Pod`, so it can live directly in arena memory.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod math;

pub use math::{Rect, Vec2};
