//! Route handlers, grouped by surface.

pub mod quiz;
pub mod stats;
