//! Shared utilities: easing curves.

pub mod easing;
