//! Per-batch animation pieces.
//!
//! - [`classify()`] labels each element of a batch as added, removed, moved
//!   or unchanged.
//! - [`TransitionPlayer`] runs one [`Tween`] per element and turns samples
//!   into frames.
//! - [`AnimationGate`] decides whether a batch animates at all.
//!
//! The [`Controller`](crate::Controller) wires them to a host.

mod classify;
mod gate;
mod player;
mod tween;

pub use classify::{
    classify, ChangeKind, Classification, Classified, ClassifyRules,
    POSITION_EPSILON,
};
pub use gate::AnimationGate;
pub use player::{Advance, TransitionPlayer};
pub use tween::{AnimationKind, Tween};
