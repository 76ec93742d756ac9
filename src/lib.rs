// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Headless FLIP auto-animation for list containers.
//!
//! Attach a [`Controller`] to a container and mutate its children however
//! you like; on every [`Controller::tick`] the engine works out what was
//! added, removed or moved and plays enter, exit and move transitions for
//! each child, without being told what changed.
//!
//! # Key entry points
//!
//! - [`Controller`] - one per animated container
//! - [`AnimateOptions`] - duration, easing, presence styles, move policy
//! - [`LayoutHost`] - the document seam; [`VirtualDom`] ships in-crate, a
//!   browser host lives behind the `web` feature
//! - [`bindings`] - directive- and handle-style wrappers
//!
//! # Architecture
//!
//! Hosts only buffer child-list records. Each tick the
//! [`watch::MutationWatcher`] coalesces them into one batch, the
//! [`animation::classify()`] step diffs a "from" snapshot (tracked baselines,
//! or exact samples of tweens in flight) against a "to" snapshot measured
//! after reflow, and the [`animation::TransitionPlayer`] turns every tween
//! into a FLIP [`Frame`] the host writes back.
//!
//! ```
//! use auto_animate::{AnimateOptions, Controller, LayoutHost, VirtualDom};
//! use glam::Vec2;
//! use web_time::{Duration, Instant};
//!
//! let mut dom = VirtualDom::new();
//! let list = dom.create_container(Vec2::ZERO);
//! let items: Vec<_> =
//!     (0..3).map(|_| dom.create_element(Vec2::new(100.0, 40.0))).collect();
//! for &item in &items {
//!     dom.append(list, item);
//! }
//!
//! let mut ctrl =
//!     Controller::attach(&mut dom, list, AnimateOptions::default())?;
//! assert!(dom.remove(list, items[1]));
//!
//! let start = Instant::now();
//! let report = ctrl.tick(&mut dom, start);
//! assert!(report.animated);
//! assert!(dom.is_held(items[1]));
//!
//! let _ = ctrl.tick(&mut dom, start + Duration::from_secs(1));
//! assert!(!dom.contains(items[1]));
//! assert_eq!(dom.children(list), vec![items[0], items[2]]);
//! # Ok::<(), auto_animate::AnimateError>(())
//! ```

pub mod animation;
pub mod bindings;
pub mod engine;
pub mod error;
pub mod host;
pub mod options;
pub mod snapshot;
pub mod util;
pub mod watch;

pub use bindings::{AutoAnimateDirective, AutoAnimateHandle};
pub use engine::{Controller, TickReport};
pub use error::{AnimateError, AnimateResult};
pub use host::{ElementId, Frame, LayoutHost, VirtualDom};
pub use options::{AnimateOptions, MovePolicy, PresenceStyle};
pub use util::easing::Easing;
