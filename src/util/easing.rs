//! Easing functions for animation interpolation.
//!
//! Provides the named curves used by the transition player plus CSS-style
//! `cubic-bezier()` timing functions and host-supplied closures. All
//! built-in curves are designed for <100ns evaluation time.

use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{AnimateError, AnimateResult};

/// Newton iterations before falling back to bisection when inverting a
/// bezier's x(t).
const NEWTON_ITERATIONS: usize = 8;
/// Bisection iterations for the fallback solver.
const BISECTION_ITERATIONS: usize = 24;
/// Accepted error on x when inverting a bezier.
const SOLVE_EPSILON: f32 = 1e-6;

/// Easing function variants for animation curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Linear interpolation (no easing).
    Linear,
    /// Quadratic ease-in (slow start, fast end).
    QuadraticIn,
    /// Quadratic ease-out (fast start, slow end).
    QuadraticOut,
    /// Square root ease-out (fast start, gradual slow).
    SqrtOut,
    /// Cubic Hermite interpolation with configurable control points.
    /// Formula: c1·3t(1-t)² + c2·3(1-t)t² + t³
    CubicHermite {
        /// First control value.
        c1: f32,
        /// Second control value.
        c2: f32,
    },
    /// CSS `cubic-bezier(x1, y1, x2, y2)` timing function.
    CubicBezier {
        /// x of the first control point, in `[0, 1]`.
        x1: f32,
        /// y of the first control point.
        y1: f32,
        /// x of the second control point, in `[0, 1]`.
        x2: f32,
        /// y of the second control point.
        y2: f32,
    },
    /// Host-supplied curve. Not serializable.
    #[serde(skip)]
    #[schemars(skip)]
    Custom(CustomEasing),
}

impl Easing {
    /// CSS `ease`.
    pub const EASE: Easing = Easing::CubicBezier {
        x1: 0.25,
        y1: 0.1,
        x2: 0.25,
        y2: 1.0,
    };
    /// CSS `ease-in`.
    pub const EASE_IN: Easing = Easing::CubicBezier {
        x1: 0.42,
        y1: 0.0,
        x2: 1.0,
        y2: 1.0,
    };
    /// CSS `ease-out`.
    pub const EASE_OUT: Easing = Easing::CubicBezier {
        x1: 0.0,
        y1: 0.0,
        x2: 0.58,
        y2: 1.0,
    };
    /// CSS `ease-in-out`, the default curve for list transitions.
    pub const EASE_IN_OUT: Easing = Easing::CubicBezier {
        x1: 0.42,
        y1: 0.0,
        x2: 0.58,
        y2: 1.0,
    };

    /// Wrap a closure as a custom easing curve.
    pub fn custom(f: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Self::Custom(CustomEasing::new(f))
    }

    /// Evaluate the easing function at time t.
    ///
    /// Input t is clamped to [0.0, 1.0]. Built-in curves return values in
    /// [0.0, 1.0] except beziers with y control points outside that range,
    /// which may overshoot.
    #[inline]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::QuadraticIn => t * t,
            Easing::QuadraticOut => {
                let omt = 1.0 - t;
                1.0 - omt * omt
            }
            Easing::SqrtOut => t.sqrt(),
            Easing::CubicHermite { c1, c2 } => {
                let omt = 1.0 - t;
                c1 * 3.0 * t * omt * omt + c2 * 3.0 * omt * t * t + t * t * t
            }
            Easing::CubicBezier { x1, y1, x2, y2 } => {
                if t <= 0.0 || t >= 1.0 {
                    return t;
                }
                let u = solve_bezier_x(*x1, *x2, t);
                bezier_component(*y1, *y2, u)
            }
            Easing::Custom(f) => f.call(t),
        }
    }

    /// Reject curves that cannot be evaluated as a timing function.
    pub fn validate(&self) -> AnimateResult<()> {
        match self {
            Easing::CubicHermite { c1, c2 } => {
                if !c1.is_finite() || !c2.is_finite() {
                    return Err(AnimateError::invalid_options(
                        "cubic hermite control values must be finite",
                    ));
                }
                Ok(())
            }
            Easing::CubicBezier { x1, y1, x2, y2 } => {
                if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
                    return Err(AnimateError::invalid_options(
                        "cubic-bezier control points must be finite",
                    ));
                }
                if !(0.0..=1.0).contains(x1) || !(0.0..=1.0).contains(x2) {
                    return Err(AnimateError::invalid_options(format!(
                        "cubic-bezier x control points must lie in [0, 1], \
                         got x1={x1} x2={x2}"
                    )));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl Default for Easing {
    #[inline]
    fn default() -> Self {
        Self::EASE_IN_OUT
    }
}

/// One axis of a cubic bezier with endpoints fixed at 0 and 1.
#[inline]
fn bezier_component(p1: f32, p2: f32, u: f32) -> f32 {
    let omu = 1.0 - u;
    3.0 * omu * omu * u * p1 + 3.0 * omu * u * u * p2 + u * u * u
}

/// Derivative of [`bezier_component`] with respect to u.
#[inline]
fn bezier_derivative(p1: f32, p2: f32, u: f32) -> f32 {
    let omu = 1.0 - u;
    3.0 * omu * omu * p1 + 6.0 * omu * u * (p2 - p1) + 3.0 * u * u * (1.0 - p2)
}

/// Find the curve parameter whose x equals `x`.
fn solve_bezier_x(x1: f32, x2: f32, x: f32) -> f32 {
    let mut u = x;
    for _ in 0..NEWTON_ITERATIONS {
        let err = bezier_component(x1, x2, u) - x;
        if err.abs() < SOLVE_EPSILON {
            return u;
        }
        let slope = bezier_derivative(x1, x2, u);
        if slope.abs() < SOLVE_EPSILON {
            break;
        }
        u -= err / slope;
    }

    // x(u) is monotonic for x1, x2 in [0, 1]
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    u = x;
    for _ in 0..BISECTION_ITERATIONS {
        let value = bezier_component(x1, x2, u);
        if (value - x).abs() < SOLVE_EPSILON {
            break;
        }
        if value < x {
            lo = u;
        } else {
            hi = u;
        }
        u = (lo + hi) * 0.5;
    }
    u
}

/// A shared closure used as an easing curve.
///
/// Equality is identity: two `CustomEasing`s are equal when they wrap the
/// same closure allocation.
#[derive(Clone)]
pub struct CustomEasing(Arc<dyn Fn(f32) -> f32 + Send + Sync>);

impl CustomEasing {
    /// Wrap a closure.
    pub fn new(f: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Evaluate the wrapped closure.
    #[inline]
    pub fn call(&self, t: f32) -> f32 {
        (self.0)(t)
    }
}

impl PartialEq for CustomEasing {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for CustomEasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomEasing(..)")
    }
}
