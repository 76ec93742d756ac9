use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Invisible end of an enter or exit transition.
///
/// Entering elements start from this style; exiting elements end at it.
/// `opacity` multiplies the element's natural opacity, `scale` is applied
/// uniformly about the element's center.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(inline)]
#[serde(default)]
pub struct PresenceStyle {
    /// Opacity factor at the invisible end, in `[0, 1]`.
    pub opacity: f32,
    /// Uniform scale at the invisible end (0 = collapsed to a point).
    pub scale: f32,
}

impl PresenceStyle {
    /// Fade and collapse to a point.
    pub const FADE_SCALE: PresenceStyle = PresenceStyle {
        opacity: 0.0,
        scale: 0.0,
    };
    /// Fade only, keeping natural size.
    pub const FADE: PresenceStyle = PresenceStyle {
        opacity: 0.0,
        scale: 1.0,
    };
    /// Collapse only, keeping natural opacity.
    pub const SCALE: PresenceStyle = PresenceStyle {
        opacity: 1.0,
        scale: 0.0,
    };
}

impl Default for PresenceStyle {
    fn default() -> Self {
        Self::FADE_SCALE
    }
}

/// Which elements whose position changed count as moved.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum MovePolicy {
    /// Any positional delta beyond epsilon animates, including siblings
    /// displaced by an insertion or removal.
    #[default]
    AnyDisplacement,
    /// Only elements the mutation batch reports as reordered animate;
    /// displaced siblings snap to their new slot.
    ReorderedOnly,
}
