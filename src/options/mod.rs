//! Engine options with TOML/JSON preset support.
//!
//! All fields use `#[serde(default)]` so partial files (e.g. only
//! `duration_ms = 400`) work. Options are validated when a controller
//! attaches; an invalid set fails that attach and nothing else.

mod presence;

use std::path::Path;

pub use presence::{MovePolicy, PresenceStyle};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::error::{AnimateError, AnimateResult};
use crate::util::easing::Easing;

/// Default transition length, in milliseconds.
pub const DEFAULT_DURATION_MS: f64 = 250.0;

/// Options recognized by [`Controller::attach`](crate::Controller::attach).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct AnimateOptions {
    /// Length of every transition, in milliseconds. Zero snaps.
    #[schemars(title = "Duration (ms)")]
    pub duration_ms: f64,
    /// Timing curve shared by enter, exit and move transitions.
    pub easing: Easing,
    /// Pin exiting elements at their raw border-box origin instead of
    /// compensating for their margins.
    pub disable_browser_auto_margin: bool,
    /// Treat a reduced-motion preference reported by the host as "disabled".
    pub respect_reduced_motion: bool,
    /// Style entering elements grow from.
    pub enter: PresenceStyle,
    /// Style exiting elements shrink to.
    pub exit: PresenceStyle,
    /// Which repositioned elements animate.
    pub move_policy: MovePolicy,
}

impl Default for AnimateOptions {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            easing: Easing::default(),
            disable_browser_auto_margin: false,
            respect_reduced_motion: true,
            enter: PresenceStyle::default(),
            exit: PresenceStyle::default(),
            move_policy: MovePolicy::default(),
        }
    }
}

impl AnimateOptions {
    /// Options with a custom duration, everything else default.
    #[must_use]
    pub fn with_duration_ms(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            ..Self::default()
        }
    }

    /// Replace the easing curve.
    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Replace the move policy.
    #[must_use]
    pub fn move_policy(mut self, policy: MovePolicy) -> Self {
        self.move_policy = policy;
        self
    }

    /// Transition length as a [`Duration`].
    ///
    /// Only meaningful after [`validate`](Self::validate) succeeded.
    pub fn duration(&self) -> Duration {
        Duration::from_nanos((self.duration_ms.max(0.0) * 1e6).round() as u64)
    }

    /// Reject option sets the engine cannot run with.
    pub fn validate(&self) -> AnimateResult<()> {
        if !self.duration_ms.is_finite() || self.duration_ms < 0.0 {
            return Err(AnimateError::invalid_options(format!(
                "duration must be a finite, non-negative number of \
                 milliseconds, got {}",
                self.duration_ms
            )));
        }
        self.easing.validate()?;
        validate_presence("enter", &self.enter)?;
        validate_presence("exit", &self.exit)
    }

    /// Generate JSON Schema describing the serializable options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(AnimateOptions)
    }

    /// Parse options from a JSON string (as handed over by a JS host).
    pub fn from_json(json: &str) -> AnimateResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| AnimateError::options_parse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> AnimateResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| AnimateError::options_parse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> AnimateResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AnimateError::options_parse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn validate_presence(which: &str, style: &PresenceStyle) -> AnimateResult<()> {
    if !(0.0..=1.0).contains(&style.opacity) {
        return Err(AnimateError::invalid_options(format!(
            "{which} opacity must lie in [0, 1], got {}",
            style.opacity
        )));
    }
    if !style.scale.is_finite() || style.scale < 0.0 {
        return Err(AnimateError::invalid_options(format!(
            "{which} scale must be finite and non-negative, got {}",
            style.scale
        )));
    }
    Ok(())
}
