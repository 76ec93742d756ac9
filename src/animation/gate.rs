//! Enable/disable gate.

use crate::host::LayoutHost;

/// Decides whether a batch animates or snaps.
///
/// Toggling only affects batches processed afterwards; tweens already in
/// flight keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationGate {
    enabled: bool,
    respect_reduced_motion: bool,
}

impl Default for AnimationGate {
    fn default() -> Self {
        Self::new(true)
    }
}

impl AnimationGate {
    /// Enabled gate.
    #[must_use]
    pub fn new(respect_reduced_motion: bool) -> Self {
        Self {
            enabled: true,
            respect_reduced_motion,
        }
    }

    /// Enable or disable animations.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether animations are enabled by the caller.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the next batch should animate on `host`.
    pub fn is_open<H: LayoutHost + ?Sized>(&self, host: &H) -> bool {
        self.enabled
            && !(self.respect_reduced_motion && host.prefers_reduced_motion())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::VirtualDom;

    #[test]
    fn test_gate_follows_toggle_and_preference() {
        let mut dom = VirtualDom::new();
        let mut gate = AnimationGate::default();
        assert!(gate.is_open(&dom));

        gate.set_enabled(false);
        assert!(!gate.is_enabled());
        assert!(!gate.is_open(&dom));
        gate.set_enabled(true);

        dom.set_reduced_motion(true);
        assert!(!gate.is_open(&dom));
        assert!(AnimationGate::new(false).is_open(&dom));
    }
}
