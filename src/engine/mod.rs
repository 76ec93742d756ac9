//! The per-container controller: attaches to a host container, watches its
//! child list and drives FLIP transitions on every tick.
//!
//! A [`Controller`] is single-threaded and owns no document state. The
//! embedder calls [`Controller::tick`] once per frame (or whenever it wants
//! pending mutations processed); each tick
//!
//! 1. drains the container's buffered mutations into one batch,
//! 2. snapshots "from" geometry out of tracked baselines and live tweens,
//!    measures "to" geometry after reflow, and classifies the batch,
//! 3. starts, restarts or snaps transitions, then
//! 4. advances every tween and writes frames back to the host.

mod accessors;
#[cfg(test)]
mod tests;
mod tick;
mod tracked;

use rustc_hash::{FxHashMap, FxHashSet};

pub use self::tracked::{ChildState, TrackedChild};
use crate::animation::{
    AnimationGate, AnimationKind, Classification, ClassifyRules, TransitionPlayer,
};
use crate::error::{AnimateError, AnimateResult};
use crate::host::{ElementId, LayoutHost};
use crate::options::AnimateOptions;
use crate::snapshot::Snapshot;
use crate::watch::MutationWatcher;

/// What one [`Controller::tick`] did.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Labels assigned to the batch processed this tick, if one arrived.
    pub classification: Option<Classification>,
    /// Whether that batch animated (false when the gate snapped it).
    pub animated: bool,
    /// Tweens still in flight after this tick.
    pub animating: usize,
    /// Live children whose transition completed this tick.
    pub settled: Vec<ElementId>,
    /// Exiting children removed from the document this tick.
    pub detached: Vec<ElementId>,
    /// The container left the document; the controller tore itself down.
    pub container_detached: bool,
}

impl TickReport {
    /// Whether nothing is animating after this tick.
    pub fn is_idle(&self) -> bool {
        self.animating == 0
    }
}

/// Animation controller bound to one container.
#[derive(Debug)]
pub struct Controller {
    container: ElementId,
    options: AnimateOptions,
    rules: ClassifyRules,
    watcher: MutationWatcher,
    player: TransitionPlayer,
    gate: AnimationGate,
    /// Live children as of the last processed batch, in document order.
    live: Vec<ElementId>,
    /// Live children plus exiting ghosts.
    tracked: FxHashMap<ElementId, TrackedChild>,
    attached: bool,
}

impl Controller {
    /// Start animating `container`'s child list.
    ///
    /// Records the current children as the baseline without animating them.
    /// Fails with [`AnimateError::InvalidOptions`] for options that do not
    /// validate and [`AnimateError::ContainerDetached`] when the container
    /// is not in the document; in both cases nothing is observed.
    pub fn attach<H: LayoutHost + ?Sized>(
        host: &mut H,
        container: ElementId,
        options: AnimateOptions,
    ) -> AnimateResult<Self> {
        options.validate()?;
        if !host.is_connected(container) {
            return Err(AnimateError::ContainerDetached);
        }

        let mut watcher = MutationWatcher::new();
        watcher.observe(host, container);

        let live = host.children(container);
        let baseline = Snapshot::capture(host, &live);
        let tracked = live
            .iter()
            .map(|&e| (e, TrackedChild::settled(e, baseline.get(e).copied())))
            .collect();

        log::info!(
            "auto-animate attached to {container} ({} children, {:.0}ms)",
            live.len(),
            options.duration_ms
        );

        Ok(Self {
            container,
            rules: ClassifyRules::from(&options),
            player: TransitionPlayer::new(
                options.duration(),
                options.easing.clone(),
            ),
            gate: AnimationGate::new(options.respect_reduced_motion),
            options,
            watcher,
            live,
            tracked,
            attached: true,
        })
    }

    /// Enable or disable animations for batches processed from now on.
    ///
    /// Transitions already in flight run to completion either way.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.gate.is_enabled() != enabled {
            log::debug!(
                "animations {} for {}",
                if enabled { "enabled" } else { "disabled" },
                self.container
            );
        }
        self.gate.set_enabled(enabled);
    }

    /// Whether animations are enabled.
    pub fn is_enabled(&self) -> bool {
        self.gate.is_enabled()
    }

    /// Stop observing and finish everything immediately.
    ///
    /// In-flight transitions jump to their end state: frames are cleared
    /// and exiting children are detached. Idempotent.
    pub fn teardown<H: LayoutHost + ?Sized>(&mut self, host: &mut H) {
        if !self.attached {
            return;
        }
        let _ = self.finish_all(host);
        self.watcher.disconnect(host);
        self.release_children(host);
        log::info!("auto-animate detached from {}", self.container);
    }

    /// Stop tracking every child and let the host drop its state for them.
    fn release_children<H: LayoutHost + ?Sized>(&mut self, host: &mut H) {
        for element in self.tracked.drain().map(|(e, _)| e) {
            host.forget(element);
        }
        self.live.clear();
        self.attached = false;
    }

    /// Cancel every tween, clear its frame, and detach exiting ghosts that
    /// are not live children again. Returns the detached ghosts.
    fn finish_all<H: LayoutHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Vec<ElementId> {
        let live: FxHashSet<ElementId> =
            host.children(self.container).into_iter().collect();
        for (element, tween) in self.player.cancel_all() {
            host.clear_frame(element);
            if let Some(child) = self.tracked.get_mut(&element) {
                if tween.kind != AnimationKind::Exit {
                    child.baseline = Some(tween.to);
                    child.state = ChildState::Settled;
                }
            }
        }

        let ghosts: Vec<ElementId> = self
            .tracked
            .values()
            .filter(|c| c.is_exiting() && !live.contains(&c.element))
            .map(|c| c.element)
            .collect();
        for &element in &ghosts {
            host.detach(element);
            let _ = self.tracked.remove(&element);
        }
        ghosts
    }
}
