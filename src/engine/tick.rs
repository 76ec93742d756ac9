//! Batch processing and frame stepping for [`Controller`].

use rustc_hash::FxHashSet;
use web_time::Instant;

use super::{ChildState, Controller, TickReport, TrackedChild};
use crate::animation::{
    classify, AnimationKind, ChangeKind, Classification, Classified,
};
use crate::host::{ElementId, LayoutHost, Placement};
use crate::options::MovePolicy;
use crate::snapshot::{Geometry, Snapshot};
use crate::watch::MutationBatch;

impl Controller {
    /// Process pending mutations and advance every transition to `now`.
    ///
    /// Safe to call every frame; with nothing pending and nothing in flight
    /// it does no host writes.
    pub fn tick<H: LayoutHost + ?Sized>(
        &mut self,
        host: &mut H,
        now: Instant,
    ) -> TickReport {
        let mut report = TickReport::default();
        if !self.attached {
            return report;
        }

        if !host.is_connected(self.container) {
            log::warn!(
                "{} left the document, stopping animations",
                self.container
            );
            report.detached = self.finish_all(host);
            self.watcher.disconnect(host);
            self.release_children(host);
            report.container_detached = true;
            return report;
        }

        self.watcher.poll(host);
        if let Some(batch) = self.watcher.flush() {
            let open = self.gate.is_open(host);
            let classification = self.process(host, &batch, now, open);
            report.animated = open && classification.has_changes();
            report.classification = Some(classification);
        }

        self.advance(host, now, &mut report);
        report.animating = self.player.active_count();
        report
    }

    /// Classify the current child list against tracked state without
    /// touching the host or consuming pending mutations.
    ///
    /// Right after a batch settles this labels every child unchanged.
    pub fn preview<H: LayoutHost + ?Sized>(
        &self,
        host: &H,
        now: Instant,
    ) -> Classification {
        let current = host.children(self.container);
        let from = self.from_snapshot(now);
        let to = Snapshot::capture(host, &current);
        classify(&self.live, &current, &from, &to, None, &self.rules)
    }

    /// Re-measure children that are at rest, adopting their current layout
    /// as the new baseline without animating.
    ///
    /// For layout changes the host reports no child-list mutation for
    /// (a resize, a style change).
    pub fn resync<H: LayoutHost + ?Sized>(&mut self, host: &H) {
        if !self.attached {
            return;
        }
        for child in self.tracked.values_mut() {
            if child.state == ChildState::Settled {
                if let Some(rect) = host.layout_rect(child.element) {
                    child.baseline = Some(Geometry::settled(
                        rect,
                        host.opacity(child.element),
                    ));
                }
            }
        }
    }

    /// "From" geometry: exact samples for elements in flight, baselines for
    /// the rest.
    fn from_snapshot(&self, now: Instant) -> Snapshot {
        let mut from = Snapshot::new();
        for (&element, child) in &self.tracked {
            if let Some(g) = self.player.sample(element, now).or(child.baseline) {
                from.insert(element, g);
            }
        }
        from
    }

    fn process<H: LayoutHost + ?Sized>(
        &mut self,
        host: &mut H,
        batch: &MutationBatch,
        now: Instant,
        animate: bool,
    ) -> Classification {
        let current = host.children(self.container);

        // Ghosts the host put back must rejoin layout before measuring
        for &element in &current {
            if self.tracked.get(&element).is_some_and(TrackedChild::is_exiting) {
                host.release_hold(element);
            }
        }

        let from = self.from_snapshot(now);
        let to = Snapshot::capture(host, &current);
        let classification =
            classify(&self.live, &current, &from, &to, Some(batch), &self.rules);

        log::debug!(
            "{}: {} records, +{} -{} ~{} ={}",
            self.container,
            batch.len(),
            classification.count(ChangeKind::Added),
            classification.count(ChangeKind::Removed),
            classification.count(ChangeKind::Moved),
            classification.count(ChangeKind::Unchanged),
        );

        if animate {
            for entry in classification.iter() {
                let reordered = batch.is_reordered(entry.element);
                self.start(host, entry, now, reordered);
            }
        } else {
            self.snap(host, &classification);
        }

        // Removed children the host never measured have nothing to animate
        let current_set: FxHashSet<ElementId> = current.iter().copied().collect();
        self.tracked.retain(|e, c| current_set.contains(e) || c.is_exiting());
        for &element in &self.live {
            if !current_set.contains(&element)
                && !self.tracked.contains_key(&element)
                && !host.is_in_document(element)
            {
                host.forget(element);
            }
        }
        self.live = current;
        classification
    }

    /// Begin (or restart) the transition for one classified element.
    fn start<H: LayoutHost + ?Sized>(
        &mut self,
        host: &mut H,
        entry: &Classified,
        now: Instant,
        reordered: bool,
    ) {
        let element = entry.element;
        log::trace!("{element}: {:?}", entry.kind);
        if entry.kind == ChangeKind::Removed && host.is_in_document(element) {
            // Moved to another parent: that parent owns it now
            log::debug!("{element} left {} but stays in the document", self.container);
            if self.player.cancel(element).is_some() {
                host.clear_frame(element);
            }
            let _ = self.tracked.remove(&element);
            return;
        }
        // Already heading to the new slot
        let on_course = self
            .player
            .target(element)
            .is_some_and(|t| t.rect.approx_eq(&entry.to.rect, self.rules.epsilon));
        if entry.kind == ChangeKind::Moved && on_course {
            self.keep(host, entry, now, true);
            return;
        }

        let kind = match entry.kind {
            ChangeKind::Added => AnimationKind::Enter,
            ChangeKind::Moved => AnimationKind::Move,
            ChangeKind::Removed => {
                let origin = entry.from.rect.origin;
                let offset = if self.options.disable_browser_auto_margin {
                    origin
                } else {
                    origin - host.margins(element).top_left()
                };
                host.hold_in_place(
                    self.container,
                    element,
                    Placement {
                        offset,
                        size: entry.from.rect.size,
                    },
                );
                AnimationKind::Exit
            }
            ChangeKind::Unchanged => {
                self.keep(host, entry, now, reordered);
                return;
            }
        };

        let _ = self.player.play(element, kind, entry.from, entry.to, now);
        let child = self
            .tracked
            .entry(element)
            .or_insert_with(|| TrackedChild::settled(element, None));
        child.state = kind.into();
        if kind != AnimationKind::Exit {
            child.baseline = Some(entry.to);
        }
    }

    /// An unchanged element keeps any tween it has, restarted from where it
    /// is now if its layout box changed underneath it.
    ///
    /// Under [`MovePolicy::ReorderedOnly`] a move tween whose element was
    /// only displaced is cancelled instead, snapping it into its new slot.
    fn keep<H: LayoutHost + ?Sized>(
        &mut self,
        host: &mut H,
        entry: &Classified,
        now: Instant,
        reordered: bool,
    ) {
        let element = entry.element;
        let retarget = self
            .player
            .get(element)
            .filter(|t| !t.to.rect.approx_eq(&entry.to.rect, self.rules.epsilon))
            .map(|t| t.kind);
        match retarget {
            Some(AnimationKind::Move)
                if self.rules.move_policy == MovePolicy::ReorderedOnly
                    && !reordered =>
            {
                let _ = self.player.cancel(element);
                host.clear_frame(element);
            }
            Some(kind) => {
                let _ = self.player.play(element, kind, entry.from, entry.to, now);
            }
            None => {}
        }
        let state = self
            .player
            .get(element)
            .map_or(ChildState::Settled, |t| t.kind.into());
        let child = self
            .tracked
            .entry(element)
            .or_insert_with(|| TrackedChild::settled(element, None));
        child.baseline = Some(entry.to);
        child.state = state;
    }

    /// Apply a batch instantly: cancel what is in flight, drop removed
    /// children, and rebase everyone else on their new layout.
    fn snap<H: LayoutHost + ?Sized>(
        &mut self,
        host: &mut H,
        classification: &Classification,
    ) {
        let _ = self.finish_all(host);
        for entry in classification.iter() {
            let element = entry.element;
            if entry.kind == ChangeKind::Removed {
                let _ = self.tracked.remove(&element);
                continue;
            }
            let child = self
                .tracked
                .entry(element)
                .or_insert_with(|| TrackedChild::settled(element, None));
            child.baseline = Some(entry.to);
            child.state = ChildState::Settled;
        }
    }

    fn advance<H: LayoutHost + ?Sized>(
        &mut self,
        host: &mut H,
        now: Instant,
        report: &mut TickReport,
    ) {
        if self.player.is_idle() {
            return;
        }
        let step = self.player.advance(now);
        for (element, frame) in &step.frames {
            host.apply_frame(*element, frame);
        }
        for (element, tween) in step.finished {
            host.clear_frame(element);
            if tween.kind == AnimationKind::Exit {
                host.detach(element);
                let _ = self.tracked.remove(&element);
                report.detached.push(element);
                log::trace!("{element} exited");
            } else {
                if let Some(child) = self.tracked.get_mut(&element) {
                    child.baseline = Some(tween.to);
                    child.state = ChildState::Settled;
                }
                report.settled.push(element);
            }
        }
    }
}
