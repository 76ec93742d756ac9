//! Mutation watcher: an event queue plus batch coalescer over a container's
//! child list.
//!
//! Hosts only buffer raw [`MutationRecord`]s when the document changes. The
//! watcher drains them on the engine's tick and emits at most one
//! [`MutationBatch`] per tick, so every write made in one logical operation
//! (an insert, a splice, a full reorder) lands in the same batch.

use rustc_hash::FxHashMap;

use crate::host::{ElementId, LayoutHost, MutationRecord};

/// Net effect of a batch on one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetChange {
    /// Not a child before the batch, a child after it.
    Added,
    /// A child before the batch, gone after it.
    Removed,
    /// A child before and after, repositioned by the host.
    Reordered,
}

/// Internal coalescing state; `Transient` marks an element that was added
/// and removed again within one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Net {
    Added,
    Removed,
    Reordered,
    Transient,
}

impl Net {
    fn start(record: &MutationRecord) -> Self {
        match record {
            MutationRecord::Added(_) => Net::Added,
            MutationRecord::Removed(_) => Net::Removed,
            MutationRecord::Moved(_) => Net::Reordered,
        }
    }

    fn then(self, record: &MutationRecord) -> Self {
        match (self, record) {
            (Net::Added, MutationRecord::Removed(_)) => Net::Transient,
            (Net::Transient, MutationRecord::Added(_)) => Net::Added,
            (Net::Removed, MutationRecord::Added(_)) => Net::Reordered,
            (Net::Reordered, MutationRecord::Removed(_)) => Net::Removed,
            (state, _) => state,
        }
    }

    fn public(self) -> Option<NetChange> {
        match self {
            Net::Added => Some(NetChange::Added),
            Net::Removed => Some(NetChange::Removed),
            Net::Reordered => Some(NetChange::Reordered),
            Net::Transient => None,
        }
    }
}

/// Every child-list record captured within one tick, plus the coalesced
/// net change per element.
#[derive(Debug, Clone, Default)]
pub struct MutationBatch {
    records: Vec<MutationRecord>,
    order: Vec<ElementId>,
    net: FxHashMap<ElementId, Net>,
}

impl MutationBatch {
    /// Coalesce raw records, in the order they occurred.
    #[must_use]
    pub fn from_records(records: Vec<MutationRecord>) -> Self {
        let mut order = Vec::new();
        let mut net: FxHashMap<ElementId, Net> = FxHashMap::default();
        for record in &records {
            let element = record.element();
            let next = match net.get(&element) {
                Some(state) => state.then(record),
                None => {
                    order.push(element);
                    Net::start(record)
                }
            };
            let _ = net.insert(element, next);
        }
        Self {
            records,
            order,
            net,
        }
    }

    /// Raw records, in arrival order.
    pub fn records(&self) -> &[MutationRecord] {
        &self.records
    }

    /// Number of raw records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Net change for `element`, if it has one.
    pub fn net_change(&self, element: ElementId) -> Option<NetChange> {
        self.net.get(&element).and_then(|n| n.public())
    }

    /// Whether the host repositioned `element` within this batch.
    pub fn is_reordered(&self, element: ElementId) -> bool {
        self.net_change(element) == Some(NetChange::Reordered)
    }

    /// Net changes in first-touch order. Elements that netted out are
    /// skipped.
    pub fn changes(&self) -> impl Iterator<Item = (ElementId, NetChange)> + '_ {
        self.order
            .iter()
            .filter_map(|e| self.net_change(*e).map(|n| (*e, n)))
    }
}

/// Buffers child-list records for one container and emits coalesced
/// batches.
#[derive(Debug, Default)]
pub struct MutationWatcher {
    container: Option<ElementId>,
    pending: Vec<MutationRecord>,
}

impl MutationWatcher {
    /// Idle watcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin monitoring `container`. Replaces any previous target.
    pub fn observe<H: LayoutHost + ?Sized>(
        &mut self,
        host: &mut H,
        container: ElementId,
    ) {
        if let Some(previous) = self.container.replace(container) {
            if previous != container {
                host.disconnect(previous);
            }
        }
        self.pending.clear();
        host.observe(container);
        log::debug!("watching children of {container}");
    }

    /// Stop monitoring and drop anything buffered.
    pub fn disconnect<H: LayoutHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(container) = self.container.take() {
            host.disconnect(container);
            log::debug!("stopped watching {container}");
        }
        self.pending.clear();
    }

    /// Container being watched, if any.
    pub fn container(&self) -> Option<ElementId> {
        self.container
    }

    /// Whether a container is being watched.
    pub fn is_observing(&self) -> bool {
        self.container.is_some()
    }

    /// Buffer records delivered by the host. Ignored while idle.
    pub fn collect(&mut self, records: impl IntoIterator<Item = MutationRecord>) {
        if self.container.is_some() {
            self.pending.extend(records);
        }
    }

    /// Pull whatever the host buffered for the watched container.
    pub fn poll<H: LayoutHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(container) = self.container {
            let records = host.take_records(container);
            self.collect(records);
        }
    }

    /// Number of records waiting for the next flush.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Emit everything buffered since the last flush as one batch.
    ///
    /// Returns `None` when nothing changed.
    pub fn flush(&mut self) -> Option<MutationBatch> {
        if self.pending.is_empty() {
            return None;
        }
        Some(MutationBatch::from_records(std::mem::take(&mut self.pending)))
    }
}
