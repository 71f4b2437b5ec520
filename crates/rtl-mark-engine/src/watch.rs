//! Incremental re-scanning on document mutation.
//!
//! The watcher subscribes to child-list and character-data records over the
//! body's subtree. Attribute records are deliberately not requested:
//! applying a marker or font class is itself an attribute mutation, and
//! observing those would make the engine re-trigger on its own writes.

use crate::dom::{DomTree, MutationRecord, ObserveOptions, ObserverId};
use crate::scan::{process_text_node, scan};
use crate::state::StateResolver;

/// Cancellable subscription to document mutations. Attaching twice is a
/// no-op, so a handle never aliases two live observers.
#[derive(Debug, Default)]
pub struct ChangeWatcher {
    observer: Option<ObserverId>,
}

impl ChangeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin observing the body subtree. Does nothing when already attached
    /// or when the tree has no body to observe.
    pub fn attach(&mut self, dom: &mut DomTree) {
        if self.observer.is_some() {
            return;
        }
        let Some(body) = dom.body() else {
            tracing::debug!("no document body; watcher stays detached");
            return;
        };
        self.observer = Some(dom.observe(
            body,
            ObserveOptions {
                child_list: true,
                character_data: true,
                attributes: false,
                subtree: true,
            },
        ));
    }

    /// Stop delivery and drop the subscription. Safe to call when detached.
    pub fn detach(&mut self, dom: &mut DomTree) {
        if let Some(id) = self.observer.take() {
            dom.disconnect(id);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.observer.is_some()
    }

    /// Pull everything queued since the last drain, oldest first. Records
    /// are consumed even when the engine is inactive; observation is never
    /// torn down, only its effect suspended.
    pub fn drain(&mut self, dom: &mut DomTree) -> Vec<MutationRecord> {
        match self.observer {
            Some(id) => dom.take_records(id),
            None => Vec::new(),
        }
    }
}

/// Dispatch one drained batch. Added subtrees get a rooted scan in listed
/// order; a text change takes the cheaper single-node path. Records whose
/// node has left the tree since being queued are skipped.
pub fn process_records(dom: &mut DomTree, resolver: &StateResolver, records: Vec<MutationRecord>) {
    if !resolver.effective_state().is_active {
        return;
    }
    for record in records {
        match record {
            MutationRecord::ChildList { added, .. } => {
                for node in added {
                    if dom.contains(node) {
                        scan(dom, node, resolver);
                    } else {
                        tracing::debug!(?node, "added node vanished before processing");
                    }
                }
            }
            MutationRecord::CharacterData { target } => {
                if dom.contains(target) {
                    process_text_node(dom, target, resolver);
                } else {
                    tracing::debug!(?target, "mutated text node vanished before processing");
                }
            }
            // Never requested; tolerated in case a host delivers them anyway.
            MutationRecord::Attributes { .. } => {}
        }
    }
}
