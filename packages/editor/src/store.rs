//! # Tree Store
//!
//! Owns the canonical block list and the active block id for one editing
//! session. `replace_all` is the only way the list changes; every higher
//! level write computes a whole new list and commits it here.
//!
//! The store is a cheap handle: clones share the same state, so consumers get
//! it injected instead of reaching for a global.
//!
//! ## Subscriptions
//!
//! ```text
//! replace_all(next)
//!     ↓
//! swap list, bump revision
//!     ↓
//! for each subscriber: did its slice change between previous and next?
//!     ↓ yes
//! callback(&Change)
//! ```
//!
//! Callbacks run after the store's borrow is released, so they may read the
//! store or commit another change. A commit made from inside a callback is
//! queued: every subscriber sees the outer commit first, then the nested one,
//! in revision order. A callback is never re-entered while it is running.

use canvas_model::{Block, BlockId};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Immutable view of the canonical list at one revision
pub type Snapshot = Rc<[Block]>;

/// What a subscriber observes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubscriptionKey {
    /// Every commit
    All,
    /// The record with this id
    Block(BlockId),
    /// Records under this parent (`None` = roots)
    Children(Option<BlockId>),
    /// The active id and the record it resolves to
    Selection,
}

impl SubscriptionKey {
    fn list_changed(&self, previous: &[Block], next: &[Block], selected: Option<&BlockId>) -> bool {
        match self {
            SubscriptionKey::All => true,
            SubscriptionKey::Block(id) => find_block(previous, id) != find_block(next, id),
            SubscriptionKey::Children(parent) => !children_in(previous, parent.as_ref())
                .eq(children_in(next, parent.as_ref())),
            SubscriptionKey::Selection => match selected {
                Some(id) => find_block(previous, id) != find_block(next, id),
                None => false,
            },
        }
    }
}

/// Delivered to subscribers whose slice changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub revision: u64,
    pub key: SubscriptionKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Rc<RefCell<Box<dyn FnMut(&Change)>>>;

struct Subscriber {
    id: SubscriptionId,
    key: SubscriptionKey,
    callback: Callback,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<Subscriber>,
    /// Changes waiting for delivery, oldest revision first
    queue: VecDeque<(Change, Callback)>,
    /// Set while the outermost `notify` drains the queue
    delivering: bool,
}

/// Clears `Registry::delivering` when the draining `notify` returns or unwinds
struct DeliveryGuard<'a>(&'a RefCell<Registry>);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        let mut registry = self.0.borrow_mut();
        registry.delivering = false;
        registry.queue.clear();
    }
}

struct StoreState {
    blocks: Snapshot,
    selected: Option<BlockId>,
    revision: u64,
}

/// Canonical block list plus selection for one editing session
#[derive(Clone)]
pub struct TreeStore {
    state: Rc<RefCell<StoreState>>,
    registry: Rc<RefCell<Registry>>,
}

impl TreeStore {
    /// Empty canvas
    pub fn new() -> Self {
        Self::with_blocks(Vec::new())
    }

    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        Self {
            state: Rc::new(RefCell::new(StoreState {
                blocks: blocks.into(),
                selected: None,
                revision: 0,
            })),
            registry: Rc::new(RefCell::new(Registry::default())),
        }
    }

    /// Full list in insertion order
    pub fn get_all(&self) -> Snapshot {
        Rc::clone(&self.state.borrow().blocks)
    }

    /// Number of commits so far
    pub fn revision(&self) -> u64 {
        self.state.borrow().revision
    }

    pub fn len(&self) -> usize {
        self.state.borrow().blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Atomically replace the canonical list and notify affected subscribers.
    ///
    /// Returns the new revision.
    pub fn replace_all(&self, blocks: Vec<Block>) -> u64 {
        let next: Snapshot = blocks.into();
        let (previous, revision, selected) = {
            let mut state = self.state.borrow_mut();
            let previous = std::mem::replace(&mut state.blocks, Rc::clone(&next));
            state.revision += 1;
            (previous, state.revision, state.selected.clone())
        };

        debug!(revision, blocks = next.len(), "Committed canvas");

        self.notify(revision, |key| key.list_changed(&previous, &next, selected.as_ref()));
        revision
    }

    /// Clear the selection and replace the whole canvas
    pub fn reset(&self, blocks: Vec<Block>) -> u64 {
        self.set_selected(None);
        self.replace_all(blocks)
    }

    /// Active id as stored, possibly dangling
    pub fn selected_id(&self) -> Option<BlockId> {
        self.state.borrow().selected.clone()
    }

    /// Active block, or `None` when unset or dangling
    pub fn get_selected(&self) -> Option<Block> {
        let state = self.state.borrow();
        let id = state.selected.as_ref()?;
        find_block(&state.blocks, id).cloned()
    }

    pub fn set_selected(&self, id: Option<BlockId>) {
        let revision = {
            let mut state = self.state.borrow_mut();
            if state.selected == id {
                return;
            }
            state.selected = id;
            state.revision
        };

        debug!(selected = ?self.selected_id(), "Selection changed");

        self.notify(revision, |key| *key == SubscriptionKey::Selection);
    }

    /// Register `callback` for changes to `key`
    pub fn subscribe<F>(&self, key: SubscriptionKey, callback: F) -> SubscriptionId
    where
        F: FnMut(&Change) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry.subscribers.push(Subscriber {
            id,
            key,
            callback: Rc::new(RefCell::new(Box::new(callback))),
        });
        id
    }

    /// Returns false if `id` was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.borrow_mut();
        let before = registry.subscribers.len();
        registry.subscribers.retain(|s| s.id != id);
        registry.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().subscribers.len()
    }

    fn notify(&self, revision: u64, mut affected: impl FnMut(&SubscriptionKey) -> bool) {
        {
            let mut registry = self.registry.borrow_mut();
            let pending: Vec<(Change, Callback)> = registry
                .subscribers
                .iter()
                .filter(|s| affected(&s.key))
                .map(|s| {
                    let change = Change {
                        revision,
                        key: s.key.clone(),
                    };
                    (change, Rc::clone(&s.callback))
                })
                .collect();
            registry.queue.extend(pending);

            if registry.delivering {
                debug!(revision, queued = registry.queue.len(), "Queued nested commit");
                return;
            }
            registry.delivering = true;
        }

        let _guard = DeliveryGuard(&self.registry);
        loop {
            let next = self.registry.borrow_mut().queue.pop_front();
            let Some((change, callback)) = next else {
                break;
            };
            match callback.try_borrow_mut() {
                Ok(mut callback) => (&mut *callback)(&change),
                Err(_) => debug!(key = ?change.key, "Skipping re-entrant subscriber"),
            };
        }
    }
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TreeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("TreeStore")
            .field("blocks", &state.blocks.len())
            .field("selected", &state.selected)
            .field("revision", &state.revision)
            .field("subscribers", &self.registry.borrow().subscribers.len())
            .finish()
    }
}

/// First record with `id`
pub fn find_block<'a>(blocks: &'a [Block], id: &BlockId) -> Option<&'a Block> {
    blocks.iter().find(|block| &block.id == id)
}

/// Records directly under `parent`, in canonical order
pub fn children_in<'a>(
    blocks: &'a [Block],
    parent: Option<&'a BlockId>,
) -> impl Iterator<Item = &'a Block> + 'a {
    blocks.iter().filter(move |block| block.parent_id.as_ref() == parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_model::BlockType;
    use std::cell::Cell;

    fn block(id: &str, parent: Option<&str>) -> Block {
        Block::with_id(id, BlockType::Container, parent.map(BlockId::from))
    }

    #[test]
    fn test_replace_all_bumps_revision() {
        let store = TreeStore::new();
        assert_eq!(store.revision(), 0);
        assert!(store.is_empty());

        let revision = store.replace_all(vec![block("1", None)]);
        assert_eq!(revision, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_all()[0].id, BlockId::from("1"));
    }

    #[test]
    fn test_snapshots_are_not_affected_by_later_commits() {
        let store = TreeStore::with_blocks(vec![block("1", None)]);
        let before = store.get_all();
        store.replace_all(vec![block("2", None)]);
        assert_eq!(before[0].id, BlockId::from("1"));
        assert_eq!(store.get_all()[0].id, BlockId::from("2"));
    }

    #[test]
    fn test_selection_resolves_against_current_list() {
        let store = TreeStore::with_blocks(vec![block("1", None)]);
        assert!(store.get_selected().is_none());

        store.set_selected(Some(BlockId::from("1")));
        assert_eq!(store.get_selected().unwrap().id, BlockId::from("1"));

        // Dangling selection degrades to no block
        store.replace_all(vec![]);
        assert_eq!(store.selected_id(), Some(BlockId::from("1")));
        assert!(store.get_selected().is_none());
    }

    #[test]
    fn test_keyed_subscribers_only_fire_when_slice_changes() {
        let store = TreeStore::with_blocks(vec![block("1", None), block("2", Some("1"))]);
        let block_hits = Rc::new(Cell::new(0));
        let children_hits = Rc::new(Cell::new(0));
        let all_hits = Rc::new(Cell::new(0));

        let hits = Rc::clone(&block_hits);
        store.subscribe(SubscriptionKey::Block(BlockId::from("2")), move |_| hits.set(hits.get() + 1));
        let hits = Rc::clone(&children_hits);
        store.subscribe(SubscriptionKey::Children(None), move |_| hits.set(hits.get() + 1));
        let hits = Rc::clone(&all_hits);
        store.subscribe(SubscriptionKey::All, move |_| hits.set(hits.get() + 1));

        // Only block 2 changes; the root slice stays the same
        let mut edited = block("2", Some("1"));
        edited.layout.gap = "8px".to_string();
        store.replace_all(vec![block("1", None), edited]);

        assert_eq!(block_hits.get(), 1);
        assert_eq!(children_hits.get(), 0);
        assert_eq!(all_hits.get(), 1);
    }

    #[test]
    fn test_selection_subscribers() {
        let store = TreeStore::with_blocks(vec![block("1", None)]);
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        store.subscribe(SubscriptionKey::Selection, move |change| {
            assert_eq!(change.key, SubscriptionKey::Selection);
            counter.set(counter.get() + 1);
        });

        store.set_selected(Some(BlockId::from("1")));
        store.set_selected(Some(BlockId::from("1")));
        assert_eq!(hits.get(), 1);

        // Deleting the active record changes what the selection resolves to
        store.replace_all(vec![]);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_nested_commit_is_delivered_after_outer_one() {
        let store = TreeStore::with_blocks(vec![block("1", None)]);
        let inner = store.clone();
        let committer_log = Rc::new(RefCell::new(Vec::new()));
        let observer_log = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&committer_log);
        store.subscribe(SubscriptionKey::All, move |change| {
            log.borrow_mut().push(change.revision);
            if change.revision == 1 {
                inner.replace_all(vec![]);
            }
        });
        let log = Rc::clone(&observer_log);
        store.subscribe(SubscriptionKey::All, move |change| log.borrow_mut().push(change.revision));

        store.replace_all(vec![block("2", None)]);
        assert_eq!(store.revision(), 2);
        assert!(store.is_empty());
        assert_eq!(*committer_log.borrow(), vec![1, 2]);
        assert_eq!(*observer_log.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_delivery_resumes_after_nested_selection_change() {
        let store = TreeStore::with_blocks(vec![block("1", None)]);
        let inner = store.clone();
        let log = Rc::new(RefCell::new(Vec::new()));

        let selection_log = Rc::clone(&log);
        store.subscribe(SubscriptionKey::Selection, move |change| {
            selection_log.borrow_mut().push(("selection", change.revision));
        });
        let all_log = Rc::clone(&log);
        store.subscribe(SubscriptionKey::All, move |change| {
            all_log.borrow_mut().push(("all", change.revision));
            inner.set_selected(Some(BlockId::from("1")));
        });

        store.replace_all(vec![block("1", None), block("2", None)]);
        assert_eq!(*log.borrow(), vec![("all", 1), ("selection", 1)]);

        // The queue is drained, so a later commit is delivered normally
        store.replace_all(vec![block("1", None)]);
        assert_eq!(log.borrow().last(), Some(&("all", 2)));
    }

    #[test]
    fn test_unsubscribe() {
        let store = TreeStore::new();
        let id = store.subscribe(SubscriptionKey::All, |_| {});
        assert_eq!(store.subscriber_count(), 1);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_reset_clears_selection() {
        let store = TreeStore::with_blocks(vec![block("1", None)]);
        store.set_selected(Some(BlockId::from("1")));
        store.reset(vec![block("9", None)]);
        assert!(store.selected_id().is_none());
        assert_eq!(store.len(), 1);
    }
}
