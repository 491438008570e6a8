//! # Derived View Index
//!
//! Keyed read/write projections over the [`TreeStore`]:
//!
//! - [`BlockView`]: the block with a given id
//! - [`ChildrenView`]: the blocks under a given parent (`None` = roots)
//! - [`ActiveBlockView`]: the selected block
//!
//! Projections are derived, not stored. A read recomputes from the canonical
//! list when the store revision moved since the last read; a write rebuilds
//! the full list (see [`crate::rewrite`]) and commits it. There is no
//! parent → children map to keep in sync.
//!
//! Handles are memoized per key, so asking twice for the same key returns
//! the same `Rc` and consumers can compare handles with `Rc::ptr_eq`.

use crate::rewrite;
use crate::store::{children_in, Change, Snapshot, SubscriptionId, SubscriptionKey, TreeStore};
use canvas_model::{Block, BlockId};
use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Id → position map for one revision of the canonical list
struct IdLookup {
    revision: u64,
    blocks: Snapshot,
    positions: HashMap<BlockId, usize>,
}

impl IdLookup {
    fn build(revision: u64, blocks: Snapshot) -> Self {
        let mut positions = HashMap::with_capacity(blocks.len());
        for (index, block) in blocks.iter().enumerate() {
            positions.entry(block.id.clone()).or_insert(index);
        }
        Self {
            revision,
            blocks,
            positions,
        }
    }

    fn get(&self, id: &BlockId) -> Option<&Block> {
        self.positions.get(id).map(|&index| &self.blocks[index])
    }
}

/// Lookup shared by every by-id handle of one index
#[derive(Clone, Default)]
struct LookupCache(Rc<RefCell<Option<Rc<IdLookup>>>>);

impl LookupCache {
    fn current(&self, store: &TreeStore) -> Rc<IdLookup> {
        let revision = store.revision();
        if let Some(lookup) = self.0.borrow().as_ref() {
            if lookup.revision == revision {
                return Rc::clone(lookup);
            }
        }

        let lookup = Rc::new(IdLookup::build(revision, store.get_all()));
        debug!(revision, blocks = lookup.blocks.len(), "Rebuilt id lookup");
        *self.0.borrow_mut() = Some(Rc::clone(&lookup));
        lookup
    }

    fn find(&self, store: &TreeStore, id: &BlockId) -> Option<Block> {
        self.current(store).get(id).cloned()
    }
}

/// Read/write projection of one block
pub struct BlockView {
    id: BlockId,
    store: TreeStore,
    lookup: LookupCache,
}

impl BlockView {
    pub fn id(&self) -> &BlockId {
        &self.id
    }

    /// The record with this id, if present
    pub fn read(&self) -> Option<Block> {
        self.lookup.find(&self.store, &self.id)
    }

    /// `Some` upserts the record under this id; `None` deletes it and
    /// promotes its direct children to roots.
    pub fn write(&self, block: Option<Block>) -> u64 {
        let blocks = self.store.get_all();
        let next = match block {
            Some(block) => rewrite::upsert(&blocks, &self.id, block),
            None => {
                debug!(block_id = %self.id, "Removing block");
                rewrite::remove_and_promote(&blocks, &self.id)
            }
        };
        self.store.replace_all(next)
    }

    /// Read, apply `f`, write back. No-op when the block is absent.
    pub fn update(&self, f: impl FnOnce(&mut Block)) -> Option<u64> {
        let mut block = self.read()?;
        f(&mut block);
        Some(self.write(Some(block)))
    }

    pub fn remove(&self) -> u64 {
        self.write(None)
    }

    pub fn subscribe(&self, callback: impl FnMut(&Change) + 'static) -> SubscriptionId {
        self.store.subscribe(SubscriptionKey::Block(self.id.clone()), callback)
    }
}

/// Read/write projection of the blocks under one parent
pub struct ChildrenView {
    parent: Option<BlockId>,
    store: TreeStore,
    cache: RefCell<Option<(u64, Snapshot)>>,
}

impl ChildrenView {
    pub fn parent(&self) -> Option<&BlockId> {
        self.parent.as_ref()
    }

    /// Records whose parent is this key, in canonical order
    pub fn read(&self) -> Snapshot {
        let revision = self.store.revision();
        if let Some((cached, children)) = self.cache.borrow().as_ref() {
            if *cached == revision {
                return Rc::clone(children);
            }
        }

        let blocks = self.store.get_all();
        let children: Snapshot = children_in(&blocks, self.parent.as_ref()).cloned().collect();
        *self.cache.borrow_mut() = Some((revision, Rc::clone(&children)));
        children
    }

    pub fn ids(&self) -> Vec<BlockId> {
        self.read().iter().map(|block| block.id.clone()).collect()
    }

    /// Replace the whole sibling set under this parent
    pub fn write(&self, children: Vec<Block>) -> u64 {
        let blocks = self.store.get_all();
        self.store
            .replace_all(rewrite::replace_children(&blocks, self.parent.as_ref(), children))
    }

    /// Append `block` to the current children. A sibling with the same id
    /// is replaced in place, so ids stay unique.
    pub fn push(&self, block: Block) -> u64 {
        let mut children = self.read().to_vec();
        match children.iter().position(|child| child.id == block.id) {
            Some(index) => children[index] = block,
            None => children.push(block),
        }
        self.write(children)
    }

    pub fn subscribe(&self, callback: impl FnMut(&Change) + 'static) -> SubscriptionId {
        self.store.subscribe(SubscriptionKey::Children(self.parent.clone()), callback)
    }
}

/// Projection of the selected block
pub struct ActiveBlockView {
    store: TreeStore,
    lookup: LookupCache,
}

impl ActiveBlockView {
    /// Selected block; `None` when nothing is selected or the id dangles
    pub fn read(&self) -> Option<Block> {
        let id = self.store.selected_id()?;
        self.lookup.find(&self.store, &id)
    }

    /// Upsert `block` by its own id
    pub fn write(&self, block: Block) -> u64 {
        let blocks = self.store.get_all();
        let id = block.id.clone();
        self.store.replace_all(rewrite::upsert(&blocks, &id, block))
    }

    pub fn selected_id(&self) -> Option<BlockId> {
        self.store.selected_id()
    }

    pub fn select(&self, id: Option<BlockId>) {
        self.store.set_selected(id);
    }

    pub fn is_active(&self, id: &BlockId) -> bool {
        self.store.selected_id().as_ref() == Some(id)
    }

    pub fn subscribe(&self, callback: impl FnMut(&Change) + 'static) -> SubscriptionId {
        self.store.subscribe(SubscriptionKey::Selection, callback)
    }
}

/// Memoized projection handles for one store
pub struct ViewIndex {
    store: TreeStore,
    lookup: LookupCache,
    by_id: RefCell<HashMap<BlockId, Rc<BlockView>>>,
    by_parent: RefCell<HashMap<Option<BlockId>, Rc<ChildrenView>>>,
    active: OnceCell<Rc<ActiveBlockView>>,
}

impl ViewIndex {
    pub fn new(store: TreeStore) -> Self {
        Self {
            store,
            lookup: LookupCache::default(),
            by_id: RefCell::new(HashMap::new()),
            by_parent: RefCell::new(HashMap::new()),
            active: OnceCell::new(),
        }
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn for_id(&self, id: &BlockId) -> Rc<BlockView> {
        let mut by_id = self.by_id.borrow_mut();
        let view = by_id.entry(id.clone()).or_insert_with(|| {
            Rc::new(BlockView {
                id: id.clone(),
                store: self.store.clone(),
                lookup: self.lookup.clone(),
            })
        });
        Rc::clone(view)
    }

    pub fn children_of(&self, parent: Option<&BlockId>) -> Rc<ChildrenView> {
        let mut by_parent = self.by_parent.borrow_mut();
        let view = by_parent.entry(parent.cloned()).or_insert_with(|| {
            Rc::new(ChildrenView {
                parent: parent.cloned(),
                store: self.store.clone(),
                cache: RefCell::new(None),
            })
        });
        Rc::clone(view)
    }

    pub fn active(&self) -> Rc<ActiveBlockView> {
        let view = self.active.get_or_init(|| {
            Rc::new(ActiveBlockView {
                store: self.store.clone(),
                lookup: self.lookup.clone(),
            })
        });
        Rc::clone(view)
    }

    /// Forget the handles keyed by a deleted block.
    ///
    /// Outstanding `Rc`s stay usable; the next request builds a fresh handle.
    pub fn evict(&self, id: &BlockId) {
        let by_id = self.by_id.borrow_mut().remove(id).is_some();
        let by_parent = self.by_parent.borrow_mut().remove(&Some(id.clone())).is_some();
        if by_id || by_parent {
            debug!(block_id = %id, "Evicted projection handles");
        }
    }

    /// Number of memoized handles
    pub fn len_cached(&self) -> usize {
        self.by_id.borrow().len() + self.by_parent.borrow().len()
    }
}

impl std::fmt::Debug for ViewIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewIndex")
            .field("store", &self.store)
            .field("by_id", &self.by_id.borrow().len())
            .field("by_parent", &self.by_parent.borrow().len())
            .finish()
    }
}
