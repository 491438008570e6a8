//! Integration tests for editor crate

use canvas_editor::{
    Block, BlockId, BlockKind, BlockType, EditSession, EditorConfig, Mutation, SubscriptionKey, TreeStore,
    ViewIndex,
};
use std::cell::RefCell;
use std::rc::Rc;

fn id(value: &str) -> BlockId {
    BlockId::from(value)
}

fn ids(blocks: &[Block]) -> Vec<&str> {
    blocks.iter().map(|block| block.id.as_str()).collect()
}

#[test]
fn test_add_child_then_delete_parent() {
    let views = ViewIndex::new(TreeStore::with_blocks(vec![Block::with_id("1", BlockType::Container, None)]));

    // Roots are written back with a text block whose parent is "1"
    let roots = views.children_of(None);
    let mut next = roots.read().to_vec();
    next.push(Block::with_id("t", BlockType::Text, Some(id("1"))));
    roots.write(next);

    let children = views.children_of(Some(&id("1"))).read();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].block_type(), BlockType::Text);

    views.for_id(&id("1")).write(None);

    let text = views.for_id(&id("t")).read().unwrap();
    assert!(text.parent_id.is_none());
    assert_eq!(ids(&roots.read()), vec!["t"]);
    assert!(views.children_of(Some(&id("1"))).read().is_empty());
}

#[test]
fn test_delete_promotes_children_and_leaves_others() {
    let blocks = vec![
        Block::with_id("p", BlockType::Container, None),
        Block::with_id("c1", BlockType::Text, Some(id("p"))),
        Block::with_id("other", BlockType::Image, None),
        Block::with_id("c2", BlockType::Container, Some(id("p"))),
    ];
    let views = ViewIndex::new(TreeStore::with_blocks(blocks.clone()));

    views.for_id(&id("p")).write(None);

    let after = views.store().get_all();
    assert_eq!(ids(&after), vec!["c1", "other", "c2"]);
    assert!(after[0].parent_id.is_none());
    assert!(after[2].parent_id.is_none());
    assert_eq!(after[1], blocks[2]);
}

#[test]
fn test_reparent_through_children_write() {
    let views = ViewIndex::new(TreeStore::with_blocks(vec![
        Block::with_id("a", BlockType::Container, None),
        Block::with_id("b", BlockType::Container, None),
        Block::with_id("x", BlockType::Text, Some(id("a"))),
        Block::with_id("y", BlockType::Text, Some(id("a"))),
    ]));

    let under_b = views.children_of(Some(&id("b")));
    let mut moved = views.for_id(&id("x")).read().unwrap();
    moved.parent_id = Some(id("b"));
    let mut next = under_b.read().to_vec();
    next.push(moved);
    under_b.write(next);

    assert_eq!(ids(&under_b.read()), vec!["x"]);
    assert_eq!(ids(&views.children_of(Some(&id("a"))).read()), vec!["y"]);
    assert_eq!(views.store().len(), 4);
}

#[test]
fn test_session_workflow() -> anyhow::Result<()> {
    let mut session = EditSession::new(EditorConfig {
        session_name: Some("workflow".to_string()),
        ..EditorConfig::default()
    });

    let page = session.add_block(BlockType::Container, None)?;
    let title = session.add_block(BlockType::Text, Some(page.clone()))?;
    let hero = session.add_block(BlockType::Image, Some(page.clone()))?;

    session.select(Some(title.clone()))?;
    session.apply(Mutation::UpdateText {
        block_id: title.clone(),
        content: "Welcome".to_string(),
    })?;

    match session.selected().map(|block| block.kind) {
        Some(BlockKind::Text { content, .. }) => assert_eq!(content, "Welcome"),
        other => panic!("expected text, got {:?}", other),
    }

    let outline = session.outline();
    assert_eq!(outline.len(), 1);
    assert_eq!(outline[0].child_ids(), vec![&title, &hero]);
    assert!(outline[0].children[0].active);

    let tree = session.render_tree();
    assert_eq!(tree[0].children.len(), 2);
    assert_eq!(session.stats().texts, 1);
    Ok(())
}

#[test]
fn test_subscribers_see_only_their_slices() {
    let store = TreeStore::with_blocks(vec![
        Block::with_id("1", BlockType::Container, None),
        Block::with_id("2", BlockType::Container, Some(id("1"))),
    ]);
    let views = ViewIndex::new(store.clone());
    let log = Rc::new(RefCell::new(Vec::new()));

    for key in [
        SubscriptionKey::Children(None),
        SubscriptionKey::Children(Some(id("1"))),
        SubscriptionKey::Block(id("2")),
    ] {
        let log = Rc::clone(&log);
        store.subscribe(key, move |change| log.borrow_mut().push(change.key.clone()));
    }

    // New child under 1: the children-of-1 slice changes, the root slice does not
    views.children_of(Some(&id("1"))).push(Block::with_id("3", BlockType::Text, Some(id("1"))));
    assert_eq!(*log.borrow(), vec![SubscriptionKey::Children(Some(id("1")))]);

    // Deleting 1 promotes 2 and 3: roots change, 2 changes, 1 loses its children
    log.borrow_mut().clear();
    views.for_id(&id("1")).remove();
    assert_eq!(
        *log.borrow(),
        vec![
            SubscriptionKey::Children(None),
            SubscriptionKey::Children(Some(id("1"))),
            SubscriptionKey::Block(id("2")),
        ]
    );
}

#[test]
fn test_handles_stay_valid_across_commits() {
    let store = TreeStore::new();
    let views = ViewIndex::new(store.clone());
    let roots = views.children_of(None);
    assert!(roots.read().is_empty());

    store.replace_all(vec![Block::with_id("1", BlockType::Container, None)]);
    assert_eq!(ids(&roots.read()), vec!["1"]);
    assert!(Rc::ptr_eq(&roots, &views.children_of(None)));
}
