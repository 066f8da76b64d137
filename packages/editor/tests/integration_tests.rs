//! Integration tests for editor crate

use blockpage_common::{MemoryStorage, PageStorage};
use blockpage_document::{BlockStyles, Breakpoint, FieldType, FormFieldConfig, Responsive, TypographyStyle};
use blockpage_editor::{
    BlockPatch, BlockPath, BlockType, DragItem, DropDecision, DropRejection, DropZone, EditorError, FieldPatch,
    FormError, FormPatch, MutationError, PageStore, StoreEvent, StoreOptions,
};
use std::path::Path;

fn p(s: &str) -> BlockPath {
    s.parse().unwrap()
}

fn drag(store: &PageStore, id: &str) -> DragItem {
    DragItem::existing_block(store.block(id).unwrap().clone(), store.path_of(id).unwrap())
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<StoreEvent>) -> Vec<StoreEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn test_container_scenario() {
    let mut store = PageStore::default();
    assert!(store.blocks().is_empty());

    let container = store.add_block(BlockType::Container, None, None).unwrap();
    assert_eq!(store.path_of(&container), Some(p("0")));
    assert!(store.block(&container).unwrap().blocks.is_empty());

    let text = store
        .add_block(BlockType::Text, Some(&BlockPatch::content("Hi")), Some(&p("0-0")))
        .unwrap();
    assert_eq!(store.path_of(&text), Some(p("0-0")));
    assert_eq!(store.block_at(&p("0-0")).unwrap().content, "Hi");

    // Onto its own position
    let before = store.page().clone();
    let decision = store.handle_drop(&DropZone::page(p("0-0")), drag(&store, &text));
    assert!(!decision.is_effective());
    assert_eq!(store.page(), &before);

    // Onto a new root slot
    let decision = store.handle_drop(&DropZone::page(p("1")), drag(&store, &text));
    assert!(matches!(decision, DropDecision::Move { .. }));
    assert!(store.block(&container).unwrap().blocks.is_empty());
    assert_eq!(store.path_of(&text), Some(p("1")));
    assert_eq!(store.block(&text).unwrap().content, "Hi");
    assert_eq!(store.block(&text).unwrap().level, 0);
}

#[test]
fn test_add_block_into_missing_container_creates_shell() {
    let mut store = PageStore::default();

    let text = store.add_block(BlockType::Text, None, Some(&p("0-0"))).unwrap();

    assert_eq!(store.blocks().len(), 1);
    assert_eq!(store.blocks()[0].kind, BlockType::Container);
    assert_eq!(store.path_of(&text), Some(p("0-0")));
    assert_eq!(store.block(&text).unwrap().level, 1);
}

#[test]
fn test_stale_path_leaves_page_unchanged() {
    let mut store = PageStore::default();
    store.add_block(BlockType::Text, None, None).unwrap();
    let before = store.page().clone();
    let version = store.version();

    assert!(store.add_block(BlockType::Text, None, Some(&p("5"))).is_none());
    assert!(store.add_block(BlockType::Text, None, Some(&p("0-0"))).is_none());
    assert!(!store.remove_block("nope"));
    assert!(!store.update_block(&BlockPatch::content("x"), "nope"));

    assert_eq!(store.page(), &before);
    assert_eq!(store.version(), version);
}

#[test]
fn test_remove_clears_selection_inside_subtree() {
    let mut store = PageStore::default();
    let outer = store.add_block(BlockType::Container, None, None).unwrap();
    let inner = store.add_block(BlockType::H1, None, Some(&p("0-0"))).unwrap();
    store.select_block(Some(&inner));

    let mut rx = store.subscribe();
    assert!(store.remove_block(&outer));

    assert_eq!(store.selected_block_id(), None);
    let events = drain(&mut rx);
    assert!(events.contains(&StoreEvent::SelectionChanged { block_id: None }));
}

#[test]
fn test_cut_then_paste_uses_fresh_ids() {
    let mut store = PageStore::default();
    let a = store.add_block(BlockType::Text, Some(&BlockPatch::content("a")), None).unwrap();
    store.add_block(BlockType::Text, Some(&BlockPatch::content("b")), None).unwrap();

    assert!(store.cut_block(&a));
    assert_eq!(store.blocks().len(), 1);
    assert!(store.block(&a).is_none());

    let first = store.paste_block().unwrap();
    let second = store.paste_block().unwrap();

    assert_ne!(first, a);
    assert_ne!(first, second);
    assert_eq!(store.blocks().len(), 3);
    assert_eq!(store.block(&second).unwrap().content, "a");
}

#[test]
fn test_paste_follows_selection() {
    let mut store = PageStore::default();
    let container = store.add_block(BlockType::Container, None, None).unwrap();
    let text = store.add_block(BlockType::Text, None, None).unwrap();
    store.add_block(BlockType::Divider, None, None).unwrap();
    store.copy_block(&text);

    // Selected container: appended inside it
    store.select_block(Some(&container));
    let inside = store.paste_block().unwrap();
    assert_eq!(store.path_of(&inside), Some(p("0-0")));

    // Selected leaf: right after it
    store.select_block(Some(&text));
    let after = store.paste_block().unwrap();
    assert_eq!(store.path_of(&after), Some(p("2")));

    // Nothing selected: end of root
    store.select_block(None);
    let end = store.paste_block().unwrap();
    assert_eq!(store.path_of(&end), Some(BlockPath::top(store.blocks().len() - 1)));
}

#[test]
fn test_paste_with_empty_clipboard() {
    let mut store = PageStore::default();
    assert!(store.paste_block().is_none());
    assert!(store.blocks().is_empty());
}

#[test]
fn test_drop_rejections_are_published() {
    let mut store = PageStore::default();
    let outer = store.add_block(BlockType::Container, None, None).unwrap();
    store.add_block(BlockType::Text, None, Some(&p("0-0"))).unwrap();
    let quote = store.add_block(BlockType::Quote, None, None).unwrap();
    let mut rx = store.subscribe();

    let into_self = store.handle_drop(&DropZone::page(p("0-1")), drag(&store, &outer));
    assert_eq!(into_self, DropDecision::Reject(DropRejection::IntoDescendant));

    // Quotes do not nest
    let into_leaf = store.handle_drop(&DropZone::page(p("1-0")), drag(&store, &outer));
    assert!(matches!(into_leaf, DropDecision::Reject(DropRejection::NotAccepted { .. })));

    let field = blockpage_document::FormFieldConfig::new("f1", "email", FieldType::Email);
    let wrong_tree = store.handle_drop(
        &DropZone::page(p("0")),
        DragItem::Field { field, origin: None },
    );
    assert_eq!(wrong_tree, DropDecision::Reject(DropRejection::WrongTree));

    let rejected = drain(&mut rx)
        .into_iter()
        .filter(|event| matches!(event, StoreEvent::DropRejected { .. }))
        .count();
    assert_eq!(rejected, 3);
    assert_eq!(store.path_of(&quote), Some(p("1")));
}

#[test]
fn test_palette_drop_inserts_fresh_block() {
    let mut store = PageStore::default();
    store.add_block(BlockType::Container, None, None).unwrap();

    let palette = blockpage_document::Block::new(BlockType::Button, "palette-button");
    let decision = store.handle_drop(&DropZone::page(p("0-0")), DragItem::new_block(palette));

    assert_eq!(decision, DropDecision::Insert { to: p("0-0") });
    let inserted = store.block_at(&p("0-0")).unwrap();
    assert_eq!(inserted.kind, BlockType::Button);
    assert_ne!(inserted.id, "palette-button");
}

#[test]
fn test_drag_lifecycle_through_store() {
    let mut store = PageStore::default();
    let a = store.add_block(BlockType::Text, None, None).unwrap();
    store.add_block(BlockType::Text, None, None).unwrap();

    store.drag_start(drag(&store, &a));
    assert!(!store.drag_enter(DropZone::page(p("1"))));
    assert!(store.drag_enter(DropZone::page(p("2"))));
    store.drag_leave();

    // Released outside any zone
    assert_eq!(store.drag_end(), DropDecision::NoOp);
    assert_eq!(store.path_of(&a), Some(p("0")));

    store.drag_start(drag(&store, &a));
    store.drag_enter(DropZone::page(p("2")));
    assert!(store.drag_end().is_effective());
    assert_eq!(store.path_of(&a), Some(p("1")));
    assert!(!store.drag().is_dragging());
}

#[test]
fn test_forms_workflow() {
    let mut store = PageStore::default();
    let form_id = store.add_form();
    assert_eq!(store.active_form().unwrap().id, form_id);

    assert!(store.update_form(&FormPatch {
        title: Some("Contact us".into()),
        ..Default::default()
    }));
    assert_eq!(store.active_form().unwrap().title.as_deref(), Some("Contact us"));

    let email = store.add_field(&form_id, FieldType::Email).unwrap();
    let name = store.add_field(&form_id, FieldType::Text).unwrap();

    let mut rx = store.subscribe();
    let err = store
        .update_field(&form_id, &name, &FieldPatch::rename("email"))
        .unwrap_err();
    assert_eq!(err, FormError::DuplicateFieldName("email".into()));
    assert_eq!(store.active_form().unwrap().field(&name).unwrap().name, "text");
    assert!(drain(&mut rx)
        .iter()
        .any(|event| matches!(event, StoreEvent::Validation { .. })));

    // Reorder by dragging the email field below the text field
    let field = store.active_form().unwrap().field(&email).unwrap().clone();
    let decision = store.handle_drop(
        &DropZone::Form {
            form_id: form_id.clone(),
            index: 2,
        },
        DragItem::Field { field, origin: Some(0) },
    );
    assert!(decision.is_effective());
    assert_eq!(store.active_form().unwrap().fields[1].id, email);

    assert!(store.remove_field(&form_id, &email));
    assert!(store.remove_form(&form_id));
    assert!(store.active_form().is_none());
    assert!(!store.select_form(&form_id));
}

#[test]
fn test_update_form_without_active_form() {
    let mut store = PageStore::default();
    assert!(!store.update_form(&FormPatch::default()));
}

#[test]
fn test_undo_redo_and_batches() {
    let mut store = PageStore::default();
    store.add_block(BlockType::Text, None, None).unwrap();
    store.add_block(BlockType::Image, None, None).unwrap();

    assert!(store.undo());
    assert_eq!(store.blocks().len(), 1);
    assert!(store.redo());
    assert_eq!(store.blocks().len(), 2);
    assert!(!store.redo());

    store.batch("add pair", |s| {
        s.add_block(BlockType::Divider, None, None);
        s.add_block(BlockType::Divider, None, None);
    });
    assert_eq!(store.blocks().len(), 4);
    assert_eq!(store.history().undo_description(), Some("add pair"));

    assert!(store.undo());
    assert_eq!(store.blocks().len(), 2);
}

#[test]
fn test_undo_drops_selection_of_vanished_block() {
    let mut store = PageStore::default();
    let id = store.add_block(BlockType::Text, None, None).unwrap();
    store.select_block(Some(&id));

    store.undo();

    assert!(store.blocks().is_empty());
    assert_eq!(store.selected_block_id(), None);
}

#[test]
fn test_resolved_style_follows_breakpoint() {
    let mut store = PageStore::default();
    let styles = BlockStyles {
        typography: Some(Responsive::responsive([
            (
                Breakpoint::Default,
                TypographyStyle {
                    font_size: Some("16px".into()),
                    color: Some("#111".into()),
                    ..Default::default()
                },
            ),
            (
                Breakpoint::Md,
                TypographyStyle {
                    font_size: Some("14px".into()),
                    ..Default::default()
                },
            ),
        ])),
        ..Default::default()
    };
    let id = store
        .add_block(BlockType::Paragraph, Some(&BlockPatch::styles(styles)), None)
        .unwrap();

    let mut rx = store.subscribe();
    assert_eq!(store.resolved_style(&id).unwrap().get("font-size"), Some("16px"));

    store.set_breakpoint(Breakpoint::Xs);
    let resolved = store.resolved_style(&id).unwrap();
    assert_eq!(resolved.get("font-size"), Some("14px"));
    assert_eq!(resolved.get("color"), Some("#111"));
    assert_eq!(resolved.get("line-height"), None);

    assert_eq!(
        drain(&mut rx),
        vec![StoreEvent::BreakpointChanged {
            breakpoint: Breakpoint::Xs
        }]
    );
    assert!(store.stylesheet().contains("@media (max-width: 1024px)"));
}

fn typography_patch(style: TypographyStyle) -> BlockPatch {
    BlockPatch::styles(BlockStyles {
        typography: Some(Responsive::fixed(style)),
        ..Default::default()
    })
}

#[test]
fn test_style_edits_one_property_at_a_time() {
    let mut store = PageStore::default();
    let id = store.add_block(BlockType::Text, None, None).unwrap();

    assert!(store.update_block(
        &typography_patch(TypographyStyle {
            color: Some("red".into()),
            ..Default::default()
        }),
        &id
    ));
    assert!(store.update_block(
        &typography_patch(TypographyStyle {
            font_size: Some("20px".into()),
            ..Default::default()
        }),
        &id
    ));

    let style = store.resolved_style(&id).unwrap();
    assert_eq!(style.get("color"), Some("red"));
    assert_eq!(style.get("font-size"), Some("20px"));

    // Each edit is its own undo step
    assert!(store.undo());
    assert_eq!(store.resolved_style(&id).unwrap().get("font-size"), None);
    assert_eq!(store.resolved_style(&id).unwrap().get("color"), Some("red"));
}

#[test]
fn test_form_block_fields_must_be_unique() {
    let mut store = PageStore::default();
    let id = store.add_block(BlockType::Form, None, None).unwrap();
    let fields_before = store.block(&id).unwrap().fields.clone();
    let version = store.version();
    let mut rx = store.subscribe();

    let duplicated = BlockPatch {
        fields: Some(vec![
            FormFieldConfig::new("a", "email", FieldType::Email),
            FormFieldConfig::new("b", "email", FieldType::Email),
        ]),
        ..Default::default()
    };
    assert!(!store.update_block(&duplicated, &id));
    assert_eq!(store.block(&id).unwrap().fields, fields_before);
    assert_eq!(store.version(), version);
    assert!(matches!(
        drain(&mut rx).as_slice(),
        [StoreEvent::Validation { message }] if message.contains("email")
    ));

    let same_id = BlockPatch {
        fields: Some(vec![
            FormFieldConfig::new("a", "email", FieldType::Email),
            FormFieldConfig::new("a", "phone", FieldType::Text),
        ]),
        ..Default::default()
    };
    assert!(matches!(
        store.try_update_block(&same_id, &id),
        Err(EditorError::Form(FormError::DuplicateFieldId(_)))
    ));

    let valid = BlockPatch {
        fields: Some(vec![
            FormFieldConfig::new("a", "email", FieldType::Email),
            FormFieldConfig::new("b", "phone", FieldType::Text),
        ]),
        ..Default::default()
    };
    assert!(store.try_update_block(&valid, &id).is_ok());
    assert_eq!(store.block(&id).unwrap().fields.len(), 2);
}

#[test]
fn test_try_update_block_reports_missing_block() {
    let mut store = PageStore::default();
    let err = store.try_update_block(&BlockPatch::content("x"), "nope").unwrap_err();
    assert!(matches!(err, EditorError::Mutation(MutationError::BlockNotFound(_))));
    assert_eq!(store.version(), 0);
}

#[test]
fn test_save_and_reload_keeps_ids() -> anyhow::Result<()> {
    let mut storage = MemoryStorage::new();
    let path = Path::new("pages/home.json");
    let options = StoreOptions {
        id_seed: "home".into(),
        ..Default::default()
    };

    let mut store = PageStore::new(options.clone());
    let container = store.add_block(BlockType::Container, None, None).unwrap();
    store.add_block(BlockType::Code, None, Some(&p("0-0"))).unwrap();
    store.save(&mut storage, path)?;
    assert!(storage.exists(path));

    let mut reloaded = PageStore::load(&storage, path, options)?;
    assert_eq!(reloaded.page(), store.page());

    // Generated ids must not collide with loaded ones
    let fresh = reloaded.add_block(BlockType::Text, None, None).unwrap();
    assert_ne!(fresh, container);
    assert_eq!(reloaded.blocks().len(), 2);
    Ok(())
}

#[test]
fn test_load_missing_page() {
    let storage = MemoryStorage::new();
    assert!(PageStore::load(&storage, Path::new("nope.json"), StoreOptions::default()).is_err());
}
