use goalboard_core::{
    AnchorRole, BoardConfig, BoardSession, CardId, DropTarget, Measurements, Rect,
};

fn board_with_child() -> (BoardSession, CardId, CardId) {
    let mut session = BoardSession::with_sample_card(BoardConfig::default());
    let parent = CardId::new("1");
    let child = session.add_sub_card(&parent).unwrap();
    (session, parent, child)
}

#[test]
fn connector_is_omitted_while_child_is_unmeasured() {
    let (mut session, parent, child) = board_with_child();
    let ticket = session.mark_dirty();

    let measurements = Measurements::new(Rect::new(0.0, 0.0, 1200.0, 800.0))
        .with_card(parent.clone(), Rect::new(32.0, 100.0, 288.0, 120.0))
        .with_card(child, Rect::new(352.0, 100.0, 0.0, 0.0));

    assert!(session.recompute_geometry(ticket, &measurements));
    assert!(session.connectors().is_empty());
}

#[test]
fn measured_edge_produces_anchors_and_path() {
    let (mut session, parent, child) = board_with_child();
    let ticket = session.mark_dirty();

    let measurements = Measurements::new(Rect::new(10.0, 10.0, 1200.0, 800.0))
        .with_card(parent.clone(), Rect::new(10.0, 110.0, 300.0, 100.0))
        .with_card(child.clone(), Rect::new(410.0, 210.0, 300.0, 100.0));

    assert!(session.recompute_geometry(ticket, &measurements));
    let connectors = session.connectors();
    assert_eq!(connectors.len(), 1);

    let connector = &connectors[0];
    assert_eq!(connector.id, format!("{parent}-{child}"));
    assert_eq!(connector.source.card_id, parent);
    assert_eq!(connector.source.role, AnchorRole::Source);
    assert_eq!(connector.target.card_id, child);
    assert_eq!(connector.target.role, AnchorRole::Target);
    assert_eq!((connector.source.point.x, connector.source.point.y), (292.0, 150.0));
    assert_eq!((connector.target.point.x, connector.target.point.y), (408.0, 250.0));
    assert_eq!(connector.path, "M 292 150 C 350 150, 350 250, 408 250");
}

#[test]
fn edges_of_collapsed_parents_still_get_connectors() {
    let (mut session, parent, child) = board_with_child();
    session.toggle_expansion(&parent);
    let ticket = session.mark_dirty();

    let measurements = Measurements::new(Rect::default())
        .with_card(parent, Rect::new(0.0, 0.0, 100.0, 50.0))
        .with_card(child, Rect::new(200.0, 0.0, 100.0, 50.0));

    assert!(session.recompute_geometry(ticket, &measurements));
    assert_eq!(session.connectors().len(), 1);
}

#[test]
fn remeasure_scheduled_before_a_drag_is_superseded() {
    let (mut session, parent, child) = board_with_child();
    let second = session.add_sub_card(&parent).unwrap();
    let stale = session.mark_dirty();

    session.drag_start(1, 1);
    session.drag_end(Some(DropTarget::new(1, 0)));
    let latest = session.pending_remeasure().expect("drag should mark layout dirty");
    assert_ne!(stale, latest);

    let measurements = Measurements::new(Rect::default())
        .with_card(parent, Rect::new(0.0, 0.0, 100.0, 50.0))
        .with_card(child, Rect::new(200.0, 0.0, 100.0, 50.0))
        .with_card(second, Rect::new(200.0, 80.0, 100.0, 50.0));

    assert!(!session.recompute_geometry(stale, &measurements));
    assert!(session.connectors().is_empty());
    assert!(session.recompute_geometry(latest, &measurements));
    assert_eq!(session.connectors().len(), 2);
}
