// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Group drag with node tracking, end to end.
//!
//! This example shows how to:
//! - wrap selected nodes in an explicit group,
//! - drag the group and watch its members follow,
//! - move a member from the host side and see the group re-fit,
//! - delete the members and see the group remove itself,
//! - snapshot the canvas to JSON.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p trellis_demos --example group_drag`

use kurbo::{Point, Rect, Vec2};
use trellis_annotation::{Annotation, AnnotationId, GroupBehavior, Marker, MarkerType, NodeId, StickyNote};
use trellis_canvas::{Canvas, ChangeFlags, MemoryNodeStore, NodeStore};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut store = MemoryNodeStore::new();
    store.insert("load", Rect::new(0.0, 0.0, 100.0, 50.0));
    store.insert("filter", Rect::new(200.0, 100.0, 300.0, 150.0));
    store.insert("export", Rect::new(500.0, 40.0, 600.0, 90.0));
    store.take_events();

    let mut canvas = Canvas::default();
    canvas.add(Annotation::new(
        "note",
        Point::new(520.0, 200.0),
        StickyNote::new("Export runs nightly", StickyNote::DEFAULT_SIZE),
    ));
    canvas.add(Annotation::new(
        "risk",
        Point::new(610.0, 30.0),
        Marker::new(MarkerType::Risk).with_label("slow"),
    ));

    canvas.select_nodes([NodeId::from("load"), NodeId::from("filter")]);
    canvas.group_selected_nodes("inputs", "Inputs", GroupBehavior::Explicit, &store);
    let inputs = AnnotationId::from("inputs");
    let watch = canvas.subscribe(&inputs);
    report(&canvas, &inputs, "created");

    // Drag the (selected) group by 30 px right in three steps.
    canvas.start_drag(&mut store);
    for _ in 0..3 {
        canvas.update_drag(Vec2::new(10.0, 0.0), &mut store);
    }
    canvas.end_drag(&mut store);
    report(&canvas, &inputs, "dragged");
    println!(
        "  load is now at {:?}",
        store.intended_rect(&NodeId::from("load"))
    );

    // A host-side move re-fits the group.
    store.set_rect(&NodeId::from("filter"), Rect::new(230.0, 300.0, 330.0, 350.0));
    canvas.pump_node_events(&mut store);
    report(&canvas, &inputs, "member moved");

    let changes = canvas.take_changes(watch);
    println!(
        "changes seen: position={} size={} selection={}",
        changes.contains(ChangeFlags::POSITION),
        changes.contains(ChangeFlags::SIZE),
        changes.contains(ChangeFlags::SELECTION),
    );

    // Hit testing: the note sits above the group layer.
    let hit = canvas.annotation_at(Point::new(540.0, 220.0));
    println!("hit at (540, 220): {hit:?}");

    // Deleting every member removes the explicit group.
    store.remove(&NodeId::from("load"));
    store.remove(&NodeId::from("filter"));
    canvas.pump_node_events(&mut store);
    println!("inputs still present: {}", canvas.contains(&inputs));

    match serde_json::to_string_pretty(&canvas.to_json()) {
        Ok(text) => println!("snapshot:\n{text}"),
        Err(err) => eprintln!("snapshot failed: {err}"),
    }
}

fn report(canvas: &Canvas, id: &AnnotationId, label: &str) {
    if let Some(a) = canvas.get(id) {
        println!(
            "{label}: {} at {:?} size {:?}",
            a.id(),
            a.position(),
            a.size()
        );
    }
}
