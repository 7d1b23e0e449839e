//! End-to-end scenarios driven through the public `EngineHandle` boundary,
//! the same surface a window-management host embeds this crate behind.
//!
//! Complements the resolver- and model-level unit tests colocated with
//! their implementation: these exercise a full drag → preview → commit
//! cycle (or a client-request round trip) through the actor's message
//! loop, the way a real host would.

use std::time::Duration;

use snaptile::engine::adapter::NullAdapter;
use snaptile::engine::client::TabGroupSummary;
use snaptile::engine::geometry::{Point, Rect};
use snaptile::engine::tab_group::TabStripLayout;
use snaptile::engine::window::{TransformKind, WindowId, WindowState};
use snaptile::{ClientEvent, ClientRequest, ClientResponse, EngineHandle, LayoutEngine};

fn rect(x: f64, y: f64, hx: f64, hy: f64) -> Rect { Rect::new(Point::new(x, y), Point::new(hx, hy)) }

async fn spawn() -> (EngineHandle, tokio::sync::broadcast::Receiver<ClientEvent>) {
    LayoutEngine::spawn(Box::new(NullAdapter::new()))
}

fn create_window(handle: &EngineHandle, id: &WindowId, r: Rect) {
    handle
        .send(snaptile::engine::actor::EngineMessage::WindowCreated { id: id.clone(), state: WindowState::new(r) })
        .unwrap();
}

/// S4: dragging a standalone window onto an existing tab group's active
/// body merges it in after the active tab, leaving the active tab
/// unchanged.
#[tokio::test]
async fn s4_tab_on_drop_joins_after_active_tab() {
    let (handle, mut events) = spawn().await;

    let strip = WindowId::new("app", "strip");
    let x = WindowId::new("app", "x");
    let y = WindowId::new("app", "y");
    let z = WindowId::new("app", "z");

    create_window(&handle, &strip, rect(0.0, -20.0, 100.0, 16.0));
    create_window(&handle, &x, rect(0.0, 50.0, 100.0, 50.0));
    create_window(&handle, &y, rect(0.0, 50.0, 100.0, 50.0));
    create_window(&handle, &z, rect(300.0, 300.0, 50.0, 50.0));

    let response = handle
        .query(ClientRequest::CreateTabGroup {
            ids: vec![strip.clone(), x.clone(), y.clone()],
            layout: TabStripLayout::default(),
        })
        .await
        .unwrap();
    let group_id = match response {
        ClientResponse::TabGroupCreated(id) => id,
        other => panic!("expected TabGroupCreated, got {other:?}"),
    };

    // Drag z over x's body (the active tab) and release.
    handle
        .send(snaptile::engine::actor::EngineMessage::WindowTransform {
            id: z.clone(),
            rect: rect(0.0, 50.0, 50.0, 50.0),
            kind: TransformKind::MOVE,
            cursor: Point::new(0.0, 50.0),
        })
        .unwrap();
    handle.send(snaptile::engine::actor::EngineMessage::WindowCommit { id: z.clone() }).unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;

    let response = handle.query(ClientRequest::GetTabs).await.unwrap();
    let ClientResponse::Tabs(tabs) = response else { panic!("expected Tabs response") };
    let group: &TabGroupSummary = tabs.iter().find(|g| g.id == group_id).expect("tab group still exists");
    // A drop lands right after the active tab; the active tab is unaffected.
    assert_eq!(group.tabs, vec![x.clone(), z.clone(), y.clone()]);
    assert_eq!(group.active_tab, x);

    let mut saw_join = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, ClientEvent::JoinTabGroup { group, window } if group == group_id && window == z) {
            saw_join = true;
        }
    }
    assert!(saw_join, "expected a JoinTabGroup client event for the dropped window");
}

/// S5: removing a tab group's active tab when only two tabs remain
/// collapses the group; the survivor becomes a standalone window again.
#[tokio::test]
async fn s5_removing_a_tab_collapses_a_two_tab_group() {
    let (handle, _events) = spawn().await;

    let strip = WindowId::new("app", "strip");
    let a = WindowId::new("app", "a");
    let b = WindowId::new("app", "b");

    create_window(&handle, &strip, rect(0.0, -20.0, 100.0, 16.0));
    create_window(&handle, &a, rect(0.0, 50.0, 100.0, 50.0));
    create_window(&handle, &b, rect(0.0, 50.0, 100.0, 50.0));

    handle
        .query(ClientRequest::CreateTabGroup { ids: vec![strip, a.clone(), b.clone()], layout: TabStripLayout::default() })
        .await
        .unwrap();

    let response = handle.query(ClientRequest::RemoveTab(a)).await.unwrap();
    assert!(matches!(response, ClientResponse::Ok));

    let response = handle.query(ClientRequest::GetTabs).await.unwrap();
    let ClientResponse::Tabs(tabs) = response else { panic!("expected Tabs response") };
    assert!(tabs.is_empty(), "a group with one remaining tab must be torn down");
}

/// S6: saving two tab groups and restoring them into a fresh set of
/// windows with the same ids reconstructs identical membership and
/// active tabs.
#[tokio::test]
async fn s6_save_and_restore_round_trips_through_the_client_api() {
    let (handle, _events) = spawn().await;

    let strip1 = WindowId::new("app", "strip1");
    let a = WindowId::new("app", "a");
    let b = WindowId::new("app", "b");
    create_window(&handle, &strip1, rect(0.0, -20.0, 100.0, 16.0));
    create_window(&handle, &a, rect(0.0, 50.0, 100.0, 50.0));
    create_window(&handle, &b, rect(0.0, 50.0, 100.0, 50.0));
    handle
        .query(ClientRequest::CreateTabGroup { ids: vec![strip1, a.clone(), b.clone()], layout: TabStripLayout::default() })
        .await
        .unwrap();

    let response = handle.query(ClientRequest::GetSaveInfo).await.unwrap();
    let ClientResponse::SaveInfo(blobs) = response else { panic!("expected SaveInfo response") };
    assert_eq!(blobs.len(), 1);

    // Tear the group down so restore has to rebuild it from scratch.
    handle.query(ClientRequest::RemoveTab(a.clone())).await.unwrap();
    let torn_down = handle.query(ClientRequest::GetTabs).await.unwrap();
    assert!(matches!(torn_down, ClientResponse::Tabs(tabs) if tabs.is_empty()));

    let response = handle.query(ClientRequest::Restore(blobs)).await.unwrap();
    assert!(matches!(response, ClientResponse::Restored(ids) if ids.len() == 1));

    let response = handle.query(ClientRequest::GetTabs).await.unwrap();
    let ClientResponse::Tabs(tabs) = response else { panic!("expected Tabs response") };
    assert_eq!(tabs.len(), 1);
    assert_eq!(tabs[0].tabs, vec![a, b]);
}
