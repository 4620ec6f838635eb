// Integration tests for the composing workflow: add, connect, delete, clear, save, deploy
mod common;

use common::RecordingBackend;
use slicer::{
    Controller, Image, ImageCatalog, SlicerError,
    backend::{LinkPayload, NodePayload, SlicePayload},
    config::SlicerConfig,
    prompt::ScriptedPrompter,
};

async fn controller_with(backend: RecordingBackend) -> Controller<RecordingBackend> {
    let mut controller = Controller::new(backend, &SlicerConfig::default());
    controller.load_images().await.unwrap();
    controller
}

fn add(controller: &mut Controller<RecordingBackend>, answers: &[&str]) -> Option<String> {
    let mut prompter = ScriptedPrompter::new(answers.iter().copied());
    controller.add_vm(&mut prompter).unwrap()
}

fn select(controller: &mut Controller<RecordingBackend>, ids: &[&str]) {
    let ids: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
    controller.select(&ids);
}

#[tokio::test]
async fn test_add_vm_then_save_matches_wire_example() {
    let mut controller = controller_with(RecordingBackend::ubuntu()).await;

    let added = add(&mut controller, &["VM1", "2", "1024", "10", "1"]);
    assert_eq!(added.as_deref(), Some("VM1"));

    let node = controller.session().topology.node("VM1").unwrap();
    assert_eq!((node.cpu, node.ram_mb, node.disk_gb, node.image_id), (2, 1024, 10, 1));

    let slice_id = controller.save_slice().await.unwrap();
    assert_eq!(controller.session().slice_id(), Some(slice_id));

    let calls = controller.backend().create_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        SlicePayload {
            name: "SliceWeb".into(),
            nodes: vec![NodePayload {
                label: "VM1".into(),
                cpu: 2,
                ram: 1024,
                disk: 10,
                image_id: 1,
            }],
            links: vec![],
        }
    );
}

#[tokio::test]
async fn test_add_vm_defaults() {
    let mut controller = controller_with(RecordingBackend::ubuntu()).await;

    // Empty answers accept every default, garbage numbers fall back to them
    assert_eq!(add(&mut controller, &["", "", "", "", ""]).as_deref(), Some("VM1"));
    assert_eq!(add(&mut controller, &["", "zero", "0", "-4", "1"]).as_deref(), Some("VM2"));

    for id in ["VM1", "VM2"] {
        let node = controller.session().topology.node(id).unwrap();
        assert_eq!((node.cpu, node.ram_mb, node.disk_gb), (1, 512, 3));
    }
    assert_eq!(controller.session().suggested_name(), "VM3");
}

#[tokio::test]
async fn test_add_vm_invalid_image_choice_adds_nothing() {
    let images = vec![Image::new(1, "ubuntu"), Image::new(2, "cirros")];
    let mut controller = controller_with(RecordingBackend::with_images(images)).await;

    for choice in ["0", "3", "abc"] {
        let mut prompter = ScriptedPrompter::new(["web", "1", "512", "3", choice]);
        let err = controller.add_vm(&mut prompter).unwrap_err();
        assert!(matches!(err, SlicerError::InvalidImageChoice(_)));
    }
    assert_eq!(controller.session().topology.node_count(), 0);
    assert_eq!(controller.session().suggested_name(), "VM1");

    assert!(add(&mut controller, &["web", "1", "512", "3", "2"]).is_some());
    assert_eq!(controller.session().topology.node("web").unwrap().image_id, 2);
}

#[tokio::test]
async fn test_add_vm_requires_catalog() {
    let mut backend = RecordingBackend::ubuntu();
    backend.fail_images = true;
    let mut controller = Controller::new(backend, &SlicerConfig::default());

    assert!(controller.load_images().await.is_err());
    assert!(controller.session().catalog.is_empty());

    let mut prompter = ScriptedPrompter::new(["VM1"]);
    let err = controller.add_vm(&mut prompter).unwrap_err();
    assert!(matches!(err, SlicerError::EmptyCatalog));
    assert!(prompter.questions().is_empty(), "no prompt before the catalog check");
}

#[tokio::test]
async fn test_add_vm_cancelled_name() {
    let mut controller = controller_with(RecordingBackend::ubuntu()).await;
    let mut prompter = ScriptedPrompter::default();
    prompter.push_cancel();

    assert_eq!(controller.add_vm(&mut prompter).unwrap(), None);
    assert_eq!(controller.session().topology.node_count(), 0);
}

#[tokio::test]
async fn test_duplicate_name_overwrites() {
    let mut controller = controller_with(RecordingBackend::ubuntu()).await;
    add(&mut controller, &["db", "1", "512", "3", "1"]);
    add(&mut controller, &["db", "4", "4096", "40", "1"]);

    let topology = &controller.session().topology;
    assert_eq!(topology.node_count(), 1);
    assert_eq!(topology.node("db").unwrap().cpu, 4);
}

#[tokio::test]
async fn test_connect_requires_exactly_two() {
    let mut controller = controller_with(RecordingBackend::ubuntu()).await;
    for name in ["a", "b", "c"] {
        add(&mut controller, &[name, "", "", "", ""]);
    }

    select(&mut controller, &["a"]);
    assert!(matches!(controller.connect_vms(), Err(SlicerError::SelectionSize(1))));

    select(&mut controller, &["a", "b", "c"]);
    assert!(matches!(controller.connect_vms(), Err(SlicerError::SelectionSize(3))));
    assert_eq!(controller.session().topology.link_count(), 0);

    select(&mut controller, &["a", "c"]);
    controller.connect_vms().unwrap();
    let links = controller.session().topology.links();
    assert_eq!(links.len(), 1);
    assert_eq!((links[0].from.as_str(), links[0].to.as_str()), ("a", "c"));
}

#[tokio::test]
async fn test_select_skips_unknown() {
    let mut controller = controller_with(RecordingBackend::ubuntu()).await;
    add(&mut controller, &["a", "", "", "", ""]);

    let unknown = controller.select(&["a".to_string(), "ghost".to_string()]);
    assert_eq!(unknown, vec!["ghost".to_string()]);
    assert_eq!(controller.session().selection(), ["a"]);
}

#[tokio::test]
async fn test_delete_removes_only_selection() {
    let mut controller = controller_with(RecordingBackend::ubuntu()).await;
    for name in ["a", "b", "c"] {
        add(&mut controller, &[name, "", "", "", ""]);
    }
    select(&mut controller, &["a", "b"]);
    controller.connect_vms().unwrap();
    select(&mut controller, &["b", "c"]);
    controller.connect_vms().unwrap();

    select(&mut controller, &["a"]);
    let removed = controller.delete_vm();
    assert_eq!(removed, vec!["a".to_string()]);

    let topology = &controller.session().topology;
    let remaining: Vec<&str> = topology.nodes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(remaining, ["b", "c"]);
    assert_eq!(topology.link_count(), 1);
    assert!(controller.session().selection().is_empty());
}

#[tokio::test]
async fn test_clear_all_needs_confirmation() {
    let mut controller = controller_with(RecordingBackend::ubuntu()).await;
    add(&mut controller, &["a", "", "", "", ""]);
    add(&mut controller, &["b", "", "", "", ""]);
    select(&mut controller, &["a", "b"]);
    controller.connect_vms().unwrap();
    controller.save_slice().await.unwrap();

    let mut decline = ScriptedPrompter::new(["n"]);
    assert!(!controller.clear_all(&mut decline).unwrap());
    assert_eq!(controller.session().topology.node_count(), 2);
    assert!(controller.session().slice_id().is_some());

    let mut accept = ScriptedPrompter::new(["y"]);
    assert!(controller.clear_all(&mut accept).unwrap());
    let session = controller.session();
    assert_eq!(session.topology.node_count(), 0);
    assert_eq!(session.topology.link_count(), 0);
    assert!(session.slice_id().is_none());
    assert_eq!(session.suggested_name(), "VM1");
    assert!(!session.catalog.is_empty(), "catalog survives a clear");
}

#[tokio::test]
async fn test_save_empty_topology_makes_no_call() {
    let mut controller = controller_with(RecordingBackend::ubuntu()).await;

    let err = controller.save_slice().await.unwrap_err();
    assert!(matches!(err, SlicerError::EmptyTopology));
    assert!(controller.backend().create_calls().is_empty());
    assert!(controller.session().slice_id().is_none());
}

#[tokio::test]
async fn test_save_payload_counts_match_topology() {
    let mut controller = controller_with(RecordingBackend::ubuntu()).await;
    for name in ["a", "b", "c"] {
        add(&mut controller, &[name, "", "", "", ""]);
    }
    select(&mut controller, &["a", "b"]);
    controller.connect_vms().unwrap();
    controller.connect_vms().unwrap();

    controller.save_slice().await.unwrap();
    let calls = controller.backend().create_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].nodes.len(), 3);
    assert_eq!(calls[0].links.len(), 2);
    assert_eq!(
        calls[0].links[0],
        LinkPayload {
            from_vm: "a".into(),
            to_vm: "b".into()
        }
    );
}

#[tokio::test]
async fn test_failed_save_leaves_slice_unset() {
    let mut backend = RecordingBackend::ubuntu();
    backend.fail_create = true;
    let mut controller = controller_with(backend).await;
    add(&mut controller, &["a", "", "", "", ""]);

    let err = controller.save_slice().await.unwrap_err();
    assert!(err.is_transport());
    assert!(controller.session().slice_id().is_none());
    assert_eq!(controller.backend().create_calls().len(), 1);
}

#[tokio::test]
async fn test_deploy_before_save_makes_no_call() {
    let mut controller = controller_with(RecordingBackend::ubuntu()).await;
    add(&mut controller, &["a", "", "", "", ""]);

    let err = controller.deploy_slice().await.unwrap_err();
    assert!(matches!(err, SlicerError::NotSaved));
    assert!(controller.backend().deploy_calls().is_empty());
}

#[tokio::test]
async fn test_deploy_uses_saved_id() {
    let mut controller = controller_with(RecordingBackend::ubuntu()).await;
    add(&mut controller, &["a", "", "", "", ""]);

    let first = controller.save_slice().await.unwrap();
    let second = controller.save_slice().await.unwrap();
    assert_ne!(first, second);

    let response = controller.deploy_slice().await.unwrap();
    assert_eq!(response.slice_id, Some(second));
    assert_eq!(controller.backend().deploy_calls(), vec![second]);
}

#[tokio::test]
async fn test_failed_deploy_keeps_slice_id() {
    let mut backend = RecordingBackend::ubuntu();
    backend.fail_deploy = true;
    let mut controller = controller_with(backend).await;
    add(&mut controller, &["a", "", "", "", ""]);
    let id = controller.save_slice().await.unwrap();

    assert!(controller.deploy_slice().await.is_err());
    assert_eq!(controller.session().slice_id(), Some(id));
    assert_eq!(controller.backend().deploy_calls(), vec![id]);
}

#[tokio::test]
async fn test_catalog_reload_replaces_or_clears() {
    let two = RecordingBackend::with_images(vec![Image::new(1, "ubuntu"), Image::new(2, "cirros")]);
    let one = RecordingBackend::with_images(vec![Image::new(7, "debian")]);
    let mut failing = RecordingBackend::ubuntu();
    failing.fail_images = true;

    let mut catalog = ImageCatalog::default();
    assert_eq!(catalog.load(&two).await.unwrap(), 2);
    assert_eq!(catalog.len(), 2);

    assert_eq!(catalog.load(&one).await.unwrap(), 1);
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.by_choice(1), Some(&Image::new(7, "debian")));

    assert!(catalog.load(&failing).await.is_err());
    assert_eq!(catalog.len(), 0);
    assert!(catalog.is_empty());

    for backend in [&two, &one, &failing] {
        assert_eq!(backend.image_fetch_count(), 1);
    }
}

#[tokio::test]
async fn test_disconnect_removes_links_between_pair() {
    let mut controller = controller_with(RecordingBackend::ubuntu()).await;
    for name in ["a", "b", "c"] {
        add(&mut controller, &[name, "", "", "", ""]);
    }
    select(&mut controller, &["a", "b"]);
    controller.connect_vms().unwrap();
    select(&mut controller, &["b", "a"]);
    controller.connect_vms().unwrap();
    select(&mut controller, &["b", "c"]);
    controller.connect_vms().unwrap();

    select(&mut controller, &["a"]);
    assert!(matches!(
        controller.disconnect_vms(),
        Err(SlicerError::SelectionSize(1))
    ));

    select(&mut controller, &["a", "b"]);
    assert_eq!(controller.disconnect_vms().unwrap(), 2);
    assert_eq!(controller.disconnect_vms().unwrap(), 0);

    let links = controller.session().topology.links();
    assert_eq!(links.len(), 1);
    assert_eq!((links[0].from.as_str(), links[0].to.as_str()), ("b", "c"));
}

#[tokio::test]
async fn test_login_asks_for_password() {
    let controller = controller_with(RecordingBackend::ubuntu()).await;
    let mut prompter = ScriptedPrompter::new(["s3cret"]);

    let response = controller.login("alice", &mut prompter).await.unwrap().unwrap();
    assert_eq!(response.access_token, "token-for-alice");
    assert_eq!(prompter.questions(), ["Password for alice"]);
    assert_eq!(
        controller.backend().login_calls(),
        vec![("alice".to_string(), "s3cret".to_string())]
    );
}

#[tokio::test]
async fn test_login_cancel_and_rejection() {
    let controller = controller_with(RecordingBackend::ubuntu()).await;

    let mut cancelled = ScriptedPrompter::default();
    assert!(controller.login("alice", &mut cancelled).await.unwrap().is_none());
    assert!(controller.backend().login_calls().is_empty());

    let mut empty = ScriptedPrompter::new([""]);
    let err = controller.login("alice", &mut empty).await.unwrap_err();
    assert!(matches!(err, SlicerError::Api { status: 401, .. }));
    assert_eq!(controller.backend().login_calls().len(), 1);
}
