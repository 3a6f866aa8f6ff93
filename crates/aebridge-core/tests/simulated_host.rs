//! End-to-end tests against the simulated host over HTTP

use std::{collections::HashSet, sync::Arc};

use aebridge_core::{
    AvItemLike, BridgeConfig, BridgeError, File, Guide, Item, ItemLike, Layer, LayerLike,
    PropertyLike, Remote, Session, Value,
};
use aebridge_host::{spawn_ephemeral, RunningHost};
use pretty_assertions::assert_eq;

fn connect() -> (RunningHost, Arc<Session>) {
    let host = spawn_ephemeral().unwrap();
    let session = Session::connect(BridgeConfig::new("127.0.0.1", host.port())).unwrap();
    (host, session)
}

#[test]
fn test_connect_fails_without_host() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let err = Session::connect(BridgeConfig::new("127.0.0.1", port)).unwrap_err();
    assert!(matches!(err, BridgeError::TransportUnavailable { .. }), "{err}");
    assert!(err.to_string().contains("Please ensure After Effects is running"));
}

#[test]
fn test_open_project_and_walk_items() {
    let (_host, session) = connect();
    let app = session.application().unwrap();
    assert_eq!(app.version().unwrap(), "24.0.0");

    let project = app
        .open(Some("/projects/demo.aep"), None)
        .unwrap()
        .expect("project opened");
    assert_eq!(project.num_items().unwrap(), 4);

    let comps = project.compositions().unwrap();
    assert_eq!(comps.len(), 1);
    let Item::Comp(main) = &comps[0] else {
        panic!("expected a composition, got {:?}", comps[0]);
    };
    assert_eq!(main.name().unwrap(), "Main");
    assert_eq!(main.num_layers().unwrap(), 3);

    let folders = project.folders().unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].name().unwrap(), "Footage");

    assert!(project.item_by_name("Black Solid 1").unwrap().is_some());
    assert!(project.item_by_name("Nope").unwrap().is_none());
}

#[test]
fn test_reads_are_idempotent_and_ids_unique() {
    let (_host, session) = connect();
    let app = session.application().unwrap();
    let projects = (0..20)
        .map(|_| app.project().unwrap())
        .collect::<Vec<_>>();

    let ids = projects.iter().map(|p| p.id().clone()).collect::<HashSet<_>>();
    assert_eq!(ids.len(), 20);

    let first = &projects[0];
    for other in &projects[1..] {
        assert!(session.same_object(first, other).unwrap());
    }
    assert_eq!(first.num_items().unwrap(), projects[19].num_items().unwrap());
}

#[test]
fn test_host_errors_surface_as_errors() {
    let (_host, session) = connect();
    let err = session.evaluate("app.foo();").unwrap_err();
    match err {
        BridgeError::HostEvaluation { message, name, .. } => {
            assert!(message.contains("foo"), "{message}");
            assert_eq!(name.as_deref(), Some("TypeError"));
        }
        other => panic!("expected a host error, got {other:?}"),
    }

    // The session stays usable
    assert_eq!(session.evaluate("app.version;").unwrap(), Value::String("24.0.0".into()));
}

#[test]
fn test_string_escaping_survives_the_round_trip() {
    let (_host, session) = connect();
    let tricky = "C:\\renders\\say \"hi\"\nnext line";
    let file = File::from_path(&session, tricky).unwrap();
    assert_eq!(file.fs_name().unwrap(), tricky);
}

#[test]
fn test_layers_and_selection() {
    let (_host, session) = connect();
    let project = session
        .application()
        .unwrap()
        .open(Some("/projects/demo.aep"), None)
        .unwrap()
        .unwrap();
    let Item::Comp(main) = project.compositions().unwrap().remove(0) else {
        panic!("expected a composition");
    };

    let title = main.layer_by_name("Title").unwrap().expect("title layer");
    assert!(matches!(title, Layer::Text(_)));

    let solid = main
        .layers()
        .unwrap()
        .add_solid([1.0, 0.0, 0.0], "Red", 640, 360, 1.0)
        .unwrap();
    assert_eq!(main.num_layers().unwrap(), 4);
    assert_eq!(solid.index().unwrap(), 1);

    solid.set_selected(true).unwrap();
    let selected = main.selected_layers().unwrap();
    assert_eq!(selected.len(), 1);
    assert!(session.same_object(&selected[0], &solid).unwrap());
    assert!(solid.has_video().unwrap());
}

#[test]
fn test_validation_happens_before_the_host_is_touched() {
    let (_host, session) = connect();
    let project = session
        .application()
        .unwrap()
        .open(Some("/projects/demo.aep"), None)
        .unwrap()
        .unwrap();
    let Item::Comp(main) = project.compositions().unwrap().remove(0) else {
        panic!("expected a composition");
    };

    let err = main
        .layers()
        .unwrap()
        .add_solid([2.0, 0.0, 0.0], "Too Red", 640, 360, 1.0)
        .unwrap_err();
    assert!(matches!(err, BridgeError::DomainValidation(_)), "{err}");
    assert_eq!(main.num_layers().unwrap(), 3);

    let err = project.set_bits_per_channel(12).unwrap_err();
    assert!(matches!(err, BridgeError::DomainValidation(_)), "{err}");
    assert_eq!(project.bits_per_channel().unwrap(), 8);
}

#[test]
fn test_guides_markers_and_time_formats() {
    let (_host, session) = connect();
    let project = session
        .application()
        .unwrap()
        .open(Some("/projects/demo.aep"), None)
        .unwrap()
        .unwrap();
    let Item::Comp(main) = project.compositions().unwrap().remove(0) else {
        panic!("expected a composition");
    };

    assert_eq!(main.add_guide(0, 540).unwrap(), 0);
    assert_eq!(main.add_guide(1, 960).unwrap(), 1);
    main.set_guide(100, 1).unwrap();
    assert!(matches!(
        main.remove_guide(2),
        Err(BridgeError::IndexOutOfRange { .. })
    ));
    main.remove_guide(0).unwrap();
    assert_eq!(
        main.guides().unwrap(),
        vec![Guide {
            orientation: 1,
            position_type: 0,
            position: 100.0,
        }]
    );

    let marker = main.marker_property().unwrap();
    assert_eq!(marker.match_name().unwrap(), "ADBE Marker");

    let viewer = main.open_in_viewer().unwrap().expect("viewer opened");
    assert!(!viewer.maximized().unwrap());
    viewer.set_maximized(true).unwrap();
    assert!(viewer.maximized().unwrap());

    assert_eq!(main.duration_in_current_format().unwrap(), "0:00:10:00");
    main.set_work_area_start_in_current_format("0:00:02:12").unwrap();
    assert_eq!(main.work_area_start().unwrap(), 2.5);
    assert_eq!(main.work_area_start_in_current_format().unwrap(), "0:00:02:12");

    let placeholder = project
        .import_placeholder("Missing", 1920, 1080, 24.0, "0:00:03:00")
        .unwrap()
        .expect("placeholder imported");
    assert_eq!(placeholder.duration().unwrap(), 3.0);
}

#[test]
fn test_project_tool_and_dialogs() {
    let (_host, session) = connect();
    let project = session.application().unwrap().project().unwrap();

    assert_eq!(project.tool_type().unwrap(), "Selection");
    project.set_tool_type("hand").unwrap();
    assert_eq!(project.tool_type().unwrap(), "Hand");

    assert!(project.compensate_for_scene_referred_profiles().unwrap());
    project.set_compensate_for_scene_referred_profiles(false).unwrap();
    assert!(!project.compensate_for_scene_referred_profiles().unwrap());

    assert!(!project.save_with_dialog().unwrap());
    assert!(project.import_file_with_dialog().unwrap().is_empty());
}
