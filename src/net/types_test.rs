use super::*;

// =============================================================
// Bundle tree decoding
// =============================================================

#[test]
fn bundle_tree_decodes_nested_paths_and_places() {
    let json = serde_json::json!({
        "id": 7,
        "name": "Fells",
        "info": "Northern fells",
        "image": "http://img/fells.png",
        "paths": [{
            "id": 11,
            "name": "Ridge Trail",
            "info": "",
            "image": "",
            "length": "12.5",
            "duration": "4",
            "polyline": [{ "lat": 1.0, "lng": 1.0 }, { "lat": 2.0, "lng": 2.0 }],
            "places": [{
                "id": 21,
                "name": "Summit",
                "info": "Cairn",
                "radius": 3,
                "position": { "lat": 2.0, "lng": 2.0 },
                "media": [{ "id": 1, "name": "Credits", "contents": "Anon", "type": "text", "image": "" }],
                "pathId": 11
            }],
            "bundleId": 7
        }]
    });

    let bundle: Bundle = serde_json::from_value(json).unwrap();
    assert_eq!(bundle.id, Some(BundleId(7)));
    let path = &bundle.paths[0];
    assert_eq!(path.id, Some(PathId(11)));
    assert!((path.length - 12.5).abs() < f64::EPSILON);
    assert!((path.duration - 4.0).abs() < f64::EPSILON);
    assert_eq!(path.polyline, vec![LatLng::new(1.0, 1.0), LatLng::new(2.0, 2.0)]);
    assert_eq!(path.bundle_id, Some(BundleId(7)));
    let place = &path.places[0];
    assert_eq!(place.path_id, Some(PathId(11)));
    assert_eq!(place.media[0].kind, "text");
}

#[test]
fn missing_and_null_collections_decode_empty() {
    let json = serde_json::json!({ "id": 1, "name": "Empty", "paths": null });
    let bundle: Bundle = serde_json::from_value(json).unwrap();
    assert!(bundle.paths.is_empty());
    assert!(bundle.info.is_empty());

    let json = serde_json::json!({ "id": 2, "name": "Bare path" });
    let path: Path = serde_json::from_value(json).unwrap();
    assert!(path.polyline.is_empty());
    assert!(path.places.is_empty());
}

#[test]
fn lenient_numbers_accept_empty_strings_and_numbers() {
    let path: Path = serde_json::from_value(serde_json::json!({
        "name": "p", "length": "", "duration": 2.5
    }))
    .unwrap();
    assert!(path.length.abs() < f64::EPSILON);
    assert!((path.duration - 2.5).abs() < f64::EPSILON);
}

#[test]
fn lenient_numbers_reject_garbage() {
    let result = serde_json::from_value::<Path>(serde_json::json!({ "name": "p", "length": "far" }));
    assert!(result.is_err());
}

// =============================================================
// Drafts
// =============================================================

#[test]
fn place_draft_defaults() {
    let draft = Place::draft(PathId(3));
    assert!(draft.id.is_none());
    assert!((draft.radius - 1.0).abs() < f64::EPSILON);
    assert_eq!(draft.position, LatLng::new(0.0, 0.0));
    assert_eq!(draft.path_id, Some(PathId(3)));
}

#[test]
fn bundle_edit_draft_drops_paths() {
    let bundle = Bundle {
        id: Some(BundleId(4)),
        name: "B".into(),
        paths: vec![Path::draft(BundleId(4))],
        ..Bundle::default()
    };
    let draft = bundle.edit_draft();
    assert_eq!(draft.id, Some(BundleId(4)));
    assert_eq!(draft.name, "B");
    assert!(draft.paths.is_empty());
}

#[test]
fn path_apply_update_keeps_identity_and_places() {
    let mut path = Path {
        id: Some(PathId(1)),
        name: "old".into(),
        places: vec![Place::draft(PathId(1))],
        ..Path::default()
    };
    let updated = Path {
        id: Some(PathId(1)),
        name: "new".into(),
        polyline: vec![LatLng::new(5.0, 6.0)],
        length: 3.0,
        ..Path::default()
    };
    path.apply_update(&updated);
    assert_eq!(path.name, "new");
    assert_eq!(path.polyline, vec![LatLng::new(5.0, 6.0)]);
    assert_eq!(path.places.len(), 1);
}

#[test]
fn entity_id_displays_inner_value() {
    assert_eq!(BundleId(42).to_string(), "42");
}
