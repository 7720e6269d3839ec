use super::*;
use crate::net::types::{BundleId, Media, PathId, PlaceId};

#[test]
fn bundle_payload_sends_only_name_info_image() {
    let bundle = Bundle {
        id: Some(BundleId(9)),
        name: "Fells".into(),
        info: "north".into(),
        image: "img".into(),
        paths: vec![Path::draft(BundleId(9))],
    };
    let json = serde_json::to_value(BundlePayload::from(&bundle)).unwrap();
    assert_eq!(json, serde_json::json!({ "name": "Fells", "info": "north", "image": "img" }));
}

#[test]
fn path_create_payload_omits_id() {
    let mut path = Path::draft(BundleId(7));
    path.id = Some(PathId(99));
    path.name = "Ridge Trail".into();
    path.polyline = vec![LatLng::new(1.0, 1.0), LatLng::new(2.0, 2.0), LatLng::new(3.0, 3.0)];

    let json = serde_json::to_value(PathPayload::for_create(&path)).unwrap();
    assert!(json.get("id").is_none());
    assert_eq!(json["bundleId"], 7);
    assert_eq!(json["name"], "Ridge Trail");
    assert_eq!(json["polyline"].as_array().unwrap().len(), 3);
    assert_eq!(json["polyline"][2], serde_json::json!({ "lat": 3.0, "lng": 3.0 }));
}

#[test]
fn path_update_payload_includes_id_and_exact_field_set() {
    let mut path = Path::draft(BundleId(7));
    path.id = Some(PathId(12));

    let json = serde_json::to_value(PathPayload::for_update(&path)).unwrap();
    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["bundleId", "duration", "id", "image", "info", "length", "name", "places", "polyline"]
    );
}

#[test]
fn place_payload_drops_image() {
    let mut place = Place::draft(PathId(3));
    place.id = Some(PlaceId(5));
    place.image = "not sent".into();
    place.media = vec![Media { name: "Credits".into(), ..Media::default() }];

    let json = serde_json::to_value(PlacePayload::for_update(&place)).unwrap();
    assert!(json.get("image").is_none());
    assert_eq!(json["id"], 5);
    assert_eq!(json["pathId"], 3);
    assert_eq!(json["media"][0]["name"], "Credits");

    let json = serde_json::to_value(PlacePayload::for_create(&place)).unwrap();
    assert!(json.get("id").is_none());
}

#[test]
fn login_form_clear_resets_fields() {
    let mut form = LoginForm::new("admin", "secret");
    form.clear();
    assert_eq!(form, LoginForm::default());
}

#[test]
fn place_create_payload_sends_whole_radius() {
    let text = serde_json::to_string(&PlacePayload::for_create(&Place::draft(PathId(11)))).unwrap();
    assert_eq!(
        text,
        r#"{"name":"","info":"","radius":1,"position":{"lat":0.0,"lng":0.0},"media":[],"pathId":11}"#
    );

    let mut place = Place::draft(PathId(11));
    place.radius = 2.6;
    let json = serde_json::to_value(PlacePayload::for_create(&place)).unwrap();
    assert_eq!(json["radius"], serde_json::json!(3));
}

#[test]
fn place_payload_rejects_unrepresentable_radius() {
    let mut place = Place::draft(PathId(11));
    place.radius = f64::NAN;
    assert!(serde_json::to_string(&PlacePayload::for_create(&place)).is_err());
}

#[test]
fn path_create_payload_sends_length_and_duration_as_text() {
    let text = serde_json::to_string(&PathPayload::for_create(&Path::draft(BundleId(7)))).unwrap();
    assert_eq!(
        text,
        r#"{"name":"","info":"","image":"","length":"","polyline":[],"places":[],"duration":"","bundleId":7}"#
    );

    let mut path = Path::draft(BundleId(7));
    path.length = 12.5;
    path.duration = 4.0;
    path.places = vec![Place::draft(PathId(11))];
    let json = serde_json::to_value(PathPayload::for_create(&path)).unwrap();
    assert_eq!(json["length"], "12.5");
    assert_eq!(json["duration"], "4");
    assert_eq!(json["places"][0]["radius"], serde_json::json!(1));
}
