use super::*;

#[test]
fn no_points_no_bounds() {
    assert!(Bounds::from_points(&Vec::<LatLng>::new()).is_none());
}

#[test]
fn single_point_is_degenerate_box() {
    let p = LatLng::new(63.0, 20.0);
    let b = Bounds::from_points(&[p]).unwrap();
    assert_eq!(b.south_west, p);
    assert_eq!(b.north_east, p);
    assert_eq!(b.center(), p);
}

#[test]
fn bounds_cover_all_points() {
    let points = [LatLng::new(1.0, 5.0), LatLng::new(-2.0, 3.0), LatLng::new(4.0, -1.0)];
    let b = Bounds::from_points(&points).unwrap();
    assert_eq!(b.south_west, LatLng::new(-2.0, -1.0));
    assert_eq!(b.north_east, LatLng::new(4.0, 5.0));
    assert_eq!(b.center(), LatLng::new(1.0, 2.0));
}
