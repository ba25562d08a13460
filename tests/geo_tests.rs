use gnw::{GeoCalculator, LatLng};

const SALAMIS: LatLng = LatLng::new(37.95, 23.57);

#[test]
fn destination_then_distance() {
    let calc = GeoCalculator::new(SALAMIS.lat);
    for bearing in [0.0, 45.0, 90.0, 180.0, 270.0, 315.0] {
        let p = calc.destination(SALAMIS, 2000.0, bearing);
        let d = calc.distance(SALAMIS, p);
        assert!((d - 2000.0).abs() < 1e-6, "bearing {}: {}", bearing, d);
    }
}

#[test]
fn bearing_matches_destination() {
    let calc = GeoCalculator::new(SALAMIS.lat);
    let p = calc.destination(SALAMIS, 1000.0, 45.0);
    assert!((calc.bearing(SALAMIS, p) - 45.0).abs() < 1e-9);
    let q = calc.destination(SALAMIS, 1000.0, 225.0);
    assert!((calc.bearing(SALAMIS, q) + 135.0).abs() < 1e-9);
}

#[test]
fn compass_directions() {
    let calc = GeoCalculator::new(SALAMIS.lat);
    let north = calc.destination(SALAMIS, 100.0, 0.0);
    assert!(north.lat > SALAMIS.lat);
    assert!((north.lng - SALAMIS.lng).abs() < 1e-12);
    let east = calc.destination(SALAMIS, 100.0, 90.0);
    assert!(east.lng > SALAMIS.lng);
    assert!((east.lat - SALAMIS.lat).abs() < 1e-9);
}

#[test]
fn negative_distance_goes_backwards() {
    let calc = GeoCalculator::new(SALAMIS.lat);
    let back = calc.destination(SALAMIS, -100.0, 0.0);
    assert!(back.lat < SALAMIS.lat);
    assert!((calc.distance(SALAMIS, back) - 100.0).abs() < 1e-6);
}

#[test]
fn longitude_degree_shrinks_with_latitude() {
    let equator = GeoCalculator::new(0.0);
    let north = GeoCalculator::new(60.0);
    let a = LatLng::new(0.0, 0.0);
    let b = LatLng::new(0.0, 0.01);
    let c = LatLng::new(60.0, 0.0);
    let d = LatLng::new(60.0, 0.01);
    assert!(north.distance(c, d) < equator.distance(a, b) * 0.55);
}

#[test]
fn distance_wraps_antimeridian() {
    let calc = GeoCalculator::new(0.0);
    let west = LatLng::new(0.0, 179.999);
    let east = LatLng::new(0.0, -179.999);
    assert!(calc.distance(west, east) < 300.0);
}
