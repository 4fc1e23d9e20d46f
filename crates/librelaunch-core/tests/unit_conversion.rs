use librelaunch_core::units::{
    convert_altitude, convert_measurement, convert_speed, Measurement, UnitError,
};

#[test]
fn test_mph_to_kmh() {
    let kmh = convert_speed(100.0, "mph").unwrap();
    assert!((kmh - 160.934).abs() < 1e-3);
}

#[test]
fn test_kmh_passes_through() {
    let kmh = convert_speed(27350.0, "km/h").unwrap(); // orbital velocity stays put
    assert_eq!(kmh, 27350.0);
}

#[test]
fn test_km_passes_through() {
    let km = convert_altitude(1.0, "km").unwrap();
    assert_eq!(km, 1.0);
}

#[test]
fn test_miles_to_km() {
    let km = convert_altitude(62.0, "mi").unwrap(); // roughly the Karman line
    assert!((km - 99.779).abs() < 1e-2);
}

#[test]
fn test_feet_to_km() {
    let km = convert_altitude(10000.0, "ft").unwrap();
    assert!((km - 3.048).abs() < 1e-6);
}

#[test]
fn test_zero_speed() {
    let kmh = convert_speed(0.0, "mph").unwrap();
    assert_eq!(kmh, 0.0);
}

#[test]
fn test_zero_altitude() {
    let km = convert_altitude(0.0, "ft").unwrap();
    assert_eq!(km, 0.0);
}

#[test]
fn test_negative_reading_converts_linearly() {
    // OCR misreads can go negative; the converter does not clamp
    let kmh = convert_speed(-10.0, "mph").unwrap();
    assert!((kmh + 16.0934).abs() < 1e-3);
}

#[test]
fn test_dispatch_by_measurement_family() {
    let speed = convert_measurement(60.0, Measurement::Speed, "mph").unwrap();
    assert!((speed - 96.5604).abs() < 1e-3);

    let altitude = convert_measurement(5280.0, Measurement::Altitude, "ft").unwrap();
    assert!((altitude - 1.609_344).abs() < 1e-3); // one statute mile of feet
}

#[test]
fn test_unknown_speed_unit_rejected() {
    let err = convert_speed(340.0, "m/s").unwrap_err();
    assert_eq!(err, UnitError::UnsupportedSpeedUnit("m/s".to_string()));
}

#[test]
fn test_unknown_altitude_unit_rejected() {
    let err = convert_altitude(100.0, "nmi").unwrap_err();
    assert_eq!(err, UnitError::UnsupportedAltitudeUnit("nmi".to_string()));
}

#[test]
fn test_dispatch_rejects_cross_family_units() {
    // feet are an altitude unit, not a speed unit
    let err = convert_measurement(100.0, Measurement::Speed, "ft").unwrap_err();
    assert_eq!(err, UnitError::UnsupportedSpeedUnit("ft".to_string()));
}

#[test]
fn test_canonical_unit_names() {
    assert_eq!(Measurement::Speed.canonical_unit(), "km/h");
    assert_eq!(Measurement::Altitude.canonical_unit(), "km");
}
