//! Cycle de vie du capteur, lectures directes et filtrées

use std::time::Duration;

use crate::common::{fast_config, wait_for_measurements, MockBus};
use ist8310::{Config, DeviceConfig, Error, Ist8310};
use nalgebra::Vector3;

fn assert_close(actual: f32, expected: f32) {
    assert!((actual - expected).abs() < 1e-3, "expected {}, got {}", expected, actual);
}

#[test]
fn test_init_fails_when_reset_times_out() {
    let bus = MockBus::new();
    bus.set_who_am_i(0x00);

    let err = Ist8310::new(bus.clone(), fast_config(true)).err().expect("init should fail");
    assert!(matches!(err, Error::Timeout(10)));

    // Aucun thread de filtrage n'a été démarré
    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(bus.measurements(), 0);
}

#[test]
fn test_init_without_filter_has_no_thread() {
    let bus = MockBus::new();
    let mag = Ist8310::new(bus.clone(), fast_config(false)).unwrap_or_else(|e| panic!("{}", e));

    assert!(!mag.is_filtering());
    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(bus.measurements(), 0);
}

#[test]
fn test_direct_read_returns_raw_sample() {
    let bus = MockBus::new();
    bus.set_data(1, 2, 3);
    let mag = Ist8310::new(bus.clone(), fast_config(false)).unwrap_or_else(|e| panic!("{}", e));

    assert_eq!(mag.read_vector().unwrap(), Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(bus.measurements(), 1);
}

#[test]
fn test_flip_swaps_x_and_y() {
    let bus = MockBus::new();
    bus.set_data(1, 2, 3);
    let mag = Ist8310::new(bus, fast_config(false)).unwrap_or_else(|e| panic!("{}", e));

    mag.set_flip_xy(true);
    assert_eq!(mag.read_vector().unwrap(), Vector3::new(2.0, 1.0, 3.0));

    mag.set_flip_xy(false);
    assert_eq!(mag.read_vector().unwrap(), Vector3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_flip_from_config() {
    let bus = MockBus::new();
    bus.set_data(1, 2, 3);
    let config = Config { flip_xy: true, ..fast_config(false) };
    let mag = Ist8310::new(bus, config).unwrap_or_else(|e| panic!("{}", e));

    assert_eq!(mag.read_vector().unwrap(), Vector3::new(2.0, 1.0, 3.0));
}

#[test]
fn test_setters_update_config() {
    let mag = Ist8310::new(MockBus::new(), fast_config(false)).unwrap_or_else(|e| panic!("{}", e));
    assert_eq!(mag.config(), DeviceConfig::default());

    mag.set_flip_xy(true);
    // Pas de validation de la plage
    mag.set_declination(42.0);
    assert_eq!(mag.config(), DeviceConfig { flip_xy: true, mag_decl: 42.0 });
}

#[test]
fn test_direct_read_failure_is_surfaced() {
    let bus = MockBus::new();
    let mag = Ist8310::new(bus.clone(), fast_config(false)).unwrap_or_else(|e| panic!("{}", e));

    bus.set_fail_data_reads(true);
    assert!(matches!(mag.read_vector(), Err(Error::Transport(_))));
    assert!(matches!(mag.try_read_heading(), Err(Error::Transport(_))));

    // Valeur sentinelle
    assert_eq!(mag.read_heading(), 0.0);

    // Le verrou a bien été relâché sur le chemin d'erreur
    bus.set_fail_data_reads(false);
    assert!(mag.read_vector().is_ok());
}

#[test]
fn test_heading_from_device() {
    let bus = MockBus::new();
    let mag = Ist8310::new(bus.clone(), fast_config(false)).unwrap_or_else(|e| panic!("{}", e));

    bus.set_data(0, 100, 0);
    assert_close(mag.read_heading(), 0.0);

    bus.set_data(100, 0, 0);
    assert_close(mag.read_heading(), 270.0);

    mag.set_declination(std::f32::consts::FRAC_PI_4);
    // -π/2 + π/4 -> 7π/4
    assert_close(mag.read_heading(), 315.0);

    bus.set_data(0, 100, 0);
    assert_close(mag.try_read_heading().unwrap(), 45.0);
}

#[test]
fn test_heading_uses_flipped_axes_once() {
    let bus = MockBus::new();
    bus.set_data(100, 0, 0);
    let mag = Ist8310::new(bus, fast_config(false)).unwrap_or_else(|e| panic!("{}", e));

    mag.set_flip_xy(true);
    // (100, 0) -> (0, 100) : nord
    let (field, heading) = mag.read_vector_and_heading().unwrap();
    assert_eq!(field, Vector3::new(0.0, 100.0, 0.0));
    assert_close(heading, 0.0);
}

#[test]
fn test_filter_averages_background_samples() {
    let bus = MockBus::new();
    bus.set_sequence(vec![[2, 4, 6], [4, 8, 12]]);
    let mag = Ist8310::new(bus.clone(), fast_config(true)).unwrap_or_else(|e| panic!("{}", e));
    assert!(mag.is_filtering());

    wait_for_measurements(&bus, 12);

    // Buffer plein : 5 échantillons de chaque
    assert_eq!(mag.read_vector().unwrap(), Vector3::new(3.0, 6.0, 9.0));
}

#[test]
fn test_filter_skips_failed_cycles() {
    let bus = MockBus::new();
    bus.set_data(50, -50, 10);
    bus.fail_next_data_reads(5);
    let mag = Ist8310::new(bus.clone(), fast_config(true)).unwrap_or_else(|e| panic!("{}", e));

    wait_for_measurements(&bus, 8);

    // Les cycles en échec n'ont rien poussé dans les buffers
    assert_eq!(mag.read_vector().unwrap(), Vector3::new(50.0, -50.0, 10.0));
}

#[test]
fn test_filter_empty_reads_zero() {
    let bus = MockBus::new();
    bus.set_data(50, 50, 50);
    bus.set_fail_data_reads(true);
    let mag = Ist8310::new(bus.clone(), fast_config(true)).unwrap_or_else(|e| panic!("{}", e));

    wait_for_measurements(&bus, 3);

    assert_eq!(mag.read_vector().unwrap(), Vector3::zeros());
    assert_eq!(mag.read_heading(), 0.0);
}

#[test]
fn test_filter_applies_flip() {
    let bus = MockBus::new();
    bus.set_data(1, 2, 3);
    let mag = Ist8310::new(bus.clone(), fast_config(true)).unwrap_or_else(|e| panic!("{}", e));
    wait_for_measurements(&bus, 2);

    mag.set_flip_xy(true);
    assert_eq!(mag.read_vector().unwrap(), Vector3::new(2.0, 1.0, 3.0));
}

#[test]
fn test_filter_snapshot_is_atomic_across_axes() {
    let bus = MockBus::new();
    // x = y = z à chaque mesure : une moyenne cohérente donne trois axes égaux
    bus.set_sequence((1..=37).map(|k| [k * 10, k * 10, k * 10]).collect());
    let config = Config { sample_period: Duration::from_micros(50), ..fast_config(true) };
    let mag = Ist8310::new(bus.clone(), config).unwrap_or_else(|e| panic!("{}", e));

    wait_for_measurements(&bus, 1);

    for _ in 0..500 {
        let v = mag.read_vector().unwrap();
        assert_eq!(v.x, v.y, "torn snapshot: {:?}", v);
        assert_eq!(v.y, v.z, "torn snapshot: {:?}", v);
    }
}

#[test]
fn test_deinit_stops_background_thread() {
    let bus = MockBus::new();
    let mag = Ist8310::new(bus.clone(), fast_config(true)).unwrap_or_else(|e| panic!("{}", e));
    wait_for_measurements(&bus, 2);

    mag.deinit();

    let measurements = bus.measurements();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(bus.measurements(), measurements);
}

#[test]
fn test_drop_stops_background_thread() {
    let bus = MockBus::new();
    {
        let _mag = Ist8310::new(bus.clone(), fast_config(true)).unwrap_or_else(|e| panic!("{}", e));
        wait_for_measurements(&bus, 2);
    }

    let measurements = bus.measurements();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(bus.measurements(), measurements);
}
