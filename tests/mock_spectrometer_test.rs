//! End-to-end exercise of the adaptor against the simulated instrument.

use ccs100::config::Settings;
use ccs100::driver::mock::MockTlccs;
use ccs100::driver::{CalibrationDataSet, NUM_PIXELS};
use ccs100::spectrometer::Ccs100;
use ccs100::CcsError;
use std::sync::Arc;
use std::time::Duration;

fn open(mock: &Arc<MockTlccs>) -> Ccs100 {
    let settings = Settings::for_serial("M00405433");
    Ccs100::open(mock.clone(), &settings).unwrap()
}

#[test]
fn test_full_acquisition_cycle() {
    let mock = Arc::new(MockTlccs::new());
    let mut spec = open(&mock);

    spec.set_integration_time(0.02).unwrap();
    assert!((spec.read_integration_time().unwrap() - 0.02).abs() <= 0.01);

    let spectrum = spec.acquire().unwrap();
    assert_eq!(spectrum.len(), NUM_PIXELS);
    assert_eq!(spectrum.wavelengths().len(), NUM_PIXELS);
    assert_eq!(spectrum.integration_time_s(), 0.02);

    // The simulated line sits at 532 nm; the peak must land there
    let (peak_nm, _) = spectrum.peak().unwrap();
    assert!((peak_nm - 532.0).abs() < 1.0);

    spec.close().unwrap();
    assert_eq!(mock.close_calls(), 1);
}

#[test]
fn test_saved_file_preserves_pairing() {
    let mock = Arc::new(MockTlccs::new());
    let mut spec = open(&mock);
    spec.set_integration_time(0.01).unwrap();
    let spectrum = spec.acquire().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spectrum.txt");
    spectrum.save_txt(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), NUM_PIXELS);

    for (line, (wavelength, intensity)) in lines.iter().zip(spectrum.samples()) {
        let (nm, counts) = line.split_once(':').unwrap();
        assert_eq!(nm, format!("{wavelength:.3}"));
        assert_eq!(counts.parse::<f64>().unwrap(), intensity);
    }
}

#[test]
fn test_unarmed_device_returns_no_data() {
    let mock = Arc::new(MockTlccs::new());
    let mut spec = open(&mock);
    mock.set_armed(false);

    match spec.acquire() {
        Err(CcsError::NotReady(status)) => {
            assert!(!status.idle_soft_trig());
            assert!(status.idle_ext_trig());
        }
        other => panic!("expected NotReady, got {other:?}"),
    }
    assert_eq!(mock.start_scan_calls(), 0);

    // Re-arming recovers without reopening
    mock.set_armed(true);
    spec.set_integration_time(0.01).unwrap();
    assert!(spec.acquire().is_ok());
}

#[test]
fn test_scan_timeout_is_bounded() {
    let mock = Arc::new(MockTlccs::new());
    let mut settings = Settings::for_serial("M00405433");
    settings.acquisition.scan_timeout_margin = Duration::from_millis(100);
    let mut spec = Ccs100::open(mock.clone(), &settings).unwrap();
    spec.set_integration_time(0.01).unwrap();
    mock.set_stuck_scan(true);

    let started = std::time::Instant::now();
    match spec.acquire() {
        Err(CcsError::ScanTimeout { waited }) => {
            assert!(waited >= Duration::from_millis(100));
        }
        other => panic!("expected ScanTimeout, got {other:?}"),
    }
    // Deadline is 2 * 0.01 s + 100 ms margin; well under a second even with slack
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_configured_integration_time_applied_at_open() {
    let mock = Arc::new(MockTlccs::new());
    let mut settings = Settings::for_serial("M00405433");
    settings.acquisition.integration_time_s = Some(0.25);
    let spec = Ccs100::open(mock.clone(), &settings).unwrap();
    assert!((spec.integration_time() - 0.25).abs() <= 0.01);
    assert_eq!(mock.set_integration_time_calls(), 1);
}

#[test]
fn test_wavelength_reload_with_user_calibration() {
    let mock = Arc::new(MockTlccs::new());
    let mut spec = open(&mock);
    spec.reload_wavelengths(CalibrationDataSet::User).unwrap();
    assert_eq!(spec.wavelengths().len(), NUM_PIXELS);
}

#[test]
fn test_out_of_range_never_reaches_driver() {
    let mock = Arc::new(MockTlccs::new());
    let mut spec = open(&mock);
    assert!(spec.set_integration_time(61.0).is_err());
    assert!(spec.set_integration_time(1e-6).is_err());
    assert_eq!(mock.set_integration_time_calls(), 0);
}
