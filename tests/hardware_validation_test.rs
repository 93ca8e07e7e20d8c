//! Hardware validation against a physical CCS100.
//!
//! Requires the TLCCS driver installed, a connected instrument, and
//! `CCS_INSTRUMENT__SERIAL_NUMBER` set. Run with:
//!
//! ```bash
//! cargo test --features tlccs_hardware,hardware_tests -- --ignored
//! ```

#![cfg(all(feature = "tlccs_hardware", feature = "hardware_tests"))]

use ccs100::config::Settings;
use ccs100::driver::tlccs::HardwareTlccs;
use ccs100::driver::NUM_PIXELS;
use ccs100::spectrometer::Ccs100;
use std::sync::Arc;

fn serial_number() -> String {
    std::env::var("CCS_INSTRUMENT__SERIAL_NUMBER")
        .expect("set CCS_INSTRUMENT__SERIAL_NUMBER to the device serial")
}

#[test]
#[ignore = "requires a connected CCS100"]
fn test_hardware_identity() {
    let settings = Settings::for_serial(&serial_number());
    let spec = Ccs100::open(Arc::new(HardwareTlccs::new()), &settings).unwrap();
    assert_eq!(spec.device_info().manufacturer, "Thorlabs");
    assert_eq!(spec.wavelengths().len(), NUM_PIXELS);
    spec.close().unwrap();
}

#[test]
#[ignore = "requires a connected CCS100"]
fn test_hardware_acquisition() {
    let settings = Settings::for_serial(&serial_number());
    let mut spec = Ccs100::open(Arc::new(HardwareTlccs::new()), &settings).unwrap();
    spec.set_integration_time(0.1).unwrap();
    let spectrum = spec.acquire().unwrap();
    assert_eq!(spectrum.len(), NUM_PIXELS);
    spec.close().unwrap();
}
