//! A mock TLCCS driver that simulates the spectrometer in memory.
//!
//! Scan timing follows the configured integration time: after `start_scan` the
//! status word reports a scan in progress until one integration period has
//! elapsed, then `scan_ready` until the data is fetched. The synthetic spectrum
//! is deterministic (no RNG) so tests can assert on it.

use crate::driver::{
    CalibrationDataSet, DeviceInfo, SpectrometerHandle, TlccsDriver, WavelengthData, NUM_PIXELS,
};
use crate::error::{CcsError, CcsResult};
use crate::status::{
    STATUS_IDLE_EXT_TRIG, STATUS_IDLE_SOFT_TRIG, STATUS_SCAN_IN_PROGRESS, STATUS_SCAN_READY,
};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

// Mirrors VISA's VI_ERROR_INV_OBJECT (0xBFFF000E).
const ERR_INVALID_HANDLE: i32 = -1_073_807_346;
// Scan data requested while no completed scan is pending.
const ERR_NO_SCAN_DATA: i32 = -1_073_807_360;

const WAVELENGTH_MIN_NM: f64 = 350.0;
const WAVELENGTH_MAX_NM: f64 = 700.0;

struct MockState {
    serial_number: String,
    integration_time_s: f64,
    scan_started_at: Option<Instant>,
}

/// In-memory stand-in for the TLCCS driver.
///
/// Call counters and fault knobs let tests observe exactly which driver entry
/// points the adaptor touched.
pub struct MockTlccs {
    instruments: Mutex<HashMap<SpectrometerHandle, MockState>>,
    next_handle: Mutex<u32>,
    /// When false the status word never reports software-trigger readiness.
    armed: AtomicBool,
    /// When true a started scan never reaches the ready state.
    stuck_scan: AtomicBool,
    /// Offset applied to integration-time readbacks, in seconds.
    readback_skew_s: Mutex<f64>,
    start_scan_calls: AtomicUsize,
    set_integration_time_calls: AtomicUsize,
    close_calls: AtomicUsize,
}

impl MockTlccs {
    /// Create a mock with an armed software trigger and no faults.
    pub fn new() -> Self {
        Self {
            instruments: Mutex::new(HashMap::new()),
            next_handle: Mutex::new(1),
            armed: AtomicBool::new(true),
            stuck_scan: AtomicBool::new(false),
            readback_skew_s: Mutex::new(0.0),
            start_scan_calls: AtomicUsize::new(0),
            set_integration_time_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
        }
    }

    /// Arm or disarm the software trigger (disarmed simulates a device waiting
    /// on its external trigger input).
    pub fn set_armed(&self, armed: bool) {
        self.armed.store(armed, Ordering::SeqCst);
    }

    /// Make every started scan hang short of the ready state.
    pub fn set_stuck_scan(&self, stuck: bool) {
        self.stuck_scan.store(stuck, Ordering::SeqCst);
    }

    /// Skew integration-time readbacks by `seconds`.
    pub fn set_readback_skew(&self, seconds: f64) {
        *self.readback_skew_s.lock().unwrap() = seconds;
    }

    /// How many times `start_scan` was invoked.
    pub fn start_scan_calls(&self) -> usize {
        self.start_scan_calls.load(Ordering::SeqCst)
    }

    /// How many times `set_integration_time` was invoked.
    pub fn set_integration_time_calls(&self) -> usize {
        self.set_integration_time_calls.load(Ordering::SeqCst)
    }

    /// How many times `close` succeeded.
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    fn with_state<T>(
        &self,
        handle: SpectrometerHandle,
        f: impl FnOnce(&mut MockState) -> CcsResult<T>,
    ) -> CcsResult<T> {
        let mut instruments = self.instruments.lock().unwrap();
        let state = instruments.get_mut(&handle).ok_or(CcsError::Driver {
            code: ERR_INVALID_HANDLE,
        })?;
        f(state)
    }

    fn wavelength_for_pixel(pixel: usize) -> f64 {
        let span = WAVELENGTH_MAX_NM - WAVELENGTH_MIN_NM;
        WAVELENGTH_MIN_NM + span * pixel as f64 / (NUM_PIXELS - 1) as f64
    }

    /// Deterministic spectrum: dark baseline plus a Gaussian line at 532 nm whose
    /// amplitude scales with the integration time.
    fn synthesize_spectrum(integration_time_s: f64) -> Vec<f64> {
        let amplitude = integration_time_s * 1.0e4;
        (0..NUM_PIXELS)
            .map(|pixel| {
                let nm = Self::wavelength_for_pixel(pixel);
                let delta = (nm - 532.0) / 12.0;
                180.0 + amplitude * (-delta * delta).exp()
            })
            .collect()
    }
}

impl Default for MockTlccs {
    fn default() -> Self {
        Self::new()
    }
}

impl TlccsDriver for MockTlccs {
    fn init(&self, resource: &str, _id_query: bool, reset: bool) -> CcsResult<SpectrometerHandle> {
        // Resource format: USB0::0x1313::0x8081::<serial>::RAW
        let serial_number = resource
            .split("::")
            .nth(3)
            .unwrap_or("UNKNOWN")
            .to_string();

        let mut next_handle = self.next_handle.lock().unwrap();
        let handle = SpectrometerHandle(*next_handle);
        *next_handle += 1;

        let state = MockState {
            serial_number: serial_number.clone(),
            integration_time_s: 0.01,
            scan_started_at: None,
        };
        self.instruments.lock().unwrap().insert(handle, state);

        info!(
            "Mock CCS100 '{}' opened with handle {:?} (reset = {})",
            serial_number, handle, reset
        );
        Ok(handle)
    }

    fn identification_query(&self, handle: SpectrometerHandle) -> CcsResult<DeviceInfo> {
        self.with_state(handle, |state| {
            Ok(DeviceInfo {
                manufacturer: "Thorlabs".to_string(),
                device_name: "CCS100".to_string(),
                serial_number: state.serial_number.clone(),
                firmware_revision: "2.0".to_string(),
                driver_revision: "mock".to_string(),
            })
        })
    }

    fn wavelength_data(
        &self,
        handle: SpectrometerHandle,
        data_set: CalibrationDataSet,
    ) -> CcsResult<WavelengthData> {
        self.with_state(handle, |_| {
            debug!("mock wavelength table requested ({:?})", data_set);
            Ok(WavelengthData {
                wavelengths: (0..NUM_PIXELS).map(Self::wavelength_for_pixel).collect(),
                min_nm: WAVELENGTH_MIN_NM,
                max_nm: WAVELENGTH_MAX_NM,
            })
        })
    }

    fn device_status(&self, handle: SpectrometerHandle) -> CcsResult<i32> {
        let stuck = self.stuck_scan.load(Ordering::SeqCst);
        let armed = self.armed.load(Ordering::SeqCst);
        self.with_state(handle, |state| {
            let word = match state.scan_started_at {
                Some(started) => {
                    let done = started.elapsed().as_secs_f64() >= state.integration_time_s;
                    if done && !stuck {
                        STATUS_SCAN_READY
                    } else {
                        STATUS_SCAN_IN_PROGRESS
                    }
                }
                None if armed => STATUS_IDLE_SOFT_TRIG | STATUS_IDLE_EXT_TRIG,
                None => STATUS_IDLE_EXT_TRIG,
            };
            Ok(word)
        })
    }

    fn start_scan(&self, handle: SpectrometerHandle) -> CcsResult<()> {
        self.start_scan_calls.fetch_add(1, Ordering::SeqCst);
        self.with_state(handle, |state| {
            state.scan_started_at = Some(Instant::now());
            Ok(())
        })
    }

    fn scan_data(&self, handle: SpectrometerHandle) -> CcsResult<Vec<f64>> {
        let stuck = self.stuck_scan.load(Ordering::SeqCst);
        self.with_state(handle, |state| {
            let ready = state
                .scan_started_at
                .map(|started| started.elapsed().as_secs_f64() >= state.integration_time_s)
                .unwrap_or(false);
            if !ready || stuck {
                return Err(CcsError::Driver {
                    code: ERR_NO_SCAN_DATA,
                });
            }
            state.scan_started_at = None;
            Ok(Self::synthesize_spectrum(state.integration_time_s))
        })
    }

    fn integration_time(&self, handle: SpectrometerHandle) -> CcsResult<f64> {
        let skew = *self.readback_skew_s.lock().unwrap();
        self.with_state(handle, |state| Ok(state.integration_time_s + skew))
    }

    fn set_integration_time(&self, handle: SpectrometerHandle, seconds: f64) -> CcsResult<()> {
        self.set_integration_time_calls.fetch_add(1, Ordering::SeqCst);
        self.with_state(handle, |state| {
            state.integration_time_s = seconds;
            Ok(())
        })
    }

    fn close(&self, handle: SpectrometerHandle) -> CcsResult<()> {
        let mut instruments = self.instruments.lock().unwrap();
        match instruments.remove(&handle) {
            Some(state) => {
                self.close_calls.fetch_add(1, Ordering::SeqCst);
                info!("Mock CCS100 '{}' closed", state.serial_number);
                Ok(())
            }
            None => Err(CcsError::Driver {
                code: ERR_INVALID_HANDLE,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn open(mock: &MockTlccs) -> SpectrometerHandle {
        mock.init("USB0::0x1313::0x8081::M00000001::RAW", true, true)
            .unwrap()
    }

    #[test]
    fn test_init_extracts_serial() {
        let mock = MockTlccs::new();
        let handle = open(&mock);
        let info = mock.identification_query(handle).unwrap();
        assert_eq!(info.serial_number, "M00000001");
        assert_eq!(info.device_name, "CCS100");
    }

    #[test]
    fn test_idle_until_scan_started() {
        let mock = MockTlccs::new();
        let handle = open(&mock);
        let status = mock.device_status(handle).unwrap();
        assert_eq!(status, STATUS_IDLE_SOFT_TRIG | STATUS_IDLE_EXT_TRIG);
    }

    #[test]
    fn test_scan_progresses_to_ready() {
        let mock = MockTlccs::new();
        let handle = open(&mock);
        mock.set_integration_time(handle, 0.05).unwrap();
        mock.start_scan(handle).unwrap();
        assert_eq!(
            mock.device_status(handle).unwrap(),
            STATUS_SCAN_IN_PROGRESS
        );
        thread::sleep(Duration::from_millis(100));
        assert_eq!(mock.device_status(handle).unwrap(), STATUS_SCAN_READY);

        let data = mock.scan_data(handle).unwrap();
        assert_eq!(data.len(), NUM_PIXELS);
        // Fetching the buffer returns the instrument to idle
        assert_eq!(
            mock.device_status(handle).unwrap(),
            STATUS_IDLE_SOFT_TRIG | STATUS_IDLE_EXT_TRIG
        );
    }

    #[test]
    fn test_scan_data_before_ready_fails() {
        let mock = MockTlccs::new();
        let handle = open(&mock);
        assert!(matches!(
            mock.scan_data(handle),
            Err(CcsError::Driver { .. })
        ));
    }

    #[test]
    fn test_spectrum_scales_with_integration_time() {
        let short = MockTlccs::synthesize_spectrum(0.01);
        let long = MockTlccs::synthesize_spectrum(0.1);
        let peak = |s: &[f64]| s.iter().cloned().fold(f64::MIN, f64::max);
        assert!(peak(&long) > peak(&short));
    }

    #[test]
    fn test_wavelengths_span_sensor_band() {
        let mock = MockTlccs::new();
        let handle = open(&mock);
        let table = mock
            .wavelength_data(handle, CalibrationDataSet::Factory)
            .unwrap();
        assert_eq!(table.wavelengths.len(), NUM_PIXELS);
        assert_eq!(table.wavelengths[0], table.min_nm);
        assert_eq!(table.wavelengths[NUM_PIXELS - 1], table.max_nm);
    }

    #[test]
    fn test_close_unknown_handle_fails() {
        let mock = MockTlccs::new();
        let handle = open(&mock);
        mock.close(handle).unwrap();
        assert!(matches!(mock.close(handle), Err(CcsError::Driver { .. })));
        assert_eq!(mock.close_calls(), 1);
    }
}
