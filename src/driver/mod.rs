//! Vendor driver abstraction.
//!
//! [`TlccsDriver`] mirrors the entry points of the Thorlabs TLCCS library, one
//! method per driver function, with the instrument handle passed explicitly. The
//! hardware implementation forwards to the vendor library; [`mock::MockTlccs`]
//! simulates the instrument so the adaptor can be exercised without hardware.

use crate::error::CcsResult;

pub mod mock;
#[cfg(feature = "tlccs_hardware")]
pub mod tlccs;

/// Number of pixels on the CCS100 line sensor. Wavelength and intensity arrays
/// always carry exactly this many samples.
pub const NUM_PIXELS: usize = 3648;

/// Instrument handle (wraps the VISA session returned by `tlccs_init`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpectrometerHandle(pub u32);

/// Static identity reported by the instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Manufacturer name.
    pub manufacturer: String,
    /// Device name.
    pub device_name: String,
    /// Serial number.
    pub serial_number: String,
    /// Firmware revision.
    pub firmware_revision: String,
    /// Instrument driver revision.
    pub driver_revision: String,
}

/// Which wavelength calibration table to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalibrationDataSet {
    /// Factory-adjusted calibration.
    #[default]
    Factory,
    /// User-supplied calibration points.
    User,
}

impl CalibrationDataSet {
    /// Data-set selector value expected by the driver.
    pub fn code(self) -> i16 {
        match self {
            CalibrationDataSet::Factory => 0,
            CalibrationDataSet::User => 1,
        }
    }
}

/// Wavelength calibration table, read once per data set.
#[derive(Debug, Clone)]
pub struct WavelengthData {
    /// Wavelength per pixel in nanometers, [`NUM_PIXELS`] entries.
    pub wavelengths: Vec<f64>,
    /// Shortest wavelength in the table.
    pub min_nm: f64,
    /// Longest wavelength in the table.
    pub max_nm: f64,
}

/// One method per TLCCS driver entry point.
///
/// Implementations report any non-zero driver status code as
/// [`crate::CcsError::Driver`]; methods take `&self` so a single driver instance
/// can be shared (interior mutability is the implementor's business).
pub trait TlccsDriver: Send + Sync {
    /// `tlccs_init` — open the instrument named by the VISA resource string.
    fn init(&self, resource: &str, id_query: bool, reset: bool) -> CcsResult<SpectrometerHandle>;

    /// `tlccs_identificationQuery` — fetch the five identity strings.
    fn identification_query(&self, handle: SpectrometerHandle) -> CcsResult<DeviceInfo>;

    /// `tlccs_getWavelengthData` — fetch a wavelength calibration table.
    fn wavelength_data(
        &self,
        handle: SpectrometerHandle,
        data_set: CalibrationDataSet,
    ) -> CcsResult<WavelengthData>;

    /// `tlccs_getDeviceStatus` — read the raw status word.
    fn device_status(&self, handle: SpectrometerHandle) -> CcsResult<i32>;

    /// `tlccs_startScan` — arm and start a single software-triggered scan.
    fn start_scan(&self, handle: SpectrometerHandle) -> CcsResult<()>;

    /// `tlccs_getScanData` — fetch the completed intensity buffer.
    fn scan_data(&self, handle: SpectrometerHandle) -> CcsResult<Vec<f64>>;

    /// `tlccs_getIntegrationTime` — read the integration time in seconds.
    fn integration_time(&self, handle: SpectrometerHandle) -> CcsResult<f64>;

    /// `tlccs_setIntegrationTime` — set the integration time in seconds.
    fn set_integration_time(&self, handle: SpectrometerHandle, seconds: f64) -> CcsResult<()>;

    /// `tlccs_close` — release the instrument handle.
    fn close(&self, handle: SpectrometerHandle) -> CcsResult<()>;
}
