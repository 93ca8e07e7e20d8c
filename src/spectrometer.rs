//! Thorlabs CCS100 adaptor.
//!
//! [`Ccs100`] owns the instrument handle for its lifetime: `open` runs the
//! startup sequence (identity, wavelength table, status, integration time) and
//! the handle is released exactly once, on [`Ccs100::close`] or on drop.
//!
//! Scan acquisition is synchronous and blocking. The poll loop sleeps a tenth
//! of the integration time between status reads and gives up once the deadline
//! (two integration periods plus the configured margin) passes, so a driver
//! that never raises the ready bit cannot hang the caller forever.

use crate::config::Settings;
use crate::driver::{
    CalibrationDataSet, DeviceInfo, SpectrometerHandle, TlccsDriver, WavelengthData,
};
use crate::error::{CcsError, CcsResult};
use crate::spectrum::Spectrum;
use crate::status::DeviceStatus;
use log::{debug, info, warn};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Shortest supported integration time, in seconds.
pub const INTEGRATION_TIME_MIN_S: f64 = 1e-5;
/// Longest supported integration time, in seconds.
pub const INTEGRATION_TIME_MAX_S: f64 = 60.0;
/// Allowed deviation between requested and read-back integration time.
pub const INTEGRATION_TIME_TOLERANCE_S: f64 = 0.01;

/// VISA resource string for a CCS100 with the given serial number.
pub fn resource_string(serial_number: &str) -> String {
    format!("USB0::0x1313::0x8081::{serial_number}::RAW")
}

/// Open CCS100 spectrometer.
pub struct Ccs100 {
    driver: Arc<dyn TlccsDriver>,
    handle: Option<SpectrometerHandle>,
    info: DeviceInfo,
    wavelengths: WavelengthData,
    integration_time_s: f64,
    scan_timeout_margin: Duration,
}

impl Ccs100 {
    /// Open the instrument and run the startup queries.
    ///
    /// Builds the VISA resource string from the configured serial number, then
    /// fetches device identity, the factory wavelength table, the device status
    /// and the current integration time. When the configuration carries an
    /// `integration_time_s` it is applied before returning.
    pub fn open(driver: Arc<dyn TlccsDriver>, settings: &Settings) -> CcsResult<Self> {
        let resource = resource_string(&settings.instrument.serial_number);
        info!("CCS100: opening {resource}");
        let handle = driver.init(&resource, true, settings.instrument.reset_on_open)?;

        let info = driver.identification_query(handle)?;
        info!("CCS100: manufacturer  = {}", info.manufacturer);
        info!("CCS100: device        = {}", info.device_name);
        info!("CCS100: serial_number = {}", info.serial_number);
        info!("CCS100: firmware      = {}", info.firmware_revision);
        info!("CCS100: driver        = {}", info.driver_revision);

        let wavelengths = driver.wavelength_data(handle, CalibrationDataSet::Factory)?;
        debug!(
            "CCS100: wavelength table {:.1}-{:.1} nm ({} px)",
            wavelengths.min_nm,
            wavelengths.max_nm,
            wavelengths.wavelengths.len()
        );

        let status = DeviceStatus::from_raw(driver.device_status(handle)?);
        debug!("CCS100: status at open {status}");

        let integration_time_s = driver.integration_time(handle)?;
        info!("CCS100: integration time = {integration_time_s} s");

        let mut spectrometer = Self {
            driver,
            handle: Some(handle),
            info,
            wavelengths,
            integration_time_s,
            scan_timeout_margin: settings.acquisition.scan_timeout_margin,
        };

        if let Some(seconds) = settings.acquisition.integration_time_s {
            spectrometer.set_integration_time(seconds)?;
        }
        Ok(spectrometer)
    }

    fn handle(&self) -> CcsResult<SpectrometerHandle> {
        self.handle.ok_or(CcsError::NotConnected)
    }

    /// Identity reported by the instrument at open.
    pub fn device_info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Wavelength per pixel, in nanometers.
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths.wavelengths
    }

    /// Shortest and longest wavelength in the calibration table.
    pub fn wavelength_range_nm(&self) -> (f64, f64) {
        (self.wavelengths.min_nm, self.wavelengths.max_nm)
    }

    /// Re-fetch the wavelength table with the given calibration data set.
    pub fn reload_wavelengths(&mut self, data_set: CalibrationDataSet) -> CcsResult<()> {
        let handle = self.handle()?;
        self.wavelengths = self.driver.wavelength_data(handle, data_set)?;
        Ok(())
    }

    /// Read and decode the device status word.
    pub fn status(&self) -> CcsResult<DeviceStatus> {
        let handle = self.handle()?;
        Ok(DeviceStatus::from_raw(self.driver.device_status(handle)?))
    }

    /// Integration time as of the last driver exchange, in seconds.
    pub fn integration_time(&self) -> f64 {
        self.integration_time_s
    }

    /// Query the integration time from the device and refresh the cache.
    pub fn read_integration_time(&mut self) -> CcsResult<f64> {
        let handle = self.handle()?;
        self.integration_time_s = self.driver.integration_time(handle)?;
        Ok(self.integration_time_s)
    }

    /// Set the integration time, in seconds.
    ///
    /// Values outside `1e-5..=60` (or non-finite) are rejected before any
    /// driver call. The value is read back afterwards and must land within
    /// ±0.01 s of the request.
    pub fn set_integration_time(&mut self, seconds: f64) -> CcsResult<()> {
        if !seconds.is_finite()
            || !(INTEGRATION_TIME_MIN_S..=INTEGRATION_TIME_MAX_S).contains(&seconds)
        {
            return Err(CcsError::IntegrationTimeOutOfRange { requested: seconds });
        }
        let handle = self.handle()?;
        info!("CCS100: setting integration time to {seconds} s");
        self.driver.set_integration_time(handle, seconds)?;

        let actual = self.read_integration_time()?;
        if (actual - seconds).abs() > INTEGRATION_TIME_TOLERANCE_S {
            return Err(CcsError::IntegrationTimeMismatch {
                requested: seconds,
                actual,
            });
        }
        Ok(())
    }

    fn scan_timeout(&self) -> Duration {
        Duration::from_secs_f64(2.0 * self.integration_time_s) + self.scan_timeout_margin
    }

    /// Acquire a single software-triggered spectrum.
    ///
    /// The device must report software-trigger readiness; otherwise no start
    /// command is issued and [`CcsError::NotReady`] is returned. After the
    /// start, the status word is polled every tenth of the integration time
    /// until the scan-ready bit is set or the deadline passes.
    pub fn acquire(&mut self) -> CcsResult<Spectrum> {
        let handle = self.handle()?;

        let status = self.status()?;
        if !status.idle_soft_trig() {
            warn!("CCS100: not ready for a software-triggered scan ({status})");
            return Err(CcsError::NotReady(status));
        }

        debug!("CCS100: starting scan");
        self.driver.start_scan(handle)?;

        let poll = Duration::from_secs_f64(self.integration_time_s / 10.0);
        let timeout = self.scan_timeout();
        let started = Instant::now();
        loop {
            let status = self.status()?;
            if status.scan_ready() {
                break;
            }
            if started.elapsed() >= timeout {
                return Err(CcsError::ScanTimeout {
                    waited: started.elapsed(),
                });
            }
            thread::sleep(poll);
        }
        debug!("CCS100: scan ready after {:?}", started.elapsed());

        let intensities = self.driver.scan_data(handle)?;
        Ok(Spectrum::new(
            self.wavelengths.wavelengths.clone(),
            intensities,
            self.integration_time_s,
        ))
    }

    /// Release the instrument handle.
    ///
    /// Consumes the adaptor; the handle cannot be closed twice.
    pub fn close(mut self) -> CcsResult<()> {
        self.release()
    }

    fn release(&mut self) -> CcsResult<()> {
        match self.handle.take() {
            Some(handle) => {
                info!("CCS100: closing");
                self.driver.close(handle)
            }
            None => Ok(()),
        }
    }
}

impl Drop for Ccs100 {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::error!("CCS100: failed to close instrument handle: {e}");
        }
    }
}
