//! FFI-backed driver using the vendor TLCCS library.
//!
//! Requires the `tlccs_hardware` feature and an installed TLCCS driver (see the
//! `tlccs-sys` crate). Every call is checked: a non-zero `ViStatus` aborts the
//! operation with [`CcsError::Driver`]. The library exports no
//! `tlccs_errorMessage`, so failures carry only the raw code.

use crate::driver::{
    CalibrationDataSet, DeviceInfo, SpectrometerHandle, TlccsDriver, WavelengthData, NUM_PIXELS,
};
use crate::error::{CcsError, CcsResult};
use std::ffi::{CStr, CString};

// Identity strings are returned in fixed 256-byte buffers.
const IDENT_BUFFER_LEN: usize = 256;

fn check(code: i32) -> CcsResult<()> {
    if code != 0 {
        return Err(CcsError::Driver { code });
    }
    Ok(())
}

fn buffer_to_string(buffer: &[i8]) -> String {
    // Safety: the driver NUL-terminates its identity strings.
    unsafe { CStr::from_ptr(buffer.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

/// Driver implementation forwarding to the vendor library.
pub struct HardwareTlccs;

impl HardwareTlccs {
    /// Create the hardware driver. The library is loaded by the dynamic linker;
    /// no per-instance state is needed, the instrument handle carries it all.
    pub fn new() -> Self {
        Self
    }
}

impl Default for HardwareTlccs {
    fn default() -> Self {
        Self::new()
    }
}

impl TlccsDriver for HardwareTlccs {
    fn init(&self, resource: &str, id_query: bool, reset: bool) -> CcsResult<SpectrometerHandle> {
        let resource = CString::new(resource).map_err(|_| CcsError::Configuration(
            "resource string contains an interior NUL byte".to_string(),
        ))?;
        let mut handle: u32 = 0;
        unsafe {
            check(tlccs_sys::tlccs_init(
                resource.as_ptr() as *mut i8,
                id_query as u16,
                reset as u16,
                &mut handle,
            ))?;
        }
        Ok(SpectrometerHandle(handle))
    }

    fn identification_query(&self, handle: SpectrometerHandle) -> CcsResult<DeviceInfo> {
        let mut manufacturer = vec![0i8; IDENT_BUFFER_LEN];
        let mut device_name = vec![0i8; IDENT_BUFFER_LEN];
        let mut serial_number = vec![0i8; IDENT_BUFFER_LEN];
        let mut firmware_revision = vec![0i8; IDENT_BUFFER_LEN];
        let mut driver_revision = vec![0i8; IDENT_BUFFER_LEN];
        unsafe {
            check(tlccs_sys::tlccs_identificationQuery(
                handle.0,
                manufacturer.as_mut_ptr(),
                device_name.as_mut_ptr(),
                serial_number.as_mut_ptr(),
                firmware_revision.as_mut_ptr(),
                driver_revision.as_mut_ptr(),
            ))?;
        }
        Ok(DeviceInfo {
            manufacturer: buffer_to_string(&manufacturer),
            device_name: buffer_to_string(&device_name),
            serial_number: buffer_to_string(&serial_number),
            firmware_revision: buffer_to_string(&firmware_revision),
            driver_revision: buffer_to_string(&driver_revision),
        })
    }

    fn wavelength_data(
        &self,
        handle: SpectrometerHandle,
        data_set: CalibrationDataSet,
    ) -> CcsResult<WavelengthData> {
        let mut wavelengths = vec![0.0f64; NUM_PIXELS];
        let mut min_nm: f64 = 0.0;
        let mut max_nm: f64 = 0.0;
        unsafe {
            check(tlccs_sys::tlccs_getWavelengthData(
                handle.0,
                data_set.code(),
                wavelengths.as_mut_ptr(),
                &mut min_nm,
                &mut max_nm,
            ))?;
        }
        Ok(WavelengthData {
            wavelengths,
            min_nm,
            max_nm,
        })
    }

    fn device_status(&self, handle: SpectrometerHandle) -> CcsResult<i32> {
        let mut status: i32 = 0;
        unsafe {
            check(tlccs_sys::tlccs_getDeviceStatus(handle.0, &mut status))?;
        }
        Ok(status)
    }

    fn start_scan(&self, handle: SpectrometerHandle) -> CcsResult<()> {
        unsafe { check(tlccs_sys::tlccs_startScan(handle.0)) }
    }

    fn scan_data(&self, handle: SpectrometerHandle) -> CcsResult<Vec<f64>> {
        let mut data = vec![0.0f64; NUM_PIXELS];
        unsafe {
            check(tlccs_sys::tlccs_getScanData(handle.0, data.as_mut_ptr()))?;
        }
        Ok(data)
    }

    fn integration_time(&self, handle: SpectrometerHandle) -> CcsResult<f64> {
        let mut seconds: f64 = 0.0;
        unsafe {
            check(tlccs_sys::tlccs_getIntegrationTime(handle.0, &mut seconds))?;
        }
        Ok(seconds)
    }

    fn set_integration_time(&self, handle: SpectrometerHandle, seconds: f64) -> CcsResult<()> {
        unsafe { check(tlccs_sys::tlccs_setIntegrationTime(handle.0, seconds)) }
    }

    fn close(&self, handle: SpectrometerHandle) -> CcsResult<()> {
        unsafe { check(tlccs_sys::tlccs_close(handle.0)) }
    }
}
