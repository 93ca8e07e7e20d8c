//! Device adaptor for the Thorlabs CCS100 compact spectrometer (350-700 nm).
//!
//! The CCS100 is driven through the vendor TLCCS library; this crate wraps it in a
//! safe, synchronous API. The instrument handle is opened once, device identity and
//! the wavelength calibration table are queried at startup, and the adaptor then
//! exposes the integration-time setter, single-scan acquisition, and spectrum
//! persistence.
//!
//! Hardware access requires the `tlccs_hardware` feature and an installed TLCCS
//! driver; [`driver::mock::MockTlccs`] simulates the instrument for everything else.
//!
//! ```no_run
//! use ccs100::config::Settings;
//! use ccs100::driver::mock::MockTlccs;
//! use ccs100::spectrometer::Ccs100;
//! use std::sync::Arc;
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = Settings::for_serial("M00405433");
//!     let mut spec = Ccs100::open(Arc::new(MockTlccs::new()), &settings)?;
//!
//!     spec.set_integration_time(0.1)?;
//!     let spectrum = spec.acquire()?;
//!     spectrum.save_txt("example.txt".as_ref())?;
//!
//!     spec.close()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod spectrometer;
pub mod spectrum;
pub mod status;

pub use error::{CcsError, CcsResult};
pub use spectrometer::Ccs100;
pub use spectrum::Spectrum;
pub use status::DeviceStatus;
