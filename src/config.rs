//! Configuration loading for the adaptor.
//!
//! Configuration is loaded from a TOML file merged with environment variables
//! (prefixed with `CCS_`, double underscore between section and key):
//!
//! ```text
//! CCS_INSTRUMENT__SERIAL_NUMBER=M00405433
//! CCS_ACQUISITION__SCAN_TIMEOUT_MARGIN=10s
//! ```
//!
//! # Example
//!
//! ```toml
//! [instrument]
//! serial_number = "M00405433"
//! reset_on_open = true
//!
//! [acquisition]
//! integration_time_s = 0.1       # applied at open when present
//! scan_timeout_margin = "5s"     # bounds the scan poll loop
//!
//! [output]
//! directory = "spectra"
//! ```

use crate::error::{CcsError, CcsResult};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level adaptor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Instrument identity and open behavior.
    pub instrument: InstrumentConfig,
    /// Acquisition settings.
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Instrument identity and open behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Serial number, as printed on the device label (e.g. "M00405433").
    pub serial_number: String,
    /// Reset the device as part of `tlccs_init`.
    #[serde(default = "default_reset_on_open")]
    pub reset_on_open: bool,
}

/// Acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Integration time applied right after open, in seconds.
    #[serde(default)]
    pub integration_time_s: Option<f64>,
    /// Safety margin added on top of the integration time when bounding the
    /// scan poll loop.
    #[serde(default = "default_scan_timeout_margin", with = "humantime_serde")]
    pub scan_timeout_margin: Duration,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            integration_time_s: None,
            scan_timeout_margin: default_scan_timeout_margin(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory spectra are saved into.
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

fn default_reset_on_open() -> bool {
    true
}

fn default_scan_timeout_margin() -> Duration {
    Duration::from_secs(5)
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("spectra")
}

impl Settings {
    /// Load configuration from `ccs100.toml` and `CCS_`-prefixed environment
    /// variables, then validate.
    pub fn load() -> CcsResult<Self> {
        Self::load_from("ccs100.toml")
    }

    /// Load configuration from a specific file path.
    ///
    /// Environment variables take precedence over file values.
    pub fn load_from<P: AsRef<Path>>(path: P) -> CcsResult<Self> {
        let settings: Self = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("CCS_").split("__"))
            .extract()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Minimal settings for a given serial number, defaults everywhere else.
    /// Used by the CLI's `--serial` override and by tests.
    pub fn for_serial(serial_number: &str) -> Self {
        Self {
            instrument: InstrumentConfig {
                serial_number: serial_number.to_string(),
                reset_on_open: true,
            },
            acquisition: AcquisitionConfig::default(),
            output: OutputConfig::default(),
        }
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> CcsResult<()> {
        if self.instrument.serial_number.trim().is_empty() {
            return Err(CcsError::Configuration(
                "instrument.serial_number must not be empty".to_string(),
            ));
        }
        if self.acquisition.scan_timeout_margin.is_zero() {
            return Err(CcsError::Configuration(
                "acquisition.scan_timeout_margin must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(toml: &str) -> CcsResult<Settings> {
        let settings: Settings = Figment::new().merge(Toml::string(toml)).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let settings = extract(
            r#"
            [instrument]
            serial_number = "M00405433"
            "#,
        )
        .unwrap();
        assert!(settings.instrument.reset_on_open);
        assert_eq!(settings.acquisition.integration_time_s, None);
        assert_eq!(
            settings.acquisition.scan_timeout_margin,
            Duration::from_secs(5)
        );
        assert_eq!(settings.output.directory, PathBuf::from("spectra"));
    }

    #[test]
    fn test_humantime_margin() {
        let settings = extract(
            r#"
            [instrument]
            serial_number = "M00405433"

            [acquisition]
            scan_timeout_margin = "1500ms"
            "#,
        )
        .unwrap();
        assert_eq!(
            settings.acquisition.scan_timeout_margin,
            Duration::from_millis(1500)
        );
    }

    #[test]
    fn test_empty_serial_rejected() {
        let err = extract(
            r#"
            [instrument]
            serial_number = ""
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("serial_number"));
    }

    #[test]
    fn test_zero_margin_rejected() {
        let err = extract(
            r#"
            [instrument]
            serial_number = "M00405433"

            [acquisition]
            scan_timeout_margin = "0s"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("scan_timeout_margin"));
    }
}
