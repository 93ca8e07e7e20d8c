//! Command-line interface for the CCS100 adaptor.

use anyhow::{Context, Result};
use ccs100::config::Settings;
use ccs100::driver::mock::MockTlccs;
use ccs100::driver::TlccsDriver;
use ccs100::spectrometer::Ccs100;
use ccs100::spectrum::Spectrum;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ccs100", about = "Thorlabs CCS100 spectrometer adaptor", version)]
struct Cli {
    /// Configuration file (default: ccs100.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Instrument serial number; overrides the configuration file
    #[arg(long, global = true)]
    serial: Option<String>,

    /// Use the simulated instrument instead of hardware
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print device identity and wavelength range
    Info,
    /// Print the decoded device status word
    Status,
    /// Read (or set, with --set) the integration time
    IntegrationTime {
        /// New integration time in seconds (1e-5 to 60)
        #[arg(long)]
        set: Option<f64>,
    },
    /// Trigger a single scan and report the result
    Acquire {
        /// Integration time to apply before the scan, in seconds
        #[arg(long)]
        integration_time: Option<f64>,

        /// Save the spectrum to this exact path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Save the spectrum under a timestamped name in the output directory
        #[arg(long, conflicts_with = "output")]
        save: bool,

        /// Render a coarse intensity preview to the terminal
        #[arg(long)]
        preview: bool,
    },
}

fn make_driver(mock: bool) -> Result<Arc<dyn TlccsDriver>> {
    if mock {
        return Ok(Arc::new(MockTlccs::new()));
    }
    #[cfg(feature = "tlccs_hardware")]
    {
        Ok(Arc::new(ccs100::driver::tlccs::HardwareTlccs::new()))
    }
    #[cfg(not(feature = "tlccs_hardware"))]
    {
        Err(ccs100::CcsError::FeatureNotEnabled("tlccs_hardware").into())
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    if let Some(serial) = &cli.serial {
        return Ok(Settings::for_serial(serial));
    }
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("ccs100.toml"));
    Settings::load_from(&path)
        .with_context(|| format!("failed to load settings from {path:?}; pass --serial to skip the file"))
}

fn print_preview(spectrum: &Spectrum) {
    const BANDS: usize = 16;
    const BAR_WIDTH: f64 = 40.0;

    let max = spectrum
        .intensities()
        .iter()
        .cloned()
        .fold(f64::MIN, f64::max);
    if max <= 0.0 {
        println!("  (no signal)");
        return;
    }

    let n = spectrum.len();
    for band in 0..BANDS {
        let start = band * n / BANDS;
        let end = (((band + 1) * n) / BANDS).max(start + 1);
        let slice = &spectrum.intensities()[start..end];
        let mean = slice.iter().sum::<f64>() / slice.len() as f64;
        let bar = "#".repeat((mean / max * BAR_WIDTH).round() as usize);
        println!("  {:7.1} nm | {}", spectrum.wavelengths()[start], bar);
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = load_settings(&cli)?;
    let driver = make_driver(cli.mock)?;
    let mut spec = Ccs100::open(driver, &settings)?;

    match cli.command {
        Command::Info => {
            let info = spec.device_info();
            println!("manufacturer  : {}", info.manufacturer);
            println!("device        : {}", info.device_name);
            println!("serial_number : {}", info.serial_number);
            println!("firmware      : {}", info.firmware_revision);
            println!("driver        : {}", info.driver_revision);
            let (min, max) = spec.wavelength_range_nm();
            println!("wavelengths   : {:.1}-{:.1} nm ({} px)", min, max, spec.wavelengths().len());
        }
        Command::Status => {
            let status = spec.status()?;
            println!("status            : {status}");
            println!("idle_soft_trig    : {}", status.idle_soft_trig());
            println!("idle_ext_trig     : {}", status.idle_ext_trig());
            println!("scan_starting     : {}", status.scan_starting());
            println!("scan_in_progress  : {}", status.scan_in_progress());
            println!("scan_ready        : {}", status.scan_ready());
        }
        Command::IntegrationTime { set } => {
            if let Some(seconds) = set {
                spec.set_integration_time(seconds)?;
            }
            println!("integration_time_s: {}", spec.read_integration_time()?);
        }
        Command::Acquire {
            integration_time,
            output,
            save,
            preview,
        } => {
            if let Some(seconds) = integration_time {
                spec.set_integration_time(seconds)?;
            }

            let spectrum = spec.acquire()?;
            println!(
                "acquired {} samples at integration_time_s = {}",
                spectrum.len(),
                spectrum.integration_time_s()
            );
            if let Some((nm, counts)) = spectrum.peak() {
                println!("peak: {nm:.3} nm at {counts:.1} counts");
            }

            if preview {
                print_preview(&spectrum);
            }

            let path = match (output, save) {
                (Some(path), _) => Some(path),
                (None, true) => {
                    let file_name = format!(
                        "spectrum_{}.txt",
                        chrono::Utc::now().format("%Y%m%d_%H%M%S")
                    );
                    Some(settings.output.directory.join(file_name))
                }
                (None, false) => None,
            };
            if let Some(path) = path {
                spectrum
                    .save_txt(&path)
                    .with_context(|| format!("failed to save spectrum to {path:?}"))?;
                println!("saved: {}", path.display());
            }
        }
    }

    spec.close()?;
    Ok(())
}
