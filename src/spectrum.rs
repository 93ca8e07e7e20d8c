//! Acquired spectrum data and serialisation.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// One completed scan: intensity per pixel paired with the wavelength table it
/// was acquired against. The two arrays always have the same length and
/// index-to-index correspondence.
#[derive(Debug, Clone)]
pub struct Spectrum {
    wavelengths: Vec<f64>,
    intensities: Vec<f64>,
    integration_time_s: f64,
}

impl Spectrum {
    pub(crate) fn new(
        wavelengths: Vec<f64>,
        intensities: Vec<f64>,
        integration_time_s: f64,
    ) -> Self {
        assert_eq!(
            wavelengths.len(),
            intensities.len(),
            "wavelength and intensity arrays must pair up"
        );
        Self {
            wavelengths,
            intensities,
            integration_time_s,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.intensities.len()
    }

    /// True when the spectrum holds no samples.
    pub fn is_empty(&self) -> bool {
        self.intensities.is_empty()
    }

    /// Wavelength per sample, in nanometers.
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Intensity per sample, in arbitrary units.
    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// Integration time this spectrum was acquired with, in seconds.
    pub fn integration_time_s(&self) -> f64 {
        self.integration_time_s
    }

    /// `(wavelength, intensity)` pairs in pixel order.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.wavelengths
            .iter()
            .copied()
            .zip(self.intensities.iter().copied())
    }

    /// The `(wavelength, intensity)` pair with the highest intensity.
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.samples()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Write the spectrum as plain text, one `"%0.3f:<intensity>"` line per
    /// sample, in pixel order.
    pub fn write_txt<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (wavelength, intensity) in self.samples() {
            writeln!(writer, "{wavelength:.3}:{intensity}")?;
        }
        Ok(())
    }

    /// Save the spectrum to `path`, creating parent directories as needed.
    pub fn save_txt(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_txt(&mut writer)?;
        writer.flush()
    }
}
