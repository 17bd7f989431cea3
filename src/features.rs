//! Reduction of a multichannel EEG recording into the 8-element feature vector.
//!
//! # Feature order
//!
//! The order of [`FeatureVector::to_array`] is a positional contract shared with the
//! image generator and must not change:
//!
//! | index | feature |
//! |-------|---------------|
//! | 0 | alpha |
//! | 1 | beta |
//! | 2 | theta |
//! | 3 | delta |
//! | 4 | gamma |
//! | 5 | concentration |
//! | 6 | mindfulness |
//! | 7 | relaxation |
//!
//! # Normalization
//!
//! Band powers are made relative per channel: the five band powers of a channel are
//! divided by their sum. A channel without any power in the five bands (e.g., a flat
//! recording) contributes `1/5` to every band. The relative powers are then averaged
//! across channels, so the five band features always sum to one.
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::classifier::{Classifier, CognitiveScores, LogisticClassifier};
use crate::error::ArtError;
use crate::signal::{ChannelLayout, SignalTable};
use crate::spectrum::{detrend, nearest_power_of_two, welch, Detrend};

/// The canonical EEG frequency bands.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Band {
    Delta,
    Theta,
    Alpha,
    Beta,
    Gamma,
}

impl Band {
    pub const ALL: [Band; 5] = [Band::Delta, Band::Theta, Band::Alpha, Band::Beta, Band::Gamma];

    pub fn name(&self) -> &'static str {
        match self {
            Band::Delta => "delta",
            Band::Theta => "theta",
            Band::Alpha => "alpha",
            Band::Beta => "beta",
            Band::Gamma => "gamma",
        }
    }
}

/// Frequency boundaries (low, high) in Hz of each band.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct BandRanges {
    pub delta: (f64, f64),
    pub theta: (f64, f64),
    pub alpha: (f64, f64),
    pub beta: (f64, f64),
    pub gamma: (f64, f64),
}

impl Default for BandRanges {
    fn default() -> Self {
        BandRanges {
            delta: (0.5, 4.0),
            theta: (4.0, 8.0),
            alpha: (8.0, 13.0),
            beta: (13.0, 30.0),
            gamma: (30.0, 45.0),
        }
    }
}

impl BandRanges {
    pub fn range(&self, band: Band) -> (f64, f64) {
        match band {
            Band::Delta => self.delta,
            Band::Theta => self.theta,
            Band::Alpha => self.alpha,
            Band::Beta => self.beta,
            Band::Gamma => self.gamma,
        }
    }

    /// Check that every band is a non-empty, non-negative interval.
    pub fn validate(&self) -> Result<(), ArtError> {
        for band in Band::ALL {
            let (low, high) = self.range(band);
            if !(low >= 0.0 && high > low && high.is_finite()) {
                return Err(ArtError::InvalidParameter(format!(
                    "{} band must satisfy 0 <= low < high, got ({}, {})",
                    band.name(),
                    low,
                    high
                )));
            }
        }
        Ok(())
    }
}

/// One value per band.
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BandPowers {
    pub delta: f64,
    pub theta: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl BandPowers {
    pub fn from_fn<F: FnMut(Band) -> f64>(mut f: F) -> Self {
        BandPowers {
            delta: f(Band::Delta),
            theta: f(Band::Theta),
            alpha: f(Band::Alpha),
            beta: f(Band::Beta),
            gamma: f(Band::Gamma),
        }
    }

    pub fn get(&self, band: Band) -> f64 {
        match band {
            Band::Delta => self.delta,
            Band::Theta => self.theta,
            Band::Alpha => self.alpha,
            Band::Beta => self.beta,
            Band::Gamma => self.gamma,
        }
    }

    /// Values in delta, theta, alpha, beta, gamma order.
    pub fn to_array(&self) -> [f64; 5] {
        [self.delta, self.theta, self.alpha, self.beta, self.gamma]
    }

    pub fn total(&self) -> f64 {
        self.to_array().iter().sum()
    }
}

/// Relative band powers averaged over channels, with their spread across channels.
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpectralFeatures {
    /// Mean relative band power across channels.
    pub mean: BandPowers,
    /// Standard deviation of the relative band power across channels.
    pub std: BandPowers,
}

impl SpectralFeatures {
    /// Number of values in [`SpectralFeatures::to_array`].
    pub const LEN: usize = 10;

    /// The means followed by the standard deviations, each in delta..gamma order.
    pub fn to_array(&self) -> [f64; SpectralFeatures::LEN] {
        let mut out = [0.0; SpectralFeatures::LEN];
        out[..5].copy_from_slice(&self.mean.to_array());
        out[5..].copy_from_slice(&self.std.to_array());
        out
    }
}

/// The feature vector consumed by the image generator. See the module documentation for the order.
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub alpha: f64,
    pub beta: f64,
    pub theta: f64,
    pub delta: f64,
    pub gamma: f64,
    pub concentration: f64,
    pub mindfulness: f64,
    pub relaxation: f64,
}

impl FeatureVector {
    pub const LEN: usize = 8;

    /// Feature names in positional order.
    pub const NAMES: [&'static str; FeatureVector::LEN] = [
        "alpha",
        "beta",
        "theta",
        "delta",
        "gamma",
        "concentration",
        "mindfulness",
        "relaxation",
    ];

    pub fn new(bands: &BandPowers, scores: &CognitiveScores) -> Self {
        FeatureVector {
            alpha: bands.alpha,
            beta: bands.beta,
            theta: bands.theta,
            delta: bands.delta,
            gamma: bands.gamma,
            concentration: scores.concentration,
            mindfulness: scores.mindfulness,
            relaxation: scores.relaxation,
        }
    }

    pub fn to_array(&self) -> [f64; FeatureVector::LEN] {
        [
            self.alpha,
            self.beta,
            self.theta,
            self.delta,
            self.gamma,
            self.concentration,
            self.mindfulness,
            self.relaxation,
        ]
    }

    pub fn from_array(values: [f64; FeatureVector::LEN]) -> Self {
        let [alpha, beta, theta, delta, gamma, concentration, mindfulness, relaxation] = values;
        FeatureVector {
            alpha,
            beta,
            theta,
            delta,
            gamma,
            concentration,
            mindfulness,
            relaxation,
        }
    }

    pub fn bands(&self) -> BandPowers {
        BandPowers {
            delta: self.delta,
            theta: self.theta,
            alpha: self.alpha,
            beta: self.beta,
            gamma: self.gamma,
        }
    }

    /// Write the feature vector as JSON.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ArtError> {
        let file = File::create(path).map_err(|e| ArtError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| ArtError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| ArtError::IOError(e.to_string()))
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ArtError> {
        let file = File::open(path).map_err(|e| ArtError::IOError(e.to_string()))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| ArtError::IOError(e.to_string()))
    }
}

/// Parameters of the spectral analysis.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub bands: BandRanges,
    #[serde(default)]
    pub detrend: Detrend,
    /// Analysis window length. Defaults to the power of two nearest to the sampling rate.
    #[serde(default)]
    pub nfft: Option<usize>,
}

impl ExtractorConfig {
    /// The analysis window length for a given sampling rate, which is also the
    /// minimum number of samples a recording must hold.
    pub fn window_len(&self, sampling_rate: f64) -> usize {
        self.nfft
            .unwrap_or_else(|| nearest_power_of_two(sampling_rate))
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ArtError> {
        let file = File::create(path).map_err(|e| ArtError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| ArtError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| ArtError::IOError(e.to_string()))
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ArtError> {
        let file = File::open(path).map_err(|e| ArtError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| ArtError::IOError(e.to_string()))
    }
}

/// Relative band powers of one channel, summing to one.
fn relative_band_powers(
    samples: &[f64],
    sampling_rate: f64,
    config: &ExtractorConfig,
) -> Result<BandPowers, ArtError> {
    let samples = detrend(samples, config.detrend);
    let psd = welch(&samples, sampling_rate, config.window_len(sampling_rate))?;
    let absolute = BandPowers::from_fn(|band| {
        let (low, high) = config.bands.range(band);
        psd.band_power(low, high)
    });

    let total = absolute.total();
    if total == 0.0 {
        return Ok(BandPowers::from_fn(|_| 1.0 / Band::ALL.len() as f64));
    }
    if !total.is_finite() {
        return Err(ArtError::InvalidTable(format!(
            "band power overflows ({})",
            total
        )));
    }
    Ok(BandPowers::from_fn(|band| absolute.get(band) / total))
}

/// Mean over channels, taken as offsets from the first channel so that equal
/// values average to themselves exactly.
fn channel_mean(values: impl Iterator<Item = f64> + Clone, n: f64) -> f64 {
    let mut iter = values.clone();
    match iter.next() {
        Some(first) => first + values.map(|v| v - first).sum::<f64>() / n,
        None => 0.0,
    }
}

/// Computes feature vectors from recordings with a pluggable cognitive-state classifier.
#[derive(Debug, Clone)]
pub struct FeatureExtractor<C: Classifier = LogisticClassifier> {
    config: ExtractorConfig,
    classifier: C,
}

impl Default for FeatureExtractor<LogisticClassifier> {
    fn default() -> Self {
        FeatureExtractor::new(ExtractorConfig::default(), LogisticClassifier::default())
    }
}

impl<C: Classifier> FeatureExtractor<C> {
    pub fn new(config: ExtractorConfig, classifier: C) -> Self {
        FeatureExtractor { config, classifier }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Returns the minimum number of samples required for the layout's sampling rate.
    pub fn min_samples(&self, layout: &ChannelLayout) -> usize {
        self.config.window_len(layout.sampling_rate)
    }

    /// Validate the inputs and select the EEG channels, before any computation.
    fn eeg_channels<'a>(
        &self,
        table: &'a SignalTable,
        layout: &ChannelLayout,
    ) -> Result<Vec<&'a [f64]>, ArtError> {
        if !(layout.sampling_rate > 0.0 && layout.sampling_rate.is_finite()) {
            return Err(ArtError::InvalidParameter(format!(
                "Sampling rate must be positive, got {}",
                layout.sampling_rate
            )));
        }
        self.config.bands.validate()?;

        let channels = table.eeg_channels(layout)?;

        let required = self.min_samples(layout);
        if table.num_samples() < required {
            return Err(ArtError::InsufficientData {
                required,
                found: table.num_samples(),
            });
        }

        for (samples, id) in channels.iter().zip(layout.eeg_channels.iter()) {
            if let Some(t) = samples.iter().position(|x| !x.is_finite()) {
                return Err(ArtError::InvalidTable(format!(
                    "channel {} has a non-finite sample at index {}: {}",
                    id, t, samples[t]
                )));
            }
        }
        Ok(channels)
    }

    /// Compute the mean and spread of the relative band powers across EEG channels.
    pub fn spectral_features(
        &self,
        table: &SignalTable,
        layout: &ChannelLayout,
    ) -> Result<SpectralFeatures, ArtError> {
        let channels = self.eeg_channels(table, layout)?;

        let per_channel = channels
            .iter()
            .map(|samples| relative_band_powers(samples, layout.sampling_rate, &self.config))
            .collect::<Result<Vec<BandPowers>, ArtError>>()?;

        let n = per_channel.len() as f64;
        let mean =
            BandPowers::from_fn(|band| channel_mean(per_channel.iter().map(|p| p.get(band)), n));
        let std = BandPowers::from_fn(|band| {
            let m = mean.get(band);
            (per_channel.iter().map(|p| (p.get(band) - m).powi(2)).sum::<f64>() / n).sqrt()
        });

        log::debug!(
            "Spectral features over {} channels: mean {:?}, std {:?}",
            per_channel.len(),
            mean,
            std
        );
        Ok(SpectralFeatures { mean, std })
    }

    /// Extract the feature vector of a recording.
    ///
    /// Fails with [`ArtError::ChannelMismatch`] if the layout declares no EEG channel or
    /// more EEG channels than the table holds, and with [`ArtError::InsufficientData`] if
    /// the recording is shorter than one analysis window.
    pub fn extract(
        &self,
        table: &SignalTable,
        layout: &ChannelLayout,
    ) -> Result<FeatureVector, ArtError> {
        let spectral = self.spectral_features(table, layout)?;
        let scores = self.classifier.classify(&spectral).clamped()?;
        Ok(FeatureVector::new(&spectral.mean, &scores))
    }
}

/// Extract the feature vector of a recording with the default configuration and classifier.
pub fn extract(table: &SignalTable, layout: &ChannelLayout) -> Result<FeatureVector, ArtError> {
    FeatureExtractor::<LogisticClassifier>::default().extract(table, layout)
}
