//! Power spectral density estimation (Welch's method) and band integration.
use itertools::Itertools;
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::ArtError;

/// Trend removal applied to a channel before spectral estimation.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Detrend {
    None,
    /// Subtract the mean.
    #[default]
    Constant,
    /// Subtract the least-squares line.
    Linear,
}

/// Returns a detrended copy of the samples.
pub fn detrend(samples: &[f64], mode: Detrend) -> Vec<f64> {
    let n = samples.len();
    if n == 0 {
        return vec![];
    }
    match mode {
        Detrend::None => samples.to_vec(),
        Detrend::Constant => {
            let mean = samples.iter().sum::<f64>() / n as f64;
            samples.iter().map(|x| x - mean).collect()
        }
        Detrend::Linear => {
            let t_mean = (n - 1) as f64 / 2.0;
            let x_mean = samples.iter().sum::<f64>() / n as f64;
            let (cov, var) = samples
                .iter()
                .enumerate()
                .fold((0.0, 0.0), |(cov, var), (t, x)| {
                    let dt = t as f64 - t_mean;
                    (cov + dt * (x - x_mean), var + dt * dt)
                });
            let slope = if var > 0.0 { cov / var } else { 0.0 };
            samples
                .iter()
                .enumerate()
                .map(|(t, x)| x - x_mean - slope * (t as f64 - t_mean))
                .collect()
        }
    }
}

/// The power of two nearest to `value` (ties go up), at least 2.
pub fn nearest_power_of_two(value: f64) -> usize {
    let upper = (value.max(2.0).ceil() as usize).next_power_of_two();
    let lower = upper / 2;
    if lower >= 2 && value - (lower as f64) < upper as f64 - value {
        lower
    } else {
        upper
    }
}

/// Periodic Hann window of the given length.
pub fn hann_window(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / len as f64).cos())
        .collect()
}

/// A one-sided power spectral density.
#[derive(Debug, PartialEq, Clone)]
pub struct Psd {
    /// Bin frequencies in Hz, from 0 to the Nyquist frequency.
    pub frequencies: Vec<f64>,
    /// Power density per bin.
    pub density: Vec<f64>,
}

impl Psd {
    /// Integrate the density over `[low, high]` Hz with the trapezoid rule.
    pub fn band_power(&self, low: f64, high: f64) -> f64 {
        self.frequencies
            .iter()
            .zip(self.density.iter())
            .filter(|(f, _)| **f >= low && **f <= high)
            .tuple_windows()
            .map(|((f0, p0), (f1, p1))| 0.5 * (p0 + p1) * (f1 - f0))
            .sum()
    }
}

/// Estimate the PSD with Welch's method: Hann-windowed segments of length `nfft`
/// with 50% overlap, periodograms averaged over all segments that fit in the record.
pub fn welch(samples: &[f64], sampling_rate: f64, nfft: usize) -> Result<Psd, ArtError> {
    if nfft < 2 {
        return Err(ArtError::InvalidParameter(format!(
            "FFT length must be at least 2, got {}",
            nfft
        )));
    }
    if !(sampling_rate > 0.0) {
        return Err(ArtError::InvalidParameter(format!(
            "Sampling rate must be positive, got {}",
            sampling_rate
        )));
    }
    if samples.len() < nfft {
        return Err(ArtError::InsufficientData {
            required: nfft,
            found: samples.len(),
        });
    }

    let window = hann_window(nfft);
    let scale = sampling_rate * window.iter().map(|w| w * w).sum::<f64>();
    let fft = FftPlanner::<f64>::new().plan_fft_forward(nfft);
    let num_bins = nfft / 2 + 1;
    let step = nfft / 2;

    let mut density = vec![0.0; num_bins];
    let mut num_segments = 0;
    let mut buffer: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); nfft];

    let mut start = 0;
    while start + nfft <= samples.len() {
        for (slot, (x, w)) in buffer
            .iter_mut()
            .zip(samples[start..start + nfft].iter().zip(window.iter()))
        {
            *slot = Complex::new(x * w, 0.0);
        }
        fft.process(&mut buffer);

        for (k, acc) in density.iter_mut().enumerate() {
            let power = buffer[k].norm_sqr() / scale;
            // One-sided spectrum: fold the negative frequencies except DC and Nyquist.
            *acc += if k == 0 || (nfft % 2 == 0 && k == nfft / 2) {
                power
            } else {
                2.0 * power
            };
        }
        num_segments += 1;
        start += step;
    }

    density.iter_mut().for_each(|p| *p /= num_segments as f64);
    let frequencies = (0..num_bins)
        .map(|k| k as f64 * sampling_rate / nfft as f64)
        .collect();

    Ok(Psd {
        frequencies,
        density,
    })
}
