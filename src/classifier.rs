//! Cognitive-state classifiers mapping spectral features to scores in `[0, 1]`.
//!
//! The extractor only depends on the [`Classifier`] trait. The bundled
//! [`LogisticClassifier`] is one logistic regression per construct over the ten
//! values of [`SpectralFeatures::to_array`]; its coefficients are a swappable artifact
//! that can be stored as JSON.
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::ArtError;
use crate::features::SpectralFeatures;

/// Scores of the derived cognitive states.
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CognitiveScores {
    pub concentration: f64,
    pub mindfulness: f64,
    pub relaxation: f64,
}

impl CognitiveScores {
    /// Clamp every score to `[0, 1]`. Fails if a score is NaN.
    pub fn clamped(&self) -> Result<Self, ArtError> {
        let clamp = |name: &str, value: f64| {
            if value.is_nan() {
                Err(ArtError::InvalidParameter(format!(
                    "classifier returned NaN for {}",
                    name
                )))
            } else {
                Ok(value.clamp(0.0, 1.0))
            }
        };
        Ok(CognitiveScores {
            concentration: clamp("concentration", self.concentration)?,
            mindfulness: clamp("mindfulness", self.mindfulness)?,
            relaxation: clamp("relaxation", self.relaxation)?,
        })
    }
}

/// A model scoring cognitive states from spectral features.
pub trait Classifier: Send + Sync {
    fn classify(&self, features: &SpectralFeatures) -> CognitiveScores;
}

impl<F> Classifier for F
where
    F: Fn(&SpectralFeatures) -> CognitiveScores + Send + Sync,
{
    fn classify(&self, features: &SpectralFeatures) -> CognitiveScores {
        self(features)
    }
}

/// The logistic function.
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// A binary logistic regression over the spectral features.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: [f64; SpectralFeatures::LEN],
    pub intercept: f64,
}

impl LogisticModel {
    pub fn new(weights: [f64; SpectralFeatures::LEN], intercept: f64) -> Self {
        LogisticModel { weights, intercept }
    }

    /// The model predicting the complementary class.
    pub fn complement(&self) -> Self {
        LogisticModel {
            weights: self.weights.map(|w| -w),
            intercept: -self.intercept,
        }
    }

    pub fn predict(&self, features: &SpectralFeatures) -> f64 {
        let z = self
            .weights
            .iter()
            .zip(features.to_array().iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        sigmoid(z)
    }
}

/// One logistic regression per cognitive state.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LogisticClassifier {
    pub concentration: LogisticModel,
    pub mindfulness: LogisticModel,
    pub relaxation: LogisticModel,
}

impl Default for LogisticClassifier {
    /// Reference coefficients over (delta, theta, alpha, beta, gamma) means then spreads.
    /// Relaxation is the complement of mindfulness.
    fn default() -> Self {
        let mindfulness = LogisticModel::new(
            [2.0, 1.5, 3.0, -3.5, -2.5, -0.5, -0.5, 0.5, -0.5, -0.5],
            -0.5,
        );
        let concentration = LogisticModel::new(
            [-2.0, -2.5, -1.0, 4.0, 2.5, 0.5, 0.5, 0.0, -0.5, -0.5],
            -0.3,
        );
        LogisticClassifier {
            relaxation: mindfulness.complement(),
            concentration,
            mindfulness,
        }
    }
}

impl LogisticClassifier {
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

impl Classifier for LogisticClassifier {
    fn classify(&self, features: &SpectralFeatures) -> CognitiveScores {
        CognitiveScores {
            concentration: self.concentration.predict(features),
            mindfulness: self.mindfulness.predict(features),
            relaxation: self.relaxation.predict(features),
        }
    }
}
