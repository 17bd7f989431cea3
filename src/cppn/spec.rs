//! The caller-supplied description of the network and the image to render.
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::activation::Activation;
use crate::error::ArtError;

/// Shape and generation parameters of a CPPN.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSpec {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Number of affine layers, the last one projecting to RGB.
    pub num_layers: usize,
    /// Width of the hidden layers.
    pub layer_width: usize,
    /// Name of the hidden-layer activation, e.g., "tanh".
    pub activation: String,
    /// Multiplier of the spatial inputs (x, y, r).
    pub input_scalar_1: f64,
    /// Multiplier of the feature inputs.
    pub input_scalar_2: f64,
    /// Seed of the weight draw. `None` draws fresh weights on every call.
    pub seed: Option<u64>,
}

impl Default for NetworkSpec {
    fn default() -> Self {
        NetworkSpec {
            width: 1920,
            height: 1080,
            num_layers: 10,
            layer_width: 9,
            activation: Activation::Tanh.name().to_string(),
            input_scalar_1: 1.0,
            input_scalar_2: 1.0,
            seed: None,
        }
    }
}

impl NetworkSpec {
    pub fn new(width: usize, height: usize, num_layers: usize, layer_width: usize) -> Self {
        NetworkSpec {
            width,
            height,
            num_layers,
            layer_width,
            ..NetworkSpec::default()
        }
    }

    pub fn with_activation(mut self, activation: &str) -> Self {
        self.activation = activation.to_string();
        self
    }

    pub fn with_scalars(mut self, input_scalar_1: f64, input_scalar_2: f64) -> Self {
        self.input_scalar_1 = input_scalar_1;
        self.input_scalar_2 = input_scalar_2;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the number of pixels of the image.
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    /// Check the shape fields and resolve the activation name.
    ///
    /// Shape errors are reported before activation errors.
    pub fn validate(&self) -> Result<Activation, ArtError> {
        if self.width == 0 || self.height == 0 {
            return Err(ArtError::InvalidSpec(format!(
                "resolution must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.num_layers < 1 {
            return Err(ArtError::InvalidSpec(
                "num_layers must be at least 1, got 0".to_string(),
            ));
        }
        if self.layer_width < 1 {
            return Err(ArtError::InvalidSpec(
                "layer_width must be at least 1, got 0".to_string(),
            ));
        }
        if !self.input_scalar_1.is_finite() || !self.input_scalar_2.is_finite() {
            return Err(ArtError::InvalidSpec(format!(
                "input scalars must be finite, got {} and {}",
                self.input_scalar_1, self.input_scalar_2
            )));
        }
        self.activation.parse::<Activation>()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert_eq!(NetworkSpec::default().validate(), Ok(Activation::Tanh));
        assert_eq!(
            NetworkSpec::new(4, 4, 2, 4).with_activation("Sin").validate(),
            Ok(Activation::Sin)
        );

        for spec in [
            NetworkSpec::new(0, 4, 2, 4),
            NetworkSpec::new(4, 0, 2, 4),
            NetworkSpec::new(4, 4, 0, 4),
            NetworkSpec::new(4, 4, 2, 0),
            NetworkSpec::new(4, 4, 2, 4).with_scalars(f64::NAN, 1.0),
        ] {
            assert!(matches!(spec.validate(), Err(ArtError::InvalidSpec(_))));
        }

        // Shape errors win over activation errors.
        let spec = NetworkSpec::new(0, 4, 2, 4).with_activation("swish");
        assert!(matches!(spec.validate(), Err(ArtError::InvalidSpec(_))));
        let spec = NetworkSpec::new(4, 4, 2, 4).with_activation("swish");
        assert_eq!(
            spec.validate(),
            Err(ArtError::UnsupportedActivation("swish".to_string()))
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let spec: NetworkSpec =
            serde_json::from_str(r#"{"width": 64, "height": 32, "seed": 7}"#).unwrap();
        assert_eq!(spec.width, 64);
        assert_eq!(spec.height, 32);
        assert_eq!(spec.seed, Some(7));
        assert_eq!(spec.num_layers, 10);
        assert_eq!(spec.activation, "tanh");
    }

    #[test]
    fn test_save_load() {
        let spec = NetworkSpec::new(16, 8, 3, 5)
            .with_activation("relu")
            .with_scalars(0.5, 0.25)
            .with_seed(Some(42));
        let file = tempfile::NamedTempFile::new().unwrap();
        spec.save_to(file.path()).unwrap();
        assert_eq!(NetworkSpec::load_from(file.path()).unwrap(), spec);
    }
}
