//! This crate turns EEG recordings into procedurally generated artwork.
//!
//! A recording is first reduced to an 8-element [`FeatureVector`] of relative band powers
//! and cognitive-state scores. The vector then parameterizes a randomly drawn
//! compositional pattern-producing network (CPPN), evaluated at every pixel of the image.
//!
//! # Extracting Features
//!
//! ```rust
//! use neuroart::features::extract;
//! use neuroart::signal::{ChannelLayout, SignalTable};
//!
//! // Two channels of a 10 Hz oscillation sampled at 250 Hz
//! let channel: Vec<f64> = (0..1000)
//!     .map(|i| (2.0 * std::f64::consts::PI * 10.0 * i as f64 / 250.0).sin())
//!     .collect();
//! let table = SignalTable::from_channels(vec![channel.clone(), channel]).unwrap();
//! let layout = ChannelLayout::new(250.0, vec![0, 1]);
//!
//! let features = extract(&table, &layout).unwrap();
//! assert!(features.alpha > 0.9);
//! ```
//!
//! # Generating Images
//!
//! ```rust
//! use neuroart::cppn::{generate, NetworkSpec};
//! use neuroart::features::FeatureVector;
//!
//! let features = FeatureVector::from_array([0.3, 0.2, 0.2, 0.2, 0.1, 0.5, 0.6, 0.4]);
//! let spec = NetworkSpec::new(64, 48, 4, 9).with_activation("tanh").with_seed(Some(42));
//!
//! let image = generate(&features, &spec).unwrap();
//! assert_eq!(image.dimensions(), (64, 48));
//!
//! // The same seed always yields the same image
//! assert_eq!(image, generate(&features, &spec).unwrap());
//! ```

pub mod classifier;
pub mod cppn;
pub mod error;
pub mod features;
pub mod signal;
pub mod spectrum;

pub use cppn::{CppnGenerator, NetworkSpec, PixelGrid};
pub use error::ArtError;
pub use features::{FeatureExtractor, FeatureVector};
pub use signal::{Board, ChannelLayout, SignalTable};
