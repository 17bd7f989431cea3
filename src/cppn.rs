//! Compositional pattern-producing networks turning feature vectors into images.
//!
//! - [`spec`]: the caller-supplied network and image description
//! - [`activation`]: the hidden-layer activation functions
//! - [`weights`]: the randomly drawn layers and their batched forward pass
//! - [`grid`]: the rendered RGB byte buffer
//! - [`generator`]: per-pixel inputs and block-parallel rendering
pub mod activation;
pub mod generator;
pub mod grid;
pub mod spec;
pub mod weights;

pub use activation::Activation;
pub use generator::{generate, CppnGenerator};
pub use grid::PixelGrid;
pub use spec::NetworkSpec;
pub use weights::CppnWeights;
