//! Rendering a feature vector to an image through a randomly drawn CPPN.
use nalgebra::DMatrix;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::ops::Range;

use super::activation::Activation;
use super::grid::PixelGrid;
use super::spec::NetworkSpec;
use super::weights::{CppnWeights, NUM_OUTPUTS};
use crate::error::ArtError;
use crate::features::FeatureVector;

/// Number of spatial inputs per pixel: x, y and the distance to the centre.
pub const NUM_SPATIAL_INPUTS: usize = 3;
/// Width of the input vector of every pixel.
pub const NUM_INPUTS: usize = NUM_SPATIAL_INPUTS + FeatureVector::LEN;
/// Number of image rows evaluated as one matrix product.
pub const ROWS_PER_BLOCK: usize = 16;
/// Minimum number of pixels to evaluate blocks in parallel.
pub const MIN_PIXELS_PAR: usize = 1 << 16;

/// Map index `i` of an axis of length `n` to `[-1, 1]`.
fn axis_coordinate(i: usize, n: usize) -> f64 {
    if n <= 1 {
        0.0
    } else {
        2.0 * i as f64 / (n - 1) as f64 - 1.0
    }
}

/// Map a squashed output in `[0, 1]` to a colour byte.
#[inline]
fn to_byte(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Generates images from feature vectors with a validated [`NetworkSpec`].
#[derive(Debug, Clone)]
pub struct CppnGenerator {
    spec: NetworkSpec,
    activation: Activation,
}

impl CppnGenerator {
    /// Validate the spec. Shape errors are reported before an unsupported activation.
    pub fn new(spec: NetworkSpec) -> Result<Self, ArtError> {
        let activation = spec.validate()?;
        Ok(CppnGenerator { spec, activation })
    }

    pub fn spec(&self) -> &NetworkSpec {
        &self.spec
    }

    /// Draw the network weights for this spec from the given random stream.
    pub fn weights<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<CppnWeights, ArtError> {
        CppnWeights::rand(
            NUM_INPUTS,
            self.spec.num_layers,
            self.spec.layer_width,
            self.activation,
            rng,
        )
    }

    /// Input rows of the pixels of image rows `rows`, in row-major pixel order.
    ///
    /// Columns are `[s1 x, s1 y, s1 r, s2 f0, ..., s2 f7]`.
    fn block_inputs(&self, features: &[f64; FeatureVector::LEN], rows: Range<usize>) -> DMatrix<f64> {
        let (width, height) = (self.spec.width, self.spec.height);
        let (s1, s2) = (self.spec.input_scalar_1, self.spec.input_scalar_2);
        DMatrix::from_fn(rows.len() * width, NUM_INPUTS, |p, c| {
            let x = axis_coordinate(p % width, width);
            let y = axis_coordinate(rows.start + p / width, height);
            match c {
                0 => s1 * x,
                1 => s1 * y,
                2 => s1 * (x * x + y * y).sqrt(),
                k => s2 * features[k - NUM_SPATIAL_INPUTS],
            }
        })
    }

    /// Evaluate already drawn weights over the full pixel grid.
    pub fn render(&self, weights: &CppnWeights, features: &FeatureVector) -> Result<PixelGrid, ArtError> {
        if weights.num_inputs() != NUM_INPUTS {
            return Err(ArtError::InvalidParameter(format!(
                "weights take {} inputs, pixels provide {}",
                weights.num_inputs(),
                NUM_INPUTS
            )));
        }
        let values = features.to_array();
        if let Some(name) = FeatureVector::NAMES
            .iter()
            .zip(values.iter())
            .find(|(_, v)| !v.is_finite())
            .map(|(name, _)| name)
        {
            return Err(ArtError::InvalidParameter(format!(
                "feature {} is not finite",
                name
            )));
        }

        let (width, height) = (self.spec.width, self.spec.height);
        let mut data = vec![0u8; width * height * NUM_OUTPUTS];
        self.render_blocks(weights, &values, &mut data, width * height >= MIN_PIXELS_PAR);
        PixelGrid::from_raw(width, height, data)
    }

    /// Fill `data` block by block, on the rayon pool if `parallel`.
    ///
    /// Blocks are fixed by the image size, so the output does not depend on the thread count.
    fn render_blocks(
        &self,
        weights: &CppnWeights,
        values: &[f64; FeatureVector::LEN],
        data: &mut [u8],
        parallel: bool,
    ) {
        let row_bytes = self.spec.width * NUM_OUTPUTS;
        let render_block = |(b, block): (usize, &mut [u8])| {
            let start = b * ROWS_PER_BLOCK;
            let rows = start..start + block.len() / row_bytes;
            let out = weights.forward(&self.block_inputs(values, rows));
            for (p, px) in block.chunks_exact_mut(NUM_OUTPUTS).enumerate() {
                for (c, byte) in px.iter_mut().enumerate() {
                    *byte = to_byte(out[(p, c)]);
                }
            }
        };

        if parallel {
            data.par_chunks_mut(row_bytes * ROWS_PER_BLOCK)
                .enumerate()
                .for_each(render_block);
        } else {
            data.chunks_mut(row_bytes * ROWS_PER_BLOCK)
                .enumerate()
                .for_each(render_block);
        }
    }

    /// Draw weights from `rng` and render the image.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        features: &FeatureVector,
        rng: &mut R,
    ) -> Result<PixelGrid, ArtError> {
        let weights = self.weights(rng)?;
        self.render(&weights, features)
    }

    /// Draw weights and render the image. With a seed in the spec the result is
    /// reproducible, otherwise every call uses a fresh random stream.
    pub fn generate(&self, features: &FeatureVector) -> Result<PixelGrid, ArtError> {
        let mut rng = match self.spec.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        log::debug!(
            "Rendering {}x{} image: {} layers of width {}, {} activation, seed {:?}",
            self.spec.width,
            self.spec.height,
            self.spec.num_layers,
            self.spec.layer_width,
            self.activation,
            self.spec.seed
        );
        self.generate_with_rng(features, &mut rng)
    }
}

/// Generate the image of a feature vector for the given spec.
pub fn generate(features: &FeatureVector, spec: &NetworkSpec) -> Result<PixelGrid, ArtError> {
    CppnGenerator::new(spec.clone())?.generate(features)
}
