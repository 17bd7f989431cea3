//! The randomly drawn layers of a CPPN and their batched forward pass.
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::activation::Activation;
use crate::classifier::sigmoid;
use crate::error::ArtError;

/// Number of colour channels produced by the network.
pub const NUM_OUTPUTS: usize = 3;

/// A fully-connected layer `z = x W + b`, with one input row per pixel.
#[derive(Debug, PartialEq, Clone)]
pub struct Layer {
    /// Weight matrix of shape (inputs, outputs).
    weights: DMatrix<f64>,
    /// Bias of length outputs.
    bias: DVector<f64>,
}

impl Layer {
    pub fn new(weights: DMatrix<f64>, bias: DVector<f64>) -> Result<Self, ArtError> {
        if weights.ncols() != bias.len() {
            return Err(ArtError::InvalidParameter(format!(
                "layer has {} outputs but {} biases",
                weights.ncols(),
                bias.len()
            )));
        }
        Ok(Layer { weights, bias })
    }

    /// Draw the weights (column-major) then the bias.
    fn rand<R: Rng + ?Sized, D: Distribution<f64>>(
        num_inputs: usize,
        num_outputs: usize,
        dist: &D,
        rng: &mut R,
    ) -> Self {
        let weights = DMatrix::from_fn(num_inputs, num_outputs, |_, _| dist.sample(rng));
        let bias = DVector::from_fn(num_outputs, |_, _| dist.sample(rng));
        Layer { weights, bias }
    }

    pub fn num_inputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn num_outputs(&self) -> usize {
        self.weights.ncols()
    }

    pub fn weights(&self) -> &DMatrix<f64> {
        &self.weights
    }

    pub fn bias(&self) -> &DVector<f64> {
        &self.bias
    }

    /// Returns `f(x W + b)` applied elementwise.
    fn forward<F: Fn(f64) -> f64>(&self, x: &DMatrix<f64>, f: F) -> DMatrix<f64> {
        let mut z = x * &self.weights;
        for (j, mut col) in z.column_iter_mut().enumerate() {
            let b = self.bias[j];
            col.apply(|v| *v = f(*v + b));
        }
        z
    }
}

/// The immutable weights of one CPPN draw.
///
/// The first layer maps the pixel inputs to `layer_width` units, hidden layers map
/// `layer_width` to `layer_width`, and the last layer maps to the three colour channels.
/// With a single layer, the inputs are projected directly to colour.
#[derive(Debug, PartialEq, Clone)]
pub struct CppnWeights {
    layers: Vec<Layer>,
    activation: Activation,
}

impl CppnWeights {
    /// Draw all weights and biases from the standard normal distribution.
    pub fn rand<R: Rng + ?Sized>(
        num_inputs: usize,
        num_layers: usize,
        layer_width: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self, ArtError> {
        if num_inputs == 0 || num_layers == 0 || layer_width == 0 {
            return Err(ArtError::InvalidSpec(format!(
                "network dimensions must be positive, got {} inputs, {} layers of width {}",
                num_inputs, num_layers, layer_width
            )));
        }
        let dist = Normal::new(0.0, 1.0)
            .map_err(|e| ArtError::InvalidParameter(format!("Invalid weight distribution: {}", e)))?;

        let widths: Vec<usize> = std::iter::once(num_inputs)
            .chain(std::iter::repeat(layer_width).take(num_layers - 1))
            .chain(std::iter::once(NUM_OUTPUTS))
            .collect();
        let layers = widths
            .windows(2)
            .map(|w| Layer::rand(w[0], w[1], &dist, rng))
            .collect();

        Ok(CppnWeights { layers, activation })
    }

    /// Assemble weights from explicit layers, checking that consecutive shapes agree
    /// and that the last layer produces colour.
    pub fn from_layers(layers: Vec<Layer>, activation: Activation) -> Result<Self, ArtError> {
        let last = layers
            .last()
            .ok_or_else(|| ArtError::InvalidSpec("a network needs at least one layer".to_string()))?;
        if last.num_outputs() != NUM_OUTPUTS {
            return Err(ArtError::InvalidSpec(format!(
                "the last layer must have {} outputs, got {}",
                NUM_OUTPUTS,
                last.num_outputs()
            )));
        }
        if let Some(l) = layers
            .windows(2)
            .position(|w| w[0].num_outputs() != w[1].num_inputs())
        {
            return Err(ArtError::InvalidSpec(format!(
                "layer {} has {} outputs but layer {} has {} inputs",
                l,
                layers[l].num_outputs(),
                l + 1,
                layers[l + 1].num_inputs()
            )));
        }
        Ok(CppnWeights { layers, activation })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn num_inputs(&self) -> usize {
        self.layers[0].num_inputs()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Evaluate the network on a batch of inputs, one row per pixel.
    ///
    /// Hidden layers use the configured activation and the last layer the logistic
    /// sigmoid, so every output lies in `[0, 1]`. Returns a matrix of shape (rows, 3).
    pub fn forward(&self, inputs: &DMatrix<f64>) -> DMatrix<f64> {
        let last = self.layers.len() - 1;
        let mut h: Option<DMatrix<f64>> = None;
        for (l, layer) in self.layers.iter().enumerate() {
            let x = h.as_ref().unwrap_or(inputs);
            h = Some(if l == last {
                layer.forward(x, sigmoid)
            } else {
                layer.forward(x, |z| self.activation.apply(z))
            });
        }
        h.unwrap_or_else(|| DMatrix::zeros(inputs.nrows(), NUM_OUTPUTS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_rand_shapes() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let weights = CppnWeights::rand(11, 4, 6, Activation::Tanh, &mut rng).unwrap();
        let shapes: Vec<(usize, usize)> = weights
            .layers()
            .iter()
            .map(|l| (l.num_inputs(), l.num_outputs()))
            .collect();
        assert_eq!(shapes, vec![(11, 6), (6, 6), (6, 6), (6, 3)]);

        let weights = CppnWeights::rand(11, 1, 6, Activation::Tanh, &mut rng).unwrap();
        assert_eq!(weights.num_layers(), 1);
        assert_eq!(weights.layers()[0].weights().shape(), (11, 3));

        assert!(matches!(
            CppnWeights::rand(11, 0, 6, Activation::Tanh, &mut rng),
            Err(ArtError::InvalidSpec(_))
        ));
    }

    #[test]
    fn test_rand_is_reproducible() {
        let a = CppnWeights::rand(11, 3, 5, Activation::Sin, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = CppnWeights::rand(11, 3, 5, Activation::Sin, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let c = CppnWeights::rand(11, 3, 5, Activation::Sin, &mut ChaCha8Rng::seed_from_u64(8)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_forward_known_values() {
        // Identity hidden layer, then a last layer summing to the three outputs.
        let first = Layer::new(
            DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]),
            DVector::from_vec(vec![0.0, 0.0]),
        )
        .unwrap();
        let last = Layer::new(
            DMatrix::from_row_slice(2, 3, &[1.0, 0.0, -1.0, 0.0, 0.0, 0.0]),
            DVector::from_vec(vec![0.0, 0.0, 0.0]),
        )
        .unwrap();
        let weights = CppnWeights::from_layers(vec![first, last], Activation::Relu).unwrap();

        let inputs = DMatrix::from_row_slice(2, 2, &[2.0, 5.0, -2.0, 5.0]);
        let out = weights.forward(&inputs);
        assert_eq!(out.shape(), (2, 3));
        assert_eq!(out[(0, 0)], sigmoid(2.0));
        assert_eq!(out[(0, 1)], 0.5);
        assert_eq!(out[(0, 2)], sigmoid(-2.0));
        // relu clips the negative input of the second row
        assert_eq!(out[(1, 0)], 0.5);
        assert_eq!(out[(1, 2)], 0.5);
    }

    #[test]
    fn test_from_layers_rejects_bad_shapes() {
        let a = Layer::new(DMatrix::zeros(4, 5), DVector::zeros(5)).unwrap();
        let b = Layer::new(DMatrix::zeros(6, 3), DVector::zeros(3)).unwrap();
        assert!(matches!(
            CppnWeights::from_layers(vec![a.clone(), b], Activation::Tanh),
            Err(ArtError::InvalidSpec(_))
        ));
        assert!(matches!(
            CppnWeights::from_layers(vec![a], Activation::Tanh),
            Err(ArtError::InvalidSpec(_))
        ));
        assert!(matches!(
            CppnWeights::from_layers(vec![], Activation::Tanh),
            Err(ArtError::InvalidSpec(_))
        ));
        assert!(Layer::new(DMatrix::zeros(2, 3), DVector::zeros(2)).is_err());
    }
}
