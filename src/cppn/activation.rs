//! Activation functions applied by the hidden layers of the network.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::classifier::sigmoid;
use crate::error::ArtError;

/// The supported activation functions.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Tanh,
    Sigmoid,
    Relu,
    Sin,
    Cos,
    /// `exp(-z^2)`
    Gaussian,
    Softplus,
    Identity,
}

impl Activation {
    pub const ALL: [Activation; 8] = [
        Activation::Tanh,
        Activation::Sigmoid,
        Activation::Relu,
        Activation::Sin,
        Activation::Cos,
        Activation::Gaussian,
        Activation::Softplus,
        Activation::Identity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Activation::Tanh => "tanh",
            Activation::Sigmoid => "sigmoid",
            Activation::Relu => "relu",
            Activation::Sin => "sin",
            Activation::Cos => "cos",
            Activation::Gaussian => "gaussian",
            Activation::Softplus => "softplus",
            Activation::Identity => "identity",
        }
    }

    #[inline]
    pub fn apply(&self, z: f64) -> f64 {
        match self {
            Activation::Tanh => z.tanh(),
            Activation::Sigmoid => sigmoid(z),
            Activation::Relu => z.max(0.0),
            Activation::Sin => z.sin(),
            Activation::Cos => z.cos(),
            Activation::Gaussian => (-z * z).exp(),
            Activation::Softplus => z.max(0.0) + (-z.abs()).exp().ln_1p(),
            Activation::Identity => z,
        }
    }
}

impl FromStr for Activation {
    type Err = ArtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Activation::ALL
            .iter()
            .copied()
            .find(|activation| activation.name() == key)
            .ok_or_else(|| ArtError::UnsupportedActivation(s.to_string()))
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
