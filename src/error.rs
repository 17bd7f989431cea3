//! Error module for the neuroart library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum ArtError {
    /// Error for a recording too short to hold one analysis window.
    InsufficientData { required: usize, found: usize },
    /// Error for a channel layout declaring more (or zero) EEG channels than the table provides.
    ChannelMismatch { declared: usize, present: usize },
    /// Error for a declared EEG channel that does not exist in the table.
    InvalidChannel(String),
    /// Error for a malformed signal table, e.g., rows of different lengths.
    InvalidTable(String),
    /// Error for an invalid network specification, e.g., a zero-sized resolution.
    InvalidSpec(String),
    /// Error for an activation name that is not recognized.
    UnsupportedActivation(String),
    /// Error for invalid parameters
    InvalidParameter(String),
    /// Error for I/O operations.
    IOError(String),
}

impl fmt::Display for ArtError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArtError::InsufficientData { required, found } => write!(
                f,
                "Insufficient data: at least {} samples are required, found {}",
                required, found
            ),
            ArtError::ChannelMismatch { declared, present } => write!(
                f,
                "Channel mismatch: layout declares {} EEG channels, table has {} channels",
                declared, present
            ),
            ArtError::InvalidChannel(e) => write!(f, "Invalid channel: {}", e),
            ArtError::InvalidTable(e) => write!(f, "Invalid signal table: {}", e),
            ArtError::InvalidSpec(e) => write!(f, "Invalid network spec: {}", e),
            ArtError::UnsupportedActivation(e) => write!(f, "Unsupported activation: {}", e),
            ArtError::InvalidParameter(e) => write!(f, "Invalid parameters: {}", e),
            ArtError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for ArtError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_offending_field() {
        let err = ArtError::ChannelMismatch {
            declared: 8,
            present: 4,
        };
        assert_eq!(
            err.to_string(),
            "Channel mismatch: layout declares 8 EEG channels, table has 4 channels"
        );

        let err = ArtError::UnsupportedActivation("swish".to_string());
        assert_eq!(err.to_string(), "Unsupported activation: swish");
    }
}
