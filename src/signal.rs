//! Multichannel recordings and the layouts describing which channels carry EEG.
//!
//! A [`SignalTable`] is always stored channels-as-rows (channels × samples).
//! Recordings written one sample per line, as BrainFlow does, are transposed
//! once at the boundary with [`SignalTable::from_samples`] or
//! [`SignalTable::load_from`].
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::error::ArtError;

/// A rectangular table of samples, one row per channel.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SignalTable {
    channels: Vec<Vec<f64>>,
}

impl SignalTable {
    /// Create a table from channel rows (channels × samples).
    /// The function returns an error if the rows do not all have the same length.
    pub fn from_channels(channels: Vec<Vec<f64>>) -> Result<Self, ArtError> {
        if let Some(first) = channels.first() {
            let num_samples = first.len();
            if let Some((id, row)) = channels
                .iter()
                .enumerate()
                .find(|(_, row)| row.len() != num_samples)
            {
                return Err(ArtError::InvalidTable(format!(
                    "channel {} has {} samples, expected {}",
                    id,
                    row.len(),
                    num_samples
                )));
            }
        }
        Ok(SignalTable { channels })
    }

    /// Create a table from sample rows (samples × channels), transposing it.
    pub fn from_samples(samples: &[Vec<f64>]) -> Result<Self, ArtError> {
        let num_channels = samples.first().map_or(0, |row| row.len());
        if let Some((id, row)) = samples
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != num_channels)
        {
            return Err(ArtError::InvalidTable(format!(
                "sample {} has {} values, expected {}",
                id,
                row.len(),
                num_channels
            )));
        }

        let channels = (0..num_channels)
            .map(|c| samples.iter().map(|row| row[c]).collect())
            .collect();
        Ok(SignalTable { channels })
    }

    /// Load a text recording with one sample per line.
    ///
    /// Values may be separated by tabs, commas or spaces. Blank lines are skipped.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ArtError> {
        let file = File::open(path).map_err(|e| ArtError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);

        let mut samples = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| ArtError::IOError(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let row = line
                .split(|c: char| c == '\t' || c == ',' || c.is_whitespace())
                .filter(|tok| !tok.is_empty())
                .map(|tok| {
                    tok.parse::<f64>().map_err(|e| {
                        ArtError::InvalidTable(format!(
                            "line {}: cannot parse {:?}: {}",
                            lineno + 1,
                            tok,
                            e
                        ))
                    })
                })
                .collect::<Result<Vec<f64>, ArtError>>()?;
            samples.push(row);
        }

        let table = SignalTable::from_samples(&samples)?;
        log::debug!(
            "Loaded recording with {} channels and {} samples",
            table.num_channels(),
            table.num_samples()
        );
        Ok(table)
    }

    /// Returns the number of channels (rows).
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Returns the number of samples per channel.
    pub fn num_samples(&self) -> usize {
        self.channels.first().map_or(0, |row| row.len())
    }

    /// A reference to a specific channel, or `None` if it does not exist.
    pub fn channel(&self, id: usize) -> Option<&[f64]> {
        self.channels.get(id).map(|row| row.as_slice())
    }

    /// Select the EEG channels declared by the layout, in layout order.
    ///
    /// Fails if the layout declares no EEG channel, more EEG channels than the table has,
    /// or a channel index that is out of range.
    pub fn eeg_channels(&self, layout: &ChannelLayout) -> Result<Vec<&[f64]>, ArtError> {
        let declared = layout.eeg_channels.len();
        if declared == 0 || declared > self.num_channels() {
            return Err(ArtError::ChannelMismatch {
                declared,
                present: self.num_channels(),
            });
        }

        layout
            .eeg_channels
            .iter()
            .map(|&id| {
                self.channel(id).ok_or_else(|| {
                    ArtError::InvalidChannel(format!(
                        "EEG channel {} is out of range for a table with {} channels",
                        id,
                        self.num_channels()
                    ))
                })
            })
            .collect()
    }
}

/// Describes the sampling rate of a recording and which of its rows are EEG.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ChannelLayout {
    /// The sampling rate in Hz.
    pub sampling_rate: f64,
    /// Row indices of the EEG channels.
    pub eeg_channels: Vec<usize>,
}

impl ChannelLayout {
    pub fn new(sampling_rate: f64, eeg_channels: Vec<usize>) -> Self {
        ChannelLayout {
            sampling_rate,
            eeg_channels,
        }
    }
}

/// Acquisition boards with a known BrainFlow recording layout.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Board {
    Synthetic,
    Cyton,
    CytonDaisy,
    Ganglion,
    Muse2,
    Muse2016,
}

impl Board {
    pub const ALL: [Board; 6] = [
        Board::Synthetic,
        Board::Cyton,
        Board::CytonDaisy,
        Board::Ganglion,
        Board::Muse2,
        Board::Muse2016,
    ];

    /// The BrainFlow board id.
    pub fn id(&self) -> i32 {
        match self {
            Board::Synthetic => -1,
            Board::Cyton => 0,
            Board::Ganglion => 1,
            Board::CytonDaisy => 2,
            Board::Muse2 => 22,
            Board::Muse2016 => 41,
        }
    }

    pub fn from_id(id: i32) -> Option<Board> {
        Board::ALL.iter().copied().find(|board| board.id() == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Board::Synthetic => "synthetic",
            Board::Cyton => "cyton",
            Board::CytonDaisy => "cyton-daisy",
            Board::Ganglion => "ganglion",
            Board::Muse2 => "muse2",
            Board::Muse2016 => "muse2016",
        }
    }

    /// The sampling rate in Hz.
    pub fn sampling_rate(&self) -> f64 {
        match self {
            Board::Synthetic | Board::Cyton => 250.0,
            Board::CytonDaisy => 125.0,
            Board::Ganglion => 200.0,
            Board::Muse2 | Board::Muse2016 => 256.0,
        }
    }

    /// Rows of a raw recording that carry EEG. Row 0 is the package counter.
    pub fn eeg_rows(&self) -> Vec<usize> {
        match self {
            Board::Synthetic | Board::CytonDaisy => (1..=16).collect(),
            Board::Cyton => (1..=8).collect(),
            Board::Ganglion | Board::Muse2 | Board::Muse2016 => (1..=4).collect(),
        }
    }

    pub fn layout(&self) -> ChannelLayout {
        ChannelLayout::new(self.sampling_rate(), self.eeg_rows())
    }
}

impl FromStr for Board {
    type Err = ArtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Board::ALL
            .iter()
            .copied()
            .find(|board| board.name() == key)
            .ok_or_else(|| ArtError::InvalidParameter(format!("unknown board {:?}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_channels_rejects_ragged_rows() {
        let res = SignalTable::from_channels(vec![vec![0.0; 4], vec![0.0; 3]]);
        assert!(matches!(res, Err(ArtError::InvalidTable(_))));
    }

    #[test]
    fn test_from_samples_transposes() {
        let samples = vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]];
        let table = SignalTable::from_samples(&samples).unwrap();
        assert_eq!(table.num_channels(), 2);
        assert_eq!(table.num_samples(), 3);
        assert_eq!(table.channel(0), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(table.channel(1), Some(&[10.0, 20.0, 30.0][..]));
    }

    #[test]
    fn test_eeg_channels() {
        let table = SignalTable::from_channels(vec![vec![0.0; 5], vec![1.0; 5], vec![2.0; 5]]).unwrap();

        let layout = ChannelLayout::new(250.0, vec![2, 1]);
        let eeg = table.eeg_channels(&layout).unwrap();
        assert_eq!(eeg, vec![&[2.0; 5][..], &[1.0; 5][..]]);

        let layout = ChannelLayout::new(250.0, vec![]);
        assert_eq!(
            table.eeg_channels(&layout),
            Err(ArtError::ChannelMismatch {
                declared: 0,
                present: 3
            })
        );

        let layout = ChannelLayout::new(250.0, vec![0, 1, 2, 3]);
        assert_eq!(
            table.eeg_channels(&layout),
            Err(ArtError::ChannelMismatch {
                declared: 4,
                present: 3
            })
        );

        let layout = ChannelLayout::new(250.0, vec![0, 7]);
        assert!(matches!(
            table.eeg_channels(&layout),
            Err(ArtError::InvalidChannel(_))
        ));
    }

    #[test]
    fn test_board_catalogue() {
        for board in Board::ALL {
            assert_eq!(Board::from_id(board.id()), Some(board));
            assert_eq!(board.name().parse::<Board>(), Ok(board));
        }
        assert_eq!(Board::Cyton.layout().eeg_channels, (1..=8).collect::<Vec<_>>());
        assert_eq!(Board::Muse2.layout().sampling_rate, 256.0);
        assert!("openbci".parse::<Board>().is_err());
    }

    #[test]
    fn test_load_from_mixed_separators() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0\t1.5\t-2.0").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "1, 2.5, -3.0").unwrap();
        writeln!(file, "2 3.5 -4.0").unwrap();

        let table = SignalTable::load_from(file.path()).unwrap();
        assert_eq!(table.num_channels(), 3);
        assert_eq!(table.num_samples(), 3);
        assert_eq!(table.channel(1), Some(&[1.5, 2.5, 3.5][..]));
    }

    #[test]
    fn test_load_from_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0\tabc").unwrap();
        assert!(matches!(
            SignalTable::load_from(file.path()),
            Err(ArtError::InvalidTable(_))
        ));
    }
}
