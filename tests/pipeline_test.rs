use std::f64::consts::PI;

use neuroart::classifier::LogisticClassifier;
use neuroart::cppn::{generate, NetworkSpec};
use neuroart::error::ArtError;
use neuroart::features::{extract, ExtractorConfig, FeatureExtractor, FeatureVector};
use neuroart::signal::{Board, ChannelLayout, SignalTable};

const FS: f64 = 250.0;

fn zero_table() -> SignalTable {
    SignalTable::from_channels(vec![vec![0.0; 1000]; 8]).unwrap()
}

fn mixed_table(num_channels: usize, num_samples: usize) -> SignalTable {
    let channels = (0..num_channels)
        .map(|c| {
            (0..num_samples)
                .map(|i| {
                    let t = i as f64 / FS;
                    (2.0 * PI * 2.0 * t).sin()
                        + 0.5 * (2.0 * PI * (9.0 + c as f64) * t).sin()
                        + 0.25 * (2.0 * PI * 21.0 * t + c as f64).sin()
                        + 0.1 * (2.0 * PI * 37.0 * t).cos()
                })
                .collect()
        })
        .collect();
    SignalTable::from_channels(channels).unwrap()
}

#[test]
fn test_zero_recording_scenario() {
    let layout = ChannelLayout::new(FS, (0..8).collect());
    let features = extract(&zero_table(), &layout).unwrap();

    let bands = features.bands().to_array();
    assert!(bands.iter().all(|b| *b == bands[0]));
    assert_eq!(bands[0], 0.2);
    assert!(features.to_array().iter().all(|v| v.is_finite()));

    let spec = NetworkSpec::new(4, 4, 2, 4)
        .with_activation("tanh")
        .with_seed(Some(42));
    let first = generate(&features, &spec).unwrap();
    assert_eq!(first.as_raw().len(), 4 * 4 * 3);
    for _ in 0..3 {
        assert_eq!(generate(&features, &spec).unwrap(), first);
    }
}

#[test]
fn test_features_are_bounded() {
    for (num_channels, num_samples) in [(1, 256), (4, 1000), (8, 2500)] {
        let table = mixed_table(num_channels, num_samples);
        let layout = ChannelLayout::new(FS, (0..num_channels).collect());
        let features = extract(&table, &layout).unwrap();
        for (name, value) in FeatureVector::NAMES.iter().zip(features.to_array()) {
            assert!((0.0..=1.0).contains(&value), "{} = {}", name, value);
        }
        assert!((features.bands().total() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_zero_eeg_channels_is_an_error() {
    let layout = ChannelLayout::new(FS, vec![]);
    assert_eq!(
        extract(&zero_table(), &layout),
        Err(ArtError::ChannelMismatch {
            declared: 0,
            present: 8
        })
    );

    let empty = SignalTable::from_channels(vec![]).unwrap();
    let layout = ChannelLayout::new(FS, vec![0]);
    assert_eq!(
        extract(&empty, &layout),
        Err(ArtError::ChannelMismatch {
            declared: 1,
            present: 0
        })
    );
}

#[test]
fn test_board_layout_on_raw_recording() {
    // Package counter, 8 EEG rows, then 3 accelerometer rows.
    let eeg = mixed_table(8, 500);
    let mut rows: Vec<Vec<f64>> = vec![(0..500).map(|i| (i % 256) as f64).collect()];
    rows.extend((0..8).map(|c| eeg.channel(c).unwrap().to_vec()));
    rows.extend((0..3).map(|_| vec![1.0; 500]));
    let raw = SignalTable::from_channels(rows).unwrap();

    let from_board = extract(&raw, &Board::Cyton.layout()).unwrap();
    let from_eeg = extract(&eeg, &ChannelLayout::new(FS, (0..8).collect())).unwrap();
    assert_eq!(from_board, from_eeg);

    // The synthetic board declares 16 EEG rows, more than the table holds.
    let eeg_only = mixed_table(8, 500);
    assert_eq!(
        extract(&eeg_only, &Board::Synthetic.layout()),
        Err(ArtError::ChannelMismatch {
            declared: 16,
            present: 8
        })
    );
}

#[test]
fn test_different_features_give_different_images() {
    let spec = NetworkSpec::new(16, 16, 3, 8).with_seed(Some(42));
    let a = FeatureVector::from_array([0.2; 8]);
    let b = FeatureVector::from_array([0.6, 0.1, 0.1, 0.1, 0.1, 0.9, 0.2, 0.8]);
    assert_ne!(generate(&a, &spec).unwrap(), generate(&b, &spec).unwrap());
}

#[test]
fn test_scalars_control_sensitivity() {
    // With the feature scalar at zero the features no longer reach the network.
    let spec = NetworkSpec::new(12, 9, 3, 6)
        .with_scalars(1.0, 0.0)
        .with_seed(Some(5));
    let a = FeatureVector::from_array([0.2; 8]);
    let b = FeatureVector::from_array([0.6, 0.1, 0.1, 0.1, 0.1, 0.9, 0.2, 0.8]);
    assert_eq!(generate(&a, &spec).unwrap(), generate(&b, &spec).unwrap());
}

#[test]
fn test_shape_contract() {
    let features = FeatureVector::from_array([0.2, 0.2, 0.2, 0.2, 0.2, 0.5, 0.5, 0.5]);
    for (width, height) in [(1, 1), (1, 7), (9, 1), (33, 17), (300, 250)] {
        for activation in ["tanh", "sigmoid", "relu", "sin", "gaussian"] {
            let spec = NetworkSpec::new(width, height, 2, 5)
                .with_activation(activation)
                .with_seed(Some(1));
            let image = generate(&features, &spec).unwrap();
            assert_eq!(image.dimensions(), (width, height));
            assert_eq!(image.as_raw().len(), width * height * 3);
        }
    }
}

#[test]
fn test_full_pipeline_through_files() {
    let dir = tempfile::tempdir().unwrap();

    let spec_path = dir.path().join("spec.json");
    NetworkSpec::new(24, 16, 4, 9)
        .with_seed(Some(9))
        .save_to(&spec_path)
        .unwrap();

    let recording = dir.path().join("recording.csv");
    let table = mixed_table(4, 600);
    let lines: Vec<String> = (0..table.num_samples())
        .map(|i| {
            (0..table.num_channels())
                .map(|c| table.channel(c).unwrap()[i].to_string())
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect();
    std::fs::write(&recording, lines.join("\n")).unwrap();

    let loaded = SignalTable::load_from(&recording).unwrap();
    assert_eq!(loaded, table);

    let extractor = FeatureExtractor::new(ExtractorConfig::default(), LogisticClassifier::default());
    let features = extractor
        .extract(&loaded, &ChannelLayout::new(FS, vec![0, 1, 2, 3]))
        .unwrap();

    let spec = NetworkSpec::load_from(&spec_path).unwrap();
    let image = generate(&features, &spec).unwrap();
    let output = dir.path().join("art.png");
    image.save_to(&output).unwrap();

    let decoded = image::open(&output).unwrap().to_rgb8();
    assert_eq!(decoded.into_raw(), image.into_raw());
}
