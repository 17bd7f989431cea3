use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use neuroart::classifier::LogisticClassifier;
use neuroart::cppn::{CppnGenerator, NetworkSpec};
use neuroart::error::ArtError;
use neuroart::features::{ExtractorConfig, FeatureExtractor, FeatureVector};
use neuroart::signal::{Board, SignalTable};

#[derive(Parser, Debug)]
#[command(name = "neuroart", version, about = "Generate CPPN artwork from an EEG recording")]
struct Args {
    /// The recording, one sample per line (tab, comma or space separated)
    input: PathBuf,
    /// The board that produced the recording: synthetic, cyton, cyton-daisy, ganglion, muse2 or muse2016
    #[arg(short, long, default_value = "synthetic")]
    board: String,
    /// A network spec JSON file; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// An extractor config JSON file (bands, detrend, nfft)
    #[arg(long)]
    extractor_config: Option<PathBuf>,
    /// Classifier coefficients JSON file
    #[arg(long)]
    classifier: Option<PathBuf>,
    /// The image width
    #[arg(long)]
    width: Option<usize>,
    /// The image height
    #[arg(long)]
    height: Option<usize>,
    /// The number of layers
    #[arg(short = 'L', long)]
    num_layers: Option<usize>,
    /// The width of the hidden layers
    #[arg(short = 'W', long)]
    layer_width: Option<usize>,
    /// The hidden-layer activation
    #[arg(short, long)]
    activation: Option<String>,
    /// The multiplier of the spatial inputs
    #[arg(long)]
    scalar_1: Option<f64>,
    /// The multiplier of the feature inputs
    #[arg(long)]
    scalar_2: Option<f64>,
    /// The seed of the network weights
    #[arg(short = 'S', long)]
    seed: Option<u64>,
    /// The output image; the format follows the extension
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Also write the feature vector as JSON
    #[arg(long)]
    features_out: Option<PathBuf>,
    /// The log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn network_spec(&self) -> Result<NetworkSpec, ArtError> {
        let mut spec = match &self.config {
            Some(path) => NetworkSpec::load_from(path)?,
            None => NetworkSpec::default(),
        };
        spec.width = self.width.unwrap_or(spec.width);
        spec.height = self.height.unwrap_or(spec.height);
        spec.num_layers = self.num_layers.unwrap_or(spec.num_layers);
        spec.layer_width = self.layer_width.unwrap_or(spec.layer_width);
        if let Some(activation) = &self.activation {
            spec.activation = activation.clone();
        }
        spec.input_scalar_1 = self.scalar_1.unwrap_or(spec.input_scalar_1);
        spec.input_scalar_2 = self.scalar_2.unwrap_or(spec.input_scalar_2);
        spec.seed = self.seed.or(spec.seed);
        Ok(spec)
    }

    fn extractor(&self) -> Result<FeatureExtractor<LogisticClassifier>, ArtError> {
        let config = match &self.extractor_config {
            Some(path) => ExtractorConfig::load_from(path)?,
            None => ExtractorConfig::default(),
        };
        let classifier = match &self.classifier {
            Some(path) => LogisticClassifier::load_from(path)?,
            None => LogisticClassifier::default(),
        };
        Ok(FeatureExtractor::new(config, classifier))
    }
}

fn init_logging(level: &str) -> Result<(), ArtError> {
    let level = LevelFilter::from_str(level)
        .map_err(|e| ArtError::InvalidParameter(format!("log level {:?}: {}", level, e)))?;
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .map_err(|e| ArtError::IOError(e.to_string()))?;
    log4rs::init_config(config).map_err(|e| ArtError::IOError(e.to_string()))?;
    Ok(())
}

fn main() -> Result<(), ArtError> {
    let args = Args::parse();
    init_logging(&args.log_level)?;
    log::debug!("{:?}", args);

    let board = Board::from_str(&args.board)?;
    let spec = args.network_spec()?;
    // Fail on a bad spec before the recording is processed.
    let generator = CppnGenerator::new(spec)?;
    let extractor = args.extractor()?;

    let table = SignalTable::load_from(&args.input)?;
    log::info!(
        "Recording loaded: {} channels, {} samples ({} board, {} Hz)",
        table.num_channels(),
        table.num_samples(),
        board.name(),
        board.sampling_rate()
    );

    let features = extractor.extract(&table, &board.layout())?;
    for (name, value) in FeatureVector::NAMES.iter().zip(features.to_array()) {
        log::info!("{:>13}: {:.3}", name, value);
    }

    if let Some(path) = &args.features_out {
        features.save_to(path)?;
        log::info!("Feature vector saved to {}", path.display());
    }

    let spec = generator.spec();
    log::info!(
        "Generating {}x{} image ({} layers of width {}, {} activation)...",
        spec.width,
        spec.height,
        spec.num_layers,
        spec.layer_width,
        spec.activation
    );
    let image = generator.generate(&features)?;

    let output = args.output.clone().unwrap_or_else(|| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        PathBuf::from(format!("neuroart_{}.png", secs))
    });
    image.save_to(&output)?;
    log::info!("Image saved to {}", output.display());

    Ok(())
}
