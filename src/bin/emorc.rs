use std::fs;
use std::process::ExitCode;

use candle_core::Device;
use candle_nn::VarMap;
use emotion_rnn::cli::EmorcArgs;
use emotion_rnn::config::{ClassifierConfig, TokenizerConfig};
use emotion_rnn::emotions::{EMOTIONS, EXAMPLES, OUTPUT_SIZE};
use emotion_rnn::evaluation::EvaluationHarness;
use emotion_rnn::labels::LabelSet;
use emotion_rnn::model::SequenceClassifier;
use emotion_rnn::text::Tokenizer;
use ortho_config::OrthoConfig;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = EmorcArgs::load()?;
    let preset = args.preset()?;
    let tokenizer_config = TokenizerConfig {
        max_words: args.max_words(),
        ..TokenizerConfig::default()
    }
    .validate()?;

    let mut tokenizer = Tokenizer::new(tokenizer_config);
    match &args.corpus {
        Some(path) => {
            let corpus = fs::read_to_string(path)?;
            tokenizer.fit(corpus.lines());
        }
        None => tokenizer.fit(EXAMPLES.iter().map(|(sentence, _)| sentence)),
    }
    let vocab_size = tokenizer.vocabulary()?.index_space();
    let config = ClassifierConfig::preset(preset, vocab_size, args.max_length(), OUTPUT_SIZE);
    config.validate()?;

    if args.dry_run {
        info!(preset = preset.name(), vocab_size, "configuration is valid");
        return Ok(());
    }

    let mut var_map = VarMap::new();
    let model = SequenceClassifier::with_var_map(&config, &var_map, &Device::Cpu)?;
    match args.weights_artefact() {
        Some(artefact) => artefact.load_into(&mut var_map)?,
        None => info!("no weights given; evaluating an untrained classifier"),
    }

    let classes = LabelSet::fit(EMOTIONS);
    let harness = EvaluationHarness::new(&tokenizer, &model, &classes, config.max_length);
    let report = harness.run(EXAMPLES.iter().copied())?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
