//! End-to-end evaluation of the reference examples.

use candle_core::{DType, Device, Tensor};
use candle_nn::VarMap;
use emotion_rnn::config::{ArchitecturePreset, ClassifierConfig, TokenizerConfig};
use emotion_rnn::emotions::{EMOTIONS, EXAMPLES, MAX_TEXT_LEN, OUTPUT_SIZE};
use emotion_rnn::evaluation::EvaluationHarness;
use emotion_rnn::labels::LabelSet;
use emotion_rnn::model::SequenceClassifier;
use emotion_rnn::text::Tokenizer;
use rstest::{fixture, rstest};

/// A classifier whose head ignores its input and always favours `label`.
fn always_predicting(label: &str, classes: &LabelSet, vocab_size: usize) -> SequenceClassifier {
    let config = ClassifierConfig::preset(ArchitecturePreset::UnidirectionalLstm, vocab_size, MAX_TEXT_LEN, OUTPUT_SIZE);
    let device = Device::Cpu;
    let mut var_map = VarMap::new();
    let model = SequenceClassifier::with_var_map(&config, &var_map, &device)
        .unwrap_or_else(|e| panic!("build: {e}"));
    let width = config.recurrent_sizes().last().copied().unwrap_or_default();
    let target = classes.position(label).unwrap_or_else(|e| panic!("{e}"));
    let mut bias = vec![0.0_f32; OUTPUT_SIZE];
    bias[target] = 10.0;
    let weight = Tensor::zeros((OUTPUT_SIZE, width), DType::F32, &device).unwrap_or_else(|e| panic!("{e}"));
    let bias = Tensor::new(bias.as_slice(), &device).unwrap_or_else(|e| panic!("{e}"));
    var_map.set_one("head.weight", weight).unwrap_or_else(|e| panic!("{e}"));
    var_map.set_one("head.bias", bias).unwrap_or_else(|e| panic!("{e}"));
    model
}

#[fixture]
fn tokenizer() -> Tokenizer {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    tokenizer.fit(EXAMPLES.iter().map(|(sentence, _)| sentence));
    tokenizer
}

#[rstest]
fn neutral_model_scores_only_neutral_examples(tokenizer: Tokenizer) {
    let classes = LabelSet::fit(EMOTIONS);
    let vocab_size = tokenizer
        .vocabulary()
        .unwrap_or_else(|e| panic!("{e}"))
        .index_space();
    let model = always_predicting("neutral", &classes, vocab_size);
    let harness = EvaluationHarness::new(&tokenizer, &model, &classes, MAX_TEXT_LEN);
    let report = harness
        .run(EXAMPLES.iter().copied())
        .unwrap_or_else(|e| panic!("{e}"));

    let neutral = EXAMPLES.iter().filter(|(_, label)| *label == "neutral").count();
    assert_eq!(report.correct, neutral);
    assert_eq!(report.total(), EXAMPLES.len());
    assert!(report.outcomes.iter().all(|o| o.predicted == "neutral"));
}

#[rstest]
fn restored_tokens_match_every_sentence(tokenizer: Tokenizer) {
    let classes = LabelSet::fit(EMOTIONS);
    let vocab_size = tokenizer
        .vocabulary()
        .unwrap_or_else(|e| panic!("{e}"))
        .index_space();
    let model = always_predicting("neutral", &classes, vocab_size);
    let harness = EvaluationHarness::new(&tokenizer, &model, &classes, MAX_TEXT_LEN);
    let report = harness
        .run(EXAMPLES.iter().copied())
        .unwrap_or_else(|e| panic!("{e}"));

    for outcome in &report.outcomes {
        assert_eq!(outcome.restored, tokenizer.split(&outcome.sentence));
    }
}
