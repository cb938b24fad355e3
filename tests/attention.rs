//! Integration tests for attention pooling.

use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use emotion_rnn::model::{AttentionPooling, ClassifierError};
use emotion_rnn::tests::support::sums_to_one;
use rstest::rstest;

fn pooling(timesteps: usize) -> AttentionPooling {
    let var_map = VarMap::new();
    let vb = VarBuilder::from_varmap(&var_map, DType::F32, &Device::Cpu);
    AttentionPooling::new(timesteps, vb).unwrap_or_else(|e| panic!("build: {e}"))
}

#[rstest]
#[case(1, 1, 1)]
#[case(2, 5, 3)]
#[case(4, 30, 16)]
fn weights_sum_to_one_over_time(#[case] batch: usize, #[case] timesteps: usize, #[case] channels: usize) {
    let attention = pooling(timesteps);
    let hidden = Tensor::randn(0_f32, 1.0, (batch, timesteps, channels), &Device::Cpu)
        .unwrap_or_else(|e| panic!("{e}"));
    let weights = attention.weights(&hidden).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(weights.dims(), &[batch, timesteps, channels]);

    let per_channel: Vec<Vec<Vec<f32>>> = weights
        .transpose(1, 2)
        .and_then(|t| t.to_vec3())
        .unwrap_or_else(|e| panic!("{e}"));
    for row in &per_channel {
        for over_time in row {
            assert!(sums_to_one(over_time, 1e-4), "{over_time:?}");
            assert!(over_time.iter().all(|w| *w >= 0.0));
        }
    }
}

#[rstest]
fn pooled_width_equals_channel_width() {
    let attention = pooling(6);
    let hidden = Tensor::randn(0_f32, 1.0, (3, 6, 10), &Device::Cpu).unwrap_or_else(|e| panic!("{e}"));
    let pooled = attention.forward(&hidden).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(pooled.dims(), &[3, 10]);
}

#[rstest]
fn wrong_sequence_length_is_rejected() {
    let attention = pooling(6);
    let hidden = Tensor::zeros((1, 5, 2), DType::F32, &Device::Cpu).unwrap_or_else(|e| panic!("{e}"));
    assert!(matches!(
        attention.weights(&hidden),
        Err(ClassifierError::TimestepMismatch { expected: 6, actual: 5 })
    ));
}
