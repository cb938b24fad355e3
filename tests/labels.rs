//! Integration tests for the categorical encoder and decoder.

use emotion_rnn::emotions::EMOTIONS;
use emotion_rnn::labels::{LabelError, LabelSet, one_hot_to_enumerate};
use rstest::{fixture, rstest};

#[fixture]
fn classes() -> LabelSet {
    LabelSet::fit(["a", "b", "c"])
}

#[fixture]
fn labels() -> Vec<&'static str> {
    vec!["b", "a", "c", "b"]
}

#[rstest]
fn enumerate_round_trip(classes: LabelSet, labels: Vec<&'static str>) {
    let encoded = classes
        .enumerate_encode(&labels)
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(encoded, vec![1, 0, 2, 1]);
    assert_eq!(
        classes.enumerate_decode(&encoded).unwrap_or_else(|e| panic!("{e}")),
        labels
    );
}

#[rstest]
fn one_hot_round_trip(classes: LabelSet, labels: Vec<&'static str>) {
    let encoded = classes
        .one_hot_encode(&labels)
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(encoded[0], vec![0.0, 1.0, 0.0]);
    assert_eq!(
        classes.one_hot_decode(&encoded).unwrap_or_else(|e| panic!("{e}")),
        labels
    );
    assert_eq!(
        one_hot_to_enumerate(&encoded),
        classes.enumerate_encode(&labels)
    );
}

#[rstest]
fn encoding_is_deterministic(classes: LabelSet, labels: Vec<&'static str>) {
    assert_eq!(classes.one_hot_encode(&labels), classes.one_hot_encode(&labels));
    assert_eq!(
        classes.enumerate_encode(&labels),
        classes.enumerate_encode(&labels)
    );
}

#[rstest]
fn unseen_label_gets_no_slot(classes: LabelSet) {
    assert_eq!(
        classes.enumerate_encode(["d"]),
        Err(LabelError::UnknownLabel { label: "d".into() })
    );
    assert_eq!(classes.len(), 3);
}

#[rstest]
fn emotions_are_already_sorted() {
    let classes = LabelSet::fit(EMOTIONS);
    assert_eq!(classes.classes(), EMOTIONS.as_slice());
    assert_eq!(classes.position("neutral"), Ok(10));
}
