//! End-to-end: CSV on disk -> cleaned dataset -> features -> stacking model -> predictions,
//! including a save/load round trip through the model file.

mod common;

use common::corpus::{benign_url, corpus, malicious_url, quick_config};
use tempfile::tempdir;
use urlsift_core::dataset::Dataset;
use urlsift_core::ensemble::{train, Model, TrainError};
use urlsift_core::features::{extract, extract_batch};
use urlsift_core::label::Label;

fn write_csv(path: &std::path::Path, urls: &[String], labels: &[Label]) {
    let mut body = String::from("id,url,label\n");
    for (i, (url, label)) in urls.iter().zip(labels).enumerate() {
        body.push_str(&format!("{i},{url},{label}\n"));
    }
    // Rows the cleaner must drop.
    body.push_str("900,http://phish.example.com/x,phishing\n");
    body.push_str("901,,benign\n");
    body.push_str("902,http://nolabel.example.com,\n");
    std::fs::write(path, body).unwrap();
}

#[test]
fn csv_to_model_to_prediction() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("urls.csv");
    let (urls, labels) = corpus(60, 40);
    write_csv(&csv_path, &urls, &labels);

    let dataset = Dataset::load(&csv_path).expect("load dataset");
    assert_eq!(dataset.len(), 100);
    assert_eq!(dataset.count(Label::Malicious), 40);

    let outcome = train(&dataset.features(), &dataset.labels, &quick_config()).expect("train");
    assert_eq!(outcome.report.samples, 30);
    assert!(outcome.report.accuracy >= 0.9, "{}", outcome.report);

    let benign = outcome.model.predict(&extract("https://www.wiki.com/"));
    assert_eq!(benign.label, Label::Benign);
    let malicious = outcome
        .model
        .predict(&extract("http://10.1.2.3/wp-admin/login.php?id=7&session=8f3a&redirect=1"));
    assert_eq!(malicious.label, Label::Malicious);
}

#[test]
fn saved_model_predicts_identically() {
    let (urls, labels) = corpus(50, 30);
    let features = extract_batch(&urls);
    let model = train(&features, &labels, &quick_config()).unwrap().model;

    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    model.save_to_path(&path).unwrap();
    let loaded = Model::load_from_path(&path).unwrap();

    let probes: Vec<String> = (100..120)
        .map(benign_url)
        .chain((100..120).map(malicious_url))
        .chain(["".to_string(), "http://[::1".to_string(), "hxxp://x[.]y".to_string()])
        .collect();
    let probe_features = extract_batch(&probes);
    assert_eq!(model.predict_batch(&probe_features), loaded.predict_batch(&probe_features));
}

#[test]
fn predictions_are_deterministic_and_complementary() {
    let (urls, labels) = corpus(40, 40);
    let features = extract_batch(&urls);
    let model = train(&features, &labels, &quick_config()).unwrap().model;
    for f in &features {
        let a = model.predict(f);
        let b = model.predict(f);
        assert_eq!(a, b);
        let sum = a.probabilities.benign + a.probabilities.malicious;
        assert!((sum - 1.0).abs() < 1e-6);
    }
}

#[test]
fn retraining_yields_the_same_model() {
    let (urls, labels) = corpus(40, 25);
    let features = extract_batch(&urls);
    let a = train(&features, &labels, &quick_config()).unwrap();
    let b = train(&features, &labels, &quick_config()).unwrap();
    assert_eq!(a.model, b.model);
}

#[test]
fn single_class_dataset_is_refused() {
    let (urls, labels) = corpus(30, 0);
    let err = train(&extract_batch(&urls), &labels, &quick_config()).unwrap_err();
    assert_eq!(
        err,
        TrainError::SingleClass {
            present: Label::Benign
        }
    );
}
