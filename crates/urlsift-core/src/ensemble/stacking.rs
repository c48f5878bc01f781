//! Training protocol: stratified holdout, k-fold out-of-fold base predictions, meta-learner
//! fit, base-learner refit, holdout scoring.

use super::{
    stratified_folds, stratified_split, EvaluationReport, GradientBoosting, LogisticRegression,
    MetaRow, Model, RandomForest, Row, TrainError,
};
use crate::config::TrainingConfig;
use crate::features::FeatureVector;
use crate::label::Label;

/// A trained model plus its held-out evaluation. The report is not part of the model.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: Model,
    pub report: EvaluationReport,
}

/// Train a fresh [`Model`]. Fails before fitting anything when a precondition does not hold.
pub fn train(
    features: &[FeatureVector],
    labels: &[Label],
    config: &TrainingConfig,
) -> Result<TrainingOutcome, TrainError> {
    config.validate()?;
    check_inputs(features, labels)?;

    let partition = stratified_split(labels, config.test_fraction, config.seed);
    let train_labels: Vec<Label> = partition.train.iter().map(|&i| labels[i]).collect();
    let minority = [Label::Benign, Label::Malicious]
        .iter()
        .map(|&class| train_labels.iter().filter(|&&l| l == class).count())
        .min()
        .unwrap_or(0);
    if minority < config.cv_folds {
        return Err(TrainError::TooFewMinority {
            found: minority,
            folds: config.cv_folds,
        });
    }
    tracing::info!(
        train = partition.train.len(),
        test = partition.test.len(),
        minority,
        "stratified split"
    );

    let train_rows: Vec<Row> = partition
        .train
        .iter()
        .map(|&i| features[i].to_array())
        .collect();
    let train_targets: Vec<f64> = train_labels.iter().map(|l| l.target()).collect();

    let meta_inputs = out_of_fold(&train_rows, &train_targets, &train_labels, config);
    let meta = LogisticRegression::fit(&meta_inputs, &train_targets, &config.meta);

    let forest = RandomForest::fit(&train_rows, &train_targets, &config.forest);
    let boosting = GradientBoosting::fit(&train_rows, &train_targets, &config.boosting);
    let model = Model::new(forest, boosting, meta);

    let truth: Vec<Label> = partition.test.iter().map(|&i| labels[i]).collect();
    let predicted: Vec<Label> = partition
        .test
        .iter()
        .map(|&i| model.predict(&features[i]).label)
        .collect();
    let report = EvaluationReport::from_predictions(&truth, &predicted);
    tracing::info!(
        accuracy = report.accuracy,
        samples = report.samples,
        "held-out evaluation"
    );

    Ok(TrainingOutcome { model, report })
}

fn check_inputs(features: &[FeatureVector], labels: &[Label]) -> Result<(), TrainError> {
    if features.len() != labels.len() {
        return Err(TrainError::LengthMismatch {
            features: features.len(),
            labels: labels.len(),
        });
    }
    let Some(&first) = labels.first() else {
        return Err(TrainError::Empty);
    };
    if labels.iter().all(|&l| l == first) {
        return Err(TrainError::SingleClass { present: first });
    }
    Ok(())
}

/// `[p_forest, p_boosting]` for every training row, each from learners fit without that
/// row's fold.
fn out_of_fold(
    rows: &[Row],
    targets: &[f64],
    labels: &[Label],
    config: &TrainingConfig,
) -> Vec<MetaRow> {
    let folds = stratified_folds(labels, config.cv_folds);
    let mut meta_inputs = vec![[0.0; 2]; rows.len()];

    for fold in 0..config.cv_folds {
        let (fit_idx, held_idx): (Vec<usize>, Vec<usize>) =
            (0..rows.len()).partition(|&i| folds[i] != fold);
        let fit_rows: Vec<Row> = fit_idx.iter().map(|&i| rows[i]).collect();
        let fit_targets: Vec<f64> = fit_idx.iter().map(|&i| targets[i]).collect();

        let forest = RandomForest::fit(&fit_rows, &fit_targets, &config.forest);
        let boosting = GradientBoosting::fit(&fit_rows, &fit_targets, &config.boosting);
        for &i in &held_idx {
            meta_inputs[i] = [forest.predict_proba(&rows[i]), boosting.predict_proba(&rows[i])];
        }
        tracing::debug!(
            fold = fold + 1,
            of = config.cv_folds,
            fit = fit_idx.len(),
            held_out = held_idx.len(),
            "cross-validation fold done"
        );
    }
    meta_inputs
}
