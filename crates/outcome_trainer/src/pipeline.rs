//! Training orchestrator
//!
//! Runs the full offline flow: load, deduplicate, impute, label, encode,
//! scale, split, fit, evaluate and persist. The encoder and scaler are fitted
//! on the whole cleaned table before the train/holdout split.

use crate::config::TrainerConfig;
use crate::dataset::{records_from_table, MovieRecord, RawTable, REQUIRED_COLUMNS};
use crate::deterministic::train_test_split;
use crate::errors::TrainerError;
use crate::export::write_metrics_table;
use crate::forest::ForestTrainer;
use crate::impute::Imputer;
use boxoffice_core::{
    derive_label, ForestModel, GenreEncoder, ModelArtifacts, Outcome, SavedBundle,
    StandardScaler, FEATURE_COUNT, FEATURE_NAMES,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Summary of a training run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub rows_loaded: usize,
    pub duplicates_dropped: usize,
    pub class_counts: BTreeMap<Outcome, usize>,
    pub vocabulary_size: usize,
    pub train_size: usize,
    pub holdout_size: usize,
    pub holdout_accuracy: f64,
    /// Rows are actual outcomes, columns predicted, both in [`Outcome::ALL`] order
    pub confusion_matrix: [[usize; 3]; 3],
    pub feature_importances: BTreeMap<String, f64>,
    pub bundle_id: String,
    pub artifacts: Option<SavedBundle>,
}

/// Result of fitting the pipeline in memory
#[derive(Debug, Clone)]
pub struct TrainedPipeline {
    pub artifacts: ModelArtifacts,
    pub records: Vec<MovieRecord>,
    pub report: TrainingReport,
}

/// Offline training pipeline
pub struct TrainingPipeline {
    config: TrainerConfig,
}

impl TrainingPipeline {
    pub fn new(config: TrainerConfig) -> Result<Self, TrainerError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Train from the configured CSV and persist the artifact bundle
    pub fn run(&self) -> Result<TrainingReport, TrainerError> {
        info!("Loading dataset from: {}", self.config.input.display());
        let raw = RawTable::from_csv(&self.config.input)?;

        let trained = self.fit_table(raw)?;
        let saved = trained.artifacts.save(&self.config.output_dir)?;

        if let Some(path) = &self.config.metrics_table {
            write_metrics_table(path, &trained.records)?;
        }

        let mut report = trained.report;
        report.bundle_id = saved.bundle_id.clone();
        report.artifacts = Some(saved);
        Ok(report)
    }

    /// Fit every pipeline stage on an in-memory table without touching disk
    pub fn fit_table(&self, mut raw: RawTable) -> Result<TrainedPipeline, TrainerError> {
        raw.require_columns(&REQUIRED_COLUMNS)?;
        let rows_loaded = raw.len();

        let duplicates_dropped = if self.config.drop_duplicates {
            raw.drop_duplicates()
        } else {
            0
        };
        info!(
            "Loaded {} rows ({} exact duplicates dropped)",
            rows_loaded, duplicates_dropped
        );

        if raw.len() < 2 {
            return Err(TrainerError::data_quality(format!(
                "need at least 2 distinct rows to train, got {}",
                raw.len()
            )));
        }

        let table = raw.select(&REQUIRED_COLUMNS)?;
        for name in table.names() {
            let missing = table.column(name).map_or(0, |c| c.missing_count());
            if missing > 0 {
                warn!("Column '{}': imputing {} missing values", name, missing);
            }
        }
        let (_, table) = Imputer::fit_transform(table)?;
        let records = records_from_table(&table)?;

        let labels: Vec<Outcome> = records
            .iter()
            .map(|r| derive_label(r.budget, r.gross))
            .collect();
        let class_counts = count_classes(&labels);
        info!("Class distribution:");
        for (outcome, count) in &class_counts {
            info!("  {}: {}", outcome, count);
        }

        let encoder = GenreEncoder::fit(records.iter().map(|r| r.genres.as_str()))?;
        info!("Genre vocabulary: {} entries", encoder.len());

        let mut raw_features = Vec::with_capacity(records.len());
        for record in &records {
            raw_features.push(record.features(encoder.transform(&record.genres)?));
        }
        let scaler = StandardScaler::fit(&raw_features)?;
        let features = scaler.transform_all(&raw_features);

        let split = train_test_split(records.len(), self.config.test_ratio, self.config.split_seed);
        if split.train.is_empty() || split.test.is_empty() {
            return Err(TrainerError::data_quality(format!(
                "split of {} rows at ratio {} leaves an empty partition",
                records.len(),
                self.config.test_ratio
            )));
        }
        info!(
            "Split: {} training rows, {} holdout rows (seed {})",
            split.train.len(),
            split.test.len(),
            self.config.split_seed
        );

        let (train_x, train_y) = gather(&features, &labels, &split.train);
        let (test_x, test_y) = gather(&features, &labels, &split.test);

        info!("Training forest of {} trees", self.config.forest.n_trees);
        let mut classifier = ForestTrainer::new(self.config.forest.clone()).fit(&train_x, &train_y)?;

        let holdout_accuracy = classifier.accuracy(&test_x, &test_y);
        classifier.holdout_accuracy = Some(holdout_accuracy);
        info!("Holdout accuracy: {:.4}", holdout_accuracy);

        let confusion_matrix = confusion_matrix(&classifier, &test_x, &test_y);
        let feature_importances = FEATURE_NAMES
            .iter()
            .zip(classifier.feature_importances)
            .map(|(name, v)| (name.to_string(), v))
            .collect();

        let report = TrainingReport {
            rows_loaded,
            duplicates_dropped,
            class_counts,
            vocabulary_size: encoder.len(),
            train_size: split.train.len(),
            holdout_size: split.test.len(),
            holdout_accuracy,
            confusion_matrix,
            feature_importances,
            bundle_id: String::new(),
            artifacts: None,
        };

        let artifacts = ModelArtifacts::new(encoder, scaler, classifier);
        let report = TrainingReport {
            bundle_id: artifacts.bundle_id()?,
            ..report
        };

        Ok(TrainedPipeline {
            artifacts,
            records,
            report,
        })
    }
}

fn count_classes(labels: &[Outcome]) -> BTreeMap<Outcome, usize> {
    let mut counts: BTreeMap<Outcome, usize> = Outcome::ALL.iter().map(|o| (*o, 0)).collect();
    for label in labels {
        *counts.entry(*label).or_default() += 1;
    }
    counts
}

fn gather(
    features: &[[f64; FEATURE_COUNT]],
    labels: &[Outcome],
    indices: &[usize],
) -> (Vec<[f64; FEATURE_COUNT]>, Vec<Outcome>) {
    indices.iter().map(|&i| (features[i], labels[i])).unzip()
}

/// Holdout confusion counts
pub fn confusion_matrix(
    model: &ForestModel,
    features: &[[f64; FEATURE_COUNT]],
    labels: &[Outcome],
) -> [[usize; 3]; 3] {
    let mut matrix = [[0usize; 3]; 3];
    for (row, actual) in features.iter().zip(labels) {
        let predicted = model.predict(row);
        matrix[class_index(*actual)][class_index(predicted)] += 1;
    }
    matrix
}

fn class_index(outcome: Outcome) -> usize {
    match outcome {
        Outcome::Flop => 0,
        Outcome::Average => 1,
        Outcome::Hit => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_core::ForestParams;

    fn sample_table() -> RawTable {
        let mut csv = String::from("genres,cast_total_facebook_likes,budget,title_year,gross\n");
        for i in 0..20 {
            let budget = 1_000_000.0 * (i + 1) as f64;
            let (genre, ratio) = match i % 3 {
                0 => ("Action|Adventure", 3.0),
                1 => ("Comedy", 1.5),
                _ => ("Drama|Romance", 0.4),
            };
            csv.push_str(&format!(
                "{genre},{},{budget},{},{}\n",
                1000 + i * 10,
                2000 + i % 10,
                budget * ratio
            ));
        }
        RawTable::from_reader(csv.as_bytes()).unwrap()
    }

    fn small_config() -> TrainerConfig {
        TrainerConfig {
            forest: ForestParams {
                n_trees: 10,
                ..ForestParams::default()
            },
            ..TrainerConfig::default()
        }
    }

    #[test]
    fn test_fit_table_report() {
        let pipeline = TrainingPipeline::new(small_config()).unwrap();
        let trained = pipeline.fit_table(sample_table()).unwrap();
        let report = &trained.report;

        assert_eq!(report.rows_loaded, 20);
        assert_eq!(report.duplicates_dropped, 0);
        assert_eq!(report.class_counts[&Outcome::Hit], 7);
        assert_eq!(report.class_counts[&Outcome::Average], 7);
        assert_eq!(report.class_counts[&Outcome::Flop], 6);
        assert_eq!(report.vocabulary_size, 3);
        assert_eq!(report.holdout_size, 4);
        assert_eq!(report.train_size, 16);
        assert_eq!(report.bundle_id, trained.artifacts.bundle_id().unwrap());
        assert!(report.artifacts.is_none());

        let matrix_total: usize = report.confusion_matrix.iter().flatten().sum();
        assert_eq!(matrix_total, report.holdout_size);
        assert_eq!(report.feature_importances.len(), FEATURE_COUNT);
        assert_eq!(
            trained.artifacts.encoder.classes(),
            ["Action", "Comedy", "Drama"]
        );
    }

    #[test]
    fn test_single_row_rejected() {
        let raw = RawTable::from_reader(
            "genres,cast_total_facebook_likes,budget,title_year,gross\nAction,1,2,2000,3\n"
                .as_bytes(),
        )
        .unwrap();
        let pipeline = TrainingPipeline::new(small_config()).unwrap();
        assert!(matches!(
            pipeline.fit_table(raw),
            Err(TrainerError::Pipeline(boxoffice_core::PipelineError::DataQuality(_)))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrainerConfig {
            test_ratio: 1.5,
            ..TrainerConfig::default()
        };
        assert!(TrainingPipeline::new(config).is_err());
    }

    #[test]
    fn test_count_classes_includes_absent() {
        let counts = count_classes(&[Outcome::Hit, Outcome::Hit]);
        assert_eq!(counts[&Outcome::Flop], 0);
        assert_eq!(counts[&Outcome::Hit], 2);
    }
}
