//! Prediction service tests against a freshly trained bundle

use anyhow::Result;
use boxoffice_core::{ArtifactKind, ForestParams, Outcome, PipelineError};
use boxoffice_service::{
    serve_lines, ArtifactCache, BatchReply, PredictionRequest, PredictionService,
};
use boxoffice_trainer::{TrainerConfig, TrainingPipeline};
use std::fs;
use std::io::Write;
use std::sync::Arc;
use std::thread;
use tempfile::{NamedTempFile, TempDir};

fn train_bundle() -> Result<TempDir> {
    let mut data = NamedTempFile::new()?;
    writeln!(data, "genres,cast_total_facebook_likes,budget,title_year,gross")?;
    for i in 0..30 {
        let (genres, gross) = match i % 3 {
            0 => ("Action|Adventure", 25_000_000),
            1 => ("Comedy", 10_000_000),
            _ => ("Drama|Romance", 5_000_000),
        };
        writeln!(data, "{genres},{},10000000,2016,{gross}", 1000 + i)?;
    }
    data.flush()?;

    let out = TempDir::new()?;
    let config = TrainerConfig {
        input: data.path().to_path_buf(),
        output_dir: out.path().to_path_buf(),
        forest: ForestParams {
            n_trees: 15,
            ..ForestParams::default()
        },
        ..TrainerConfig::default()
    };
    TrainingPipeline::new(config)?.run()?;
    Ok(out)
}

fn request(genre: &str, score: f64) -> PredictionRequest {
    PredictionRequest {
        genre: genre.to_string(),
        budget: 10_000_000.0,
        release_year: 2016,
        cast_popularity: 1015,
        quality_score: score,
    }
}

#[test]
fn test_predict_with_heuristic() -> Result<()> {
    let bundle = train_bundle()?;
    let service = PredictionService::start(Arc::new(ArtifactCache::new(bundle.path())))?;

    let response = service.predict(&request("Action", 6.99))?;
    assert_eq!(response.heuristic_verdict, Outcome::Average);
    assert_eq!(response.class_probabilities.len(), 3);
    let total: f64 = response.class_probabilities.values().sum();
    assert!((total - 1.0).abs() < 1e-9);
    for p in response.class_probabilities.values() {
        assert!((0.0..=1.0).contains(p));
    }
    assert_eq!(
        response.predicted_label,
        *response
            .class_probabilities
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| k)
            .unwrap()
    );

    assert_eq!(service.predict(&request("Action", 4.9))?.heuristic_verdict, Outcome::Flop);
    assert_eq!(service.predict(&request("Action", 7.0))?.heuristic_verdict, Outcome::Hit);
    assert_eq!(service.genres()?, ["Action", "Comedy", "Drama"]);
    assert_eq!(service.cache().load_count(), 1);
    Ok(())
}

#[test]
fn test_unknown_genre_is_local_to_request() -> Result<()> {
    let bundle = train_bundle()?;
    let service = PredictionService::start(Arc::new(ArtifactCache::new(bundle.path())))?;

    match service.predict(&request("Western", 5.0)) {
        Err(PipelineError::UnknownCategory { genre }) => assert_eq!(genre, "Western"),
        other => panic!("expected UnknownCategory, got {other:?}"),
    }
    assert!(service.predict(&request("Comedy", 5.0)).is_ok());
    Ok(())
}

#[test]
fn test_concurrent_predictions_agree() -> Result<()> {
    let bundle = train_bundle()?;
    let cache = Arc::new(ArtifactCache::new(bundle.path()));
    let service = PredictionService::new(cache);

    let expected = service.predict(&request("Drama", 3.0))?;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            thread::spawn(move || {
                (0..20)
                    .map(|_| service.predict(&request("Drama", 3.0)))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        let results = handle.join().expect("worker panicked");
        for result in results {
            assert_eq!(result?, expected);
        }
    }
    assert_eq!(service.cache().load_count(), 1);
    Ok(())
}

#[test]
fn test_tampered_bundle_refused() -> Result<()> {
    let bundle = train_bundle()?;
    let path = bundle.path().join(ArtifactKind::Scaler.file_name());
    let mut envelope: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    envelope["payload"]["means"][2] = serde_json::json!(1.0);
    fs::write(&path, serde_json::to_string_pretty(&envelope)?)?;

    let result = PredictionService::start(Arc::new(ArtifactCache::new(bundle.path())));
    assert!(matches!(result, Err(PipelineError::ArtifactMissing { .. })));
    Ok(())
}

#[test]
fn test_serve_lines() -> Result<()> {
    let bundle = train_bundle()?;
    let service = PredictionService::start(Arc::new(ArtifactCache::new(bundle.path())))?;

    let input = concat!(
        r#"{"genre":"Action","budget":10000000,"releaseYear":2016,"castPopularity":1000,"qualityScore":8}"#,
        "\n",
        "\n",
        r#"{"genre":"Western","budget":1,"releaseYear":2016,"castPopularity":1,"qualityScore":1}"#,
        "\n",
        "not json\n",
        r#"{"genre":"Comedy","budget":-5,"releaseYear":2016,"castPopularity":1,"qualityScore":1}"#,
        "\n",
    );
    let mut output = Vec::new();
    let answered = serve_lines(&service, input.as_bytes(), &mut output)?;
    assert_eq!(answered, 1);

    let replies: Vec<BatchReply> = String::from_utf8(output)?
        .lines()
        .map(|line| serde_json::from_str::<BatchReply>(line))
        .collect::<Result<_, _>>()?;
    assert_eq!(replies.len(), 4);
    match &replies[0] {
        BatchReply::Prediction(p) => assert_eq!(p.heuristic_verdict, Outcome::Hit),
        other => panic!("expected prediction, got {other:?}"),
    }
    for reply in &replies[1..] {
        assert!(matches!(reply, BatchReply::Rejected { .. }));
    }
    Ok(())
}
