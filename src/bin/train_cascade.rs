use haar_cascade::cascade::{evaluate_cascade_detailed, CascadeEvaluation, CascadeTrainer};
use haar_cascade::config::train::load_config;
use haar_cascade::diagnostics::TrainingReport;
use haar_cascade::features::create_all_features;
use haar_cascade::image::io::{list_image_files, write_json_file};
use haar_cascade::samples::prepare::{load_sample_windows, SampleKind};
use haar_cascade::samples::{clamp_request, select_samples, SampleSet};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::env;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;
    let sampling = &config.sampling;
    let window = config.training.window_size;
    let mut rng = StdRng::seed_from_u64(sampling.seed);

    let positive_files = list_image_files(&config.positives)?;
    let negative_files = list_image_files(&config.negatives)?;
    let positive_count = clamp_request(sampling.positive_count, positive_files.len(), "positive");
    let negative_count = clamp_request(sampling.negative_count, negative_files.len(), "negative");
    let positive_paths = select_samples(&positive_files, positive_count, &mut rng);
    let negative_paths = select_samples(&negative_files, negative_count, &mut rng);

    let positives = load_sample_windows(
        &positive_paths,
        SampleKind::Positive,
        window,
        sampling.crop_top,
        &mut rng,
    )?;
    let negatives =
        load_sample_windows(&negative_paths, SampleKind::Negative, window, 0, &mut rng)?;
    let set = SampleSet::from_windows(&positives, &negatives, window).map_err(|e| e.to_string())?;

    let pool = create_all_features(window as u32);
    let trainer = CascadeTrainer::new(config.training.to_params());
    let outcome = trainer.train(&set, &pool).map_err(|e| e.to_string())?;

    let evaluation = evaluate_cascade_detailed(&outcome.model.cascade, set.samples(), set.labels());
    evaluation.log_report();

    outcome
        .model
        .save(&config.output.model_json)
        .map_err(|e| e.to_string())?;
    if let Some(path) = &config.output.report_json {
        let summary = TrainSummary {
            precision: evaluation.precision(),
            recall: evaluation.recall(),
            accuracy: evaluation.accuracy(),
            f1_score: evaluation.f1_score(),
            evaluation: &evaluation,
            training: &outcome.report,
        };
        write_json_file(path, &summary)?;
    }

    println!(
        "Trained {} stages ({} weak classifiers) on {} positives / {} negatives in {:.1} ms",
        outcome.model.cascade.stage_count(),
        outcome.model.cascade.weak_count(),
        set.positive_count(),
        set.negative_count(),
        outcome.report.timings.total_ms
    );
    println!("Saved model to {}", config.output.model_json.display());
    Ok(())
}

fn usage() -> String {
    "Usage: train_cascade <config.json>".to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TrainSummary<'a> {
    precision: f64,
    recall: f64,
    accuracy: f64,
    f1_score: f64,
    evaluation: &'a CascadeEvaluation,
    training: &'a TrainingReport,
}
