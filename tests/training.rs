mod common;

use common::synthetic::{overlapping_windows, separable_windows};
use haar_cascade::boost::{is_positive, train_boosted, weighted_error, BoostParams, SampleWeights};
use haar_cascade::cascade::{
    build_stage, evaluate_cascade_detailed, CascadeClassifier, CascadeError, CascadeTrainParams,
    CascadeTrainer, StageSchedule, TrainedCascade,
};
use haar_cascade::detect::{DetectParams, MultiScaleDetector};
use haar_cascade::features::{create_all_features, create_features_with_shape, FeatureKind};
use haar_cascade::image::ImageF32;
use haar_cascade::integral::IntegralImage;
use haar_cascade::samples::SampleSet;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn four_tiny_samples_are_split_without_error() {
    init_logger();
    // positives carry a bright column at x = 0, negatives at x = 1
    let column = |bright_x: usize| {
        ImageF32::from_fn(4, 4, move |x, _| if x == bright_x { 9.0 } else { 1.0 })
    };
    let set = SampleSet::from_windows(&[column(0), column(0)], &[column(1), column(1)], 4)
        .expect("samples");
    let pool = create_features_with_shape(FeatureKind::TwoH, 2, 1, 4);
    assert_eq!(pool.len(), 12);

    let trainer = CascadeTrainer::new(CascadeTrainParams {
        window_size: 4,
        stages: vec![StageSchedule::new(1, 0.5)],
        boost: BoostParams::default(),
    });
    let outcome = trainer.train(&set, &pool).expect("trained");

    let stage = &outcome.report.stages[0];
    assert_eq!(stage.built_rounds, 1);
    assert_eq!(stage.rounds[0].error, 0.0);
    for (sample, &label) in set.samples().iter().zip(set.labels()) {
        assert_eq!(outcome.model.cascade.predict(sample), is_positive(label));
    }
}

#[test]
fn bright_left_column_against_uniform_negatives() {
    init_logger();
    let positive = ImageF32::from_fn(4, 4, |x, _| if x == 0 { 9.0 } else { 1.0 });
    let uniform = ImageF32::from_fn(4, 4, |_, _| 1.0);
    let set = SampleSet::from_windows(
        &[positive.clone(), positive],
        &[uniform.clone(), uniform],
        4,
    )
    .expect("samples");
    let pool = create_features_with_shape(FeatureKind::TwoH, 2, 1, 4);

    let trainer = CascadeTrainer::new(CascadeTrainParams {
        window_size: 4,
        stages: vec![StageSchedule::new(1, 0.5)],
        boost: BoostParams::default(),
    });
    let outcome = trainer.train(&set, &pool).expect("trained");

    assert_eq!(outcome.report.stages[0].rounds[0].error, 0.0);
    let chosen = outcome.model.cascade.stages[0].weak_classifiers[0].feature;
    assert_eq!(chosen.kind, FeatureKind::TwoH);
    assert_eq!(chosen.x, 0, "chosen feature {chosen:?} misses the bright column");
    for (sample, &label) in set.samples().iter().zip(set.labels()) {
        assert_eq!(outcome.model.cascade.predict(sample), is_positive(label));
    }
}

#[test]
fn ensemble_error_never_grows_on_separable_data() {
    init_logger();
    let (pos, neg) = separable_windows(8, 20, 20, 9);
    let set = SampleSet::from_windows(&pos, &neg, 8).expect("samples");
    let pool = create_all_features(8);
    let out = train_boosted(6, set.samples(), set.labels(), &pool, None, &BoostParams::default());
    assert_eq!(out.classifiers.len(), 6, "stopped early: {:?}", out.stopped);

    let mut weights = SampleWeights::balanced(set.labels());
    weights.normalize();
    let mut previous = f64::INFINITY;
    for r in 1..=out.classifiers.len() {
        let stage = build_stage(out.classifiers[..r].to_vec(), 0.5);
        let ensemble = CascadeClassifier::new(vec![stage]);
        let error: f64 = set
            .samples()
            .iter()
            .zip(set.labels())
            .zip(weights.as_slice())
            .filter(|((s, label), _)| ensemble.predict(*s) != is_positive(**label))
            .map(|(_, &w)| w)
            .sum();
        assert!(error <= previous + 1e-12, "round {r}: {error} after {previous}");
        previous = error;
    }
    assert!(previous < 1e-12, "final ensemble error {previous}");
}

#[test]
fn reweighting_makes_the_last_winner_a_coin_flip() {
    init_logger();
    let (pos, neg) = overlapping_windows(6, 30, 30, 11);
    let set = SampleSet::from_windows(&pos, &neg, 6).expect("samples");
    let pool = create_all_features(6);
    let out = train_boosted(4, set.samples(), set.labels(), &pool, None, &BoostParams::default());

    assert!(out.stopped.is_none(), "stopped early: {:?}", out.stopped);
    assert_eq!(out.classifiers.len(), 4);
    assert_eq!(out.history.len(), 5);

    for (r, wc) in out.classifiers.iter().enumerate() {
        let values: Vec<f32> = set
            .samples()
            .iter()
            .map(|s| wc.feature.evaluate(s))
            .collect();

        let mut before = out.history[r].clone();
        before.normalize();
        let e = weighted_error(&values, set.labels(), before.as_slice(), wc.threshold, wc.polarity);
        let recorded = out.rounds[r].error;
        assert!((e - recorded).abs() < 1e-9, "round {r}: realized {e} vs recorded {recorded}");
        assert!(recorded > 0.0 && recorded < 0.5, "round {r}: error {recorded}");

        let mut after = out.history[r + 1].clone();
        after.normalize();
        assert!((after.sum() - 1.0).abs() < 1e-9);
        assert!(after.as_slice().iter().all(|&w| w > 0.0));
        let e_after =
            weighted_error(&values, set.labels(), after.as_slice(), wc.threshold, wc.polarity);
        assert!((e_after - 0.5).abs() < 1e-9, "round {r}: error after reweighting {e_after}");
    }
}

#[test]
fn stages_resume_from_previous_weights() {
    init_logger();
    let (pos, neg) = overlapping_windows(6, 20, 20, 5);
    let set = SampleSet::from_windows(&pos, &neg, 6).expect("samples");
    let pool = create_all_features(6);
    let params = BoostParams::default();

    let trainer = CascadeTrainer::new(CascadeTrainParams {
        window_size: 6,
        stages: vec![StageSchedule::new(2, 0.3), StageSchedule::new(2, 0.5)],
        boost: params.clone(),
    });
    let outcome = trainer.train(&set, &pool).expect("trained");

    // the same four rounds in one call must pick the same classifiers
    let single = train_boosted(4, set.samples(), set.labels(), &pool, None, &params);
    let staged: Vec<_> = outcome
        .model
        .cascade
        .stages
        .iter()
        .flat_map(|s| s.weak_classifiers.iter().copied())
        .collect();
    assert_eq!(staged, single.classifiers);
    assert_eq!(Some(&outcome.final_weights), single.final_weights());

    let second = &outcome.model.cascade.stages[1];
    assert!((second.threshold - 0.5 * second.total_alpha()).abs() < 1e-12);
}

#[test]
fn trained_cascade_survives_a_save_load_cycle() {
    init_logger();
    let (pos, neg) = separable_windows(8, 20, 20, 3);
    let set = SampleSet::from_windows(&pos, &neg, 8).expect("samples");
    let pool = create_all_features(8);
    let trainer = CascadeTrainer::new(CascadeTrainParams {
        window_size: 8,
        stages: vec![StageSchedule::new(2, 0.3), StageSchedule::new(3, 0.5)],
        boost: BoostParams::default(),
    });
    let outcome = trainer.train(&set, &pool).expect("trained");

    let eval = evaluate_cascade_detailed(&outcome.model.cascade, set.samples(), set.labels());
    assert_eq!(eval.total(), 40);
    assert_eq!(eval.true_positives, 20, "{eval:?}");
    assert_eq!(eval.true_negatives, 20, "{eval:?}");
    assert_eq!(
        eval.stage_rejects.iter().sum::<usize>(),
        eval.true_negatives + eval.false_negatives
    );
    for s in set.samples() {
        let cascade = &outcome.model.cascade;
        assert_eq!(cascade.predict(s), cascade.predict_all_stages(s));
    }

    let path = std::env::temp_dir().join(format!("haar_cascade_model_{}.json", std::process::id()));
    outcome.model.save(&path).expect("save");
    let loaded = TrainedCascade::load(&path).expect("load");
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, outcome.model);

    let batch = loaded.cascade.predict_batch(set.samples());
    let single: Vec<bool> = set
        .samples()
        .iter()
        .map(|s| outcome.model.cascade.predict(s))
        .collect();
    assert_eq!(batch, single);
}

#[test]
fn detector_without_model_asks_for_training() {
    let path = std::env::temp_dir().join("haar_cascade_no_such_model.json");
    let err = MultiScaleDetector::from_file(&path, DetectParams::default()).unwrap_err();
    assert!(matches!(err, CascadeError::MissingCascade { .. }), "{err}");
    assert!(err.to_string().contains("run the trainer first"));
}

#[test]
fn integral_tables_from_grid_and_view_agree() {
    let rows: Vec<Vec<u8>> = (0..5u8).map(|y| (0..7u8).map(|x| x * 3 + y).collect()).collect();
    let from_grid = IntegralImage::<u32>::from_grid(&rows).expect("rectangular");
    let img = ImageF32::from_fn(7, 5, |x, y| (x * 3 + y) as f32);
    let from_view = IntegralImage::<f64>::from_view(&img);
    for y in 0..=5 {
        for x in 0..=7 {
            assert_eq!(from_grid.at(x, y) as f64, from_view.at(x, y));
        }
    }
}
