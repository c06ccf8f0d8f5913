//! End-to-end pipeline tests: CSV → scores → comparison → reports.

use std::path::{Path, PathBuf};

use confscore_core::aggregate::Aggregation;
use confscore_core::config::AnalysisConfig;
use confscore_core::dataset::{load_dataset, parse_dataset_str};
use confscore_core::engine::AnalysisEngine;
use confscore_core::model::Group;
use confscore_core::report::AnalysisReport;
use confscore_core::statistics::TTest;

fn study_csv() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/study.csv")
}

fn swap_groups(group: Group) -> Group {
    match group {
        Group::Control => Group::Experimental,
        Group::Experimental => Group::Control,
    }
}

#[test]
fn sample_study_favours_control() {
    let dataset = load_dataset(&study_csv(), 20).unwrap();
    let report = AnalysisEngine::default().run(&dataset).unwrap();

    assert_eq!(report.dataset.control, 8);
    assert_eq!(report.dataset.experimental, 8);

    let acc = report.comparisons.get("accuracy").unwrap();
    assert!((acc.mean_cg - 0.83125).abs() < 1e-9);
    assert!((acc.mean_eg - 0.61875).abs() < 1e-9);
    assert!(acc.t_statistic > 0.0);
    assert!(acc.p_value_one_tailed < 0.05);
    assert!((acc.p_value_two_tailed - 2.0 * acc.p_value_one_tailed).abs() < 1e-12);
    assert!(acc.cohens_d > 0.0);
}

#[test]
fn fifteen_confident_correct_five_guessed_wrong() {
    let mut csv = String::from("participant,group");
    for i in 1..=20 {
        csv.push_str(&format!(",correct_{i}"));
    }
    for i in 1..=20 {
        csv.push_str(&format!(",conf_{i}"));
    }
    csv.push('\n');
    csv.push_str("x,CG");
    for i in 0..20 {
        csv.push_str(if i < 15 { ",1" } else { ",0" });
    }
    for i in 0..20 {
        csv.push_str(if i < 15 { ",7" } else { ",1" });
    }
    csv.push('\n');

    let dataset = parse_dataset_str(&csv, 20).unwrap();
    let engine = AnalysisEngine::default();
    let scored = engine.score_participants(&dataset.participants).unwrap();
    assert_eq!(scored[0].total_correct, 15);
    assert!((scored[0].accuracy - 0.75).abs() < 1e-12);
    assert!((scored[0].cws_total - 5.0).abs() < 1e-12);
    assert!((scored[0].abs_total - 0.75).abs() < 1e-12);

    let sum = AnalysisEngine::new(AnalysisConfig {
        aggregation: Aggregation::Sum,
        ..Default::default()
    });
    let scored = sum.score_participants(&dataset.participants).unwrap();
    assert!((scored[0].cws_total - 100.0).abs() < 1e-12);
    assert!((scored[0].abs_total - 15.0).abs() < 1e-12);
}

#[test]
fn swapping_labels_negates_t_and_d() {
    let dataset = load_dataset(&study_csv(), 20).unwrap();
    let mut swapped = dataset.clone();
    for p in &mut swapped.participants {
        p.group = swap_groups(p.group);
    }

    for t_test in [TTest::Welch, TTest::Student] {
        let engine = AnalysisEngine::new(AnalysisConfig {
            t_test,
            ..Default::default()
        });
        let a = engine.run(&dataset).unwrap();
        let b = engine.run(&swapped).unwrap();
        for (x, y) in a.comparisons.rows.iter().zip(&b.comparisons.rows) {
            assert!((x.t_statistic + y.t_statistic).abs() < 1e-9, "{}", x.metric);
            assert!((x.cohens_d + y.cohens_d).abs() < 1e-9, "{}", x.metric);
            assert!((x.df - y.df).abs() < 1e-9, "{}", x.metric);
            assert!(
                (x.p_value_one_tailed + y.p_value_one_tailed - 1.0).abs() < 1e-9,
                "{}",
                x.metric
            );
        }
    }
}

#[test]
fn report_survives_json_round_trip() {
    let dataset = load_dataset(&study_csv(), 20).unwrap();
    let report = AnalysisEngine::default().run(&dataset).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.save_json(&path).unwrap();
    let loaded = AnalysisReport::load_json(&path).unwrap();

    assert_eq!(loaded.id, report.id);
    assert_eq!(loaded.participants.len(), report.participants.len());
    assert_eq!(loaded.comparisons.to_tsv(), report.comparisons.to_tsv());
}

#[test]
fn repeated_analysis_is_deterministic() {
    let dataset = load_dataset(&study_csv(), 20).unwrap();
    let engine = AnalysisEngine::default();
    let a = engine.run(&dataset).unwrap();
    let b = engine.run(&dataset).unwrap();
    assert_eq!(a.comparisons, b.comparisons);
    assert_eq!(a.descriptives, b.descriptives);
    assert_eq!(a.participants, b.participants);
}
