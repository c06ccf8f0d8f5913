//! CSV writers for the per-participant table and the comparison summary.
//!
//! The participant table keeps the cleaned-input layout (`correct_i`,
//! `conf_i`) and appends the derived per-question and participant columns.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use confscore_core::model::ScoredParticipant;
use confscore_core::report::ComparisonTable;

/// Header of the per-participant table for `questions` questions.
pub fn participant_header(questions: usize) -> Vec<String> {
    let mut header = vec!["participant".to_string(), "group".to_string()];
    for prefix in ["correct", "conf", "p", "abs", "cws"] {
        header.extend((1..=questions).map(|i| format!("{prefix}_{i}")));
    }
    header.extend(
        ["total_correct", "accuracy", "mean_conf", "abs_total", "cws_total"]
            .iter()
            .map(|s| s.to_string()),
    );
    header
}

/// Write scored participants as CSV to any writer.
pub fn write_participants<W: Write>(writer: W, participants: &[ScoredParticipant]) -> Result<()> {
    let questions = participants.first().map_or(0, |p| p.items.len());
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(participant_header(questions))?;

    for p in participants {
        anyhow::ensure!(
            p.items.len() == questions,
            "participant '{}' has {} item scores, expected {questions}",
            p.id,
            p.items.len()
        );
        let mut record = vec![p.id.clone(), p.group.to_string()];
        record.extend(p.items.iter().map(|i| u8::from(i.correct).to_string()));
        record.extend(p.items.iter().map(|i| i.confidence.to_string()));
        record.extend(p.items.iter().map(|i| i.probability.to_string()));
        record.extend(p.items.iter().map(|i| i.abs.to_string()));
        record.extend(p.items.iter().map(|i| i.cws.to_string()));
        record.push(p.total_correct.to_string());
        record.push(p.accuracy.to_string());
        record.push(p.mean_confidence.to_string());
        record.push(p.abs_total.to_string());
        record.push(p.cws_total.to_string());
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the per-participant table to a CSV file.
pub fn write_participants_csv(participants: &[ScoredParticipant], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_participants(file, participants)
        .with_context(|| format!("failed to write participant table to {}", path.display()))
}

/// Write the comparison table as CSV to any writer.
pub fn write_summary<W: Write>(writer: W, table: &ComparisonTable) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "metric",
        "test",
        "n_cg",
        "n_eg",
        "cg_mean",
        "eg_mean",
        "cg_sd",
        "eg_sd",
        "t",
        "df",
        "p_one_tailed",
        "p_two_tailed",
        "cohens_d",
    ])?;
    for r in &table.rows {
        wtr.write_record([
            r.metric.clone(),
            r.test.to_string(),
            r.n_cg.to_string(),
            r.n_eg.to_string(),
            r.mean_cg.to_string(),
            r.mean_eg.to_string(),
            r.sd_cg.to_string(),
            r.sd_eg.to_string(),
            r.t_statistic.to_string(),
            r.df.to_string(),
            r.p_value_one_tailed.to_string(),
            r.p_value_two_tailed.to_string(),
            r.cohens_d.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the comparison table to a CSV file.
pub fn write_summary_csv(table: &ComparisonTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_summary(file, table)
        .with_context(|| format!("failed to write summary to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use confscore_core::aggregate::{score_participant, Aggregation};
    use confscore_core::model::{Group, Participant, Response};
    use confscore_core::scoring::ScoringScheme;
    use confscore_core::statistics::{compare_groups, TTest};

    fn scored(id: &str, group: Group) -> ScoredParticipant {
        let responses = vec![
            Response::new(1, 7).unwrap(),
            Response::new(0, 1).unwrap(),
            Response::new(1, 4).unwrap(),
        ];
        let p = Participant::new(id, group, responses);
        score_participant(&p, 3, ScoringScheme::Signed, Aggregation::Mean).unwrap()
    }

    #[test]
    fn header_layout() {
        let header = participant_header(2);
        assert_eq!(
            header,
            vec![
                "participant", "group", "correct_1", "correct_2", "conf_1", "conf_2", "p_1",
                "p_2", "abs_1", "abs_2", "cws_1", "cws_2", "total_correct", "accuracy",
                "mean_conf", "abs_total", "cws_total"
            ]
        );
    }

    #[test]
    fn participant_rows() {
        let mut buf = Vec::new();
        write_participants(&mut buf, &[scored("ann", Group::Control), scored("bob", Group::Experimental)])
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("ann,CG,1,0,1,7,1,4,1,0,0.5,1,0,0.5,7,-1,4,2,"));
        assert!(lines[2].starts_with("bob,EG,"));
    }

    #[test]
    fn summary_rows_write_nan() {
        let table = ComparisonTable {
            rows: vec![compare_groups("accuracy", &[0.5, 0.5], &[0.5, 0.5], TTest::Welch).unwrap()],
        };
        let mut buf = Vec::new();
        write_summary(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("metric,test,n_cg"));
        assert!(text.contains("accuracy,welch,2,2,0.5,0.5,0,0,NaN,NaN,NaN,NaN,0"));
    }

    #[test]
    fn write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/participants.csv");
        write_participants_csv(&[scored("ann", Group::Control)], &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("cws_total"));
        assert!(content.contains("ann,CG"));
    }
}
