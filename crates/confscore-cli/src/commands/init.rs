//! The `confscore init` command.

use std::path::Path;

use anyhow::Result;

use confscore_core::model::DEFAULT_QUESTIONS;

pub fn execute() -> Result<()> {
    // Create confscore.toml
    if Path::new("confscore.toml").exists() {
        println!("confscore.toml already exists, skipping.");
    } else {
        std::fs::write("confscore.toml", SAMPLE_CONFIG)?;
        println!("Created confscore.toml");
    }

    // Create example dataset
    std::fs::create_dir_all("data")?;
    let example_path = Path::new("data/example.csv");
    if example_path.exists() {
        println!("data/example.csv already exists, skipping.");
    } else {
        std::fs::write(example_path, example_csv())?;
        println!("Created data/example.csv");
    }

    println!("\nNext steps:");
    println!("  1. Replace data/example.csv with your study table");
    println!("  2. Run: confscore validate --data data/example.csv");
    println!("  3. Run: confscore analyze --data data/example.csv --format all");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# confscore configuration

# Questions answered by every participant
questions = 20

# Item scoring: "signed" (ABS = ±(c-1)/6, CWS = ±c) or "brier"
scheme = "signed"

# Participant totals: "mean" or "sum" over the questions
aggregation = "mean"

# One-tailed test of CG > EG: "welch" or "student"
t_test = "welch"

output_dir = "./confscore-results"
"#;

/// Example participants: id, group, correctness per question, confidence per question.
const EXAMPLE_ROWS: &[(&str, &str, &str, &str)] = &[
    ("p01", "CG", "11111111111111100000", "76767676767676732123"),
    ("p02", "CG", "11111111111111111000", "66666666666666666332"),
    ("p03", "CG", "11111111111111110000", "77777666665555542211"),
    ("p04", "EG", "11111111111100000000", "55555444443333344444"),
    ("p05", "EG", "11111111110000000000", "44444444444444444444"),
    ("p06", "EG", "11111111111110000000", "65432165432165432165"),
];

fn example_csv() -> String {
    let mut header = vec!["participant".to_string(), "group".to_string()];
    header.extend((1..=DEFAULT_QUESTIONS).map(|i| format!("correct_{i}")));
    header.extend((1..=DEFAULT_QUESTIONS).map(|i| format!("conf_{i}")));

    let mut out = header.join(",");
    out.push('\n');
    for (id, group, correct, confidence) in EXAMPLE_ROWS {
        let mut cells = vec![id.to_string(), group.to_string()];
        cells.extend(correct.chars().map(String::from));
        cells.extend(confidence.chars().map(String::from));
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}
