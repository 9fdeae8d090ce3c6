use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use coach_terminal::chat;
use coach_terminal::model::parse_envelope;
use coach_terminal::narrative;

fn main() -> anyhow::Result<()> {
    let mut cards = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--cards" => cards = true,
            _ => path = Some(PathBuf::from(arg)),
        }
    }
    let path = path.unwrap_or_else(|| PathBuf::from("tests/fixtures/envelope_prediction_lol.json"));

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let result = parse_envelope(&raw)
        .with_context(|| format!("{} is not a valid analysis envelope", path.display()))?;

    // Offline only: renders one stored response exactly as the transcript would show it.
    let rendered = narrative::render(&result);
    if cards {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        println!("{}", chat::message(&rendered));
    }

    Ok(())
}
