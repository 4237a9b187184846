//! Plain-text rendering of answers and the vocabulary.

use samarth_assistant::QueryAnswer;
use samarth_dataset_models::Dataset;
use samarth_vocabulary::Vocabulary;

/// Renders sections, the comparison table, notices and sources.
#[must_use]
pub fn render_answer(answer: &QueryAnswer) -> String {
    let mut out = Vec::new();

    for section in &answer.payload.sections {
        out.push(format!("## {}", section.heading));
        out.extend(section.lines.iter().map(|l| format!("  {l}")));
        out.push(String::new());
    }

    if let Some(table) = &answer.payload.tabular_data {
        let locations = &answer.intent.locations;
        out.push(format!("Year | {}", locations.join(" | ")));
        for (year, row) in table {
            let cells: Vec<String> = locations
                .iter()
                .map(|l| {
                    row.get(l)
                        .copied()
                        .flatten()
                        .map_or_else(|| "N/A".to_string(), |v| format!("{v:.1}"))
                })
                .collect();
            out.push(format!("{year} | {}", cells.join(" | ")));
        }
        out.push(String::new());
    }

    for notice in &answer.payload.notices {
        out.push(format!("Note: {notice}"));
    }

    if !answer.provenance.is_empty() {
        out.push("Sources:".to_string());
        out.extend(answer.provenance.iter().map(|p| format!("  - {p}")));
    }

    out.join("\n")
}

/// One status line per dataset: its row count, or why it is unavailable.
#[must_use]
pub fn render_datasets<C, R>(crops: &Dataset<C>, rainfall: &Dataset<R>) -> String {
    fn line<T>(dataset: &Dataset<T>) -> String {
        dataset.load_error.as_ref().map_or_else(
            || format!("{}: {} rows", dataset.kind.label(), dataset.len()),
            |error| format!("{}: unavailable ({error})", dataset.kind.label()),
        )
    }

    format!("{}\n{}", line(crops), line(rainfall))
}

/// Renders every known name and year, one category per block.
#[must_use]
pub fn render_vocabulary(vocabulary: &Vocabulary) -> String {
    fn block<'a>(title: &str, names: impl ExactSizeIterator<Item = &'a String>) -> String {
        let count = names.len();
        let names: Vec<&str> = names.map(String::as_str).collect();
        format!("{title} ({count}):\n  {}", names.join(", "))
    }

    let years: Vec<String> = vocabulary.years.iter().map(ToString::to_string).collect();

    [
        block("States", vocabulary.states.iter()),
        block("Crops", vocabulary.crops.iter()),
        block("Rainfall subdivisions", vocabulary.subdivisions.iter()),
        format!("Years ({}):\n  {}", years.len(), years.join(", ")),
    ]
    .join("\n\n")
}
