use anyhow::Result;
use comfy_table::{Cell, Table as ComfyTable};
use serde::Serialize;

use safeshare_core::PiiCategory;

use crate::args::{ReportFormat, ScanArgs};
use crate::commands::{build_detector, load_config, load_table, resolve_threshold};

#[derive(Serialize)]
struct ColumnReport {
    column: String,
    sample_size: usize,
    suggested: PiiCategory,
    categories: Vec<CategoryReport>,
    samples: Vec<String>,
}

#[derive(Serialize)]
struct CategoryReport {
    category: PiiCategory,
    count: usize,
    ratio: f64,
}

pub fn run(args: &ScanArgs) -> Result<()> {
    let config = load_config()?;
    let threshold = resolve_threshold(args.threshold, &config)?;
    let detector = build_detector(&config)?;
    let table = load_table(&args.input, &config)?;

    let results = detector.scan_table(&table, threshold);
    let reports: Vec<ColumnReport> = results
        .iter()
        .filter_map(|(name, result)| {
            let values = table.column(name)?;
            Some(ColumnReport {
                column: name.clone(),
                sample_size: result.sample_size,
                suggested: detector.suggest_category(name, values),
                categories: result
                    .flagged
                    .iter()
                    .map(|(category, signal)| CategoryReport {
                        category: *category,
                        count: signal.count,
                        ratio: signal.ratio,
                    })
                    .collect(),
                samples: detector.sample_values(values, args.samples),
            })
        })
        .collect();

    match args.format {
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        ReportFormat::Table => {
            let info = table.info();
            println!(
                "File: {}  Rows: {}  Columns: {}  Threshold: {:.0}%",
                args.input.display(),
                info.rows,
                info.columns,
                threshold * 100.0
            );
            println!();

            if reports.is_empty() {
                println!("No personal data detected.");
                return Ok(());
            }

            let mut t = ComfyTable::new();
            t.set_header(vec!["Column", "Detected", "Match", "Suggested", "Samples"]);
            for report in &reports {
                let detected = report
                    .categories
                    .iter()
                    .map(|c| c.category.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                let ratio = report
                    .categories
                    .iter()
                    .map(|c| format!("{}/{} ({:.0}%)", c.count, report.sample_size, c.ratio * 100.0))
                    .collect::<Vec<_>>()
                    .join(", ");
                t.add_row(vec![
                    Cell::new(&report.column),
                    Cell::new(detected),
                    Cell::new(ratio),
                    Cell::new(report.suggested.to_string()),
                    Cell::new(report.samples.join(", ")),
                ]);
            }
            println!("{}", t);
            println!();
            println!(
                "Anonymize with: safeshare anonymize {} --auto --output <path> --mapping <path>",
                args.input.display()
            );
        }
    }

    Ok(())
}
