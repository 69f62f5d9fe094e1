use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use fairrec_model::{DropReport, TableKind};
use fairrec_train::{MetricReport, MetricSection, RunOutcome, RunPlan};

use fairrec_cli::pipeline::NormalizeResult;

const DIGEST_PREFIX: usize = 12;

pub fn print_normalize_summary(result: &NormalizeResult) {
    println!("Dataset: {}", result.manifest.dataset);
    println!("Output: {}", result.dataset_dir.display());
    println!(
        "Sources: {} ({} rows), {} ({} rows)",
        result.sources.behaviors.display(),
        result.behavior_rows,
        result.sources.articles.display(),
        result.article_rows
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Table"),
        header_cell("Rows"),
        header_cell("Bytes"),
        header_cell("SHA-256"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for entry in &result.manifest.tables {
        let digest: String = entry.sha256.chars().take(DIGEST_PREFIX).collect();
        table.add_row(vec![
            Cell::new(&entry.file).add_attribute(Attribute::Bold),
            Cell::new(entry.table.extension()),
            Cell::new(entry.rows),
            dim_cell(entry.bytes),
            dim_cell(digest),
        ]);
    }
    println!("{table}");
    print_drop_table(&result.manifest.dropped);
}

fn print_drop_table(report: &DropReport) {
    if report.is_empty() {
        println!("No rows dropped.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Dropped"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (reason, count) in report.entries() {
        table.add_row(vec![
            Cell::new(reason.as_str()),
            Cell::new(count).fg(Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(report.total()).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

pub fn print_schema() {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Field"),
        header_cell("Type"),
    ]);
    apply_table_style(&mut table);
    for kind in TableKind::ALL {
        for field in kind.fields() {
            table.add_row(vec![
                Cell::new(format!(".{}", kind.extension())),
                Cell::new(field.name),
                dim_cell(field.field_type.as_str()),
            ]);
        }
    }
    println!("{table}");
}

pub fn print_plan(plan: &RunPlan, rendered: &str) {
    println!("Run: {}", plan.kind.as_str());
    println!("Working directory: {}", plan.command.working_dir.display());
    println!("Command: {}", plan.command.display());
    println!("Framework config:");
    println!("{rendered}");
}

pub fn print_run_summary(outcome: &RunOutcome) {
    println!(
        "{} finished in {:.1}s ({} log lines)",
        outcome.kind.as_str(),
        outcome.duration_ms as f64 / 1000.0,
        outcome.lines
    );
    print_metrics(&outcome.metrics);
}

fn print_metrics(report: &MetricReport) {
    if report.is_empty() {
        println!("No metrics reported.");
        return;
    }
    let sections: Vec<MetricSection> = report.iter().map(|(section, _)| section).collect();
    let mut header = vec![header_cell("Metric")];
    header.extend(sections.iter().map(|section| header_cell(section.marker())));

    let mut table = Table::new();
    table.set_header(header);
    apply_table_style(&mut table);
    for index in 1..=sections.len() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for name in report.metric_names() {
        let mut row = vec![Cell::new(name).add_attribute(Attribute::Bold)];
        for section in &sections {
            let value = report.get(*section).and_then(|values| values.get(name));
            row.push(match value {
                Some(value) => Cell::new(format!("{value:.4}")),
                None => dim_cell("-"),
            });
        }
        table.add_row(row);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
