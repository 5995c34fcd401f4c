use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use hts_core::{DedupReport, DuplicateAnalysis, ScheduleStats};
use hts_model::{DutyKind, DutyRule, Section301List, format_percent};
use hts_standards::RuleCatalog;
use hts_cli::pipeline::{CombineResult, PreprocessResult};

pub fn print_preprocess_summary(result: &PreprocessResult) {
    println!("Output: {}", result.output.display());
    println!("HTS revision: {}", result.hts_revision);
    println!(
        "Rules: {}  Section 301 codes: {}  Section 201 table: {}",
        result.rule_count,
        result.section301_codes,
        if result.section201_loaded { "loaded" } else { "unavailable" }
    );
    let stats = &result.stats;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Measure"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (label, count) in run_counts(stats) {
        table.add_row(vec![Cell::new(label), count_cell(count, Color::Reset)]);
    }
    for kind in DutyKind::ALL {
        table.add_row(vec![
            Cell::new(format!("{} duties", kind.display_name())),
            count_cell(stats.duty_counts.get(kind), Color::Reset),
        ]);
    }
    table.add_row(vec![
        Cell::new("Degraded values")
            .fg(Color::Yellow)
            .add_attribute(Attribute::Bold),
        count_cell(stats.degraded_values, Color::Yellow),
    ]);
    println!("{table}");
    print_section_301_breakdown(stats);
}

fn run_counts(stats: &ScheduleStats) -> [(&'static str, usize); 8] {
    [
        ("Rows read", stats.total_rows),
        ("Entries written", stats.total_entries),
        ("Rows skipped (no code)", stats.skipped_rows),
        ("Rows filtered (section 301 only)", stats.filtered_rows),
        ("Chapter 99 entries", stats.chapter_99_entries),
        ("Special provisions", stats.special_provisions),
        ("Trade action entries", stats.trade_action_entries),
        ("Entries with extra tariffs", stats.extra_tariff_entries),
    ]
}

fn print_section_301_breakdown(stats: &ScheduleStats) {
    if stats.section_301_breakdown.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("List"),
        header_cell("Entries"),
        header_cell("Tariff"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (label, count) in &stats.section_301_breakdown {
        let list = Section301List::parse(label);
        table.add_row(vec![
            Cell::new(label),
            Cell::new(count),
            Cell::new(list.tier_label()),
        ]);
    }
    println!("{table}");
}

pub fn print_combine_summary(result: &CombineResult) {
    println!("Output: {}", result.output.display());
    println!("Files: {}", result.files.len());
    let mut table = Table::new();
    table.set_header(vec![header_cell("List"), header_cell("Entries")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (label, count) in &result.combined.per_list {
        table.add_row(vec![Cell::new(label), Cell::new(count)]);
    }
    table.add_row(vec![
        header_cell("TOTAL"),
        Cell::new(result.combined.entries.len()).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    if result.combined.duplicate_entries > 0 {
        println!(
            "{} entries share {} codes across lists; run `dedupe` before `preprocess`.",
            result.combined.duplicate_entries,
            result.combined.duplicate_codes.len()
        );
    }
}

pub fn print_analysis(analysis: &DuplicateAnalysis, top: usize) {
    if analysis.codes.is_empty() {
        println!("No code appears on more than one list.");
        return;
    }
    println!("Codes on more than one list: {}", analysis.codes.len());
    let mut table = Table::new();
    table.set_header(vec![header_cell("Lists"), header_cell("Codes")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (combination, count) in &analysis.combinations {
        table.add_row(vec![Cell::new(combination), Cell::new(count)]);
    }
    println!("{table}");

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("HTS code"),
        header_cell("Lists"),
        header_cell("Tiers"),
    ]);
    apply_table_style(&mut table);
    for code in analysis.codes.iter().take(top) {
        table.add_row(vec![
            Cell::new(&code.raw_code),
            Cell::new(code.lists.join(", ")),
            Cell::new(code.tiers.join(", ")),
        ]);
    }
    println!("{table}");
}

pub fn print_dedup_report(report: &DedupReport) {
    println!(
        "Entries: {} -> unique codes: {}",
        report.input_entries, report.unique_codes
    );
    println!(
        "Codes on multiple lists: {} ({} entries)",
        report.multi_list_codes, report.multi_list_entries
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Controlling list"),
        header_cell("Codes"),
        header_cell("Tariff"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (label, count) in &report.distribution {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(count),
            Cell::new(Section301List::parse(label).tier_label()),
        ]);
    }
    println!("{table}");

    if !report.moved_to_reduced_tier.is_empty() {
        println!(
            "Moved from 25% to 7.5% by List 4A: {}",
            report.moved_to_reduced_tier.len()
        );
        let mut table = Table::new();
        table.set_header(vec![header_cell("HTS code"), header_cell("Previous lists")]);
        apply_table_style(&mut table);
        for moved in &report.moved_to_reduced_tier {
            table.add_row(vec![
                Cell::new(&moved.raw_code),
                Cell::new(moved.previous_lists.join(", ")),
            ]);
        }
        println!("{table}");
    }
    for collision in &report.collisions {
        println!(
            "Normalization collision at {}: {}",
            collision.code,
            collision.raw_codes.join(", ")
        );
    }
}

pub fn print_rules(catalog: &RuleCatalog) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rule"),
        header_cell("Type"),
        header_cell("Applies to"),
        header_cell("Countries"),
        header_cell("Rate"),
        header_cell("Effective"),
        header_cell("Expires"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for rule in catalog.iter() {
        table.add_row(rule_row(rule));
    }
    println!("{table}");
}

fn rule_row(rule: &DutyRule) -> Vec<Cell> {
    let date = |value: Option<chrono::NaiveDate>| match value {
        Some(date) => Cell::new(date),
        None => dim_cell("-"),
    };
    let mut rate = format_percent(rule.rate);
    if let Some(reduced) = &rule.reduced_rate {
        rate.push_str(&format!(" ({} reduced)", format_percent(reduced.rate)));
    }
    vec![
        Cell::new(&rule.name).add_attribute(Attribute::Bold),
        Cell::new(rule.kind.display_name()),
        Cell::new(&rule.applies_to),
        Cell::new(&rule.countries),
        Cell::new(rate),
        date(rule.effective),
        date(rule.expires),
        if rule.is_active() {
            Cell::new("active").fg(Color::Green)
        } else {
            dim_cell("inactive")
        },
    ]
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
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

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
