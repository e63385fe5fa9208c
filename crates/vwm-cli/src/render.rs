//! Terminal rendering of reports.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use vwm_model::{AggregateReport, ErrorTally, UnavailableReport};

/// Decimal places shown for DASH amounts.
const AMOUNT_PRECISION: usize = 8;

pub fn print_report(report: &AggregateReport) {
    println!("{}", report_table(report));
    if let Some(table) = failures_table(report) {
        println!();
        println!("Failed lookups:");
        println!("{table}");
    }
    println!();
    println!("{}", report_summary(report));
}

pub fn print_unavailable(unavailable: &UnavailableReport) {
    eprintln!("{}", unavailable_message(unavailable));
}

/// One row per validator plus a total row.
pub fn report_table(report: &AggregateReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Validator"),
        header_cell("Identity"),
        header_cell("Epochs paid"),
        header_cell("Failed"),
        header_cell("Total (DASH)"),
    ]);
    apply_report_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);

    for (entity, total) in &report.validator_totals {
        let identity = report
            .identities
            .get(entity)
            .map_or_else(|| dim_cell("-"), |identity| Cell::new(identity.as_str()));
        let paid = report.withdrawals.get(entity).map_or(0, |epochs| {
            epochs.values().filter(|amount| !amount.is_zero()).count()
        });
        let failed = report
            .failures
            .iter()
            .filter(|failure| &failure.entity == entity)
            .count();
        table.add_row(vec![
            Cell::new(entity.as_str()),
            identity,
            Cell::new(paid),
            count_cell(failed, Color::Red),
            Cell::new(format!("{total:.AMOUNT_PRECISION$}")),
        ]);
    }

    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        count_cell(report.failures.len(), Color::Red).add_attribute(Attribute::Bold),
        Cell::new(format!("{:.AMOUNT_PRECISION$}", report.grand_total))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
    ]);
    table
}

/// Pairs that errored, or `None` when the report is complete.
pub fn failures_table(report: &AggregateReport) -> Option<Table> {
    if report.failures.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Validator"),
        header_cell("Epoch"),
        header_cell("Error"),
    ]);
    apply_report_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for failure in &report.failures {
        table.add_row(vec![
            Cell::new(failure.entity.as_str()),
            Cell::new(failure.epoch),
            Cell::new(failure.error.label()).fg(Color::Red),
        ]);
    }
    Some(table)
}

/// Range, totals, valuation and a partial-result notice.
pub fn report_summary(report: &AggregateReport) -> String {
    let range = report.epoch_range;
    let mut lines = Vec::new();

    if range.is_empty() {
        lines.push(format!(
            "Epochs: none (start {} is past current epoch {})",
            range.start(),
            report.current_epoch
        ));
    } else {
        lines.push(format!(
            "Epochs: {}-{} (current {})",
            range.start(),
            range.end(),
            report.current_epoch
        ));
    }
    if let Some(populated) = report.populated {
        lines.push(format!(
            "Data found for epochs {}-{}",
            populated.start(),
            populated.end()
        ));
    }

    lines.push(format!(
        "Grand total: {:.AMOUNT_PRECISION$} DASH",
        report.grand_total
    ));
    if let Some(valuation) = &report.valuation {
        lines.push(format!(
            "Value: {:.2} {currency} at {:.2} {currency}/DASH",
            valuation.grand_total_fiat,
            valuation.rate,
            currency = valuation.currency
        ));
    }

    if report.is_partial() {
        let failed = report.failures.len();
        let (noun, verb) = if failed == 1 {
            ("pair", "is")
        } else {
            ("pairs", "are")
        };
        lines.push(format!(
            "Partial result: {failed} {noun} could not be fetched and {verb} excluded from the totals. Run again to retry."
        ));
    }

    lines.join("\n")
}

/// Headline plus guidance for an unavailable report.
pub fn unavailable_message(unavailable: &UnavailableReport) -> String {
    format!(
        "Withdrawal data unavailable for epoch {} ({}).\n{}",
        unavailable.epoch_range.start(),
        describe_errors(&unavailable.errors),
        unavailable.guidance()
    )
}

fn describe_errors(errors: &ErrorTally) -> String {
    let mut parts = Vec::new();
    if errors.connection > 0 {
        parts.push(counted(errors.connection, "connection error", "connection errors"));
    }
    if errors.timeout > 0 {
        parts.push(counted(errors.timeout, "timeout", "timeouts"));
    }
    if parts.is_empty() {
        return "no calls completed".to_string();
    }
    parts.join(", ")
}

fn counted(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

fn apply_report_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
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

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}
