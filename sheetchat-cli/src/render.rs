//! Terminal rendering for summaries, transcript messages, tables and charts

use colored::Colorize;
use sheetchat_core::{ChartSpec, ChartType, Role, Sheet, Workbook};

/// Rows shown per sheet by the `/table` command.
const TABLE_ROW_LIMIT: usize = 15;

/// Width of the value bar gutter in chart rendering.
const BAR_WIDTH: usize = 30;

pub fn print_summary(workbook: &Workbook) {
    println!();
    println!(
        "{} {}",
        "Loaded".bold().green(),
        workbook.file_name.bold()
    );
    for sheet in &workbook.sheets {
        println!(
            "  {} {} ({} rows): {}",
            "•".dimmed(),
            sheet.name.bold(),
            sheet.row_count(),
            sheet.columns.join(", ").dimmed()
        );
    }
    println!();
}

pub fn print_message(role: Role, content: &str) {
    let label = match role {
        Role::User => "you".bold().cyan(),
        Role::Model => "analyst".bold().green(),
    };
    println!("{}{} {}", label, ">".bold(), content);
    println!();
}

/// Plain column-aligned preview of one sheet.
pub fn print_table(sheet: &Sheet) {
    let shown = sheet.rows.len().min(TABLE_ROW_LIMIT);

    // Column widths from headers and the shown rows.
    let mut widths: Vec<usize> = sheet.columns.iter().map(|c| c.chars().count()).collect();
    for row in &sheet.rows[..shown] {
        for (i, value) in row.values().enumerate() {
            let len = value.render().chars().count();
            if len > widths[i] {
                widths[i] = len;
            }
        }
    }

    println!("{}", format!("[{}]", sheet.name).bold());
    let header = sheet
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", header.bold());

    for row in &sheet.rows[..shown] {
        let line = row
            .values()
            .enumerate()
            .map(|(i, v)| format!("{:<width$}", v.render(), width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line);
    }
    if sheet.rows.len() > shown {
        println!("{}", format!("... {} more rows", sheet.rows.len() - shown).dimmed());
    }
    println!();
}

/// Text rendering of a chart directive: title, axes and a proportional bar
/// per data point.
pub fn print_chart(chart: &ChartSpec) {
    let kind = match chart.chart_type {
        ChartType::Bar => "bar",
        ChartType::Line => "line",
        ChartType::Pie => "pie",
        ChartType::Area => "area",
    };
    println!("{} {}", chart.title.bold(), format!("({kind})").dimmed());
    if let (Some(x), Some(y)) = (&chart.x_axis_label, &chart.y_axis_label) {
        println!("{}", format!("{} vs {}", y, x).dimmed());
    }

    let max = chart
        .data
        .iter()
        .map(|p| p.value.abs())
        .fold(0.0_f64, f64::max);
    let name_width = chart
        .data
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0);

    for point in &chart.data {
        let filled = if max > 0.0 {
            ((point.value.abs() / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        println!(
            "  {:<name_width$}  {} {}",
            point.name,
            "█".repeat(filled).green(),
            point.value
        );
    }
    println!();
}
