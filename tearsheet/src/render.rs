//! Terminal and CSV rendering for metric tables.
//!
//! The grid arriving here already contains every formatting decision; this
//! adapter only pads, truncates, and styles.

use console::Style;
use tearsheetlib::MetricTable;

/// Width of the label column.
const LABEL_WIDTH: usize = 24;

/// Width of each value column.
const CELL_WIDTH: usize = 12;

/// Truncate a label to fit within max_len, adding ".." prefix if needed
fn truncate_label(label: &str, max_len: usize) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() > max_len {
        let tail: String = chars[chars.len() - max_len + 2..].iter().collect();
        format!("..{}", tail)
    } else {
        label.to_string()
    }
}

/// Render a metric table as an aligned, styled terminal table.
pub fn render_table(table: &MetricTable) -> String {
    let title_style = Style::new().cyan().bold();
    let header_style = Style::new().bold();
    let separator_style = Style::new().dim();

    let mut output = String::new();
    if let Some(title) = &table.title {
        output.push_str(&format!("{}\n\n", title_style.apply_to(title)));
    }

    let mut header_line = format!(
        "{:<width$}",
        truncate_label(&table.headers[0], LABEL_WIDTH - 2),
        width = LABEL_WIDTH
    );
    for cell in &table.headers[1..] {
        header_line.push_str(&format!("{:>width$}", cell, width = CELL_WIDTH));
    }
    output.push_str(&format!("{}\n", header_style.apply_to(&header_line)));

    let separator = "-".repeat(LABEL_WIDTH + CELL_WIDTH * (table.headers.len() - 1));
    output.push_str(&format!("{}\n", separator_style.apply_to(&separator)));

    for row in &table.rows {
        let mut line = format!(
            "{:<width$}",
            truncate_label(&row.label, LABEL_WIDTH - 2),
            width = LABEL_WIDTH
        );
        for cell in &row.values {
            line.push_str(&format!("{:>width$}", cell, width = CELL_WIDTH));
        }
        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Render a metric table as CSV (labels quoted, cells verbatim).
pub fn render_csv(table: &MetricTable) -> String {
    let mut output = String::new();

    output.push_str(&table.headers.join(","));
    output.push('\n');

    for row in &table.rows {
        output.push_str(&format!("\"{}\"", row.label));
        for cell in &row.values {
            output.push(',');
            output.push_str(cell);
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use tearsheetlib::{standard_definitions, DataRow, FormatRegistry, MetricValue};

    fn sample_table() -> MetricTable {
        let rows = vec![DataRow::new("AAPL")
            .with_value("cagr", MetricValue::Num(0.1534))
            .with_value("beta", MetricValue::Null)];
        MetricTable::from_scan(
            &standard_definitions(),
            &FormatRegistry::standard(),
            &rows,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("a-very-long-ticker-name", 10), "..cker-name");
    }

    #[test]
    fn test_render_table_lines_are_aligned() {
        let rendered = render_table(&sample_table());
        let lines: Vec<&str> = rendered.lines().collect();
        // header, separator, one body row
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Ticker"));
        assert!(lines[0].contains("CAGR"));
        assert!(lines[2].contains("15.34%"));
        assert!(lines[2].contains("N/A"));
    }

    #[test]
    fn test_render_csv_shape() {
        let csv = render_csv(&sample_table());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Ticker,CAGR,Volatility,MDD,Sharpe,Sortino,Beta,Alpha,Score"
        );
        assert!(lines[1].starts_with("\"AAPL\",15.34%"));
        // alpha never computed: placeholder cell
        assert!(lines[1].contains(",—,"));
    }
}
