// src/render.rs

use crate::error::Result;
use crate::models::LogEntry;
use clap::ValueEnum;
use rust_xlsxwriter::Workbook;
use std::path::Path;

pub const HEADERS: [&str; 4] = ["Operator", "Operator IP(s)", "Timestamp (UTC)", "Command/Activity"];

/// Spreadsheet output, written to the current directory.
pub const SPREADSHEET_FILE: &str = "opl-timeline.xlsx";
const SHEET_NAME: &str = "Timeline";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Terminal,
    #[value(alias = "markdown")]
    Md,
    #[value(alias = "spreadsheet")]
    Xlsx,
}

fn columns(entry: &LogEntry) -> [String; 4] {
    [
        entry.operator.clone().unwrap_or_default(),
        entry.ip_addrs.join(", "),
        entry.date.clone(),
        entry.text.clone(),
    ]
}

/// Per-column width: the longest of the header and every cell, in characters.
pub fn column_widths(entries: &[LogEntry]) -> [usize; 4] {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for entry in entries {
        for (width, cell) in widths.iter_mut().zip(columns(entry)) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

fn row(cells: &[String; 4], widths: &[usize; 4], sep: &str, edge: bool) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{:<w$}", cell, w = w))
        .collect();
    if edge {
        format!("| {} |\n", padded.join(sep))
    } else {
        format!("{}\n", padded.join(sep))
    }
}

pub fn render_terminal(entries: &[LogEntry]) -> String {
    let widths = column_widths(entries);
    let mut out = row(&HEADERS.map(String::from), &widths, " ", false);
    out.push_str(&"-".repeat(widths.iter().sum()));
    out.push('\n');
    for entry in entries {
        out.push_str(&row(&columns(entry), &widths, " ", false));
    }
    out.push('\n');
    out
}

pub fn render_markdown(entries: &[LogEntry]) -> String {
    let widths = column_widths(entries);
    let mut out = row(&HEADERS.map(String::from), &widths, " | ", true);
    let dashes: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&format!("|-{}-|\n", dashes.join("-|-")));
    for entry in entries {
        out.push_str(&row(&columns(entry), &widths, " | ", true));
    }
    out.push('\n');
    out
}

/// One `Timeline` sheet: header row, then entries in input order.
pub fn write_spreadsheet(entries: &[LogEntry], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (idx, entry) in entries.iter().enumerate() {
        let r = (idx + 1) as u32;
        for (col, cell) in columns(entry).iter().enumerate() {
            sheet.write_string(r, col as u16, cell)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Reader, Xlsx};
    use tempfile::tempdir;

    fn entry(operator: &str, ips: &[&str], text: &str) -> LogEntry {
        LogEntry {
            date: "2024-01-01 10:00:00 GMT".to_string(),
            text: text.to_string(),
            ip_addrs: ips.iter().map(|s| s.to_string()).collect(),
            operator: Some(operator.to_string()).filter(|o| !o.is_empty()),
        }
    }

    #[test]
    fn widths_cover_headers_and_data() {
        let entries = vec![
            entry("abc", &["10.0.0.1"], "id"),
            entry("abcdefghij", &["10.0.0.1", "10.0.0.2"], "nmap"),
        ];
        let widths = column_widths(&entries);
        assert_eq!(widths[0], 10);
        assert_eq!(widths[1], "10.0.0.1, 10.0.0.2".len());
        assert_eq!(widths[2], "Timestamp (UTC)".len().max(23));
        assert_eq!(widths[3], "Command/Activity".len());
    }

    #[test]
    fn short_data_keeps_header_width() {
        let widths = column_widths(&[entry("abc", &[], "x")]);
        assert_eq!(widths[0], "Operator".len());
    }

    #[test]
    fn terminal_rows_are_aligned() {
        let entries = vec![entry("abc", &[], "whoami"), entry("abcdefghij", &[], "nmap")];
        let out = render_terminal(&entries);
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].starts_with("Operator   Operator IP(s) "));
        assert_eq!(lines[1], "-".repeat(column_widths(&entries).iter().sum()));
        assert!(lines[2].starts_with("abc        "));
        assert!(lines[3].starts_with("abcdefghij "));
        assert_eq!(lines[0].len(), lines[2].len());
        assert!(out.ends_with("\n\n"));
    }

    #[test]
    fn markdown_separator_matches_header() {
        let entries = vec![entry("abc", &["10.0.0.1"], "id"), entry("abcdefghij", &[], "nmap")];
        let out = render_markdown(&entries);
        let lines: Vec<&str> = out.lines().collect();

        let header_cells: Vec<usize> = lines[0].split('|').map(str::len).collect();
        let sep_cells: Vec<usize> = lines[1].split('|').map(str::len).collect();
        assert_eq!(header_cells, sep_cells);
        assert!(lines[1].chars().all(|c| c == '|' || c == '-'));
        assert_eq!(lines[0].len(), lines[1].len());
        assert_eq!(lines[2].len(), lines[1].len());
        assert!(lines[0].starts_with("| Operator   | "));
    }

    #[test]
    fn empty_input_still_prints_headers() {
        let out = render_markdown(&[]);
        assert_eq!(out.lines().filter(|l| !l.is_empty()).count(), 2);
    }

    #[test]
    fn spreadsheet_has_timeline_sheet_in_input_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SPREADSHEET_FILE);
        let entries = vec![
            entry("zk", &["10.0.0.1", "10.0.0.2"], "nmap -sV target"),
            entry("ana", &["10.0.0.3"], "phished helpdesk"),
        ];
        write_spreadsheet(&entries, &path).unwrap();

        let mut book: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(book.sheet_names(), [SHEET_NAME]);

        let range = book.worksheet_range(SHEET_NAME).unwrap();
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|r| r.iter().map(|cell| cell.to_string()).collect())
            .collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], HEADERS);
        assert_eq!(
            rows[1],
            ["zk", "10.0.0.1, 10.0.0.2", "2024-01-01 10:00:00 GMT", "nmap -sV target"]
        );
        assert_eq!(rows[2][0], "ana");
        assert_eq!(rows[2][3], "phished helpdesk");
    }

    #[test]
    fn spreadsheet_save_failure_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing/dir/out.xlsx");
        assert!(write_spreadsheet(&[], &path).is_err());
    }
}
