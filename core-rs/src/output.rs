//! Terminal output helpers
//!
//! Colors are on only when stdout is a terminal and `NO_COLOR` is unset.

use colored::Colorize;
use std::env;
use std::io::IsTerminal;

/// Message styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Success,
    Warning,
    Error,
    Info,
    Header,
    Dim,
}

/// Whether colored output should be used for this process
pub fn colors_enabled() -> bool {
    env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// Apply [`colors_enabled`] to every later [`paint`] call
pub fn init_colors() {
    colored::control::set_override(colors_enabled());
}

/// Styled text
pub fn paint(tone: Tone, text: &str) -> String {
    match tone {
        Tone::Plain => text.to_string(),
        Tone::Success => text.green().to_string(),
        Tone::Warning => text.yellow().to_string(),
        Tone::Error => text.red().to_string(),
        Tone::Info => text.cyan().to_string(),
        Tone::Header => text.bold().to_string(),
        Tone::Dim => text.dimmed().to_string(),
    }
}

pub fn success(msg: &str) {
    println!("{}", paint(Tone::Success, msg));
}

pub fn warning(msg: &str) {
    println!("{}", paint(Tone::Warning, msg));
}

pub fn error(msg: &str) {
    println!("{}", paint(Tone::Error, msg));
}

pub fn info(msg: &str) {
    println!("{}", paint(Tone::Info, msg));
}

pub fn header(msg: &str) {
    println!("{}", paint(Tone::Header, msg));
}

/// Lay out a table; widths are measured on the unstyled text
pub fn render_table(headers: &[&str], rows: &[Vec<(String, Tone)>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, (cell, _)) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let pad = |text: &str, width: usize| {
        let fill = width.saturating_sub(text.chars().count());
        " ".repeat(fill)
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{}{}", paint(Tone::Header, h), pad(h, widths[i])))
        .collect();
    lines.push(header_row.join("  ").trim_end().to_string());

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, (cell, tone))| {
                let width = widths.get(i).copied().unwrap_or(0);
                format!("{}{}", paint(*tone, cell), pad(cell, width))
            })
            .collect();
        lines.push(cells.join("  ").trim_end().to_string());
    }

    lines
}

pub fn print_table(headers: &[&str], rows: &[Vec<(String, Tone)>]) {
    for line in render_table(headers, rows) {
        println!("{}", line);
    }
}
