use std::io::{self, Write};

use cartpick_core::Envelope;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Plain-text rendering of a command's data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|header| (*header).to_owned()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        let mut widths = self
            .headers
            .iter()
            .map(|header| header.chars().count())
            .collect::<Vec<_>>();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                let width = cell.chars().count();
                match widths.get_mut(index) {
                    Some(current) => *current = (*current).max(width),
                    None => widths.push(width),
                }
            }
        }

        write_row(writer, &self.headers, &widths)?;
        let rule = widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>();
        write_row(writer, &rule, &widths)?;
        for row in &self.rows {
            write_row(writer, row, &widths)?;
        }
        Ok(())
    }
}

fn write_row(writer: &mut impl Write, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(writer, "{}", line.trim_end())
}

pub fn render(
    envelope: &Envelope<Value>,
    table: &Table,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    match format {
        OutputFormat::Json => {
            if pretty {
                serde_json::to_writer_pretty(&mut writer, envelope)?;
            } else {
                serde_json::to_writer(&mut writer, envelope)?;
            }
            writeln!(writer)?;
        }
        OutputFormat::Table => {
            table.write_to(&mut writer)?;
            for warning in &envelope.meta.warnings {
                writeln!(writer, "warning: {warning}")?;
            }
            for error in &envelope.errors {
                writeln!(writer, "error[{}]: {}", error.code, error.message)?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_columns_to_widest_cell() {
        let mut table = Table::new(&["mall", "price"]);
        table.push_row(vec![String::from("coupang"), String::from("2980")]);
        table.push_row(vec![String::from("kurly"), String::from("990")]);

        let mut buffer = Vec::new();
        table.write_to(&mut buffer).expect("writes");
        let rendered = String::from_utf8(buffer).expect("utf8");

        assert_eq!(
            rendered,
            "mall     price\n-------  -----\ncoupang  2980\nkurly    990\n"
        );
    }

    #[test]
    fn counts_hangul_as_single_columns() {
        let mut table = Table::new(&["name"]);
        table.push_row(vec![String::from("우유")]);

        let mut buffer = Vec::new();
        table.write_to(&mut buffer).expect("writes");
        let rendered = String::from_utf8(buffer).expect("utf8");

        assert_eq!(rendered, "name\n----\n우유\n");
    }
}
