use serde::Serialize;
use serde_json::Value;

use presale_core::{MemorySurface, UtcDateTime};

use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct Document<'a> {
    command: &'a str,
    generated_at: UtcDateTime,
    data: &'a Value,
    display: &'a MemorySurface,
    #[serde(skip_serializing_if = "no_warnings")]
    warnings: &'a [String],
}

fn no_warnings(warnings: &&[String]) -> bool {
    warnings.is_empty()
}

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let document = Document {
                command: result.command,
                generated_at: UtcDateTime::now(),
                data: &result.data,
                display: &result.display,
                warnings: &result.warnings,
            };
            let payload = if pretty {
                serde_json::to_string_pretty(&document)?
            } else {
                serde_json::to_string(&document)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => print!("{}", render_table(result)),
    }

    Ok(())
}

fn render_table(result: &CommandResult) -> String {
    let mut out = format!("== {} ==\n", result.command);

    let width = result
        .display
        .iter()
        .map(|(slot, _)| slot.name().len())
        .max()
        .unwrap_or(0);
    for (slot, text) in result.display.iter() {
        out.push_str(&format!("{:width$} : {text}\n", slot.name()));
    }

    if result.display.is_empty() {
        for line in serde_json::to_string_pretty(&result.data)
            .unwrap_or_default()
            .lines()
        {
            out.push_str(&format!("  {line}\n"));
        }
    }

    if !result.warnings.is_empty() {
        out.push_str("warnings:\n");
        for warning in &result.warnings {
            out.push_str(&format!("  - {warning}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use presale_core::{DisplaySlot, DisplaySurface};
    use serde_json::json;

    use super::*;

    #[test]
    fn table_lists_slots_and_warnings() {
        let mut display = MemorySurface::new();
        display.write(DisplaySlot::ProgressPercent, String::from("70.0%"));
        display.write(DisplaySlot::SoldUnits, String::from("70.0k"));
        let result = CommandResult::new("progress", json!({}), display)
            .with_warning("allocation figures are scheduled, not sales data");

        let table = render_table(&result);

        assert!(table.starts_with("== progress ==\n"));
        assert!(table.contains("progress_percent : 70.0%\n"));
        assert!(table.contains(&format!("{:16} : 70.0k\n", "sold_units")));
        assert!(table.contains("  - allocation figures are scheduled"));
    }

    #[test]
    fn table_falls_back_to_data_without_slots() {
        let result = CommandResult::new("wallet status", json!({"connected": false}), MemorySurface::new());
        assert!(render_table(&result).contains("\"connected\": false"));
    }
}
