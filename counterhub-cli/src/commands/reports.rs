//! Reports command - list report definitions.

use anyhow::Result;
use counterhub_store::DefinitionStore;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the reports command.
pub async fn run(cli: &Cli) -> Result<()> {
    let definitions = DefinitionStore::load_default().read().await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_definitions_header());
            println!("{}", "─".repeat(60));
            for definition in &definitions {
                println!("{}", formatter.format_definition_line(definition));
            }
            println!();
            println!(
                "Total: {} definitions ({} custom)",
                definitions.len(),
                definitions.iter().filter(|d| d.is_custom()).count()
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_definitions(&definitions)?);
        }
    }

    Ok(())
}
