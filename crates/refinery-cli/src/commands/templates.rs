//! Templates command implementation.

use super::{open_store, parse_id, read_input};
use crate::cli::{TemplatesAction, TemplatesArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use refinery_domain::RecordStore;
use refinery_pipeline::validate_input_strict;
use refinery_store::Template;

/// Execute the templates command.
pub fn execute_templates(args: TemplatesArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut store = open_store(config)?;
    let output = run_templates(args.action, &mut store, formatter)?;
    println!("{}", output);
    Ok(())
}

/// Run a template action against any template store.
pub fn run_templates<S: RecordStore<Template>>(
    action: TemplatesAction,
    store: &mut S,
    formatter: &Formatter,
) -> Result<String> {
    match action {
        TemplatesAction::List => {
            let templates = store.list().into_result().map_err(CliError::Record)?;
            formatter.format_templates(&templates)
        }
        TemplatesAction::Add {
            name,
            file,
            description,
        } => {
            let body = read_input(&file)?;
            if !validate_input_strict(&body) {
                return Err(CliError::InvalidInput(format!("Template '{}' is empty", file)));
            }
            let mut template = Template::new(name, body);
            template.description = description;
            let template = store.insert(template).into_result().map_err(CliError::Record)?;
            Ok(formatter.success(&format!("Saved template {}", template.id)))
        }
        TemplatesAction::Delete { id } => {
            let id = parse_id(&id)?;
            store.delete(id).into_result().map_err(CliError::Record)?;
            Ok(formatter.success(&format!("Deleted {}", id)))
        }
    }
}
