//! Merge command implementation.

use super::{build_provider, open_store, read_input};
use crate::cli::MergeArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use refinery_store::{SqliteStore, Template};
use refinery_service::TemplateMerger;
use std::sync::Arc;
use uuid::Uuid;

/// Execute the merge command.
pub async fn execute_merge(args: MergeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let template = match Uuid::parse_str(args.template.trim()) {
        Ok(id) => load_template(&open_store(config)?, id)?,
        Err(_) => read_input(&args.template)?,
    };
    let content = read_input(&args.content)?;

    let provider = Arc::new(build_provider(config)?);
    let merger = TemplateMerger::new(provider, &config.pipeline);
    let merged = merger.merge(&template, &content).await?;

    println!("{}", merged);
    eprintln!("{}", formatter.success("Template merged"));
    Ok(())
}

/// Body of a saved template.
pub fn load_template(store: &SqliteStore, id: Uuid) -> Result<String> {
    Ok(store.fetch::<Template>(id)?.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use refinery_store::StoreError;

    #[test]
    fn test_load_saved_template() {
        let mut store = SqliteStore::in_memory().unwrap();
        let template = Template::new("Show notes", "# {title}\n\n{summary}");
        store.put(&template).unwrap();

        assert_eq!(load_template(&store, template.id).unwrap(), template.body);
    }

    #[test]
    fn test_load_missing_template() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(matches!(
            load_template(&store, Uuid::now_v7()),
            Err(CliError::Store(StoreError::NotFound(_)))
        ));
    }
}
