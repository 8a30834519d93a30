//! Posts command implementation.

use super::{open_store, parse_id};
use crate::cli::{PostsAction, PostsArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use refinery_domain::RecordStore;
use refinery_store::{publish, unpublish, Post};

/// Execute the posts command.
pub fn execute_posts(args: PostsArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut store = open_store(config)?;
    let output = run_posts(args.action, &mut store, formatter)?;
    println!("{}", output);
    Ok(())
}

/// Run a post action against any post store.
pub fn run_posts<S: RecordStore<Post>>(
    action: PostsAction,
    store: &mut S,
    formatter: &Formatter,
) -> Result<String> {
    match action {
        PostsAction::List => {
            let posts = store.list().into_result().map_err(CliError::Record)?;
            formatter.format_posts(&posts)
        }
        PostsAction::Show { id } => {
            let post = store.get(parse_id(&id)?).into_result().map_err(CliError::Record)?;
            formatter.format_post(&post)
        }
        PostsAction::Publish { id } => {
            let post = publish(store, parse_id(&id)?)
                .into_result()
                .map_err(CliError::Record)?;
            Ok(formatter.success(&format!("Published {}", post.id)))
        }
        PostsAction::Unpublish { id } => {
            let post = unpublish(store, parse_id(&id)?)
                .into_result()
                .map_err(CliError::Record)?;
            Ok(formatter.success(&format!("Moved {} back to draft", post.id)))
        }
        PostsAction::Delete { id } => {
            let id = parse_id(&id)?;
            store.delete(id).into_result().map_err(CliError::Record)?;
            Ok(formatter.success(&format!("Deleted {}", id)))
        }
    }
}
