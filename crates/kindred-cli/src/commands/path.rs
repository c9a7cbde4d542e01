//! Relationship path command

use clap::Args;

use crate::output::print_json;
use crate::AppContext;
use kindred_core::{resolve_relationship_path, PersonId};
use kindred_storage::StorageBackend;

#[derive(Args)]
pub struct PathArgs {
    /// Member id to start from
    pub person1: PersonId,
    /// Member id to reach
    pub person2: PersonId,
}

pub async fn run(args: &PathArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let tree = ctx.require_tree().await?;
    let family = ctx.storage.load_family(tree.id).await?;

    tracing::info!(
        "Finding path from {} to {} in tree {}",
        args.person1,
        args.person2,
        tree.id
    );
    let path = resolve_relationship_path(
        &family.people,
        &family.relationships,
        args.person1,
        args.person2,
    )?;

    if ctx.format.is_json() {
        return print_json(&serde_json::json!({ "path": path }));
    }

    match path {
        Some(path) => {
            println!("{}", path.describe());
            println!("  ({} steps)", path.len());
        }
        None => println!(
            "No relationship found between #{} and #{}",
            args.person1, args.person2
        ),
    }

    Ok(())
}
