//! Relationship commands

use std::collections::HashMap;

use clap::{Args, Subcommand};

use crate::output::print_json;
use crate::AppContext;
use kindred_core::limits::validate_relationship;
use kindred_core::{NewRelationship, PersonId, RelationshipId};
use kindred_storage::StorageBackend;

#[derive(Args)]
pub struct RelationArgs {
    #[command(subcommand)]
    pub command: RelationCommands,
}

#[derive(Subcommand)]
pub enum RelationCommands {
    /// Record that person1 is the <type> of person2
    Add {
        /// Member id of person1
        person1: PersonId,
        /// Member id of person2
        person2: PersonId,
        /// Relationship type: parent, child, spouse, sibling or any custom kind
        #[arg(long = "type", value_name = "KIND")]
        kind: String,
    },
    /// List relationships of the selected tree
    List,
    /// Delete a relationship
    Delete {
        /// Relationship id
        id: RelationshipId,
    },
}

pub async fn run(args: &RelationArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let tree = ctx.require_tree().await?;
    tracing::debug!("Running relation command for tree: {}", tree.id);

    match &args.command {
        RelationCommands::Add {
            person1,
            person2,
            kind,
        } => {
            let new = NewRelationship::new(*person1, *person2, kind.trim());
            validate_relationship(&new)?;

            let relationship = ctx.storage.create_relationship(tree.id, new).await?;
            tracing::info!(
                "Created relationship: {} -[{}]-> {}",
                person1,
                relationship.relationship_type,
                person2
            );

            if ctx.format.is_json() {
                print_json(&relationship)?;
            } else {
                println!(
                    "Created relationship #{}: {} -[{}]-> {}",
                    relationship.id, person1, relationship.relationship_type, person2
                );
            }
        }
        RelationCommands::List => {
            let family = ctx.storage.load_family(tree.id).await?;
            tracing::info!("Found {} relationships", family.relationships.len());

            if ctx.format.is_json() {
                return print_json(&family.relationships);
            }

            if family.relationships.is_empty() {
                println!("No relationships in tree '{}'", tree.name);
                return Ok(());
            }

            let names: HashMap<PersonId, &str> = family
                .people
                .iter()
                .map(|p| (p.id, p.name.as_str()))
                .collect();
            let name_of = |id: PersonId| {
                names
                    .get(&id)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| format!("#{}", id))
            };

            println!(
                "Relationships in '{}' ({} found):",
                tree.name,
                family.relationships.len()
            );
            for rel in &family.relationships {
                println!(
                    "  #{} {} -[{}]-> {}",
                    rel.id,
                    name_of(rel.person1_id),
                    rel.relationship_type,
                    name_of(rel.person2_id)
                );
            }
        }
        RelationCommands::Delete { id } => {
            ctx.storage.delete_relationship(tree.id, *id).await?;
            tracing::info!("Deleted relationship {}", id);
            println!("Deleted relationship #{}", id);
        }
    }

    Ok(())
}
