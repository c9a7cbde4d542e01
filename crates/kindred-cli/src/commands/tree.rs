//! Family tree commands

use std::collections::HashSet;

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::output::{print_json, OutputFormat};
use crate::AppContext;
use kindred_core::limits::validate_tree_name;
use kindred_core::passcode::{hash_passcode, verify_passcode};
use kindred_core::{Person, PersonId, RelationshipGraph, RelationshipKind, TreeId};
use kindred_storage::StorageBackend;

#[derive(Args)]
pub struct TreeArgs {
    #[command(subcommand)]
    pub command: TreeCommands,
}

#[derive(Subcommand)]
pub enum TreeCommands {
    /// Create a new family tree
    Create {
        /// Tree name
        name: String,
        /// Passcode protecting the tree
        #[arg(long, env = "KINDRED_PASSCODE")]
        passcode: String,
    },
    /// List all family trees
    List,
    /// Check a tree's passcode
    Verify {
        /// Tree id
        id: TreeId,
        /// Passcode to check
        #[arg(long, env = "KINDRED_PASSCODE")]
        passcode: String,
    },
    /// Delete a family tree with all its members and relationships
    Delete {
        /// Tree id
        id: TreeId,
        /// Delete without confirmation
        #[arg(long)]
        force: bool,
    },
    /// Show the selected tree as a descendant outline
    Outline,
}

/// One member in the descendant outline
#[derive(Debug, Serialize)]
pub struct OutlineNode {
    pub id: PersonId,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub spouses: Vec<String>,
    pub children: Vec<OutlineNode>,
}

pub async fn run(args: &TreeArgs, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::debug!("Running tree command");

    match &args.command {
        TreeCommands::Create { name, passcode } => {
            let name = name.trim();
            validate_tree_name(name)?;

            let hash = hash_passcode(passcode, ctx.config.passcode_cost)?;
            let tree = ctx.storage.create_tree(name, &hash).await?;
            tracing::info!("Created family tree {} ({})", tree.id, tree.name);

            if ctx.format.is_json() {
                print_json(&tree)?;
            } else {
                println!("Created family tree #{}: {}", tree.id, tree.name);
                println!("  Select it with: kindred --tree {} ...", tree.id);
            }
        }
        TreeCommands::List => {
            let trees = ctx.storage.get_all_trees().await?;
            tracing::info!("Found {} trees", trees.len());

            if ctx.format.is_json() {
                return print_json(&trees);
            }

            if trees.is_empty() {
                println!(
                    "No family trees found. Create one with 'kindred tree create <name> --passcode <code>'"
                );
            } else {
                println!("Family trees ({} found):", trees.len());
                for tree in &trees {
                    let current = if ctx.tree == Some(tree.id) { " (current)" } else { "" };
                    println!(
                        "  #{} {}{} - created {}",
                        tree.id,
                        tree.name,
                        current,
                        tree.created_at.format("%Y-%m-%d")
                    );
                }
            }
        }
        TreeCommands::Verify { id, passcode } => {
            let tree = ctx
                .storage
                .get_tree(*id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Family tree {} not found", id))?;

            if !verify_passcode(passcode, &tree.passcode_hash)? {
                anyhow::bail!("Invalid passcode");
            }

            if ctx.format.is_json() {
                print_json(&serde_json::json!({
                    "verified": true,
                    "tree": tree.summary(),
                }))?;
            } else {
                println!("Passcode accepted for tree #{} ({})", tree.id, tree.name);
            }
        }
        TreeCommands::Delete { id, force } => {
            let tree = ctx
                .storage
                .get_tree(*id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Family tree {} not found", id))?;

            let family = ctx.storage.load_family(tree.id).await?;
            let members = family.people.len();
            let relationships = family.relationships.len();

            if !force {
                println!(
                    "Tree '{}' has {} members and {} relationships",
                    tree.name, members, relationships
                );
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            ctx.storage.delete_tree(tree.id).await?;
            tracing::info!(
                "Deleted tree: {} ({} members, {} relationships)",
                tree.name,
                members,
                relationships
            );
            println!(
                "Deleted tree '{}' ({} members, {} relationships)",
                tree.name, members, relationships
            );
        }
        TreeCommands::Outline => {
            let tree = ctx.require_tree().await?;
            let family = ctx.storage.load_family(tree.id).await?;
            let outline = build_outline(&family.people, &family.relationships);

            match ctx.format {
                OutputFormat::Json => print_json(&outline)?,
                OutputFormat::Text => {
                    println!("{} (#{})", tree.name, tree.id);
                    if outline.is_empty() {
                        println!("  (no members)");
                    }
                    for node in &outline {
                        print_node(node, 1);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Descendant forest of a tree, starting from members with no recorded parent.
/// Each member appears once; members reachable only through a cycle are
/// appended as extra roots.
pub fn build_outline(
    people: &[Person],
    relationships: &[kindred_core::Relationship],
) -> Vec<OutlineNode> {
    let graph = RelationshipGraph::build(people, relationships);
    let mut seen = HashSet::new();

    let mut outline: Vec<OutlineNode> = graph
        .roots()
        .into_iter()
        .filter_map(|root| outline_node(&graph, people, root, &mut seen))
        .collect();

    for person in people {
        if let Some(node) = outline_node(&graph, people, person.id, &mut seen) {
            outline.push(node);
        }
    }

    outline
}

fn outline_node(
    graph: &RelationshipGraph,
    people: &[Person],
    id: PersonId,
    seen: &mut HashSet<PersonId>,
) -> Option<OutlineNode> {
    if !seen.insert(id) {
        return None;
    }

    let name_of = |id: PersonId| {
        people
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("unknown #{}", id))
    };

    let spouses = graph
        .neighbors(id)
        .iter()
        .filter(|n| n.kind == RelationshipKind::Spouse)
        .map(|n| name_of(n.id))
        .collect();

    let children = graph
        .children_of(id)
        .into_iter()
        .filter_map(|child| outline_node(graph, people, child, seen))
        .collect();

    Some(OutlineNode {
        id,
        name: name_of(id),
        spouses,
        children,
    })
}

fn print_node(node: &OutlineNode, depth: usize) {
    let indent = "  ".repeat(depth);
    if node.spouses.is_empty() {
        println!("{}{}", indent, node.name);
    } else {
        println!("{}{} & {}", indent, node.name, node.spouses.join(", "));
    }
    for child in &node.children {
        print_node(child, depth + 1);
    }
}
