//! Family member commands

use clap::{Args, Subcommand};

use crate::output::{person_details, print_json};
use crate::AppContext;
use kindred_core::limits::validate_person;
use kindred_core::{NewPerson, Person, PersonId};
use kindred_storage::StorageBackend;

#[derive(Args)]
pub struct MemberArgs {
    #[command(subcommand)]
    pub command: MemberCommands,
}

/// Optional member details shared by `add` and `update`
#[derive(Args, Debug, Default)]
pub struct MemberDetails {
    /// Gender
    #[arg(long)]
    pub gender: Option<String>,
    /// Birth date (free text, e.g. 1901-02-03)
    #[arg(long)]
    pub birth_date: Option<String>,
    /// Death date
    #[arg(long)]
    pub death_date: Option<String>,
    /// Notes
    #[arg(long)]
    pub notes: Option<String>,
    /// Photo URL
    #[arg(long)]
    pub photo_url: Option<String>,
}

impl MemberDetails {
    /// Overlay the given fields on `base`; an empty value clears a field
    fn apply_to(&self, mut base: NewPerson) -> NewPerson {
        fn pick(new: &Option<String>, old: Option<String>) -> Option<String> {
            match new {
                Some(value) => Some(value.clone()),
                None => old,
            }
        }

        base.gender = pick(&self.gender, base.gender);
        base.birth_date = pick(&self.birth_date, base.birth_date);
        base.death_date = pick(&self.death_date, base.death_date);
        base.notes = pick(&self.notes, base.notes);
        base.photo_url = pick(&self.photo_url, base.photo_url);
        base.normalized()
    }
}

#[derive(Subcommand)]
pub enum MemberCommands {
    /// Add a member to the selected tree
    Add {
        /// Full name
        name: String,
        #[command(flatten)]
        details: MemberDetails,
    },
    /// List members of the selected tree
    List,
    /// Update a member; only the given fields change
    Update {
        /// Member id
        id: PersonId,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        details: MemberDetails,
    },
    /// Delete a member and their relationships
    Delete {
        /// Member id
        id: PersonId,
    },
}

fn details_of(person: &Person) -> NewPerson {
    NewPerson {
        name: person.name.clone(),
        gender: person.gender.clone(),
        birth_date: person.birth_date.clone(),
        death_date: person.death_date.clone(),
        notes: person.notes.clone(),
        photo_url: person.photo_url.clone(),
    }
}

pub async fn run(args: &MemberArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let tree = ctx.require_tree().await?;
    tracing::debug!("Running member command for tree: {}", tree.id);

    match &args.command {
        MemberCommands::Add { name, details } => {
            let new = details.apply_to(NewPerson::new(name.as_str()));
            validate_person(&new)?;

            let person = ctx.storage.create_person(tree.id, new).await?;
            tracing::info!("Added member {} ({})", person.id, person.name);

            if ctx.format.is_json() {
                print_json(&person)?;
            } else {
                println!("Added member #{}: {}", person.id, person.name);
            }
        }
        MemberCommands::List => {
            let people = ctx.storage.get_all_people(tree.id).await?;
            tracing::info!("Found {} members", people.len());

            if ctx.format.is_json() {
                return print_json(&people);
            }

            if people.is_empty() {
                println!(
                    "No members in tree '{}'. Add one with 'kindred member add <name>'",
                    tree.name
                );
            } else {
                println!("Members of '{}' ({} found):", tree.name, people.len());
                for person in &people {
                    println!("  #{} {}{}", person.id, person.name, person_details(person));
                }
            }
        }
        MemberCommands::Update { id, name, details } => {
            let existing = ctx
                .storage
                .get_person(tree.id, *id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Member {} not found in tree '{}'", id, tree.name))?;

            let mut base = details_of(&existing);
            if let Some(name) = name {
                base.name = name.clone();
            }
            let new = details.apply_to(base);
            validate_person(&new)?;

            let person = ctx.storage.update_person(tree.id, *id, new).await?;
            tracing::info!("Updated member {}", person.id);

            if ctx.format.is_json() {
                print_json(&person)?;
            } else {
                println!("Updated member #{}: {}{}", person.id, person.name, person_details(&person));
            }
        }
        MemberCommands::Delete { id } => {
            ctx.storage.delete_person(tree.id, *id).await?;
            tracing::info!("Deleted member {}", id);
            println!("Deleted member #{}", id);
        }
    }

    Ok(())
}
