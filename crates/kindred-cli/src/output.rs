//! Output formatting utilities

use clap::ValueEnum;
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        self == Self::Json
    }
}

/// Print `data` as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Short descriptor of a member's optional details, e.g. `(female, b. 1901)`
pub fn person_details(person: &kindred_core::Person) -> String {
    let mut parts = Vec::new();
    if let Some(gender) = &person.gender {
        parts.push(gender.clone());
    }
    if let Some(born) = &person.birth_date {
        parts.push(format!("b. {}", born));
    }
    if let Some(died) = &person.death_date {
        parts.push(format!("d. {}", died));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}
