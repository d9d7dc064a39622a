pub mod completions;
pub mod extract;
pub mod list;
pub mod validate;

use clap::{Parser, Subcommand};

/// shipdex - Ship and outfit catalog extractor
#[derive(Parser, Debug)]
#[command(name = "shipdex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract ships, variants, outfits, and effects to JSON
    Extract(extract::ExtractArgs),

    /// List extracted record names
    List(list::ListArgs),

    /// Validate data files without writing output
    Validate(validate::ValidateArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
