use clap::Parser;
use miette::Result;
use shipdex::cli::{Cli, Commands};
use shipdex::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let printer = Printer::new();

    match cli.command {
        Commands::Extract(args) => shipdex::cli::extract::run(args, &printer)?,
        Commands::List(args) => shipdex::cli::list::run(args, &printer)?,
        Commands::Validate(args) => shipdex::cli::validate::run(args, &printer)?,
        Commands::Completions(args) => shipdex::cli::completions::run(args)?,
    }

    Ok(())
}
