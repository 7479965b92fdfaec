mod cli;
mod commands;
mod file_io;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { input } => {
            commands::save::show(&input)?;
        }

        Commands::Set {
            value,
            input,
            output,
            backup,
            no_backup,
        } => {
            let backup = if no_backup { None } else { Some(backup.as_path()) };
            commands::save::set(value.as_deref(), &input, &output, backup)?;
        }

        Commands::Unpack {
            input,
            output,
            pretty,
        } => {
            commands::save::unpack(&input, output.as_deref(), pretty)?;
        }

        Commands::Pack {
            container,
            json,
            output,
        } => {
            commands::save::pack(&container, json.as_deref(), &output)?;
        }
    }

    Ok(())
}
