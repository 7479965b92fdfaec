//! CLI argument definitions for metro.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "metro")]
#[command(about = "Subway Builder save editor", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the money values stored in a save file
    Show {
        /// Path to .metro save file
        #[arg(default_value = "save.metro")]
        input: PathBuf,
    },

    /// Set the money value and write a modified save
    Set {
        /// New money value (prompts interactively if not provided)
        value: Option<String>,

        /// Path to the original .metro save file
        #[arg(short, long, default_value = "save.metro")]
        input: PathBuf,

        /// Path for the modified save
        #[arg(short, long, default_value = "save_modified.metro")]
        output: PathBuf,

        /// Path for the one-time backup of the original
        #[arg(short, long, default_value = "save_backup.metro")]
        backup: PathBuf,

        /// Skip writing the backup file
        #[arg(long)]
        no_backup: bool,
    },

    /// Decompress the embedded JSON document (stdout or -o file)
    Unpack {
        /// Path to .metro save file
        #[arg(default_value = "save.metro")]
        input: PathBuf,

        /// Path to output JSON file (uses stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Re-indent the JSON for reading
        #[arg(short, long)]
        pretty: bool,
    },

    /// Recompress a JSON document into an existing container
    Pack {
        /// Container whose header is patched with the new size and checksum
        container: PathBuf,

        /// JSON input file (reads stdin if not provided)
        json: Option<PathBuf>,

        /// Path for the rebuilt save
        #[arg(short, long)]
        output: PathBuf,
    },
}
