use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::clean::{DEFAULT_GARBAGE_MARKER, DEFAULT_SIMILARITY_THRESHOLD};

#[derive(Parser, Debug)]
#[command(name = "pokedex-sqlite")]
#[command(version, about = "Clean a dirty Pokedex SQLite database and serve lookups over it")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// (Re)create a database filled with the dirty seed dataset
    Seed {
        /// SQLite database path
        #[arg(env = "POKEDEX_DB")]
        db: PathBuf,
    },

    /// Clean a database in place
    Clean {
        /// SQLite database path
        #[arg(env = "POKEDEX_DB")]
        db: PathBuf,

        #[command(flatten)]
        options: CleanArgs,

        /// Show a full-screen progress view
        #[arg(long)]
        tui: bool,
    },

    /// Clean a database, then serve the HTTP API over it
    Serve {
        /// SQLite database path
        #[arg(env = "POKEDEX_DB")]
        db: PathBuf,

        #[command(flatten)]
        options: CleanArgs,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port to bind
        #[arg(short, long, default_value_t = 8000)]
        port: u16,

        /// Serve the database as it is, without cleaning first
        #[arg(long)]
        no_clean: bool,
    },

    /// Run one lookup against a cleaned database
    Query {
        /// What to look up
        #[arg(value_enum)]
        lookup: Lookup,

        /// SQLite database path
        #[arg(env = "POKEDEX_DB")]
        db: PathBuf,

        /// Ability, type or pokemon name (letters and hyphens)
        name: String,
    },

    /// Register a new pokemon for a trainer, fetching its species data
    Register {
        /// SQLite database path
        #[arg(env = "POKEDEX_DB")]
        db: PathBuf,

        /// Pokemon name (letters and hyphens)
        pokemon: String,

        /// Trainer name (letters and hyphens)
        trainer: String,
    },

    /// List entity kinds in cleaning order
    ListKinds,
}

/// Options shared by every command that cleans
#[derive(clap::Args, Debug, Clone)]
pub struct CleanArgs {
    /// Only clean these kinds (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub only: Option<Vec<String>>,

    /// Skip these kinds (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub skip: Option<Vec<String>>,

    /// Read reference names from a JSON file instead of PokeAPI
    #[arg(short, long)]
    pub references: Option<PathBuf>,

    /// Force re-download of reference names even if cached
    #[arg(short = 'f', long)]
    pub refresh: bool,

    /// Custom cache directory
    #[arg(short, long)]
    pub cache_dir: Option<PathBuf>,

    /// Substring marking a row as garbage (repeatable)
    #[arg(short, long = "marker", default_value = DEFAULT_GARBAGE_MARKER)]
    pub markers: Vec<String>,

    /// Minimum similarity for a spelling correction, in (0, 1]
    #[arg(short, long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    pub threshold: f64,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Pokemon with an ability
    Ability,
    /// Pokemon with a type
    Type,
    /// Trainers holding a pokemon
    Trainers,
    /// Abilities of a pokemon
    Abilities,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
