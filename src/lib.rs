pub mod clean;
pub mod cli;
pub mod download;
pub mod error;
pub mod filter;
pub mod parser;
pub mod query;
pub mod schema;
pub mod server;
pub mod ui;
pub mod writer;

pub use clean::{clean_database, CleanConfig, CleanError, CleanReport};
pub use cli::{Cli, Commands};
pub use error::{Error, Result};
pub use ui::{Phase, SilentUi, Ui, UiApp};
