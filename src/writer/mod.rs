pub mod schema_gen;
pub mod seed;
pub mod sqlite;

pub use schema_gen::*;
pub use seed::*;
pub use sqlite::*;
