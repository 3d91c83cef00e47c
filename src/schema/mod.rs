pub mod dependencies;
pub mod kind;
pub mod tables;
pub mod types;

pub use dependencies::*;
pub use kind::*;
pub use tables::*;
pub use types::*;
