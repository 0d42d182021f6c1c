pub mod import;
pub mod prompt;

pub use import::{import, ImportOptions};
