pub mod error;
pub mod flags;
pub mod logging;
pub mod parser;
pub mod shell;

pub mod core;
pub mod input;
pub mod process;
