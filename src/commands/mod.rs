//! # CLI Commands
//!
//! Contains modules that run the commands.  At present there is only the
//! catalog, which also drives the interactive copy.

pub mod catalog;

#[derive(thiserror::Error,Debug)]
pub enum CommandError {
    #[error("Command could not be interpreted")]
    InvalidCommand,
    #[error("One or more disk images could not be loaded")]
    InputNotAvailable
}
