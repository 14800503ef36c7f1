//! Command handlers for the kbchat CLI.

pub mod ask;
pub mod chat;
pub mod check;
pub mod generate;
pub mod shared;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use check::CheckCommand;
pub use generate::GenerateCommand;
