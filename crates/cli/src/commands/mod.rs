//! Command handlers for the DocRAG CLI.

pub mod ask;
pub mod chat;
pub mod init;
pub mod session;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use init::InitCommand;
