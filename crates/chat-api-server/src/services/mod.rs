pub mod chat;
pub mod resolver;

pub use chat::ChatService;
