mod messages;
pub use messages::{ChatMessage, Role, create_message, first_text_block};
