pub mod locale;
pub mod message;
pub mod session;

pub use locale::Locale;
pub use message::{Message, Role};
pub use session::ChatSession;
