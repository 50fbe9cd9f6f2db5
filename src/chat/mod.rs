//! Conversation core: transcript, SQL extraction, request assembly, and the
//! session state machine.

pub mod parser;
pub mod request;
pub mod session;
pub mod types;

pub use parser::{extract_sql, ExtractedSql};
pub use request::RequestPayload;
pub use session::{ChatSession, PendingTurn, SessionState};
pub use types::{Message, Role, Transcript};
