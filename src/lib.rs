//! In-memory flashcards: a card store, a flip-to-reveal quiz over a snapshot
//! of it, and the front ends that drive both.

pub mod card_store;
pub mod config;
pub mod error;
pub mod events;
pub mod flashcard;
pub mod form;
pub mod quiz;
pub mod render;
pub mod repl;
pub mod server;
pub mod session;

pub use card_store::CardStore;
pub use error::{Field, SessionError, ValidationError};
pub use events::{EventBus, SessionEvent};
pub use flashcard::{CardId, Flashcard};
pub use form::CardForm;
pub use quiz::{Quiz, Side};
pub use session::Session;
