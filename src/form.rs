use crate::card_store::CardStore;
use crate::error::ValidationError;
use crate::flashcard::CardId;
use serde::Serialize;

/// The two text inputs of the main screen.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CardForm {
    pub question: String,
    pub answer: String,
}

impl CardForm {
    /// Create a card from the current input. The fields are cleared only
    /// when the card was stored.
    pub fn submit(&mut self, store: &mut CardStore) -> Result<CardId, ValidationError> {
        let id = store.add(&self.question, &self.answer)?;
        self.clear();
        Ok(id)
    }

    pub fn clear(&mut self) {
        self.question.clear();
        self.answer.clear();
    }
}
