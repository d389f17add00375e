//! Ordered in-memory collection of flashcards.

use crate::error::{Field, ValidationError};
use crate::flashcard::{CardId, Flashcard};
use indexmap::IndexMap;
use log::debug;

#[derive(Debug, Default, Clone)]
pub struct CardStore {
    // insertion order is the display order
    cards: IndexMap<CardId, Flashcard>,
}

impl CardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new card. Whitespace-only text counts as empty and leaves
    /// the store untouched.
    pub fn add(&mut self, question: &str, answer: &str) -> Result<CardId, ValidationError> {
        if question.trim().is_empty() {
            return Err(ValidationError::Empty(Field::Question));
        }
        if answer.trim().is_empty() {
            return Err(ValidationError::Empty(Field::Answer));
        }
        let card = Flashcard::new(question, answer);
        let id = card.id();
        debug!("add card {id}");
        self.cards.insert(id, card);
        Ok(id)
    }

    /// Remove the card with `id`, keeping the order of the rest.
    pub fn delete(&mut self, id: CardId) -> Option<Flashcard> {
        let removed = self.cards.shift_remove(&id);
        if removed.is_some() {
            debug!("delete card {id}");
        }
        removed
    }

    /// Remove every card, returns how many were dropped.
    pub fn reset(&mut self) -> usize {
        let n = self.cards.len();
        self.cards.clear();
        debug!("reset store, {n} cards removed");
        n
    }

    pub fn get(&self, id: CardId) -> Option<&Flashcard> {
        self.cards.get(&id)
    }

    /// Card at a 0-based position.
    pub fn nth(&self, index: usize) -> Option<&Flashcard> {
        self.cards.get_index(index).map(|(_, card)| card)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flashcard> {
        self.cards.values()
    }

    pub fn snapshot(&self) -> Vec<Flashcard> {
        self.cards.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
