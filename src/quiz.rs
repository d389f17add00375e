//! Two-sided presentation of a card snapshot.
//!
//! A quiz copies the store's cards when it is opened; deleting or adding
//! cards afterwards does not change an open quiz.

use crate::card_store::CardStore;
use crate::flashcard::{CardId, Flashcard};
use log::debug;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Question,
    Answer,
}

impl Side {
    fn from_revealed(revealed: bool) -> Self {
        if revealed {
            Side::Answer
        } else {
            Side::Question
        }
    }
}

/// What one card currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardFace<'a> {
    pub id: CardId,
    pub side: Side,
    pub text: &'a str,
}

#[derive(Debug, Clone)]
pub struct Quiz {
    cards: Vec<Flashcard>,
    revealed: HashMap<CardId, bool>,
}

impl Quiz {
    pub fn open(store: &CardStore) -> Self {
        let cards = store.snapshot();
        let revealed = cards.iter().map(|c| (c.id(), false)).collect();
        debug!("open quiz over {} cards", cards.len());
        Self { cards, revealed }
    }

    /// Toggle one card. Returns the side now shown, `None` if the card is
    /// not part of this quiz.
    pub fn flip(&mut self, id: CardId) -> Option<Side> {
        let revealed = self.revealed.get_mut(&id)?;
        *revealed = !*revealed;
        debug!("flip card {id} revealed={revealed}");
        Some(Side::from_revealed(*revealed))
    }

    /// Turn every card back to its question, returns how many were showing
    /// the answer.
    pub fn reset_flips(&mut self) -> usize {
        let n = self.revealed_count();
        self.revealed.values_mut().for_each(|r| *r = false);
        n
    }

    pub fn side(&self, id: CardId) -> Option<Side> {
        self.revealed.get(&id).copied().map(Side::from_revealed)
    }

    pub fn face(&self, id: CardId) -> Option<&str> {
        let card = self.cards.iter().find(|c| c.id() == id)?;
        Some(self.text_for(card))
    }

    pub fn cards(&self) -> impl Iterator<Item = CardFace<'_>> {
        self.cards.iter().map(|card| CardFace {
            id: card.id(),
            side: self.side(card.id()).unwrap_or(Side::Question),
            text: self.text_for(card),
        })
    }

    /// Card id at a 0-based position of the snapshot.
    pub fn nth_id(&self, index: usize) -> Option<CardId> {
        self.cards.get(index).map(Flashcard::id)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.values().filter(|r| **r).count()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn text_for<'a>(&self, card: &'a Flashcard) -> &'a str {
        match self.side(card.id()) {
            Some(Side::Answer) => card.answer(),
            _ => card.question(),
        }
    }
}
