//! The one controller behind every front end. Each user action is a method
//! call; state changes are announced on the event bus.

use crate::card_store::CardStore;
use crate::error::{SessionError, ValidationError};
use crate::events::{EventBus, SessionEvent};
use crate::flashcard::{CardId, Flashcard};
use crate::form::CardForm;
use crate::quiz::{Quiz, Side};
use crossbeam_channel::Receiver;
use serde::Serialize;

#[derive(Debug, Default)]
pub struct Session {
    store: CardStore,
    form: CardForm,
    quiz: Option<Quiz>,
    events: EventBus,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub cards: Vec<Flashcard>,
    pub form: CardForm,
    pub quiz: Option<QuizView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub cards: Vec<QuizCardView>,
    pub revealed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizCardView {
    pub id: CardId,
    pub side: Side,
    pub text: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &CardStore {
        &self.store
    }

    pub fn form(&self) -> &CardForm {
        &self.form
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn set_question(&mut self, text: impl Into<String>) {
        self.form.question = text.into();
    }

    pub fn set_answer(&mut self, text: impl Into<String>) {
        self.form.answer = text.into();
    }

    /// Create a card from the form.
    pub fn submit(&mut self) -> Result<CardId, ValidationError> {
        let id = self.form.submit(&mut self.store)?;
        self.events.publish(SessionEvent::CardAdded { id });
        Ok(id)
    }

    /// Fill the form and submit it in one step.
    pub fn add_card(&mut self, question: &str, answer: &str) -> Result<CardId, ValidationError> {
        self.set_question(question);
        self.set_answer(answer);
        self.submit()
    }

    /// Returns whether a card was removed. An open quiz keeps its snapshot.
    pub fn delete_card(&mut self, id: CardId) -> bool {
        let removed = self.store.delete(id).is_some();
        if removed {
            self.events.publish(SessionEvent::CardDeleted { id });
        }
        removed
    }

    pub fn reset_cards(&mut self) -> usize {
        let removed = self.store.reset();
        self.events.publish(SessionEvent::CardsCleared { removed });
        removed
    }

    /// Start a quiz over the cards as they are now. An already open quiz is
    /// replaced by a fresh snapshot.
    pub fn open_quiz(&mut self) -> &Quiz {
        let quiz = Quiz::open(&self.store);
        let cards = quiz.len();
        self.events.publish(SessionEvent::QuizOpened { cards });
        self.quiz.insert(quiz)
    }

    pub fn close_quiz(&mut self) -> bool {
        let was_open = self.quiz.take().is_some();
        if was_open {
            self.events.publish(SessionEvent::QuizClosed);
        }
        was_open
    }

    /// `Ok(None)` when the card is not part of the open quiz.
    pub fn flip(&mut self, id: CardId) -> Result<Option<Side>, SessionError> {
        let quiz = self.quiz.as_mut().ok_or(SessionError::NoQuiz)?;
        let side = quiz.flip(id);
        if let Some(side) = side {
            self.events.publish(SessionEvent::CardFlipped { id, side });
        }
        Ok(side)
    }

    pub fn reset_flips(&mut self) -> Result<usize, SessionError> {
        let quiz = self.quiz.as_mut().ok_or(SessionError::NoQuiz)?;
        let n = quiz.reset_flips();
        self.events.publish(SessionEvent::FlipsReset);
        Ok(n)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            cards: self.store.snapshot(),
            form: self.form.clone(),
            quiz: self.quiz.as_ref().map(|quiz| QuizView {
                cards: quiz
                    .cards()
                    .map(|face| QuizCardView {
                        id: face.id,
                        side: face.side,
                        text: face.text.to_owned(),
                    })
                    .collect(),
                revealed: quiz.revealed_count(),
            }),
        }
    }
}
