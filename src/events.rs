use crate::flashcard::CardId;
use crate::quiz::Side;
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;
use serde::Serialize;

/// Published after every action that changed the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SessionEvent {
    CardAdded { id: CardId },
    CardDeleted { id: CardId },
    CardsCleared { removed: usize },
    QuizOpened { cards: usize },
    QuizClosed,
    CardFlipped { id: CardId, side: Side },
    FlipsReset,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::CardAdded { .. } => "cardAdded",
            SessionEvent::CardDeleted { .. } => "cardDeleted",
            SessionEvent::CardsCleared { .. } => "cardsCleared",
            SessionEvent::QuizOpened { .. } => "quizOpened",
            SessionEvent::QuizClosed => "quizClosed",
            SessionEvent::CardFlipped { .. } => "cardFlipped",
            SessionEvent::FlipsReset => "flipsReset",
        }
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<SessionEvent>>,
}

impl EventBus {
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver to every live subscriber, dropping the ones whose receiver
    /// is gone.
    pub fn publish(&mut self, event: SessionEvent) {
        debug!("publish {}", event.name());
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_out_and_prune() {
        let mut bus = EventBus::default();
        let a = bus.subscribe();
        let b = bus.subscribe();
        bus.publish(SessionEvent::QuizClosed);
        assert_eq!(a.try_recv(), Ok(SessionEvent::QuizClosed));
        assert_eq!(b.try_recv(), Ok(SessionEvent::QuizClosed));

        drop(b);
        bus.publish(SessionEvent::FlipsReset);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(a.try_recv(), Ok(SessionEvent::FlipsReset));
    }

    #[test]
    fn name_matches_serde_tag() {
        let event = SessionEvent::CardsCleared { removed: 2 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], event.name());
        assert_eq!(json["removed"], 2);
    }
}
