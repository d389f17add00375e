use chrono::DateTime;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque card identity, only used for equality and lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(Uuid);

impl CardId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CardId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A question/answer pair. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    id: CardId,
    question: String,
    answer: String,
    created_at: DateTime<Utc>,
}

impl Flashcard {
    /// Callers are responsible for checking the texts are non-empty,
    /// see `CardStore::add`.
    pub(crate) fn new(question: &str, answer: &str) -> Self {
        Self {
            id: CardId::new(),
            question: question.trim().to_owned(),
            answer: answer.trim().to_owned(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
