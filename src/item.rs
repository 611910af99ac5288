//! Items that can be administered adaptively.

use serde::{Deserialize, Serialize};

/// Anything the engine can select: it only needs a difficulty in [0, 1].
pub trait CatItem {
    fn difficulty(&self) -> f64;
}

impl CatItem for f64 {
    fn difficulty(&self) -> f64 {
        *self
    }
}

impl<T: CatItem + ?Sized> CatItem for &T {
    fn difficulty(&self) -> f64 {
        (**self).difficulty()
    }
}

/// Minimal bank entry: the fields of a question record the engine cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub difficulty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl Question {
    pub fn new(id: impl Into<String>, difficulty: f64) -> Self {
        Self {
            id: id.into(),
            difficulty,
            topic: None,
        }
    }
}

impl CatItem for Question {
    fn difficulty(&self) -> f64 {
        self.difficulty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_deserializes_from_bank_record() {
        let q: Question =
            serde_json::from_str(r#"{"id": "abc", "difficulty": 0.65, "topic": "algebra"}"#).unwrap();
        assert_eq!(q.difficulty(), 0.65);
        assert_eq!(q.topic.as_deref(), Some("algebra"));
        let bare: Question = serde_json::from_str(r#"{"id": "x", "difficulty": 0.1}"#).unwrap();
        assert!(bare.topic.is_none());
    }

    #[test]
    fn references_forward_difficulty() {
        let q = Question::new("q", 0.3);
        let r = &q;
        assert_eq!(CatItem::difficulty(&r), 0.3);
        assert_eq!(CatItem::difficulty(&0.8_f64), 0.8);
    }
}
