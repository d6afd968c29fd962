use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type ItemId = i64;

/// Progress records keyed by item id. Serialises as a JSON object whose keys
/// are the ids rendered as strings.
pub type ProgressMap = BTreeMap<ItemId, ProgressRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Basic,
    Intermediate,
    Hard,
    Expert,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Basic => "Basic",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
}

/// A catalog entry. Read-only as far as scheduling is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyItem {
    pub id: ItemId,
    pub text: String,
    pub difficulty: Difficulty,
    pub category_id: String,
    pub answer: Option<String>,
    pub sources: Vec<Source>,
}

// Self-assessed recall confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Score {
    Poor = 1,
    Ok = 2,
    Good = 3,
}

impl Score {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Score::Poor => "Poor",
            Score::Ok => "Ok",
            Score::Good => "Good",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "1" | "poor" | "bad" | "fail" => Some(Score::Poor),
            "2" | "ok" | "partial" => Some(Score::Ok),
            "3" | "good" | "success" => Some(Score::Good),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Score {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Score::Poor),
            2 => Ok(Score::Ok),
            3 => Ok(Score::Good),
            other => Err(format!("score must be 1, 2 or 3, got {}", other)),
        }
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.as_u8()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub at: i64,
    pub score: Score,
}

/// Scheduling state of one item. Exists only once the item has been rated or
/// skipped; an unseen item has no record at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub item_id: ItemId,
    #[serde(rename = "box")]
    pub box_level: u8,
    pub last_reviewed_at: i64,
    pub next_review_at: i64,
    pub history: Vec<ReviewEntry>,
}

impl ProgressRecord {
    pub fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            box_level: 0,
            last_reviewed_at: 0,
            next_review_at: 0,
            history: Vec::new(),
        }
    }

    pub fn last_score(&self) -> Option<Score> {
        self.history.last().map(|entry| entry.score)
    }

    pub fn is_due(&self, now: i64) -> bool {
        self.next_review_at <= now
    }

    pub fn box_label(&self) -> &'static str {
        match self.box_level {
            0 => "New",
            1 => "Learning",
            2 => "Familiar",
            3 => "Comfortable",
            4 => "Proficient",
            5 => "Strong",
            6 => "Mastered",
            _ => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    pub started: usize,
    pub learned: usize,
    pub struggling: usize,
    pub due: usize,
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
