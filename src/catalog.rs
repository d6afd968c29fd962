use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{Difficulty, ItemId, Source, StudyItem};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    title: String,
    categories: Vec<CategoryFile>,
}

#[derive(Debug, Deserialize)]
struct CategoryFile {
    id: String,
    title: String,
    questions: Vec<QuestionFile>,
}

#[derive(Debug, Deserialize)]
struct QuestionFile {
    id: ItemId,
    question: String,
    difficulty: Difficulty,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    sources: Vec<Source>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub title: String,
}

/// Read-only set of study items, flattened from categories in file order.
#[derive(Debug, Clone)]
pub struct Catalog {
    title: String,
    categories: Vec<Category>,
    items: Vec<StudyItem>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;

        let mut seen = HashSet::new();
        let mut categories = Vec::with_capacity(file.categories.len());
        let mut items = Vec::new();

        for category in file.categories {
            for q in category.questions {
                if !seen.insert(q.id) {
                    return Err(Error::DuplicateItem(q.id));
                }
                items.push(StudyItem {
                    id: q.id,
                    text: q.question,
                    difficulty: q.difficulty,
                    category_id: category.id.clone(),
                    answer: q.answer,
                    sources: q.sources,
                });
            }
            categories.push(Category {
                id: category.id,
                title: category.title,
            });
        }

        log::debug!(
            "Loaded catalog '{}' with {} items in {} categories",
            file.title,
            items.len(),
            categories.len()
        );

        Ok(Self {
            title: file.title,
            categories,
            items,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn items(&self) -> &[StudyItem] {
        &self.items
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: ItemId) -> Option<&StudyItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn category_title(&self, id: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.title.as_str())
    }
}
