//! Example prompt catalog.
//!
//! The catalog maps category names to ordered prompt lists. Its JSON form is
//! an object whose key order is significant, so both directions keep the
//! document order instead of going through a hash map.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use std::fmt;

/// One named category of example prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptCategory {
    pub name: String,
    pub prompts: Vec<String>,
}

/// Ordered collection of prompt categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptCatalog {
    pub categories: Vec<PromptCategory>,
}

impl PromptCatalog {
    /// The catalog shipped with the server, used to seed an empty store.
    pub fn builtin() -> Self {
        let category = |name: &str, prompts: [&str; 3]| PromptCategory {
            name: name.to_string(),
            prompts: prompts.iter().map(|p| p.to_string()).collect(),
        };
        Self {
            categories: vec![
                category(
                    "daily_life",
                    [
                        "What are some productive habits I can develop?",
                        "How can I manage my time better?",
                        "What's a good morning routine?",
                    ],
                ),
                category(
                    "personal_trainee",
                    [
                        "Create a 30-minute workout routine for beginners",
                        "How can I improve my posture?",
                        "What exercises can I do at home without equipment?",
                    ],
                ),
                category(
                    "meal_planner",
                    [
                        "Suggest a healthy meal plan for weight loss",
                        "What are some high-protein breakfast ideas?",
                        "Plan meals for a vegetarian for one week",
                    ],
                ),
                category(
                    "recipe_khazana",
                    [
                        "Share a quick and easy dinner recipe",
                        "How do I make homemade pasta?",
                        "What's a good dessert recipe for beginners?",
                    ],
                ),
                category(
                    "gate_preparation",
                    [
                        "How should I prepare for GATE Computer Science?",
                        "What's the best study schedule for GATE?",
                        "Recommend resources for GATE preparation",
                    ],
                ),
                category(
                    "qna",
                    [
                        "Explain quantum computing in simple terms",
                        "What's the difference between AI and machine learning?",
                        "How does blockchain technology work?",
                    ],
                ),
            ],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn category(&self, name: &str) -> Option<&PromptCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }
}

impl Serialize for PromptCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for category in &self.categories {
            map.serialize_entry(&category.name, &category.prompts)?;
        }
        map.end()
    }
}

struct CatalogVisitor;

impl<'de> Visitor<'de> for CatalogVisitor {
    type Value = PromptCatalog;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping category names to prompt lists")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut categories: Vec<PromptCategory> = Vec::new();
        while let Some((name, prompts)) = access.next_entry::<String, Vec<String>>()? {
            // A repeated key replaces the earlier list but keeps its position.
            match categories.iter_mut().find(|c| c.name == name) {
                Some(existing) => existing.prompts = prompts,
                None => categories.push(PromptCategory { name, prompts }),
            }
        }
        Ok(PromptCatalog { categories })
    }
}

impl<'de> Deserialize<'de> for PromptCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CatalogVisitor)
    }
}
