use crate::error::Result;
use crate::storage::Storage;
use crate::types::{Category, Question};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Seed file shape: a `[[categories]]` table array (with optional explicit
/// ids) followed by a `[[questions]]` table array.
#[derive(Debug, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    #[serde(default)]
    pub questions: Vec<SeedQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub category_type: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

impl SeedData {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let seed = toml::from_str(&content)?;
        Ok(seed)
    }

    /// Built-in starter set: the six classic categories and a handful of
    /// questions, enough to exercise every endpoint from a fresh database.
    pub fn defaults() -> Self {
        let categories = ["Science", "Art", "Geography", "History", "Entertainment", "Sports"]
            .iter()
            .enumerate()
            .map(|(i, label)| SeedCategory {
                id: Some(i as i64 + 1),
                category_type: label.to_string(),
            })
            .collect();

        let questions = vec![
            SeedQuestion {
                question: "What is the heaviest organ in the human body?".to_string(),
                answer: "The Liver".to_string(),
                category: 1,
                difficulty: 4,
            },
            SeedQuestion {
                question: "Who discovered penicillin?".to_string(),
                answer: "Alexander Fleming".to_string(),
                category: 1,
                difficulty: 3,
            },
            SeedQuestion {
                question: "La Giaconda is better known as what?".to_string(),
                answer: "Mona Lisa".to_string(),
                category: 2,
                difficulty: 3,
            },
            SeedQuestion {
                question: "What is the largest lake in Africa?".to_string(),
                answer: "Lake Victoria".to_string(),
                category: 3,
                difficulty: 2,
            },
            SeedQuestion {
                question: "In which royal palace would you find the Hall of Mirrors?".to_string(),
                answer: "The Palace of Versailles".to_string(),
                category: 3,
                difficulty: 3,
            },
            SeedQuestion {
                question: "What boxer's original name is Cassius Clay?".to_string(),
                answer: "Muhammad Ali".to_string(),
                category: 4,
                difficulty: 1,
            },
            SeedQuestion {
                question: "Whose autobiography is entitled 'I Know Why the Caged Bird Sings'?"
                    .to_string(),
                answer: "Maya Angelou".to_string(),
                category: 4,
                difficulty: 2,
            },
            SeedQuestion {
                question: "What movie earned Tom Hanks his third straight Oscar nomination, in 1996?"
                    .to_string(),
                answer: "Apollo 13".to_string(),
                category: 5,
                difficulty: 4,
            },
            SeedQuestion {
                question: "Which country won the first ever soccer World Cup in 1930?".to_string(),
                answer: "Uruguay".to_string(),
                category: 6,
                difficulty: 4,
            },
        ];

        Self {
            categories,
            questions,
        }
    }
}

/// Inserts the seed set through the same storage trait the handlers use.
/// Returns the counts of categories and questions written.
pub async fn apply_seed(storage: Arc<dyn Storage>, seed: SeedData) -> Result<(usize, usize)> {
    let mut category_count = 0;
    for seed_category in seed.categories {
        let mut category = Category {
            id: seed_category.id,
            category_type: seed_category.category_type,
        };
        storage.create_category(&mut category).await?;
        category_count += 1;
    }

    let mut question_count = 0;
    for seed_question in seed.questions {
        let mut question = Question {
            id: None,
            question: seed_question.question,
            answer: seed_question.answer,
            category: seed_question.category,
            difficulty: seed_question.difficulty,
        };
        storage.create_question(&mut question).await?;
        question_count += 1;
    }

    info!("seeded {} categories and {} questions", category_count, question_count);
    Ok((category_count, question_count))
}
