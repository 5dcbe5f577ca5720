use crate::error::Result;
use crate::types::{Category, Question};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Storage trait for the question and category tables. One handle is
/// constructed at startup and threaded through the request handlers;
/// there is no other persisted state.
///
/// Every listing method returns rows in ascending id order.
#[async_trait]
pub trait Storage: Send + Sync {
    // Category operations
    async fn create_category(&self, category: &mut Category) -> Result<()>;
    async fn get_all_categories(&self) -> Result<Vec<Category>>;
    async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>>;

    // Question operations
    async fn create_question(&self, question: &mut Question) -> Result<()>;
    async fn get_all_questions(&self) -> Result<Vec<Question>>;
    async fn get_questions_by_category(&self, category_id: i64) -> Result<Vec<Question>>;
    async fn search_questions(&self, term: &str) -> Result<Vec<Question>>;
    /// Returns true iff a row was actually removed.
    async fn delete_question(&self, id: i64) -> Result<bool>;
}

/// SQLite-backed storage. The connection sits behind a mutex; every
/// operation is a single short statement, so contention is a non-issue
/// at this scale.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // No foreign key from questions.category to categories.id: a question
    // referencing an unknown category is accepted and simply never matches
    // a labeled category listing.
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS categories (
                id   INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS questions (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                question   TEXT NOT NULL,
                answer     TEXT NOT NULL,
                category   INTEGER NOT NULL,
                difficulty INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

fn question_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Question> {
    Ok(Question {
        id: Some(row.get(0)?),
        question: row.get(1)?,
        answer: row.get(2)?,
        category: row.get(3)?,
        difficulty: row.get(4)?,
    })
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn create_category(&self, category: &mut Category) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        match category.id {
            // Seed files may carry explicit ids to keep a stable mapping
            Some(id) => {
                conn.execute(
                    "INSERT INTO categories (id, type) VALUES (?1, ?2)",
                    params![id, category.category_type],
                )?;
            }
            None => {
                conn.execute(
                    "INSERT INTO categories (type) VALUES (?1)",
                    params![category.category_type],
                )?;
                category.id = Some(conn.last_insert_rowid());
            }
        }

        debug!("created category {} ({:?})", category.category_type, category.id);
        Ok(())
    }

    async fn get_all_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, type FROM categories ORDER BY id")?;
        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: Some(row.get(0)?),
                    category_type: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, type FROM categories WHERE id = ?1")?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Category {
                id: Some(row.get(0)?),
                category_type: row.get(1)?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn create_question(&self, question: &mut Question) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        match question.id {
            // Same id policy as categories: a pre-set id is honored
            Some(id) => {
                conn.execute(
                    "INSERT INTO questions (id, question, answer, category, difficulty)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        id,
                        question.question,
                        question.answer,
                        question.category,
                        question.difficulty
                    ],
                )?;
            }
            None => {
                conn.execute(
                    "INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        question.question,
                        question.answer,
                        question.category,
                        question.difficulty
                    ],
                )?;
                question.id = Some(conn.last_insert_rowid());
            }
        }

        debug!("created question {:?}", question.id);
        Ok(())
    }

    async fn get_all_questions(&self) -> Result<Vec<Question>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, question, answer, category, difficulty FROM questions ORDER BY id",
        )?;
        let questions = stmt
            .query_map([], question_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(questions)
    }

    async fn get_questions_by_category(&self, category_id: i64) -> Result<Vec<Question>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, question, answer, category, difficulty FROM questions
             WHERE category = ?1 ORDER BY id",
        )?;
        let questions = stmt
            .query_map(params![category_id], question_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(questions)
    }

    async fn search_questions(&self, term: &str) -> Result<Vec<Question>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, question, answer, category, difficulty FROM questions
             WHERE LOWER(question) LIKE '%' || LOWER(?1) || '%' ORDER BY id",
        )?;
        let questions = stmt
            .query_map(params![term], question_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(questions)
    }

    async fn delete_question(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute("DELETE FROM questions WHERE id = ?1", params![id])?;

        if removed > 0 {
            debug!("deleted question {}", id);
        }
        Ok(removed > 0)
    }
}

/// In-memory storage implementation for development/testing.
pub struct InMemoryStorage {
    categories: Mutex<Vec<Category>>,
    questions: Mutex<Vec<Question>>,
    next_category_id: AtomicI64,
    next_question_id: AtomicI64,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            categories: Mutex::new(Vec::new()),
            questions: Mutex::new(Vec::new()),
            next_category_id: AtomicI64::new(1),
            next_question_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_category(&self, category: &mut Category) -> Result<()> {
        let id = match category.id {
            Some(id) => {
                // Keep the counter ahead of explicitly seeded ids
                self.next_category_id.fetch_max(id + 1, Ordering::SeqCst);
                id
            }
            None => self.next_category_id.fetch_add(1, Ordering::SeqCst),
        };
        category.id = Some(id);

        let mut categories = self.categories.lock().unwrap();
        categories.push(category.clone());
        categories.sort_by_key(|c| c.id);

        debug!("created category {} with id {}", category.category_type, id);
        Ok(())
    }

    async fn get_all_categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let categories = self.categories.lock().unwrap();
        Ok(categories.iter().find(|c| c.id == Some(id)).cloned())
    }

    async fn create_question(&self, question: &mut Question) -> Result<()> {
        let id = match question.id {
            Some(id) => {
                // Keep the counter ahead of explicitly supplied ids
                self.next_question_id.fetch_max(id + 1, Ordering::SeqCst);
                id
            }
            None => self.next_question_id.fetch_add(1, Ordering::SeqCst),
        };
        question.id = Some(id);

        let mut questions = self.questions.lock().unwrap();
        questions.push(question.clone());
        questions.sort_by_key(|q| q.id);

        debug!("created question with id {}", id);
        Ok(())
    }

    async fn get_all_questions(&self) -> Result<Vec<Question>> {
        Ok(self.questions.lock().unwrap().clone())
    }

    async fn get_questions_by_category(&self, category_id: i64) -> Result<Vec<Question>> {
        let questions = self.questions.lock().unwrap();
        Ok(questions
            .iter()
            .filter(|q| q.category == category_id)
            .cloned()
            .collect())
    }

    async fn search_questions(&self, term: &str) -> Result<Vec<Question>> {
        let needle = term.to_lowercase();
        let questions = self.questions.lock().unwrap();
        Ok(questions
            .iter()
            .filter(|q| q.question.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn delete_question(&self, id: i64) -> Result<bool> {
        let mut questions = self.questions.lock().unwrap();
        let before = questions.len();
        questions.retain(|q| q.id != Some(id));
        Ok(questions.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, category: i64) -> Question {
        Question {
            id: None,
            question: text.to_string(),
            answer: "answer".to_string(),
            category,
            difficulty: 1,
        }
    }

    #[tokio::test]
    async fn sqlite_assigns_monotonic_ids() -> Result<()> {
        let storage = SqliteStorage::open_in_memory()?;

        let mut first = question("first", 1);
        let mut second = question("second", 1);
        storage.create_question(&mut first).await?;
        storage.create_question(&mut second).await?;

        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn sqlite_lists_questions_in_id_order() -> Result<()> {
        let storage = SqliteStorage::open_in_memory()?;
        for text in ["a", "b", "c"] {
            storage.create_question(&mut question(text, 1)).await?;
        }

        let all = storage.get_all_questions().await?;
        let ids: Vec<_> = all.iter().map(|q| q.id.unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        Ok(())
    }

    #[tokio::test]
    async fn sqlite_search_is_case_insensitive() -> Result<()> {
        let storage = SqliteStorage::open_in_memory()?;
        storage
            .create_question(&mut question("Whose autobiography is Anansi Boys?", 5))
            .await?;

        let matches = storage.search_questions("ANANSI").await?;
        assert_eq!(matches.len(), 1);

        let none = storage.search_questions("nonexistent").await?;
        assert!(none.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn sqlite_filters_by_category() -> Result<()> {
        let storage = SqliteStorage::open_in_memory()?;
        storage.create_question(&mut question("science q", 1)).await?;
        storage.create_question(&mut question("art q", 2)).await?;
        storage.create_question(&mut question("more science", 1)).await?;

        let science = storage.get_questions_by_category(1).await?;
        assert_eq!(science.len(), 2);
        assert!(science.iter().all(|q| q.category == 1));

        let empty = storage.get_questions_by_category(42).await?;
        assert!(empty.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn sqlite_delete_reports_removal() -> Result<()> {
        let storage = SqliteStorage::open_in_memory()?;
        let mut q = question("delete me", 1);
        storage.create_question(&mut q).await?;
        let id = q.id.unwrap();

        assert!(storage.delete_question(id).await?);
        assert!(!storage.delete_question(id).await?);
        assert!(storage.get_all_questions().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn sqlite_honors_explicit_question_ids() -> Result<()> {
        let storage = SqliteStorage::open_in_memory()?;

        let mut pinned = question("pinned", 1);
        pinned.id = Some(42);
        storage.create_question(&mut pinned).await?;
        assert_eq!(pinned.id, Some(42));

        // The sequence continues past the explicit id
        let mut next = question("next", 1);
        storage.create_question(&mut next).await?;
        assert_eq!(next.id, Some(43));
        Ok(())
    }

    #[tokio::test]
    async fn in_memory_honors_explicit_question_ids() -> Result<()> {
        let storage = InMemoryStorage::new();

        let mut pinned = question("pinned", 1);
        pinned.id = Some(42);
        storage.create_question(&mut pinned).await?;
        assert_eq!(pinned.id, Some(42));

        let mut next = question("next", 1);
        storage.create_question(&mut next).await?;
        assert_eq!(next.id, Some(43));

        let ids: Vec<_> = storage
            .get_all_questions()
            .await?
            .iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(ids, vec![Some(42), Some(43)]);
        Ok(())
    }

    #[tokio::test]
    async fn sqlite_honors_explicit_category_ids() -> Result<()> {
        let storage = SqliteStorage::open_in_memory()?;
        let mut science = Category {
            id: Some(5),
            category_type: "Science".to_string(),
        };
        storage.create_category(&mut science).await?;

        let found = storage.get_category_by_id(5).await?;
        assert_eq!(found.unwrap().category_type, "Science");
        assert!(storage.get_category_by_id(1).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn sqlite_persists_across_reopen() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("trivia.db");

        {
            let storage = SqliteStorage::open(&path)?;
            storage.create_question(&mut question("persisted", 1)).await?;
        }

        let storage = SqliteStorage::open(&path)?;
        assert_eq!(storage.get_all_questions().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn in_memory_counter_stays_ahead_of_seeded_ids() -> Result<()> {
        let storage = InMemoryStorage::new();
        let mut seeded = Category {
            id: Some(5),
            category_type: "Science".to_string(),
        };
        storage.create_category(&mut seeded).await?;

        let mut next = Category {
            id: None,
            category_type: "Art".to_string(),
        };
        storage.create_category(&mut next).await?;
        assert_eq!(next.id, Some(6));
        Ok(())
    }

    #[tokio::test]
    async fn in_memory_matches_sqlite_search_semantics() -> Result<()> {
        let storage = InMemoryStorage::new();
        storage
            .create_question(&mut question("What is the largest lake in Africa?", 3))
            .await?;

        assert_eq!(storage.search_questions("LAKE").await?.len(), 1);
        assert!(storage.search_questions("river").await?.is_empty());
        Ok(())
    }
}
