use crate::constants::{DEFAULT_PAGE, QUESTIONS_PER_PAGE};
use crate::error::{ApiError, Result};
use crate::storage::Storage;
use crate::types::{
    AddQuestionRequest, AddQuestionResponse, CategoriesResponse, Category,
    CategoryQuestionsResponse, DeleteQuestionResponse, PageParams, Question,
    QuestionListResponse, QuizRequest, QuizResponse, SearchRequest, SearchResponse,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Slice a full, id-ordered result set down to the requested page.
/// Pages are 1-based and QUESTIONS_PER_PAGE entries long; a page past the
/// end yields an empty vector, not an error.
pub fn paginate(questions: &[Question], page: usize) -> Vec<Question> {
    let start = page.saturating_sub(1).saturating_mul(QUESTIONS_PER_PAGE);
    if start >= questions.len() {
        return Vec::new();
    }
    let end = (start + QUESTIONS_PER_PAGE).min(questions.len());
    questions[start..end].to_vec()
}

fn categories_map(categories: &[Category]) -> BTreeMap<i64, String> {
    categories
        .iter()
        .map(|c| (c.id.unwrap_or_default(), c.category_type.clone()))
        .collect()
}

fn require_field<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| ApiError::BadRequest(format!("missing required field: {}", name)))
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "trivia-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /categories
pub async fn list_categories(
    Extension(storage): Extension<Arc<dyn Storage>>,
) -> Result<Json<CategoriesResponse>> {
    let categories = storage.get_all_categories().await?;
    if categories.is_empty() {
        return Err(ApiError::NotFound("no categories".to_string()));
    }

    Ok(Json(CategoriesResponse {
        success: true,
        categories: categories_map(&categories),
    }))
}

/// GET /questions?page=N
pub async fn list_questions(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Query(params): Query<PageParams>,
) -> Result<Json<QuestionListResponse>> {
    let selection = storage.get_all_questions().await?;
    if selection.is_empty() {
        return Err(ApiError::NotFound("no questions".to_string()));
    }

    let categories = storage.get_all_categories().await?;
    if categories.is_empty() {
        return Err(ApiError::NotFound("no categories".to_string()));
    }

    let page = params.page.unwrap_or(DEFAULT_PAGE);
    Ok(Json(QuestionListResponse {
        success: true,
        questions: paginate(&selection, page),
        total_questions: selection.len(),
        categories: categories_map(&categories),
        current_category: None,
    }))
}

/// DELETE /questions/:question_id
pub async fn delete_question(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Path(question_id): Path<i64>,
) -> Result<Json<DeleteQuestionResponse>> {
    // 0 is the frontend's sentinel for "no id supplied"
    if question_id == 0 {
        return Err(ApiError::BadRequest("question id 0".to_string()));
    }

    if !storage.delete_question(question_id).await? {
        return Err(ApiError::NotFound(format!("question {}", question_id)));
    }

    info!("deleted question {}", question_id);
    Ok(Json(DeleteQuestionResponse {
        success: true,
        deleted_id: question_id,
    }))
}

/// POST /questions
///
/// Missing fields are a BadRequest before any entity is constructed; a
/// malformed body or a failed insert maps to Unprocessable.
pub async fn add_question(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Query(params): Query<PageParams>,
    body: std::result::Result<Json<AddQuestionRequest>, JsonRejection>,
) -> Result<Json<AddQuestionResponse>> {
    let Json(body) = body.map_err(|e| ApiError::Unprocessable(e.to_string()))?;

    let mut question = Question {
        id: None,
        question: require_field(body.question, "question")?,
        answer: require_field(body.answer, "answer")?,
        category: require_field(body.category, "category")?,
        difficulty: require_field(body.difficulty, "difficulty")?,
    };

    storage
        .create_question(&mut question)
        .await
        .map_err(|e| ApiError::Unprocessable(e.to_string()))?;
    let question_id = question
        .id
        .ok_or_else(|| ApiError::Unprocessable("no id assigned on insert".to_string()))?;
    info!("added question {}", question_id);

    // Re-read the full set so the reported total reflects the insert; the
    // request's own page parameter selects the same slice the listing view
    // would show.
    let selection = storage.get_all_questions().await?;
    let page = params.page.unwrap_or(DEFAULT_PAGE);
    let current_page = paginate(&selection, page);
    debug!(
        "listing page {} holds {} questions after insert",
        page,
        current_page.len()
    );

    Ok(Json(AddQuestionResponse {
        success: true,
        question_id,
        current_category: None,
        total_questions: selection.len(),
    }))
}

/// POST /questions/search
pub async fn search_questions(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Query(params): Query<PageParams>,
    body: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let term = match body.search_term {
        Some(term) if !term.is_empty() => term,
        _ => return Err(ApiError::BadRequest("empty search term".to_string())),
    };

    let selection = storage.search_questions(&term).await?;
    if selection.is_empty() {
        return Err(ApiError::NotFound(format!("no questions matching {:?}", term)));
    }

    let page = params.page.unwrap_or(DEFAULT_PAGE);
    Ok(Json(SearchResponse {
        success: true,
        questions: paginate(&selection, page),
        current_category: None,
    }))
}

/// GET /categories/:category_id/questions
///
/// Unlike the other listing endpoints this one never 404s: an unknown
/// category or an empty match set is reported as a successful empty
/// listing. Longstanding surface behavior, kept as-is.
pub async fn list_questions_by_category(
    Extension(storage): Extension<Arc<dyn Storage>>,
    Path(category_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> Result<Json<CategoryQuestionsResponse>> {
    let current_category = storage.get_category_by_id(category_id).await?;
    debug!(
        "listing questions for category {} ({:?})",
        category_id,
        current_category.as_ref().map(|c| c.category_type.as_str())
    );

    let selection = storage.get_questions_by_category(category_id).await?;
    let page = params.page.unwrap_or(DEFAULT_PAGE);
    Ok(Json(CategoryQuestionsResponse {
        success: true,
        questions: paginate(&selection, page),
        total_questions: selection.len(),
    }))
}

/// POST /quizzes
///
/// Picks one question uniformly at random from the candidates left after
/// excluding previously served ids (and filtering by category when the
/// requested id is non-zero). An exhausted candidate set is success with
/// the question key omitted.
pub async fn next_quiz_question(
    Extension(storage): Extension<Arc<dyn Storage>>,
    body: std::result::Result<Json<QuizRequest>, JsonRejection>,
) -> Result<Json<QuizResponse>> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let category_id = body.quiz_category.id;

    let selection = if category_id == 0 {
        storage.get_all_questions().await?
    } else {
        storage.get_questions_by_category(category_id).await?
    };
    let candidates: Vec<Question> = selection
        .into_iter()
        .filter(|q| q.id.map_or(false, |id| !body.previous_questions.contains(&id)))
        .collect();

    let question = candidates.choose(&mut rand::thread_rng()).cloned();
    if question.is_none() {
        debug!("quiz exhausted for category {}", category_id);
    }

    Ok(Json(QuizResponse {
        success: true,
        question,
    }))
}
