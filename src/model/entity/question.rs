use serde::{Deserialize, Serialize};

use crate::model::entity::AnswerCreate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::prelude::FromRow, utoipa::ToSchema)]
pub struct Question {
    pub id: i64,
    pub test_id: i64,
    pub question_text: String,
    /// single_choice, multiple_choice or text.
    pub question_type: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuestionCreate {
    pub test_id: i64,
    pub question_text: String,
    pub question_type: String,
    /// Answer options created together with the question.
    #[serde(default)]
    pub answers: Vec<AnswerCreate>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuestionPatch {
    pub question_text: Option<String>,
    pub question_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct QuestionFilter {
    pub test_id: Option<i64>,
}

impl Question {
    pub fn from_create(id: i64, data: &QuestionCreate) -> Self {
        Self {
            id,
            test_id: data.test_id,
            question_text: data.question_text.clone(),
            question_type: data.question_type.clone(),
        }
    }

    pub fn apply(&mut self, patch: QuestionPatch) {
        if let Some(question_text) = patch.question_text {
            self.question_text = question_text;
        }
        if let Some(question_type) = patch.question_type {
            self.question_type = question_type;
        }
    }

    pub fn matches(&self, filter: &QuestionFilter) -> bool {
        filter.test_id.is_none_or(|tid| self.test_id == tid)
    }
}
