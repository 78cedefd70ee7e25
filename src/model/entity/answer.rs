use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::prelude::FromRow, utoipa::ToSchema)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub answer_text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct AnswerCreate {
    pub question_id: i64,
    pub answer_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct AnswerPatch {
    pub answer_text: Option<String>,
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct AnswerFilter {
    pub question_id: Option<i64>,
}

impl Answer {
    pub fn from_create(id: i64, data: AnswerCreate) -> Self {
        Self {
            id,
            question_id: data.question_id,
            answer_text: data.answer_text,
            is_correct: data.is_correct,
        }
    }

    pub fn apply(&mut self, patch: AnswerPatch) {
        if let Some(answer_text) = patch.answer_text {
            self.answer_text = answer_text;
        }
        if let Some(is_correct) = patch.is_correct {
            self.is_correct = is_correct;
        }
    }

    pub fn matches(&self, filter: &AnswerFilter) -> bool {
        filter.question_id.is_none_or(|qid| self.question_id == qid)
    }
}
