use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's submitted answer. The selected answer, when present, must
/// belong to the question being answered; stores reject anything else
/// as a validation error.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::prelude::FromRow, utoipa::ToSchema)]
pub struct UserAnswer {
    pub id: i64,
    pub user_id: i64,
    pub question_id: i64,
    pub selected_answer_id: Option<i64>,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserAnswerCreate {
    pub user_id: i64,
    pub question_id: i64,
    #[serde(default)]
    pub selected_answer_id: Option<i64>,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserAnswerPatch {
    pub selected_answer_id: Option<i64>,
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct UserAnswerFilter {
    pub user_id: Option<i64>,
    pub question_id: Option<i64>,
}

impl UserAnswer {
    pub fn from_create(id: i64, data: UserAnswerCreate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: data.user_id,
            question_id: data.question_id,
            selected_answer_id: data.selected_answer_id,
            is_correct: data.is_correct,
            answered_at: now,
        }
    }

    pub fn apply(&mut self, patch: UserAnswerPatch) {
        if let Some(selected_answer_id) = patch.selected_answer_id {
            self.selected_answer_id = Some(selected_answer_id);
        }
        if let Some(is_correct) = patch.is_correct {
            self.is_correct = is_correct;
        }
    }

    pub fn matches(&self, filter: &UserAnswerFilter) -> bool {
        if let Some(user_id) = filter.user_id {
            if self.user_id != user_id {
                return false;
            }
        }
        if let Some(question_id) = filter.question_id {
            if self.question_id != question_id {
                return false;
            }
        }
        true
    }
}
