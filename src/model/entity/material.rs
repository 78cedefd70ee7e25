use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::prelude::FromRow, utoipa::ToSchema)]
pub struct Material {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub file_path: String,
    pub number_of_pages: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct MaterialCreate {
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub file_path: String,
    #[serde(default)]
    pub number_of_pages: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct MaterialPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub number_of_pages: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct MaterialFilter {
    pub course_id: Option<i64>,
}

impl Material {
    pub fn from_create(id: i64, data: MaterialCreate) -> Self {
        Self {
            id,
            course_id: data.course_id,
            title: data.title,
            description: data.description,
            file_path: data.file_path,
            number_of_pages: data.number_of_pages,
        }
    }

    pub fn apply(&mut self, patch: MaterialPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(file_path) = patch.file_path {
            self.file_path = file_path;
        }
        if let Some(number_of_pages) = patch.number_of_pages {
            self.number_of_pages = Some(number_of_pages);
        }
    }

    pub fn matches(&self, filter: &MaterialFilter) -> bool {
        filter.course_id.is_none_or(|cid| self.course_id == cid)
    }
}
