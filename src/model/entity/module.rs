use serde::{Deserialize, Serialize};

/// Ordered chapter inside a course. Optional layer: deployments with a
/// flat course -> lesson shape simply have no modules.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Module {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub order: i32,
    pub is_published: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ModuleCreate {
    pub course_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ModulePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: Option<i32>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct ModuleFilter {
    pub course_id: Option<i64>,
}

impl Module {
    pub fn from_create(id: i64, data: ModuleCreate) -> Self {
        Self {
            id,
            course_id: data.course_id,
            title: data.title,
            description: data.description,
            order: data.order,
            is_published: data.is_published,
        }
    }

    pub fn apply(&mut self, patch: ModulePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        if let Some(is_published) = patch.is_published {
            self.is_published = is_published;
        }
    }

    pub fn matches(&self, filter: &ModuleFilter) -> bool {
        filter.course_id.is_none_or(|cid| self.course_id == cid)
    }
}
