use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Pdf,
    Docx,
    Pptx,
    Text,
    Image,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Pptx => "pptx",
            Self::Text => "text",
            Self::Image => "image",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "video" => Self::Video,
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "pptx" => Self::Pptx,
            "image" => Self::Image,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LessonType {
    Theory,
    Practice,
    Test,
}

impl LessonType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Theory => "theory",
            Self::Practice => "practice",
            Self::Test => "test",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "practice" => Self::Practice,
            "test" => Self::Test,
            _ => Self::Theory,
        }
    }
}

/// A lesson belongs to exactly one course, either directly or through a
/// module. `order` is a render key and is not unique; readers break
/// ties by id. `is_published` gates student visibility only.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Lesson {
    pub id: i64,
    pub course_id: i64,
    pub module_id: Option<i64>,
    pub title: String,
    pub content_type: ContentType,
    pub content_url: Option<String>,
    pub content_text: Option<String>,
    pub duration_minutes: i32,
    pub order: i32,
    pub lesson_type: LessonType,
    pub is_published: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonCreate {
    pub course_id: i64,
    #[serde(default)]
    pub module_id: Option<i64>,
    pub title: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub content_url: Option<String>,
    #[serde(default)]
    pub content_text: Option<String>,
    #[serde(default)]
    pub duration_minutes: i32,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "LessonType::default_theory")]
    pub lesson_type: LessonType,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

impl LessonType {
    fn default_theory() -> Self {
        Self::Theory
    }
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonPatch {
    pub module_id: Option<i64>,
    pub title: Option<String>,
    pub content_type: Option<ContentType>,
    pub content_url: Option<String>,
    pub content_text: Option<String>,
    pub duration_minutes: Option<i32>,
    pub order: Option<i32>,
    pub lesson_type: Option<LessonType>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct LessonFilter {
    pub course_id: Option<i64>,
    pub module_id: Option<i64>,
    pub lesson_type: Option<LessonType>,
}

impl Lesson {
    pub fn from_create(id: i64, data: LessonCreate) -> Self {
        Self {
            id,
            course_id: data.course_id,
            module_id: data.module_id,
            title: data.title,
            content_type: data.content_type,
            content_url: data.content_url,
            content_text: data.content_text,
            duration_minutes: data.duration_minutes,
            order: data.order,
            lesson_type: data.lesson_type,
            is_published: data.is_published,
        }
    }

    pub fn apply(&mut self, patch: LessonPatch) {
        if let Some(module_id) = patch.module_id {
            self.module_id = Some(module_id);
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content_type) = patch.content_type {
            self.content_type = content_type;
        }
        if let Some(content_url) = patch.content_url {
            self.content_url = Some(content_url);
        }
        if let Some(content_text) = patch.content_text {
            self.content_text = Some(content_text);
        }
        if let Some(duration_minutes) = patch.duration_minutes {
            self.duration_minutes = duration_minutes;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        if let Some(lesson_type) = patch.lesson_type {
            self.lesson_type = lesson_type;
        }
        if let Some(is_published) = patch.is_published {
            self.is_published = is_published;
        }
    }

    pub fn matches(&self, filter: &LessonFilter) -> bool {
        if let Some(course_id) = filter.course_id {
            if self.course_id != course_id {
                return false;
            }
        }
        if let Some(module_id) = filter.module_id {
            if self.module_id != Some(module_id) {
                return false;
            }
        }
        if let Some(lesson_type) = filter.lesson_type {
            if self.lesson_type != lesson_type {
                return false;
            }
        }
        true
    }
}
