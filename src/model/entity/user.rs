use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform account. `role` is stored as the raw string; the policy
/// layer parses it and treats anything unrecognized as deny-all.
/// Organizational attributes are opaque to the core.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::prelude::FromRow, utoipa::ToSchema)]
pub struct User {
    pub id: i64,
    pub login: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub company: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserCreate {
    pub login: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserPatch {
    pub login: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct UserFilter {
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Default for UserFilter {
    fn default() -> Self {
        Self {
            search: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl User {
    pub fn from_create(id: i64, data: UserCreate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            login: data.login,
            password_hash: data.password_hash,
            full_name: data.full_name,
            role: data.role,
            company: data.company,
            department: data.department,
            position: data.position,
            is_active: true,
            created_at: now,
        }
    }

    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(login) = patch.login {
            self.login = login;
        }
        if let Some(password_hash) = patch.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(full_name) = patch.full_name {
            self.full_name = full_name;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(company) = patch.company {
            self.company = Some(company);
        }
        if let Some(department) = patch.department {
            self.department = Some(department);
        }
        if let Some(position) = patch.position {
            self.position = Some(position);
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
    }

    pub fn matches(&self, filter: &UserFilter) -> bool {
        if let Some(search) = &filter.search {
            if !super::matches_search(search, &self.login, &self.full_name) {
                return false;
            }
        }
        true
    }
}
