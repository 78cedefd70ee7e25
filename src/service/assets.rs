//! Asset path rewriting for composed views.
//!
//! Only the two site-served prefixes are recognized; anything else,
//! including already absolute URLs, passes through untouched.

const STATIC_PREFIX: &str = "/static/";
const UPLOADS_PREFIX: &str = "/uploads/";

pub const DEFAULT_COURSE_IMAGE: &str = "/static/images/course_default.png";

pub fn absolutize(base_url: &str, path: &str) -> String {
    if path.starts_with(STATIC_PREFIX) || path.starts_with(UPLOADS_PREFIX) {
        format!("{}{path}", base_url.trim_end_matches('/'))
    } else {
        path.to_string()
    }
}

pub fn absolutize_opt(base_url: &str, path: Option<&str>) -> Option<String> {
    path.map(|p| absolutize(base_url, p))
}
