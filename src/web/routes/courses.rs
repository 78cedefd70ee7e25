use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    model::{
        EntityKind,
        entity::{Course, CourseCreate, CourseFilter, CoursePatch, EnrollmentKind},
    },
    policy::Action,
    service::{ContentSummary, CourseDetail},
    web::{
        AppState, RequestContext, WebError, WebResult, error::ErrorResponse, middlewares,
        routes::actor_scope,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(courses_list_handler).post(courses_create_handler))
        .route("/my", get(courses_my_handler))
        .route(
            "/{id}",
            get(courses_get_handler)
                .put(courses_update_handler)
                .delete(courses_delete_handler),
        )
        .route("/{id}/summary", get(courses_summary_handler))
        .route(
            "/{id}/enroll",
            post(courses_enroll_handler).delete(courses_unenroll_handler),
        )
        .route(
            "/{id}/trainers/{user_id}",
            post(courses_assign_trainer_handler).delete(courses_remove_trainer_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses",
    params(CourseFilter),
    description = "Lists courses visible to the current actor",
    responses(
        (status = 200, description = "Visible courses", body = Vec<Course>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(("cookie" = []))
)]
pub async fn courses_list_handler(
    ctx: RequestContext,
    Query(filter): Query<CourseFilter>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Course).await?;

    let courses = state
        .courses()
        .list_courses(&scope, &filter)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Course, e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = CourseCreate,
    description = "Creates a new draft course",
    responses(
        (status = 200, description = "Course created", body = Course),
        (status = 403, description = "Privileged roles only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(("cookie" = []))
)]
pub async fn courses_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Course).await?;
    scope
        .require_privileged()
        .map_err(|e| WebError::from_store(EntityKind::Course, e))?;

    let created = state
        .mm()
        .store()
        .create_course(payload)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Course, e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    description = "Full course view with ordered lessons and enrollment annotation",
    params(("id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course detail", body = CourseDetail),
        (status = 403, description = "Course is outside your enrollment", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "courses",
    security(("cookie" = []))
)]
pub async fn courses_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Course).await?;

    let detail = state
        .courses()
        .course_detail(&scope, id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Course, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Course))?;

    Ok((StatusCode::OK, Json(detail)))
}

pub async fn courses_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<CoursePatch>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Course).await?;
    scope
        .authorize(Action::Update, id, true)
        .map_err(|e| WebError::from_store(EntityKind::Course, e))?;

    let updated = state
        .mm()
        .store()
        .update_course(id, patch)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Course, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Course))?;

    Ok((StatusCode::OK, Json(updated)))
}

pub async fn courses_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Course).await?;
    scope
        .authorize(Action::Delete, id, true)
        .map_err(|e| WebError::from_store(EntityKind::Course, e))?;

    let deleted = state
        .mm()
        .store()
        .delete_course(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Course, e))?;

    if !deleted {
        return Err(WebError::resource_not_found(EntityKind::Course));
    }

    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/summary",
    description = "Lesson count and total duration of the visible content",
    params(("id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Content summary", body = ContentSummary),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "courses",
    security(("cookie" = []))
)]
pub async fn courses_summary_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Course).await?;

    let summary = state
        .courses()
        .content_summary(&scope, id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Course, e))?
        .ok_or_else(|| WebError::resource_not_found(EntityKind::Course))?;

    Ok((StatusCode::OK, Json(summary)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/my",
    description = "Lists the courses the current user is enrolled in as a student",
    responses(
        (status = 200, description = "Enrolled courses", body = Vec<Course>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
    ),
    tag = "courses",
    security(("cookie" = []))
)]
pub async fn courses_my_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let enrolled = state
        .mm()
        .graph()
        .courses_for(user.user_id(), EnrollmentKind::Student)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Enrollment, e))?;

    // fetch by the edge set directly; going through the paginated
    // course listing would drop enrollments in older courses
    let mut ids: Vec<i64> = enrolled.into_iter().collect();
    ids.sort_unstable();

    let mut courses = Vec::with_capacity(ids.len());
    for id in ids {
        let found = state
            .mm()
            .store()
            .course_by_id(id)
            .await
            .map_err(|e| WebError::from_store(EntityKind::Course, e))?;
        if let Some(course) = found {
            courses.push(course);
        }
    }

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/enroll",
    description = "Enrolls the current user as a student; repeating is a no-op",
    params(("id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Enrollment edge", body = crate::model::entity::Enrollment),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "courses",
    security(("cookie" = []))
)]
pub async fn courses_enroll_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let exists = state
        .mm()
        .store()
        .course_by_id(id)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Course, e))?
        .is_some();
    if !exists {
        return Err(WebError::resource_not_found(EntityKind::Course));
    }

    let enrollment = state
        .mm()
        .graph()
        .enroll(user.user_id(), id, EnrollmentKind::Student)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Enrollment, e))?;

    Ok((StatusCode::OK, Json(enrollment)))
}

pub async fn courses_unenroll_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    state
        .mm()
        .graph()
        .unenroll(user.user_id(), id, EnrollmentKind::Student)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Enrollment, e))?;

    // removing an absent edge is still a success
    Ok(StatusCode::OK)
}

pub async fn courses_assign_trainer_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Enrollment).await?;
    scope
        .require_privileged()
        .map_err(|e| WebError::from_store(EntityKind::Enrollment, e))?;

    let enrollment = state
        .mm()
        .graph()
        .enroll(user_id, id, EnrollmentKind::Trainer)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Enrollment, e))?;

    Ok((StatusCode::OK, Json(enrollment)))
}

pub async fn courses_remove_trainer_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> WebResult<impl IntoResponse> {
    let scope = actor_scope(&state, &ctx, EntityKind::Enrollment).await?;
    scope
        .require_privileged()
        .map_err(|e| WebError::from_store(EntityKind::Enrollment, e))?;

    state
        .mm()
        .graph()
        .unenroll(user_id, id, EnrollmentKind::Trainer)
        .await
        .map_err(|e| WebError::from_store(EntityKind::Enrollment, e))?;

    Ok(StatusCode::OK)
}
