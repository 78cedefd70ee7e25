use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "SID",
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::account::account_signup_handler,
        crate::web::routes::account::account_signin_handler,
        crate::web::routes::users::users_list_handler,
        crate::web::routes::courses::courses_list_handler,
        crate::web::routes::courses::courses_my_handler,
        crate::web::routes::courses::courses_create_handler,
        crate::web::routes::courses::courses_get_handler,
        crate::web::routes::courses::courses_summary_handler,
        crate::web::routes::courses::courses_enroll_handler,
        crate::web::routes::modules::modules_list_handler,
        crate::web::routes::lessons::lessons_list_handler,
        crate::web::routes::lessons::lessons_get_handler,
        crate::web::routes::tests::tests_list_handler,
        crate::web::routes::questions::questions_submit_handler,
        crate::web::routes::tasks::tasks_list_handler,
        crate::web::routes::tasks::tasks_create_handler,
        crate::web::routes::materials::materials_list_handler,
        crate::web::routes::events::events_list_handler,
        crate::web::routes::events::events_create_handler,
    ),
    modifiers(&CookieAuthModifier),
)]
pub struct ApiDoc;
