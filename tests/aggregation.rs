//! Cross-entity course views over the flat-collection backend:
//! deterministic lesson ordering, asset URL rewriting, enrollment
//! annotation and content summaries.

use corso::model::entity::{
    ContentType, CourseCreate, EnrollmentKind, LessonCreate, LessonType, UserCreate,
};
use corso::model::ModelManager;
use corso::policy::{Actor, ActorScope, PolicyEngine, Role};
use corso::service::CourseService;

const BASE_URL: &str = "http://courses.example.com";

async fn scratch_mm() -> (ModelManager, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mm = ModelManager::json(dir.path()).await.unwrap();
    (mm, dir)
}

fn admin_scope() -> ActorScope {
    ActorScope::unscoped(Actor {
        user_id: 1,
        role: Role::Admin,
    })
}

fn lesson(course_id: i64, title: &str, order: i32, published: bool) -> LessonCreate {
    LessonCreate {
        course_id,
        module_id: None,
        title: title.to_string(),
        content_type: ContentType::Text,
        content_url: None,
        content_text: Some("body".to_string()),
        duration_minutes: 30,
        order,
        lesson_type: LessonType::Theory,
        is_published: published,
    }
}

fn course(title: &str, image_url: Option<&str>) -> CourseCreate {
    CourseCreate {
        title: title.to_string(),
        description: "d".to_string(),
        short_description: None,
        image_url: image_url.map(String::from),
        duration_hours: 0,
        tags: Vec::new(),
        requirements: Vec::new(),
        what_you_learn: Vec::new(),
    }
}

#[tokio::test]
async fn lessons_order_by_order_then_id() {
    let (mm, _dir) = scratch_mm().await;
    let svc = CourseService::new(mm.clone(), BASE_URL);

    let c = mm.store().create_course(course("ordered", None)).await.unwrap();
    // created out of order, with an order collision between b and c
    let b = mm.store().create_lesson(lesson(c.id, "b", 1, true)).await.unwrap();
    let a = mm.store().create_lesson(lesson(c.id, "a", 0, true)).await.unwrap();
    let tied = mm.store().create_lesson(lesson(c.id, "tied", 1, true)).await.unwrap();

    let ordered = svc.ordered_lessons(c.id).await.unwrap();
    let ids: Vec<i64> = ordered.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![a.id, b.id, tied.id]);
}

#[tokio::test]
async fn detail_rewrites_site_served_urls_only() {
    let (mm, _dir) = scratch_mm().await;
    let svc = CourseService::new(mm.clone(), BASE_URL);

    let c = mm
        .store()
        .create_course(course("assets", Some("/uploads/cover.png")))
        .await
        .unwrap();
    let mut site = lesson(c.id, "site", 0, true);
    site.content_url = Some("/static/v/intro.mp4".to_string());
    mm.store().create_lesson(site).await.unwrap();
    let mut external = lesson(c.id, "external", 1, true);
    external.content_url = Some("https://cdn.example.net/v.mp4".to_string());
    mm.store().create_lesson(external).await.unwrap();

    let detail = svc
        .course_detail(&admin_scope(), c.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        detail.course.image_url.as_deref(),
        Some("http://courses.example.com/uploads/cover.png")
    );
    assert_eq!(
        detail.lessons[0].content_url.as_deref(),
        Some("http://courses.example.com/static/v/intro.mp4")
    );
    // foreign origins pass through untouched
    assert_eq!(
        detail.lessons[1].content_url.as_deref(),
        Some("https://cdn.example.net/v.mp4")
    );
}

#[tokio::test]
async fn detail_falls_back_to_default_course_image() {
    let (mm, _dir) = scratch_mm().await;
    let svc = CourseService::new(mm.clone(), BASE_URL);

    let c = mm.store().create_course(course("bare", None)).await.unwrap();
    let detail = svc
        .course_detail(&admin_scope(), c.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        detail.course.image_url.as_deref(),
        Some("http://courses.example.com/static/images/course_default.png")
    );
}

#[tokio::test]
async fn detail_is_annotated_for_enrolled_students_and_hides_unpublished() {
    let (mm, _dir) = scratch_mm().await;
    let svc = CourseService::new(mm.clone(), BASE_URL);
    let policy = PolicyEngine::new(mm.graph());

    let c = mm.store().create_course(course("annotated", None)).await.unwrap();
    mm.store().create_lesson(lesson(c.id, "visible", 0, true)).await.unwrap();
    mm.store().create_lesson(lesson(c.id, "draft", 1, false)).await.unwrap();

    let student = mm
        .store()
        .create_user(UserCreate {
            login: "student".to_string(),
            password_hash: "x".to_string(),
            full_name: "Student".to_string(),
            role: "student".to_string(),
            company: None,
            department: None,
            position: None,
        })
        .await
        .unwrap();
    mm.graph()
        .enroll(student.id, c.id, EnrollmentKind::Student)
        .await
        .unwrap();

    let scope = policy
        .scope_for(Actor {
            user_id: student.id,
            role: Role::Student,
        })
        .await
        .unwrap();

    let detail = svc.course_detail(&scope, c.id).await.unwrap().unwrap();
    assert!(detail.enrollment.is_some());
    assert_eq!(detail.lessons.len(), 1);
    assert_eq!(detail.lessons[0].title, "visible");

    // the same view through privileged eyes has no annotation and all
    // lessons
    let admin_detail = svc.course_detail(&admin_scope(), c.id).await.unwrap().unwrap();
    assert!(admin_detail.enrollment.is_none());
    assert_eq!(admin_detail.lessons.len(), 2);
}

#[tokio::test]
async fn summary_counts_visible_lessons() {
    let (mm, _dir) = scratch_mm().await;
    let svc = CourseService::new(mm.clone(), BASE_URL);
    let policy = PolicyEngine::new(mm.graph());

    let c = mm.store().create_course(course("summed", None)).await.unwrap();
    mm.store().create_lesson(lesson(c.id, "one", 0, true)).await.unwrap();
    mm.store().create_lesson(lesson(c.id, "two", 1, true)).await.unwrap();
    mm.store().create_lesson(lesson(c.id, "draft", 2, false)).await.unwrap();

    let admin_summary = svc
        .content_summary(&admin_scope(), c.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(admin_summary.lesson_count, 3);
    assert_eq!(admin_summary.total_duration_minutes, 90);
    assert!((admin_summary.total_duration_hours - 1.5).abs() < f64::EPSILON);

    let student = mm
        .store()
        .create_user(UserCreate {
            login: "student2".to_string(),
            password_hash: "x".to_string(),
            full_name: "Student".to_string(),
            role: "student".to_string(),
            company: None,
            department: None,
            position: None,
        })
        .await
        .unwrap();
    mm.graph()
        .enroll(student.id, c.id, EnrollmentKind::Student)
        .await
        .unwrap();
    let scope = policy
        .scope_for(Actor {
            user_id: student.id,
            role: Role::Student,
        })
        .await
        .unwrap();

    let student_summary = svc.content_summary(&scope, c.id).await.unwrap().unwrap();
    assert_eq!(student_summary.lesson_count, 2);
    assert_eq!(student_summary.total_duration_minutes, 60);

    // absent course stays None for everyone
    assert!(svc.content_summary(&admin_scope(), 404).await.unwrap().is_none());
}
