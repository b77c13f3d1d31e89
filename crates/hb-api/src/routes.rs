//! API routes

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::extractors::AppState;
use crate::handlers::{dashboard, projects, summary, time_entries, users};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api", api_router())
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .route("/me", get(users::me))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/roles", get(users::list_roles))
        .route("/users/:id/role", post(users::set_role))
        .route("/work_items/available_owners", get(users::available_owners))
        .route("/time_entries/:id/rebate", post(time_entries::rebate_time_entry))
        .nest("/projects", projects_router())
}

fn projects_router() -> Router<AppState> {
    Router::new()
        .route("/chart", post(projects::chart))
        .route("/summary", post(summary::email_summary))
        .route("/:id", get(projects::show_project))
        .route("/:id/log", get(projects::project_log))
        .route("/:id/non_project_users", get(projects::non_project_users))
        .route("/:id/summary", get(summary::view_summary))
        .route("/:id/summary/:start/:end", get(summary::view_summary_between))
}

async fn api_root(State(state): State<AppState>) -> Json<ApiRoot> {
    Json(ApiRoot {
        type_name: "Root",
        instance_name: state.config.app_title.clone(),
    })
}

#[derive(Serialize)]
struct ApiRoot {
    #[serde(rename = "_type")]
    type_name: &'static str,
    #[serde(rename = "instanceName")]
    instance_name: String,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use chrono::{Local, NaiveDate, TimeZone, Utc};
    use hb_core::types::UnmatchedEntries;
    use hb_db::{
        CreateOrderDto, CreateWorkItemDto, MemoryStore, OrderRepository, ProjectRepository,
        TimeEntryRepository, UserRepository, WorkItemRepository,
    };
    use hb_models::{NewTimeEntry, Project, Role, User};
    use hb_notifications::{EmailAddress, MemoryEmailSender};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::extractors::{ApiConfig, USER_ID_HEADER};

    const SUPER_ADMIN: i64 = 1;
    const MANAGER: i64 = 2;
    const ENGINEER: i64 = 3;
    const CUSTOMER: i64 = 4;
    const OUTSIDER: i64 = 5;

    struct TestApp {
        store: Arc<MemoryStore>,
        mailer: Arc<MemoryEmailSender>,
        router: Router,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Project 1 "Apollo" is managed by MANAGER with ENGINEER owning its only work item;
    /// project 2 "Gemini" is inactive and managed by SUPER_ADMIN.
    async fn app() -> TestApp {
        let store = Arc::new(MemoryStore::new());
        store.insert_user(User::new(SUPER_ADMIN, "Sam", "Root", "sam@example.com").with_role(Role::SuperAdmin));
        store.insert_user(User::new(MANAGER, "Pat", "Manager", "pat@example.com").with_role(Role::ProjectManager));
        store.insert_user(User::new(ENGINEER, "Eli", "Engineer", "eli@example.com").with_role(Role::Engineer));
        store.insert_user(User::new(CUSTOMER, "Cara", "Customer", "cara@example.com").with_role(Role::Customer));
        store.insert_user(User::new(OUTSIDER, "Olga", "Outsider", "olga@example.com").with_role(Role::Engineer));

        store.insert_project(
            Project::new(1, "Apollo", CUSTOMER, MANAGER)
                .created(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()),
        );
        store.insert_project(
            Project::new(2, "Gemini", CUSTOMER, SUPER_ADMIN)
                .inactive()
                .created(Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap()),
        );

        let item = store
            .create_work_item(CreateWorkItemDto {
                project_id: 1,
                owner_id: ENGINEER,
                name: "Launch".to_string(),
                start_date: date(2023, 9, 1),
                end_date: None,
                ticket_data: None,
            })
            .await
            .unwrap();
        for (hours, on) in [(10.0, date(2023, 9, 2)), (-5.0, date(2023, 9, 2)), (3.0, date(2023, 9, 4))] {
            store
                .create_time_entry(NewTimeEntry::new(item.id, ENGINEER, hours, on))
                .await
                .unwrap();
        }
        store
            .create_order(CreateOrderDto {
                project_id: Some(1),
                reference_number: Some("PO-1".to_string()),
                email: "cara@example.com".to_string(),
                hours: 40.0,
                date: Utc::now(),
            })
            .await
            .unwrap();

        let mailer = Arc::new(MemoryEmailSender::new());
        let config = ApiConfig {
            app_title: "Hourbook Test".to_string(),
            base_url: "https://hourbook.example.com".to_string(),
            from_address: EmailAddress::new("hourbook@example.com"),
            chart_unmatched: UnmatchedEntries::Drop,
        };
        let state = AppState::new(store.clone(), mailer.clone(), config);

        TestApp {
            store,
            mailer,
            router: router().with_state(state),
        }
    }

    fn get_as(user: i64, uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(USER_ID_HEADER, user.to_string())
            .body(Body::empty())
            .unwrap()
    }

    fn post_as(user: i64, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(USER_ID_HEADER, user.to_string())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        serde_json::from_str(&text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_requires_known_user() {
        let app = app().await;

        let anonymous = Request::builder().uri("/api/dashboard").body(Body::empty()).unwrap();
        let response = app.router.clone().oneshot(anonymous).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app.router.oneshot(get_as(99, "/api/dashboard")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["_type"], "Error");
    }

    #[tokio::test]
    async fn test_api_root() {
        let app = app().await;
        let response = app.router.oneshot(get_as(CUSTOMER, "/api")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["instanceName"], "Hourbook Test");
    }

    #[tokio::test]
    async fn test_dashboard_with_hours() {
        let app = app().await;

        let response = app
            .router
            .clone()
            .oneshot(get_as(MANAGER, "/api/dashboard?with_hours=true"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["name"], "Apollo");
        assert_eq!(body[0]["hours_ordered"], 40.0);
        assert_eq!(body[0]["hours_used"], 8.0);

        // newest first, inactive included on request
        let response = app
            .router
            .oneshot(get_as(SUPER_ADMIN, "/api/dashboard?in_active=true"))
            .await
            .unwrap();
        let body = json_body(response).await;
        let names: Vec<_> = body.as_array().unwrap().iter().map(|p| p["name"].clone()).collect();
        assert_eq!(names, vec![json!("Gemini"), json!("Apollo")]);
        assert!(body[0].get("hours_ordered").is_none());
    }

    #[tokio::test]
    async fn test_customer_dashboard_is_empty() {
        let app = app().await;
        let response = app.router.oneshot(get_as(CUSTOMER, "/api/dashboard")).await.unwrap();
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_project_guard() {
        let app = app().await;

        let response = app.router.clone().oneshot(get_as(ENGINEER, "/api/projects/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["projectId"], 1);
        assert_eq!(body["projectName"], "Apollo");
        assert_eq!(body["title"], "Hourbook Test");

        let response = app.router.clone().oneshot(get_as(OUTSIDER, "/api/projects/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/dashboard");

        let response = app.router.oneshot(get_as(SUPER_ADMIN, "/api/projects/42")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_chart() {
        let app = app().await;

        let body = json!({ "project_id": 1, "start": "2023-09-01", "end": "2023-09-05" });
        let response = app.router.clone().oneshot(post_as(ENGINEER, "/api/projects/chart", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let chart = json_body(response).await;
        assert_eq!(chart["labels"], json!(["09/01", "09/02", "09/03", "09/04", "09/05"]));
        assert_eq!(chart["data"], json!([0.0, 5.0, 0.0, 3.0, 0.0]));

        let missing = json!({ "project_id": 42, "start": "2023-09-01", "end": "2023-09-05" });
        let response = app.router.clone().oneshot(post_as(ENGINEER, "/api/projects/chart", missing)).await.unwrap();
        assert_eq!(json_body(response).await, json!({ "labels": [], "data": [] }));

        let invalid = json!({ "project_id": 1, "start": "yesterday", "end": "2023-09-05" });
        let response = app.router.oneshot(post_as(ENGINEER, "/api/projects/chart", invalid)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_view_summary() {
        let app = app().await;

        let response = app
            .router
            .clone()
            .oneshot(get_as(CUSTOMER, "/api/projects/1/summary/2023-09-01/2023-09-05"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = text(response).await;
        assert!(html.contains("<title>Project Apollo Summary</title>"));
        assert!(html.contains("Rebated: <b>5</b>"));

        let response = app
            .router
            .clone()
            .oneshot(get_as(CUSTOMER, "/api/projects/42/summary"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .router
            .oneshot(get_as(CUSTOMER, "/api/projects/abc/summary"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_email_summary() {
        let app = app().await;

        let body = json!({
            "id": 1,
            "start": "2023-09-01",
            "end": "2023-09-05",
            "email": ["boss@example.com", "CARA@example.com"]
        });
        let response = app.router.clone().oneshot(post_as(MANAGER, "/api/projects/summary", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await["recipients"],
            json!(["cara@example.com", "boss@example.com"])
        );

        let sent = app.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Project Apollo Summary");
        assert!(sent[0].html_body.is_some());

        let invalid = json!({ "id": 1, "start": "2023-09-01", "email": ["not-an-address"] });
        let response = app.router.clone().oneshot(post_as(MANAGER, "/api/projects/summary", invalid)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let errors = json_body(response).await["errors"].clone();
        assert!(errors.get("end").is_some());
        assert!(errors.get("email.0").is_some());

        let missing = json!({ "id": 42, "start": "2023-09-01", "end": "2023-09-05" });
        let response = app.router.oneshot(post_as(MANAGER, "/api/projects/summary", missing)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(app.mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_project_log() {
        let app = app().await;

        let response = app.router.clone().oneshot(get_as(MANAGER, "/api/projects/1/log")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv"));
        let csv = text(response).await;
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.contains(r#""Launch","","2023-09-01","","No","Eli Engineer","8""#));

        let response = app.router.oneshot(get_as(MANAGER, "/api/projects/42/log")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["message"], "This project does not exists");
    }

    #[tokio::test]
    async fn test_rebate() {
        let app = app().await;
        let original = app.store.time_entries_for_project(1).await.unwrap()[0].clone();

        let uri = format!("/api/time_entries/{}/rebate", original.id);
        let response = app.router.clone().oneshot(post_as(CUSTOMER, &uri, json!({}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app.router.clone().oneshot(post_as(ENGINEER, &uri, json!({}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let rebate = json_body(response).await;
        assert_eq!(rebate["hours"], -original.hours);
        assert_eq!(rebate["work_item_id"], original.work_item_id);
        assert_eq!(rebate["note"], format!("Refund of entry {}", original.id));
        assert_eq!(rebate["date"], Local::now().date_naive().to_string());

        let response = app
            .router
            .oneshot(post_as(ENGINEER, "/api/time_entries/999/rebate", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_roles() {
        let app = app().await;
        let response = app.router.oneshot(get_as(ENGINEER, "/api/roles")).await.unwrap();
        let roles = json_body(response).await;
        assert_eq!(roles.as_array().map(Vec::len), Some(6));
        assert_eq!(roles[2]["name"], "Project Manager");
    }

    #[tokio::test]
    async fn test_set_role() {
        let app = app().await;
        let manager_role = Role::ProjectManager.id();

        let response = app
            .router
            .clone()
            .oneshot(post_as(MANAGER, "/api/users/3/role", json!({ "role": manager_role })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .router
            .clone()
            .oneshot(post_as(SUPER_ADMIN, "/api/users/3/role", json!({ "role": manager_role })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let user = app.store.find_user(ENGINEER).await.unwrap().unwrap();
        assert_eq!(user.roles, vec![Role::ProjectManager]);

        let response = app
            .router
            .clone()
            .oneshot(post_as(SUPER_ADMIN, "/api/users/3/role", json!({ "role": 99 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .router
            .oneshot(post_as(SUPER_ADMIN, "/api/users/99/role", json!({ "role": manager_role })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_available_owners() {
        let app = app().await;
        let response = app
            .router
            .oneshot(get_as(MANAGER, "/api/work_items/available_owners"))
            .await
            .unwrap();
        let ids: Vec<_> = json_body(response).await.as_array().unwrap().iter().map(|u| u["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(2), json!(3), json!(5)]);
    }

    #[tokio::test]
    async fn test_non_project_users() {
        let app = app().await;

        let response = app
            .router
            .clone()
            .oneshot(get_as(MANAGER, "/api/projects/1/non_project_users"))
            .await
            .unwrap();
        let ids: Vec<_> = json_body(response).await.as_array().unwrap().iter().map(|u| u["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(5)]);

        app.store.attach_user(1, OUTSIDER).await.unwrap();
        let response = app
            .router
            .clone()
            .oneshot(get_as(MANAGER, "/api/projects/1/non_project_users"))
            .await
            .unwrap();
        assert_eq!(json_body(response).await.as_array().map(Vec::len), Some(1));

        let response = app
            .router
            .oneshot(get_as(MANAGER, "/api/projects/42/non_project_users"))
            .await
            .unwrap();
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_me() {
        let app = app().await;
        let response = app.router.oneshot(get_as(ENGINEER, "/api/me")).await.unwrap();
        let me = json_body(response).await;
        assert_eq!(me["email"], "eli@example.com");
        assert_eq!(me["role"], "Engineer");
        assert!(me["permissions"].as_array().unwrap().contains(&json!("Edit Time Entry")));
    }
}
