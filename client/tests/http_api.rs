//! `HttpTodoApi` against a mock HTTP server.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use todo_client::api::{HttpTodoApi, NewTask, TaskStatusUpdate, TodoApi};
use todo_client::{ApiError, ClientConfig, Filter, TaskId, TodoManager};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> HttpTodoApi {
    HttpTodoApi::new(format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap()
}

fn task_json(id: &str, title: &str, completed: bool) -> serde_json::Value {
    json!({
        "_id": id,
        "title": title,
        "isActive": !completed,
        "isCompleted": completed,
        "createdAt": "2024-01-10T12:00:00.000Z",
        "__v": 0
    })
}

#[tokio::test]
async fn list_decodes_server_documents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            task_json("65a1", "Buy milk", false),
            task_json("65a2", "Walk dog", true),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = api_for(&server).list().await.unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, TaskId::new("65a1"));
    assert!(tasks[1].is_completed);
}

#[tokio::test]
async fn create_posts_title() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/todos"))
        .and(body_json(json!({"title": "Buy milk"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(task_json("65a3", "Buy milk", false)))
        .expect(1)
        .mount(&server)
        .await;

    let task = api_for(&server)
        .create(NewTask {
            title: "Buy milk".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(task.id.as_str(), "65a3");
    assert!(task.is_active);
}

#[tokio::test]
async fn update_puts_both_flags() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/todos/65a1"))
        .and(body_json(json!({"isActive": false, "isCompleted": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json("65a1", "Buy milk", true)))
        .expect(1)
        .mount(&server)
        .await;

    let task = api_for(&server)
        .update(&TaskId::new("65a1"), TaskStatusUpdate::completion(true))
        .await
        .unwrap();

    assert!(task.is_completed && !task.is_active);
}

#[tokio::test]
async fn delete_ignores_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/todos/65a1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("deleted"))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server).delete(&TaskId::new("65a1")).await.unwrap();
}

#[tokio::test]
async fn non_success_status_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Todo not found"))
        .mount(&server)
        .await;

    let error = api_for(&server)
        .delete(&TaskId::new("missing"))
        .await
        .unwrap_err();

    assert_eq!(
        error,
        ApiError::Server {
            status: 404,
            body: "Todo not found".to_string()
        }
    );
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let error = api_for(&server).list().await.unwrap_err();
    assert!(matches!(error, ApiError::Parse(_)), "got {error:?}");
}

#[tokio::test]
async fn slow_response_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let api = HttpTodoApi::new(format!("{}/api", server.uri()), Duration::from_millis(50)).unwrap();
    let error = api.list().await.unwrap_err();
    assert!(matches!(error, ApiError::Network(_)), "got {error:?}");
}

#[tokio::test]
async fn manager_loads_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            task_json("1", "A", false),
            task_json("2", "B", true),
        ])))
        .mount(&server)
        .await;

    let config = ClientConfig {
        api_url: format!("{}/api", server.uri()),
        ..ClientConfig::default()
    };
    let manager = TodoManager::from_config(&config).unwrap();

    manager.load_tasks(Filter::Completed).await.unwrap();

    let state = manager.snapshot().await;
    assert_eq!(state.tasks.len(), 1);
    assert_eq!(state.tasks[0].id.as_str(), "2");
    assert_eq!(state.active_count, 1);
}

#[tokio::test]
async fn manager_surfaces_http_failures_as_notifications() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let api = Arc::new(api_for(&server));
    let manager = TodoManager::with_api(&ClientConfig::default(), api);

    manager.create_task("Buy milk").await.unwrap();

    let state = manager.snapshot().await;
    assert!(state.tasks.is_empty());
    assert_eq!(state.notifications[0].message, "Error adding task");
    assert_eq!(
        state.last_error.as_deref(),
        Some("Server error (status 500): boom")
    );
}
