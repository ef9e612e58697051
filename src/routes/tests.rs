use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use crate::errors::Result;
use crate::grading::{Aggregator, Evaluator, GradingPipeline, Scorer};
use crate::models::assignments::entities::TranslationDirection;
use crate::storage::Storage;
use crate::storage::sea_orm_storage::SeaOrmStorage;
use crate::utils::{USER_ID_HEADER, json_error_handler};

struct StaticScorer;

#[async_trait::async_trait]
impl Scorer for StaticScorer {
    async fn score(
        &self,
        _direction: TranslationDirection,
        _reference: &str,
        _student: &str,
    ) -> Result<String> {
        Ok(r#"{"score": 88, "feedback": "good"}"#.to_string())
    }
}

async fn app_state() -> (Arc<dyn Storage>, GradingPipeline) {
    let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await);
    let evaluator = Evaluator::new(Arc::new(StaticScorer), Duration::from_secs(5));
    let pipeline = GradingPipeline::new(storage.clone(), Aggregator::new(evaluator, 1));
    (storage, pipeline)
}

macro_rules! init_app {
    ($storage:expr, $pipeline:expr) => {
        test::init_service(
            App::new()
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .app_data(web::Data::new($storage.clone()))
                .app_data(web::Data::new($pipeline.clone()))
                .configure(super::configure_assignments_routes)
                .configure(super::configure_submissions_routes),
        )
        .await
    };
}

fn assignment_body() -> Value {
    json!({
        "class_id": 3,
        "title": "  Unit 1  ",
        "type": "zh-en",
        "questions": [
            {"type": "zh-en", "prompt_text": "我喜欢读书", "reference_answer": "I like reading"},
            {"type": "read", "prompt_text": "Read aloud"}
        ],
        "allow_view_ref": false
    })
}

#[actix_web::test]
async fn test_full_submit_and_grade_flow() {
    let (storage, pipeline) = app_state().await;
    let app = init_app!(storage, pipeline);

    // 教师创建作业
    let req = test::TestRequest::post()
        .uri("/api/v1/assignments")
        .insert_header((USER_ID_HEADER, "1"))
        .set_json(assignment_body())
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["code"], 0);
    assert_eq!(resp["data"]["title"], "Unit 1");
    let assignment_id = resp["data"]["id"].as_i64().unwrap();

    // 学生看到的详情不含参考答案
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/assignments/{assignment_id}"))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert!(!String::from_utf8_lossy(&body).contains("reference_answer"));

    // 学生提交
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/assignments/{assignment_id}/submit"))
        .insert_header((USER_ID_HEADER, "42"))
        .set_json(json!({
            "answers": [
                {"text": "I love reading"},
                {"audio_url": "/uploads/r.mp3"},
                {"text": "extra answer is dropped"}
            ]
        }))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"]["status"], "graded");
    assert_eq!(resp["data"]["total_score"], 88);
    let answers = resp["data"]["answers"].as_array().unwrap();
    assert_eq!(answers.len(), 2);
    assert!(answers[1].get("score").is_none());
    let submission_id = resp["data"]["id"].as_i64().unwrap();

    // 教师批改
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/submissions/{submission_id}/grade"))
        .set_json(json!({
            "answers": [{"index": 1, "score": 70, "feedback": "clear"}],
            "comment": "不错"
        }))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"]["total_score"], 79);
    assert_eq!(resp["data"]["comment"], "不错");
    assert_eq!(resp["data"]["answers"][0]["feedback"], "good");

    // 批改视图包含参考答案
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/submissions/{submission_id}/review"))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        resp["data"]["assignment"]["questions"][0]["reference_answer"],
        "I like reading"
    );

    // 班级列表
    let req = test::TestRequest::get()
        .uri("/api/v1/classes/3/assignments?page=1&size=100")
        .insert_header((USER_ID_HEADER, "42"))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"]["items"][0]["status"], "graded");
    assert_eq!(resp["data"]["pagination"]["page_size"], 50);
}

#[actix_web::test]
async fn test_update_clears_due_date_with_null() {
    let (storage, pipeline) = app_state().await;
    let app = init_app!(storage, pipeline);

    let mut body = assignment_body();
    body["due_at"] = json!("2026-01-24T12:00:00Z");
    body["retry_limit"] = json!(2);
    let req = test::TestRequest::post()
        .uri("/api/v1/assignments")
        .insert_header((USER_ID_HEADER, "1"))
        .set_json(body)
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"]["retry_limit"], 2);
    let assignment_id = resp["data"]["id"].as_i64().unwrap();

    // 只改标题，截止时间不变
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/assignments/{assignment_id}"))
        .set_json(json!({"title": "Unit 2"}))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert!(resp["data"]["due_at"].is_string());

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/assignments/{assignment_id}"))
        .set_json(json!({"due_at": null}))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert!(resp["data"]["due_at"].is_null());
    assert_eq!(resp["data"]["title"], "Unit 2");
    assert_eq!(resp["data"]["retry_limit"], 2);
}

#[actix_web::test]
async fn test_error_statuses() {
    let (storage, pipeline) = app_state().await;
    let app = init_app!(storage, pipeline);

    // 缺少用户身份
    let req = test::TestRequest::post()
        .uri("/api/v1/assignments/1/submit")
        .set_json(json!({"answers": []}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // 作业不存在
    let req = test::TestRequest::post()
        .uri("/api/v1/assignments/999/submit")
        .insert_header((USER_ID_HEADER, "42"))
        .set_json(json!({"answers": []}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // 提交不存在
    let req = test::TestRequest::get()
        .uri("/api/v1/submissions/999")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // 非法 JSON
    let req = test::TestRequest::post()
        .uri("/api/v1/assignments")
        .insert_header((USER_ID_HEADER, "1"))
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 空标题
    let mut body = assignment_body();
    body["title"] = json!("   ");
    let req = test::TestRequest::post()
        .uri("/api/v1/assignments")
        .insert_header((USER_ID_HEADER, "1"))
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_out_of_range_grade_is_rejected() {
    let (storage, pipeline) = app_state().await;
    let app = init_app!(storage, pipeline);

    let req = test::TestRequest::post()
        .uri("/api/v1/assignments")
        .insert_header((USER_ID_HEADER, "1"))
        .set_json(assignment_body())
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    let assignment_id = resp["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/assignments/{assignment_id}/submit"))
        .insert_header((USER_ID_HEADER, "42"))
        .set_json(json!({"answers": [{"text": "hi"}]}))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    let submission_id = resp["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/submissions/{submission_id}/grade"))
        .set_json(json!({"answers": [{"index": 0, "score": 130}]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_delete_cascades_and_my_submission_empty() {
    let (storage, pipeline) = app_state().await;
    let app = init_app!(storage, pipeline);

    let req = test::TestRequest::post()
        .uri("/api/v1/assignments")
        .insert_header((USER_ID_HEADER, "1"))
        .set_json(assignment_body())
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    let assignment_id = resp["data"]["id"].as_i64().unwrap();

    // 未提交时返回空数据
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/assignments/{assignment_id}/submissions/my"))
        .insert_header((USER_ID_HEADER, "42"))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["code"], 0);
    assert!(resp.get("data").is_none());

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/assignments/{assignment_id}/submit"))
        .insert_header((USER_ID_HEADER, "42"))
        .set_json(json!({"answers": [{"text": "hi"}]}))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    let submission_id = resp["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/assignments/{assignment_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(
        storage
            .get_submission_by_id(submission_id)
            .await
            .unwrap()
            .is_none()
    );
}
