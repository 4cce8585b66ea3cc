mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};

use common::{account, app, bearer, state, token_for};
use homework_server::models::domain::UserRole;

fn homework_body() -> Value {
    json!({
        "name": "homework",
        "description": "first homework",
        "deadline": "2018-11-08 08:48:11",
        "headcount": "2",
        "self_assignable": "True"
    })
}

#[actix_web::test]
async fn test_course_lifecycle() {
    let state = state().await;
    account(&state, UserRole::Teacher, "teacher").await;
    let token = token_for(&state, "teacher").await;
    let app = test::init_service(app(state)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/teacher/courses")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "algebra", "description": "numbers" }))
        .to_request();
    let course: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(course["name"], "algebra");
    assert_eq!(course["teacher"], "teacher");
    let course_id = course["id"].as_str().unwrap().to_string();

    let resp = test::TestRequest::post()
        .uri("/api/v1/teacher/courses")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "algebra", "description": "again" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri("/api/v1/teacher/courses")
        .insert_header(bearer(&token))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["courses"].as_array().unwrap().len(), 1);
    assert!(page["next"].is_null());
    assert!(page["prev"].is_null());

    let delete = |uri: String| {
        test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer(&token))
            .to_request()
    };
    let resp = test::call_service(&app, delete(format!("/api/v1/teacher/course/{}", course_id))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = test::call_service(&app, delete(format!("/api/v1/teacher/course/{}", course_id))).await;
    assert_eq!(resp.status(), StatusCode::GONE);
}

#[actix_web::test]
async fn test_create_course_requires_fields() {
    let state = state().await;
    account(&state, UserRole::Teacher, "teacher").await;
    let token = token_for(&state, "teacher").await;
    let app = test::init_service(app(state)).await;

    let resp = test::TestRequest::post()
        .uri("/api/v1/teacher/courses")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "algebra" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_homework_creation_checks() {
    let state = state().await;
    account(&state, UserRole::Teacher, "owner").await;
    account(&state, UserRole::Teacher, "other").await;
    let owner = token_for(&state, "owner").await;
    let other = token_for(&state, "other").await;
    let app = test::init_service(app(state)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/teacher/courses")
        .insert_header(bearer(&owner))
        .set_json(json!({ "name": "course", "description": "course" }))
        .to_request();
    let course: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/api/v1/teacher/course/{}/homeworks", course["id"].as_str().unwrap());

    let resp = test::TestRequest::post()
        .uri("/api/v1/teacher/course/missing/homeworks")
        .insert_header(bearer(&owner))
        .set_json(homework_body())
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::GONE);

    let resp = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&other))
        .set_json(homework_body())
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let mut bad_deadline = homework_body();
    bad_deadline["deadline"] = json!("next week");
    let resp = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&owner))
        .set_json(bad_deadline)
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&owner))
        .set_json(homework_body())
        .to_request();
    let homework: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(homework["headcount"], 2);
    assert_eq!(homework["self_assignable"], true);
    assert_eq!(homework["deadline"], "2018-11-08 08:48:11");
    assert_eq!(homework["course"], "course");

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&other))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["homeworks"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_modify_homework() {
    let state = state().await;
    account(&state, UserRole::Teacher, "teacher").await;
    let student = account(&state, UserRole::Student, "student").await;
    let token = token_for(&state, "teacher").await;
    let app = test::init_service(app(state)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/teacher/courses")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "course", "description": "course" }))
        .to_request();
    let course: Value = test::call_and_read_body_json(&app, req).await;
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/teacher/course/{}/homeworks", course["id"].as_str().unwrap()))
        .insert_header(bearer(&token))
        .set_json(homework_body())
        .to_request();
    let homework: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/api/v1/teacher/homework/{}", homework["id"].as_str().unwrap());

    let put = |body: Value| {
        test::TestRequest::put()
            .uri(&uri)
            .insert_header(bearer(&token))
            .set_json(body)
            .to_request()
    };

    let resp = test::call_service(&app, put(json!({}))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(&app, put(json!({ "name": "renamed", "headcount": "many" }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let updated: Value = test::call_and_read_body_json(
        &app,
        put(json!({ "headcount": 5, "self_assignable": false })),
    )
    .await;
    assert_eq!(updated["headcount"], 5);
    assert_eq!(updated["self_assignable"], false);
    assert_eq!(updated["name"], "homework");

    let resp = test::call_service(&app, put(json!({ "students": ["nobody"] }))).await;
    assert_eq!(resp.status(), StatusCode::GONE);

    let resp = test::call_service(&app, put(json!({ "students": [student.id] }))).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&token))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, put(json!({ "name": "late" }))).await;
    assert_eq!(resp.status(), StatusCode::GONE);
}

#[actix_web::test]
async fn test_grading_solutions() {
    let state = state().await;
    account(&state, UserRole::Teacher, "teacher").await;
    let student = account(&state, UserRole::Student, "student").await;
    let teacher_token = token_for(&state, "teacher").await;
    let student_token = token_for(&state, "student").await;
    let app = test::init_service(app(state)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/teacher/courses")
        .insert_header(bearer(&teacher_token))
        .set_json(json!({ "name": "course", "description": "course" }))
        .to_request();
    let course: Value = test::call_and_read_body_json(&app, req).await;
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/teacher/course/{}/homeworks", course["id"].as_str().unwrap()))
        .insert_header(bearer(&teacher_token))
        .set_json(homework_body())
        .to_request();
    let homework: Value = test::call_and_read_body_json(&app, req).await;
    let homework_id = homework["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/teacher/homework/{}", homework_id))
        .insert_header(bearer(&teacher_token))
        .set_json(json!({ "students": [student.id] }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/student/homework/{}/submit?filename=answer.txt", homework_id))
        .insert_header(bearer(&student_token))
        .set_payload("42")
        .to_request();
    let submitted: Value = test::call_and_read_body_json(&app, req).await;
    let solution_id = submitted["solution"]["id"].as_str().unwrap().to_string();
    assert!(submitted["solution"]["status"].is_null());

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/teacher/homework/{}/solutions", homework_id))
        .insert_header(bearer(&teacher_token))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["solutions"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/teacher/solution/{}", solution_id))
        .insert_header(bearer(&teacher_token))
        .set_json(json!({ "status": "accepted" }))
        .to_request();
    let graded: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(graded["solution"]["status"], "accepted");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/teacher/solution/{}", solution_id))
        .insert_header(bearer(&teacher_token))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["solution"]["status"], "accepted");

    let resp = test::TestRequest::get()
        .uri("/api/v1/teacher/solution/missing")
        .insert_header(bearer(&teacher_token))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::GONE);
}

#[actix_web::test]
async fn test_course_students_lists_only_enrolled() {
    let state = state().await;
    account(&state, UserRole::Teacher, "teacher").await;
    account(&state, UserRole::Student, "enrolled").await;
    account(&state, UserRole::Student, "outsider").await;
    let teacher_token = token_for(&state, "teacher").await;
    let student_token = token_for(&state, "enrolled").await;
    let app = test::init_service(app(state)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/teacher/courses")
        .insert_header(bearer(&teacher_token))
        .set_json(json!({ "name": "course", "description": "course" }))
        .to_request();
    let course: Value = test::call_and_read_body_json(&app, req).await;
    let course_id = course["id"].as_str().unwrap().to_string();

    let resp = test::TestRequest::post()
        .uri(&format!("/api/v1/student/course/{}", course_id))
        .insert_header(bearer(&student_token))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/teacher/course/{}/students", course_id))
        .insert_header(bearer(&teacher_token))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    let students = page["students"].as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["username"], "enrolled");
}

#[actix_web::test]
async fn test_students_cannot_use_teacher_endpoints() {
    let state = state().await;
    account(&state, UserRole::Student, "student").await;
    let token = token_for(&state, "student").await;
    let app = test::init_service(app(state)).await;

    let resp = test::TestRequest::get()
        .uri("/api/v1/teacher/courses")
        .insert_header(bearer(&token))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
