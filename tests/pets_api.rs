//! Pet CRUD tests over the in-process router.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::TestApp;

#[tokio::test]
async fn create_returns_id_and_forces_session_owner() {
    let app = TestApp::new();
    let (uid, cookie) = app.signup("ada@example.com", "hunter22", "Ada").await;

    // The body tries to claim a different owner; the session wins
    let res = app
        .request(
            Method::POST,
            "/pets",
            Some(json!({ "name": "Rex", "species": "dog", "ownerUid": Uuid::new_v4() })),
            Some(&cookie),
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.json["id"].as_str().unwrap().to_string();
    assert!(Uuid::parse_str(&id).is_ok());

    let res = app.get("/pets", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
    let pets = res.json.as_array().unwrap();
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0]["id"], id);
    assert_eq!(pets[0]["ownerUid"], uid.to_string());
    assert_eq!(pets[0]["name"], "Rex");
    assert_eq!(pets[0]["species"], "dog");
}

#[tokio::test]
async fn fresh_account_starts_empty_then_sees_its_pet() {
    let app = TestApp::new();
    let (uid, cookie) = app.signup("alice@example.com", "secret1", "Alice").await;

    let res = app.get("/pets", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json.as_array().unwrap().len(), 0);

    let res = app
        .request(
            Method::POST,
            "/pets",
            Some(json!({ "name": "Rex" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = app.get("/pets", Some(&cookie)).await;
    let pets = res.json.as_array().unwrap();
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0]["name"], "Rex");
    assert_eq!(pets[0]["ownerUid"], uid.to_string());
}

#[tokio::test]
async fn create_requires_a_name() {
    let app = TestApp::new();
    let (_, cookie) = app.signup("ada@example.com", "hunter22", "Ada").await;

    let res = app
        .request(
            Method::POST,
            "/pets",
            Some(json!({ "species": "dog" })),
            Some(&cookie),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json["field_errors"]["name"].is_string());
}

#[tokio::test]
async fn pet_text_fields_are_html_escaped() {
    let app = TestApp::new();
    let (_, cookie) = app.signup("ada@example.com", "hunter22", "Ada").await;

    let res = app
        .request(
            Method::POST,
            "/pets",
            Some(json!({ "name": "<b>Rex</b>", "description": "likes \"fetch\"" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = app.get("/pets", Some(&cookie)).await;
    let pets = res.json.as_array().unwrap();
    assert_eq!(pets[0]["name"], "&lt;b&gt;Rex&lt;&#x2F;b&gt;");
    assert_eq!(pets[0]["description"], "likes &quot;fetch&quot;");
}

#[tokio::test]
async fn listing_is_scoped_to_the_owner() {
    let app = TestApp::new();
    let (_, ada) = app.signup("ada@example.com", "hunter22", "Ada").await;
    let (_, grace) = app.signup("grace@example.com", "hunter22", "Grace").await;

    for name in ["Rex", "Milo"] {
        let res = app
            .request(
                Method::POST,
                "/pets",
                Some(json!({ "name": name })),
                Some(&ada),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
    }
    app.request(
        Method::POST,
        "/pets",
        Some(json!({ "name": "Whiskers" })),
        Some(&grace),
    )
    .await;

    let res = app.get("/pets", Some(&ada)).await;
    let names: Vec<_> = res
        .json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    // Newest first
    assert_eq!(names, vec!["Milo", "Rex"]);

    let res = app.get("/pets/all", Some(&grace)).await;
    assert_eq!(res.json.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn pet_routes_require_a_session() {
    let app = TestApp::new();

    for (method, path) in [
        (Method::GET, "/pets"),
        (Method::GET, "/pets/all"),
        (Method::POST, "/pets"),
    ] {
        let res = app.request(method, path, None, None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{path}");
    }

    let id = Uuid::new_v4();
    let res = app
        .request(Method::PUT, &format!("/pets/{id}"), None, None)
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    let res = app
        .request(Method::DELETE, &format!("/pets/{id}"), None, None)
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_applies_only_provided_fields() {
    let app = TestApp::new();
    let (_, cookie) = app.signup("ada@example.com", "hunter22", "Ada").await;

    let res = app
        .request(
            Method::POST,
            "/pets",
            Some(json!({ "name": "Rex", "species": "dog", "age": 3 })),
            Some(&cookie),
        )
        .await;
    let id = res.json["id"].as_str().unwrap().to_string();

    let res = app
        .request(
            Method::PUT,
            &format!("/pets/{id}"),
            Some(json!({ "age": 4 })),
            Some(&cookie),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["name"], "Rex");
    assert_eq!(res.json["species"], "dog");
    assert_eq!(res.json["age"], 4);
    assert!(res.json["updatedAt"].is_string());
}

#[tokio::test]
async fn update_of_anothers_pet_is_forbidden() {
    let app = TestApp::new();
    let (_, ada) = app.signup("ada@example.com", "hunter22", "Ada").await;
    let (_, grace) = app.signup("grace@example.com", "hunter22", "Grace").await;

    let res = app
        .request(
            Method::POST,
            "/pets",
            Some(json!({ "name": "Rex" })),
            Some(&ada),
        )
        .await;
    let id = res.json["id"].as_str().unwrap().to_string();

    let res = app
        .request(
            Method::PUT,
            &format!("/pets/{id}"),
            Some(json!({ "name": "Stolen" })),
            Some(&grace),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.json["message"], "Not authorized");

    let res = app
        .request(Method::DELETE, &format!("/pets/{id}"), None, Some(&grace))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    // Still there, untouched
    let res = app.get("/pets", Some(&ada)).await;
    assert_eq!(res.json[0]["name"], "Rex");
}

#[tokio::test]
async fn update_of_missing_pet_is_not_found() {
    let app = TestApp::new();
    let (_, cookie) = app.signup("ada@example.com", "hunter22", "Ada").await;

    let id = Uuid::new_v4();
    let res = app
        .request(
            Method::PUT,
            &format!("/pets/{id}"),
            Some(json!({ "name": "Ghost" })),
            Some(&cookie),
        )
        .await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json["message"], "Pet not found");
}

#[tokio::test]
async fn malformed_pet_id_is_a_bad_request() {
    let app = TestApp::new();
    let (_, cookie) = app.signup("ada@example.com", "hunter22", "Ada").await;

    let res = app
        .request(
            Method::PUT,
            "/pets/not-a-uuid",
            Some(json!({ "name": "Rex" })),
            Some(&cookie),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn operator_keys_in_update_bodies_are_neutralized() {
    let app = TestApp::new();
    let (_, cookie) = app.signup("ada@example.com", "hunter22", "Ada").await;

    let res = app
        .request(
            Method::POST,
            "/pets",
            Some(json!({ "name": "Rex" })),
            Some(&cookie),
        )
        .await;
    let id = res.json["id"].as_str().unwrap().to_string();

    // An operator-shaped key must not reach the store as a field name
    let res = app
        .request(
            Method::PUT,
            &format!("/pets/{id}"),
            Some(json!({ "$set": { "name": "Hacked" }, "owner.uid": "x" })),
            Some(&cookie),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["name"], "Rex");
}

#[tokio::test]
async fn delete_removes_the_record() {
    let app = TestApp::new();
    let (_, cookie) = app.signup("ada@example.com", "hunter22", "Ada").await;

    let res = app
        .request(
            Method::POST,
            "/pets",
            Some(json!({ "name": "Rex" })),
            Some(&cookie),
        )
        .await;
    let id = res.json["id"].as_str().unwrap().to_string();

    let res = app
        .request(Method::DELETE, &format!("/pets/{id}"), None, Some(&cookie))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["success"], true);

    let res = app.get("/pets", Some(&cookie)).await;
    assert_eq!(res.json.as_array().unwrap().len(), 0);

    // A second delete finds nothing
    let res = app
        .request(Method::DELETE, &format!("/pets/{id}"), None, Some(&cookie))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}
