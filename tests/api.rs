use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use serde_json::{json, Value};

use featurevote::api::{self, AppState, ErrorBody, VoteResponse, USER_HEADER};
use featurevote::db::Database;
use featurevote::models::*;

fn setup() -> (TestServer, Database) {
    let db = Database::open_memory().expect("Failed to create test database");
    db.migrate().expect("Failed to migrate test database");
    let server = TestServer::new(api::create_router(db.clone())).expect("Failed to start test server");
    (server, db)
}

fn create_user(db: &Database, username: &str) -> User {
    db.create_user(CreateUserInput { username: username.into(), email: None })
        .expect("Failed to create user")
}

fn create_feature(db: &Database, author: &User, title: &str) -> Feature {
    db.create_feature(author.id, CreateFeatureInput { title: title.into(), description: None })
        .expect("Failed to create feature")
}

fn as_user(request: TestRequest, user: &User) -> TestRequest {
    request.add_header(
        HeaderName::from_static(USER_HEADER),
        HeaderValue::from_str(&user.id.to_string()).unwrap(),
    )
}

#[tokio::test]
async fn health_reports_ok() {
    let (server, _) = setup();

    let response = server.get("/api/health").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn registers_and_identifies_users() {
    let (server, _) = setup();

    let response = server
        .post("/api/users")
        .json(&json!({"username": "alice", "email": "alice@example.com"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let alice: User = response.json();

    let me = as_user(server.get("/api/users/me"), &alice).await;
    me.assert_status_ok();
    assert_eq!(me.json::<User>().username, "alice");

    let duplicate = server.post("/api/users").json(&json!({"username": "alice"})).await;
    duplicate.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn users_update_their_own_profile() {
    let (server, db) = setup();
    let alice = create_user(&db, "alice");
    create_user(&db, "bob");

    let patched = as_user(server.patch("/api/users/me"), &alice)
        .json(&json!({"email": "alice@example.com"}))
        .await;
    patched.assert_status_ok();
    let user: User = patched.json();
    assert_eq!(user.username, "alice");
    assert_eq!(user.email.as_deref(), Some("alice@example.com"));

    let replaced = as_user(server.put("/api/users/me"), &alice)
        .json(&json!({"username": "alicia"}))
        .await;
    replaced.assert_status_ok();
    let user: User = replaced.json();
    assert_eq!(user.username, "alicia");
    assert_eq!(user.email, None);

    let taken = as_user(server.patch("/api/users/me"), &alice)
        .json(&json!({"username": "bob"}))
        .await;
    taken.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(taken.json::<ErrorBody>().code, "validation_error");

    let anonymous = server.patch("/api/users/me").json(&json!({"username": "x"})).await;
    anonymous.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_requires_identity() {
    let (server, _) = setup();

    let response = server.get("/api/users/me").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<ErrorBody>().code, "unauthenticated");
}

#[tokio::test]
async fn unknown_user_header_is_rejected() {
    let (server, _) = setup();

    let response = server
        .get("/api/features")
        .add_header(
            HeaderName::from_static(USER_HEADER),
            HeaderValue::from_static("00000000-0000-0000-0000-000000000000"),
        )
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn lists_features_ranked_by_votes() {
    let (server, db) = setup();
    let author = create_user(&db, "author");
    let voter = create_user(&db, "voter");
    let quiet = create_feature(&db, &author, "Quiet");
    let popular = create_feature(&db, &author, "Popular");
    db.cast_vote(popular.id, voter.id).unwrap();

    let response = as_user(server.get("/api/features"), &voter).await;

    response.assert_status_ok();
    let page: Page<FeatureView> = response.json();
    assert_eq!(page.count, 2);
    assert_eq!(page.results[0].feature.id, popular.id);
    assert_eq!(page.results[0].feature.vote_count, 1);
    assert!(page.results[0].has_voted);
    assert_eq!(page.results[1].feature.id, quiet.id);
    assert!(!page.results[1].has_voted);
}

#[tokio::test]
async fn list_honours_page_size_and_rejects_missing_pages() {
    let (server, db) = setup();
    let author = create_user(&db, "author");
    for i in 0..3 {
        create_feature(&db, &author, &format!("Feature {}", i));
    }

    let page = server.get("/api/features").add_query_param("page_size", 2).await;
    page.assert_status_ok();
    assert_eq!(page.json::<Page<FeatureView>>().results.len(), 2);

    let missing = server.get("/api/features").add_query_param("page", 5).await;
    missing.assert_status(StatusCode::NOT_FOUND);

    let malformed = server.get("/api/features").add_query_param("page", "abc").await;
    malformed.assert_status(StatusCode::BAD_REQUEST);

    let empty = server.get("/api/features").add_query_param("page_size", 0).await;
    empty.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(empty.json::<ErrorBody>().code, "validation_error");
}

#[tokio::test]
async fn create_requires_authentication() {
    let (server, db) = setup();

    let response = server
        .post("/api/features")
        .json(&json!({"title": "New Feature", "description": "New description"}))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(db.feature_count().unwrap(), 0);
}

#[tokio::test]
async fn creates_a_feature_for_the_caller() {
    let (server, db) = setup();
    let author = create_user(&db, "author");

    let response = as_user(server.post("/api/features"), &author)
        .json(&json!({"title": "Dark Mode"}))
        .await;

    response.assert_status(StatusCode::CREATED);
    let view: FeatureView = response.json();
    assert_eq!(view.feature.title, "Dark Mode");
    assert_eq!(view.feature.author_id, author.id);
    assert_eq!(view.feature.vote_count, 0);
    assert_eq!(view.feature.description, None);
}

#[tokio::test]
async fn create_rejects_invalid_titles() {
    let (server, db) = setup();
    let author = create_user(&db, "author");

    let blank = as_user(server.post("/api/features"), &author)
        .json(&json!({"title": ""}))
        .await;
    blank.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(blank.json::<ErrorBody>().code, "validation_error");

    let missing = as_user(server.post("/api/features"), &author)
        .json(&json!({"description": "no title"}))
        .await;
    missing.assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(db.feature_count().unwrap(), 0);
}

#[tokio::test]
async fn retrieve_maps_unknown_and_malformed_ids_to_not_found() {
    let (server, db) = setup();
    let author = create_user(&db, "author");
    let feature = create_feature(&db, &author, "Dark Mode");

    let found = server.get(&format!("/api/features/{}", feature.id)).await;
    found.assert_status_ok();
    assert_eq!(found.json::<FeatureView>().feature.id, feature.id);

    let unknown = server.get(&format!("/api/features/{}", uuid::Uuid::new_v4())).await;
    unknown.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(unknown.json::<ErrorBody>().error, "Feature not found");

    let malformed = server.get("/api/features/not-a-uuid").await;
    malformed.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_author_may_edit_or_delete() {
    let (server, db) = setup();
    let author = create_user(&db, "author");
    let other = create_user(&db, "other");
    let feature = create_feature(&db, &author, "Dark Mode");
    let path = format!("/api/features/{}", feature.id);

    let patch = as_user(server.patch(&path), &other)
        .json(&json!({"title": "Hijacked"}))
        .await;
    patch.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(patch.json::<ErrorBody>().code, "forbidden");

    let delete = as_user(server.delete(&path), &other).await;
    delete.assert_status(StatusCode::FORBIDDEN);

    let own_patch = as_user(server.patch(&path), &author)
        .json(&json!({"description": "Night theme"}))
        .await;
    own_patch.assert_status_ok();
    let view: FeatureView = own_patch.json();
    assert_eq!(view.feature.title, "Dark Mode");
    assert_eq!(view.feature.description.as_deref(), Some("Night theme"));

    let own_put = as_user(server.put(&path), &author)
        .json(&json!({"title": "Dark Theme"}))
        .await;
    own_put.assert_status_ok();
    assert_eq!(own_put.json::<FeatureView>().feature.description, None);

    let own_delete = as_user(server.delete(&path), &author).await;
    own_delete.assert_status(StatusCode::NO_CONTENT);
    assert!(db.get_feature(feature.id).unwrap().is_none());
}

#[tokio::test]
async fn upvote_and_remove_vote_round_trip() {
    let (server, db) = setup();
    let author = create_user(&db, "author");
    let voter = create_user(&db, "voter");
    let feature = create_feature(&db, &author, "Dark Mode");
    let upvote_path = format!("/api/features/{}/upvote", feature.id);
    let remove_path = format!("/api/features/{}/remove_vote", feature.id);

    let upvote = as_user(server.post(&upvote_path), &voter).await;
    upvote.assert_status_ok();
    let body: VoteResponse = upvote.json();
    assert_eq!(body.vote_count, 1);
    assert!(body.has_voted);

    let again = as_user(server.post(&upvote_path), &voter).await;
    again.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(again.json::<ErrorBody>().error, "You have already voted for this feature");

    let removed = as_user(server.delete(&remove_path), &voter).await;
    removed.assert_status_ok();
    let body: VoteResponse = removed.json();
    assert_eq!(body.vote_count, 0);
    assert!(!body.has_voted);

    let none_left = as_user(server.delete(&remove_path), &voter).await;
    none_left.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(none_left.json::<ErrorBody>().code, "no_vote");
}

#[tokio::test]
async fn author_cannot_upvote_own_feature() {
    let (server, db) = setup();
    let author = create_user(&db, "author");
    let feature = create_feature(&db, &author, "Dark Mode");

    let response = as_user(server.post(&format!("/api/features/{}/upvote", feature.id)), &author).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json();
    assert_eq!(body.code, "self_vote");
    assert!(body.error.contains("cannot vote for your own feature"));
    assert_eq!(db.vote_count(feature.id).unwrap(), 0);
}

#[tokio::test]
async fn voting_requires_authentication() {
    let (server, db) = setup();
    let author = create_user(&db, "author");
    let feature = create_feature(&db, &author, "Dark Mode");

    let response = server.post(&format!("/api/features/{}/upvote", feature.id)).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upvote_on_unknown_feature_is_not_found() {
    let (server, db) = setup();
    let voter = create_user(&db, "voter");

    let response = as_user(
        server.post(&format!("/api/features/{}/upvote", uuid::Uuid::new_v4())),
        &voter,
    )
    .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn configured_page_size_is_the_default() {
    let db = Database::open_memory().unwrap();
    db.migrate().unwrap();
    let author = create_user(&db, "author");
    for i in 0..4 {
        create_feature(&db, &author, &format!("Feature {}", i));
    }
    let server = TestServer::new(api::router(AppState::new(db).with_page_size(3))).unwrap();

    let page: Page<FeatureView> = server.get("/api/features").await.json();

    assert_eq!(page.page_size, 3);
    assert_eq!(page.results.len(), 3);
    assert_eq!(page.count, 4);
}
