use std::sync::{Arc, Mutex};

use actix_web::{App, http::StatusCode, http::header, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};
use uuid::Uuid;

use scribe_core::domain::Role;
use scribe_core::ports::{MailError, TokenKind, TokenPayload};
use scribe_infra::mail::{MailTransport, OutgoingMail};
use scribe_infra::{Argon2PasswordService, JwtConfig, JwtTokenService, MailConfig, TemplatedMailer};

use super::configure_routes;
use crate::middleware::auth::TokenContext;
use crate::state::{AppState, Repositories};

#[derive(Default)]
struct Outbox(Mutex<Vec<OutgoingMail>>);

impl Outbox {
    /// Token embedded in the link of the latest mail.
    fn last_token(&self) -> String {
        let sent = self.0.lock().unwrap();
        let html = &sent.last().expect("no mail sent").html;
        let start = html.find("token=").expect("no token link") + "token=".len();
        let end = start + html[start..].find('"').unwrap();
        html[start..end].to_string()
    }
}

#[async_trait]
impl MailTransport for Outbox {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        self.0.lock().unwrap().push(mail);
        Ok(())
    }
}

fn test_state() -> (AppState, Arc<Outbox>) {
    let outbox = Arc::new(Outbox::default());
    let jwt = JwtConfig {
        access_secret: "access-secret".into(),
        refresh_secret: "refresh-secret".into(),
        ..JwtConfig::default()
    };
    let mail = MailConfig {
        client_url: "http://client.test".into(),
        from: "Admin root@scribe.test".into(),
    };

    let state = AppState::from_parts(
        Repositories::in_memory(),
        Arc::new(JwtTokenService::new(jwt)),
        Arc::new(Argon2PasswordService::with_cost(1).unwrap()),
        Arc::new(TemplatedMailer::new(mail, outbox.clone())),
    );
    (state, outbox)
}

fn token_for(state: &AppState, role: Role) -> String {
    let payload = TokenPayload {
        id: Uuid::new_v4(),
        email: format!("{}@scribe.test", role.as_str().to_lowercase()),
        role,
    };
    state.tokens.generate_token(TokenKind::Access, &payload).unwrap()
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(TokenContext)
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

/// Registers, confirms and logs in; returns the login response body and its cookies.
macro_rules! signed_in_user {
    ($app:expr, $outbox:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({ "name": "Reader", "email": $email, "password": "secret1" }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/auth/confirm?token={}", $outbox.last_token()))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": $email, "password": "secret1" }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookies: Vec<String> = resp
            .headers()
            .get_all(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        let body: Value = test::read_body_json(resp).await;
        (body, cookies)
    }};
}

#[actix_web::test]
async fn healthcheck_reports_ok() {
    let (state, _) = test_state();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/healthcheck").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "OK");
    assert!(body["uptime"].as_f64().is_some());
    assert!(body["timestamp"].as_i64().is_some());
}

#[actix_web::test]
async fn register_confirm_login_and_fetch_me() {
    let (state, outbox) = test_state();
    let app = init_app!(state);

    let (body, cookies) = signed_in_user!(app, outbox, "reader@scribe.test");
    assert_eq!(body["user"]["status"], "ACTIVE");
    assert_eq!(body["user"]["role"], "USER");
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=")));

    let jwt = body["jwt"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri("/api/v1/user/me")
        .insert_header(("x-access-token", jwt))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let me: Value = test::read_body_json(resp).await;
    assert_eq!(me["email"], "reader@scribe.test");
    assert!(me.get("password").is_none());
    assert!(me.get("passwordHash").is_none());
}

#[actix_web::test]
async fn inactive_user_cannot_log_in() {
    let (state, _) = test_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "name": "Late", "email": "late@scribe.test", "password": "secret1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "late@scribe.test", "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "err": "Invalid password or email" }));
}

#[actix_web::test]
async fn invalid_registration_is_unprocessable() {
    let (state, _) = test_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "name": "Reader", "email": "nope", "password": "123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["err"],
        "email must be an email,password must be longer than or equal to 6 characters"
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn access_token_is_read_from_query_and_body() {
    let (state, outbox) = test_state();
    let app = init_app!(state);
    let (body, _) = signed_in_user!(app, outbox, "reader@scribe.test");
    let jwt = body["jwt"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/user/me?token={jwt}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/restore-password")
        .set_json(json!({ "password": "secret2", "token": jwt }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "reader@scribe.test", "password": "secret2" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn large_body_still_carries_its_token() {
    let (state, _) = test_state();
    let admin = token_for(&state, Role::Admin);
    let app = init_app!(state);
    let text = "a".repeat(300 * 1024);

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .set_json(json!({ "title": "Long read", "text": text, "token": admin }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["text"].as_str().map(str::len), Some(300 * 1024));
}

#[actix_web::test]
async fn oversized_body_is_rejected_by_the_json_limit() {
    let (state, _) = test_state();
    let app = init_app!(state);
    let password = "p".repeat(3 * 1024 * 1024);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({ "name": "Big", "email": "big@scribe.test", "password": password }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert!(!body["err"].as_str().unwrap_or_default().contains("EOF"));
}

#[actix_web::test]
async fn unusable_token_does_not_reject_public_routes() {
    let (state, _) = test_state();
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/posts")
        .insert_header(("x-access-token", "garbage"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let refresh_as_access = {
        let payload = TokenPayload {
            id: Uuid::new_v4(),
            email: "user@scribe.test".into(),
            role: Role::Admin,
        };
        state.tokens.generate_token(TokenKind::Refresh, &payload).unwrap()
    };
    let req = test::TestRequest::get()
        .uri("/api/v1/user")
        .insert_header((header::AUTHORIZATION, format!("Bearer {refresh_as_access}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["err"], "User not authorized");
}

#[actix_web::test]
async fn refresh_cookie_issues_a_new_access_token() {
    let (state, outbox) = test_state();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/auth/token").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let (_, cookies) = signed_in_user!(app, outbox, "reader@scribe.test");
    let refresh = cookies
        .iter()
        .find(|c| c.starts_with("refreshToken="))
        .and_then(|c| c.split(';').next())
        .unwrap()
        .to_string();

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/token")
        .insert_header((header::COOKIE, refresh))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::SET_COOKIE).is_some());

    let body: Value = test::read_body_json(resp).await;
    assert!(body["jwt"].as_str().is_some_and(|t| !t.is_empty()));
}

#[actix_web::test]
async fn logout_expires_both_cookies() {
    let (state, _) = test_state();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookies: Vec<_> = resp.headers().get_all(header::SET_COOKIE).collect();
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.to_str().unwrap().contains("Max-Age=0")));
}

#[actix_web::test]
async fn tag_routes_are_guarded_by_role() {
    let (state, _) = test_state();
    let app = init_app!(state);
    let tag = json!({ "title": "rust" });

    let req = test::TestRequest::post().uri("/api/v1/tag").set_json(&tag).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["err"], "User not authorized");

    let req = test::TestRequest::post()
        .uri("/api/v1/tag")
        .insert_header(("x-access-token", token_for(&state, Role::User)))
        .set_json(&tag)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["err"], "No permissions");

    let admin = token_for(&state, Role::Admin);
    let req = test::TestRequest::post()
        .uri("/api/v1/tag")
        .insert_header(("x-access-token", admin.clone()))
        .set_json(&tag)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/tag")
        .insert_header(("x-access-token", admin))
        .set_json(&tag)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn invalid_body_is_reported_before_the_role_check() {
    let (state, _) = test_state();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/tag")
        .set_json(json!({ "title": "ab" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[actix_web::test]
async fn malformed_path_id_is_a_bad_request() {
    let (state, _) = test_state();
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/api/v1/posts/not-a-uuid").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn post_visibility_depends_on_publish_state() {
    let (state, _) = test_state();
    let app = init_app!(state);

    let manager = token_for(&state, Role::Manager);
    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(("x-access-token", manager))
        .set_json(json!({ "title": "Draft", "text": "Not yet" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let draft: Value = test::read_body_json(resp).await;
    assert_eq!(draft["isPublish"], false);

    let admin = token_for(&state, Role::Admin);
    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(("x-access-token", admin.clone()))
        .set_json(json!({ "title": "Live", "text": "Hello" }))
        .to_request();
    let live: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(live["isPublish"], true);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{}", draft["id"].as_str().unwrap()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{}", draft["id"].as_str().unwrap()))
        .insert_header(("x-access-token", admin.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/v1/posts").to_request();
    let listed: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["title"], "Live");

    let req = test::TestRequest::get()
        .uri("/api/v1/posts/accessible")
        .insert_header(("x-access-token", admin))
        .to_request();
    let all: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn comments_wait_for_publication() {
    let (state, outbox) = test_state();
    let app = init_app!(state);
    let (login, _) = signed_in_user!(app, outbox, "reader@scribe.test");
    let reader = login["jwt"].as_str().unwrap().to_string();
    let admin = token_for(&state, Role::Admin);

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(("x-access-token", admin.clone()))
        .set_json(json!({ "title": "Live", "text": "Hello" }))
        .to_request();
    let post: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let post_id = post["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/v1/comment")
        .insert_header(("x-access-token", reader))
        .set_json(json!({ "text": "Nice", "postId": post_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let comment: Value = test::read_body_json(resp).await;
    assert_eq!(comment["isPublish"], false);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/comment/published/{post_id}"))
        .to_request();
    let published: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert!(published.as_array().unwrap().is_empty());

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/comment/publish/{}", comment["id"].as_str().unwrap()))
        .insert_header(("x-access-token", admin))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/comment/published/{post_id}"))
        .to_request();
    let published: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(published[0]["text"], "Nice");
    assert_eq!(published[0]["user"]["email"], "reader@scribe.test");
}

#[actix_web::test]
async fn admin_edits_role_and_status() {
    let (state, outbox) = test_state();
    let app = init_app!(state);
    let (login, _) = signed_in_user!(app, outbox, "reader@scribe.test");
    let user_id = login["user"]["id"].as_str().unwrap().to_string();
    let admin = token_for(&state, Role::Admin);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/user/{user_id}"))
        .insert_header(("x-access-token", admin.clone()))
        .set_json(json!({ "role": "MANAGER" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user: Value = test::read_body_json(resp).await;
    assert_eq!(user["role"], "MANAGER");
    assert_eq!(user["status"], "ACTIVE");

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/user/{user_id}"))
        .insert_header(("x-access-token", admin))
        .set_json(json!({ "status": "BANNED" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}
