// tests/profile_tests.rs

mod common;

use common::spawn_app;
use quiz_backend::config::MAX_PROFILE_IMAGE_BYTES;
use reqwest::multipart::{Form, Part};
use serde_json::json;

async fn upload(
    app: &common::TestApp,
    token: &str,
    bytes: Vec<u8>,
    mime: &str,
) -> reqwest::Response {
    let part = Part::bytes(bytes)
        .file_name("avatar")
        .mime_str(mime)
        .unwrap();
    app.client
        .post(app.url("/api/profile/image"))
        .bearer_auth(token)
        .multipart(Form::new().part("profile_image", part))
        .send()
        .await
        .expect("Upload failed")
}

#[tokio::test]
async fn profile_image_is_stored_and_served() {
    let Some(app) = spawn_app().await else { return };
    let (token, _) = app.register_and_login(&[]).await;

    let first_bytes = b"\x89PNG\r\n\x1a\nfirst".to_vec();
    let response = upload(&app, &token, first_bytes.clone(), "image/png").await;
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let first_url = body["profile_image"].as_str().unwrap().to_string();
    assert!(first_url.starts_with("/media/profiles/"));
    assert!(first_url.ends_with(".png"));

    let served = app.client.get(app.url(&first_url)).send().await.unwrap();
    assert_eq!(served.status().as_u16(), 200);
    assert_eq!(served.bytes().await.unwrap().to_vec(), first_bytes);

    let profile = app.get_json(&token, "/api/profile").await;
    assert_eq!(profile["profile_image"], first_url);

    // A new upload replaces the old file.
    let response = upload(&app, &token, b"GIF89a".to_vec(), "image/gif").await;
    let body: serde_json::Value = response.json().await.unwrap();
    let second_url = body["profile_image"].as_str().unwrap();
    assert!(second_url.ends_with(".gif"));

    let old = app.client.get(app.url(&first_url)).send().await.unwrap();
    assert_eq!(old.status().as_u16(), 404);
}

#[tokio::test]
async fn profile_image_type_and_size_are_checked() {
    let Some(app) = spawn_app().await else { return };
    let (token, _) = app.register_and_login(&[]).await;

    let response = upload(&app, &token, b"hello".to_vec(), "text/plain").await;
    assert_eq!(response.status().as_u16(), 400);

    let response = upload(&app, &token, Vec::new(), "image/png").await;
    assert_eq!(response.status().as_u16(), 400);

    let too_big = vec![0u8; MAX_PROFILE_IMAGE_BYTES + 1];
    let response = upload(&app, &token, too_big, "image/png").await;
    assert_eq!(response.status().as_u16(), 400);

    let profile = app.get_json(&token, "/api/profile").await;
    assert!(profile["profile_image"].is_null());
}

#[tokio::test]
async fn nickname_must_be_unique() {
    let Some(app) = spawn_app().await else { return };
    let (first, _) = app.register_and_login(&[]).await;
    let (second, _) = app.register_and_login(&[]).await;

    let taken = app.get_json(&first, "/api/profile").await["username"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .patch_json(&second, "/api/profile/nickname", json!({ "username": taken }))
        .await;
    assert_eq!(response.status().as_u16(), 409);

    let fresh = common::unique("nick");
    let response = app
        .patch_json(
            &second,
            "/api/profile/nickname",
            json!({ "username": format!("  {}  ", fresh) }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let profile = app.get_json(&second, "/api/profile").await;
    assert_eq!(profile["username"], fresh);
}

#[tokio::test]
async fn password_change_checks_current_password() {
    let Some(app) = spawn_app().await else { return };
    let (token, _) = app.register_and_login(&[]).await;
    let email = app.get_json(&token, "/api/profile").await["email"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .patch_json(
            &token,
            "/api/profile/password",
            json!({ "current_password": "not-my-password", "new_password": "brandnew123" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 401);

    let response = app
        .patch_json(
            &token,
            "/api/profile/password",
            json!({ "current_password": "password123", "new_password": "password123" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);

    let response = app
        .patch_json(
            &token,
            "/api/profile/password",
            json!({ "current_password": "password123", "new_password": "brandnew123" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    assert!(app.login(&email, "password123").await.is_none());
    assert!(app.login(&email, "brandnew123").await.is_some());
}
