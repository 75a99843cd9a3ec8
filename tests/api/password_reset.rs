use crate::helpers::{error_kind, TestApp};

fn forgot_body(test_app: &TestApp) -> serde_json::Value {
    serde_json::json!({"email": &test_app.test_merchant.email})
}

fn reset_body(token: &str, new_password: &str) -> serde_json::Value {
    serde_json::json!({"token": token, "new_password": new_password})
}

#[tokio::test]
async fn a_reset_request_for_an_unknown_email_returns_202_without_sending() -> Result<(), anyhow::Error>
{
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(0).await;

    let response = test_app
        .post_forgot_password(&serde_json::json!({"email": "nobody@example.com"}))
        .await?;

    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

    Ok(())
}

#[tokio::test]
async fn the_reset_link_replaces_the_password() -> Result<(), anyhow::Error> {
    // 준비
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(2).await;
    test_app.register_and_verify().await?;

    // 실행 - 1단계 - 재설정 메일을 요청한다.
    let response = test_app.post_forgot_password(&forgot_body(&test_app)).await?;
    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);
    let token = test_app.last_email_token().await;

    // 실행 - 2단계 - 새 비밀번호를 설정한다.
    let response = test_app
        .post_reset_password(&reset_body(&token, "N3wPassword"))
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

    // 확인 - 이전 비밀번호로는 로그인할 수 없다.
    let response = test_app.post_login(&test_app.login_body()).await?;
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    // 확인 - 새 비밀번호로 로그인한다.
    let response = test_app
        .post_login(&serde_json::json!({
            "email": &test_app.test_merchant.email,
            "password": "N3wPassword",
        }))
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn a_second_reset_request_invalidates_the_first_link() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(3).await;
    test_app.register_and_verify().await?;

    test_app.post_forgot_password(&forgot_body(&test_app)).await?;
    let first_token = test_app.last_email_token().await;
    test_app.post_forgot_password(&forgot_body(&test_app)).await?;
    let second_token = test_app.last_email_token().await;

    let response = test_app
        .post_reset_password(&reset_body(&first_token, "N3wPassword"))
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(error_kind(response).await?, "token_not_found");

    let response = test_app
        .post_reset_password(&reset_body(&second_token, "N3wPassword"))
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

    Ok(())
}

#[tokio::test]
async fn a_reset_link_works_only_once() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(2).await;
    test_app.register_and_verify().await?;
    test_app.post_forgot_password(&forgot_body(&test_app)).await?;
    let token = test_app.last_email_token().await;

    let first = test_app
        .post_reset_password(&reset_body(&token, "N3wPassword"))
        .await?;
    let second = test_app
        .post_reset_password(&reset_body(&token, "Oth3rPassword"))
        .await?;

    assert_eq!(first.status(), reqwest::StatusCode::NO_CONTENT);
    assert_eq!(second.status(), reqwest::StatusCode::CONFLICT);
    assert_eq!(error_kind(second).await?, "token_already_used");

    Ok(())
}

#[tokio::test]
async fn a_weak_new_password_is_rejected_without_burning_the_link() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(2).await;
    test_app.register_and_verify().await?;
    test_app.post_forgot_password(&forgot_body(&test_app)).await?;
    let token = test_app.last_email_token().await;

    let response = test_app
        .post_reset_password(&reset_body(&token, "weak"))
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(response).await?, "weak_credential");

    let response = test_app
        .post_reset_password(&reset_body(&token, "N3wPassword"))
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

    Ok(())
}

#[tokio::test]
async fn a_verification_link_cannot_reset_a_password() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    test_app.post_register(&test_app.register_body()).await?;
    let verification_token = test_app.last_email_token().await;

    let response = test_app
        .post_reset_password(&reset_body(&verification_token, "N3wPassword"))
        .await?;

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn an_expired_reset_link_returns_410() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app_with(|settings| {
        settings.authentication.password_reset_ttl_seconds = 0;
    })
    .await?;
    test_app.mount_email_ok(2).await;
    test_app.register_and_verify().await?;
    test_app.post_forgot_password(&forgot_body(&test_app)).await?;
    let token = test_app.last_email_token().await;

    let response = test_app
        .post_reset_password(&reset_body(&token, "N3wPassword"))
        .await?;

    assert_eq!(response.status(), reqwest::StatusCode::GONE);
    assert_eq!(error_kind(response).await?, "token_expired");

    Ok(())
}
