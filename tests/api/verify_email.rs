use crate::helpers::{error_kind, TestApp};

#[tokio::test]
async fn the_verification_link_activates_the_account() -> Result<(), anyhow::Error> {
    // 준비
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    let response = test_app.post_register(&test_app.register_body()).await?;
    let registered: serde_json::Value = response.json().await?;
    let token = test_app.last_email_token().await;

    // 실행
    let response = test_app.get_verify(&token).await?;

    // 확인
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "active");
    assert_eq!(body["merchant_id"], registered["merchant_id"]);

    let response = test_app.post_login(&test_app.login_body()).await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn a_verification_link_works_only_once() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    test_app.post_register(&test_app.register_body()).await?;
    let token = test_app.last_email_token().await;

    let first = test_app.get_verify(&token).await?;
    let second = test_app.get_verify(&token).await?;

    assert_eq!(first.status(), reqwest::StatusCode::OK);
    assert_eq!(second.status(), reqwest::StatusCode::CONFLICT);
    assert_eq!(error_kind(second).await?, "token_already_used");

    Ok(())
}

#[tokio::test]
async fn an_unknown_token_returns_404() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;

    let response = test_app.get_verify("this-token-was-never-issued").await?;

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(error_kind(response).await?, "token_not_found");

    Ok(())
}

#[tokio::test]
async fn a_request_without_a_token_is_rejected_with_400() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;

    let response = test_app
        .api_client
        .get(test_app.get_uri("auth/verify")?)
        .send()
        .await?;

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn an_expired_token_returns_410() -> Result<(), anyhow::Error> {
    // 발급과 동시에 만료되는 토큰
    let test_app = TestApp::spawn_app_with(|settings| {
        settings.authentication.email_verification_ttl_seconds = 0;
    })
    .await?;
    test_app.mount_email_ok(1).await;
    test_app.post_register(&test_app.register_body()).await?;
    let token = test_app.last_email_token().await;

    let response = test_app.get_verify(&token).await?;

    assert_eq!(response.status(), reqwest::StatusCode::GONE);
    assert_eq!(error_kind(response).await?, "token_expired");
    let response = test_app.post_login(&test_app.login_body()).await?;
    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn resending_invalidates_the_previous_link() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(2).await;
    test_app.post_register(&test_app.register_body()).await?;
    let first_token = test_app.last_email_token().await;

    let response = test_app
        .post_resend_verification(&serde_json::json!({"email": &test_app.test_merchant.email}))
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);
    let second_token = test_app.last_email_token().await;

    let response = test_app.get_verify(&first_token).await?;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    let response = test_app.get_verify(&second_token).await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn resending_to_an_unknown_email_looks_the_same() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(0).await;

    let response = test_app
        .post_resend_verification(&serde_json::json!({"email": "nobody@example.com"}))
        .await?;

    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

    Ok(())
}
