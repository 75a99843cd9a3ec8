use merchant_backoffice::{database::MerchantRepository, domain::AccountStatus};

use crate::helpers::{error_kind, TestApp};

#[tokio::test]
async fn unknown_emails_and_wrong_passwords_get_the_same_401() -> Result<(), anyhow::Error> {
    // 준비
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    test_app.register_and_verify().await?;

    // 실행
    let unknown_email = test_app
        .post_login(&serde_json::json!({
            "email": "nobody@example.com",
            "password": &test_app.test_merchant.password,
        }))
        .await?;
    let wrong_password = test_app
        .post_login(&serde_json::json!({
            "email": &test_app.test_merchant.email,
            "password": "Wr0ngPassword",
        }))
        .await?;

    // 확인
    assert_eq!(unknown_email.status(), reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.status(), reqwest::StatusCode::UNAUTHORIZED);
    let unknown_email: serde_json::Value = unknown_email.json().await?;
    let wrong_password: serde_json::Value = wrong_password.json().await?;
    assert_eq!(unknown_email, wrong_password);
    assert_eq!(unknown_email["error"]["kind"], "invalid_credentials");

    Ok(())
}

#[tokio::test]
async fn login_starts_a_session() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    let merchant_id = test_app.register_and_verify().await?;

    let response = test_app.post_login(&test_app.login_body()).await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["merchant_id"], merchant_id.to_string());

    // 세션 쿠키로 보호된 페이지에 접근한다.
    let response = test_app.get_profile().await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn logout_ends_the_session() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    test_app.log_in_verified_merchant().await?;

    let response = test_app.post_logout().await?;
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

    let response = test_app.get_profile().await?;
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn logout_without_a_session_succeeds() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;

    let response = test_app.post_logout().await?;

    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

    Ok(())
}

#[tokio::test]
async fn a_suspended_merchant_cannot_log_in() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    let merchant_id = test_app.register_and_verify().await?;
    test_app
        .repository
        .update_status(merchant_id, AccountStatus::Suspended)
        .await?;

    let response = test_app.post_login(&test_app.login_body()).await?;

    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
    assert_eq!(error_kind(response).await?, "account_suspended");

    Ok(())
}
