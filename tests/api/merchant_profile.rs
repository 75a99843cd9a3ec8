use merchant_backoffice::{database::MerchantRepository, domain::AccountStatus};

use crate::helpers::{error_kind, TestApp};

#[tokio::test]
async fn anonymous_requests_are_rejected_with_401() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;

    let get = test_app.get_profile().await?;
    let patch = test_app
        .patch_profile(&serde_json::json!({"name": "Toko Baru"}))
        .await?;

    assert_eq!(get.status(), reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(error_kind(get).await?, "unauthenticated");
    assert_eq!(patch.status(), reqwest::StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn the_logged_in_merchant_reads_its_profile() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    let merchant_id = test_app.log_in_verified_merchant().await?;

    let response = test_app.get_profile().await?;

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["merchant_id"], merchant_id.to_string());
    assert_eq!(body["email"], test_app.test_merchant.email.as_str());
    assert_eq!(body["name"], test_app.test_merchant.name.as_str());
    assert_eq!(body["status"], "active");
    assert!(body.get("password_hash").is_none());

    Ok(())
}

#[tokio::test]
async fn patch_changes_only_the_given_fields() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    test_app.log_in_verified_merchant().await?;

    let response = test_app
        .patch_profile(&serde_json::json!({
            "name": "Toko Makmur Jaya",
            "phone": "+62 812 3456 7890",
        }))
        .await?;

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["name"], "Toko Makmur Jaya");
    assert_eq!(body["phone"], "+62 812 3456 7890");
    assert!(body["address"].is_null());
    assert_eq!(body["email"], test_app.test_merchant.email.as_str());

    // 변경 사항은 저장된다.
    let body: serde_json::Value = test_app.get_profile().await?.json().await?;
    assert_eq!(body["name"], "Toko Makmur Jaya");

    Ok(())
}

#[tokio::test]
async fn identity_fields_cannot_be_patched() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    test_app.log_in_verified_merchant().await?;
    let test_cases = [
        serde_json::json!({"email": "other@example.com"}),
        serde_json::json!({"merchant_id": uuid::Uuid::new_v4()}),
        serde_json::json!({"name": "Toko", "status": "active"}),
    ];

    for body in test_cases {
        let response = test_app.patch_profile(&body).await?;

        assert_eq!(
            response.status(),
            reqwest::StatusCode::UNPROCESSABLE_ENTITY,
            "The API accepted {}",
            body
        );
    }
    let body: serde_json::Value = test_app.get_profile().await?.json().await?;
    assert_eq!(body["email"], test_app.test_merchant.email.as_str());

    Ok(())
}

#[tokio::test]
async fn patch_returns_400_for_invalid_values() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    test_app.log_in_verified_merchant().await?;

    let response = test_app
        .patch_profile(&serde_json::json!({"phone": "call me maybe"}))
        .await?;

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(response).await?, "invalid_input");

    Ok(())
}

#[tokio::test]
async fn a_suspended_merchant_loses_access_to_its_profile() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    let merchant_id = test_app.log_in_verified_merchant().await?;
    test_app
        .repository
        .update_status(merchant_id, AccountStatus::Suspended)
        .await?;

    let response = test_app.get_profile().await?;

    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
    assert_eq!(error_kind(response).await?, "account_not_active");

    Ok(())
}

#[tokio::test]
async fn blank_profile_text_is_rejected_with_400() -> Result<(), anyhow::Error> {
    // 준비
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    test_app.log_in_verified_merchant().await?;
    let test_cases = [
        serde_json::json!({"address": ""}),
        serde_json::json!({"description": "   "}),
    ];

    for body in test_cases {
        // 실행
        let response = test_app.patch_profile(&body).await?;

        // 확인
        assert_eq!(
            response.status(),
            reqwest::StatusCode::BAD_REQUEST,
            "The API did not reject the payload: {}",
            body
        );
        assert_eq!(error_kind(response).await?, "invalid_input");
    }

    let body: serde_json::Value = test_app.get_profile().await?.json().await?;
    assert!(body["address"].is_null());
    assert!(body["description"].is_null());

    Ok(())
}
