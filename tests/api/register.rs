use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

use crate::helpers::{error_kind, TestApp};

#[tokio::test]
async fn register_returns_201_and_sends_a_verification_email() -> Result<(), anyhow::Error> {
    // 준비
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;

    // 실행
    let response = test_app.post_register(&test_app.register_body()).await?;

    // 확인
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "unverified");
    assert_eq!(body["verification_email_sent"], true);
    assert!(body["merchant_id"].is_string());

    // 메일 API 호출 횟수는 `MockServer`가 drop될 때 확인한다.
    Ok(())
}

#[tokio::test]
async fn the_verification_email_is_sent_to_the_normalized_address() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    let body = serde_json::json!({
        "email": "  Shop.Owner@Example.COM ",
        "password": "Secr3t!",
        "name": "Toko Makmur",
    });

    test_app.post_register(&body).await?;

    let requests = test_app.email_server.received_requests().await.unwrap();
    let email: serde_json::Value = serde_json::from_slice(&requests[0].body)?;
    assert_eq!(email["To"], "shop.owner@example.com");

    Ok(())
}

#[tokio::test]
async fn registering_the_same_email_twice_returns_409() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    test_app.post_register(&test_app.register_body()).await?;

    // 대소문자만 다른 이메일도 중복이다.
    let body = serde_json::json!({
        "email": test_app.test_merchant.email.to_uppercase(),
        "password": "An0therPassword",
        "name": "Toko Lain",
    });
    let response = test_app.post_register(&body).await?;

    assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);
    assert_eq!(error_kind(response).await?, "duplicate_email");

    Ok(())
}

#[tokio::test]
async fn register_returns_400_for_invalid_input() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(0).await;
    let test_cases = [
        (
            serde_json::json!({"email": "not-an-email", "password": "Secr3t!", "name": "Toko"}),
            "invalid_input",
            "invalid email",
        ),
        (
            serde_json::json!({"email": "m@x.com", "password": "Secr3t!", "name": "  "}),
            "invalid_input",
            "empty name",
        ),
        (
            serde_json::json!({"email": "m@x.com", "password": "Secr3t!", "name": "Toko", "phone": "call me"}),
            "invalid_input",
            "invalid phone",
        ),
        (
            serde_json::json!({"email": "m@x.com", "password": "short", "name": "Toko"}),
            "weak_credential",
            "short password",
        ),
        (
            serde_json::json!({"email": "m@x.com", "password": "onlyletters", "name": "Toko"}),
            "weak_credential",
            "password without a digit",
        ),
    ];

    for (body, kind, description) in test_cases {
        let response = test_app.post_register(&body).await?;

        assert_eq!(
            response.status(),
            reqwest::StatusCode::BAD_REQUEST,
            "The API did not fail with 400 Bad Request when the payload had an {}.",
            description
        );
        assert_eq!(error_kind(response).await?, kind, "{}", description);
    }

    Ok(())
}

#[tokio::test]
async fn register_returns_422_when_fields_are_missing() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;

    let response = test_app
        .post_register(&serde_json::json!({"email": "m@x.com"}))
        .await?;

    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);

    Ok(())
}

#[tokio::test]
async fn a_mail_failure_keeps_the_registration() -> Result<(), anyhow::Error> {
    // 준비
    let test_app = TestApp::spawn_app().await?;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    // 실행
    let response = test_app.post_register(&test_app.register_body()).await?;

    // 확인
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["verification_email_sent"], false);

    // 같은 이메일로 다시 가입할 수 없다.
    let response = test_app.post_register(&test_app.register_body()).await?;
    assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);

    // 메일 서버가 복구되면 인증 메일을 다시 받을 수 있다.
    test_app.mount_email_ok(1).await;
    let response = test_app
        .post_resend_verification(&serde_json::json!({"email": &test_app.test_merchant.email}))
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);
    let token = test_app.last_email_token().await;
    let response = test_app.get_verify(&token).await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn a_new_account_cannot_log_in_before_verification() -> Result<(), anyhow::Error> {
    let test_app = TestApp::spawn_app().await?;
    test_app.mount_email_ok(1).await;
    test_app.post_register(&test_app.register_body()).await?;

    let response = test_app.post_login(&test_app.login_body()).await?;

    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
    assert_eq!(error_kind(response).await?, "account_not_verified");

    Ok(())
}
