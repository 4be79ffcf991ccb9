//! The bundled reqwest transport against a local mock gateway

mod common;

use common::*;
use saferpay::{Action, Config, Error, PayInit, SaferpayClient, TracingLogger};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONFIRM_XML: &str = r#"<IDP MSGTYPE="PayConfirm" ID="WxWrIlA48W06rAjKKOp5bzS80E5A" AMOUNT="1250" CURRENCY="CHF" ACCOUNTID="99867-94913159"/>"#;

fn client_for(server: &MockServer) -> SaferpayClient {
    init_tracing();
    let config = Config {
        base_url: format!("{}/hosting", server.uri()),
        timeout_seconds: 5,
        ..Config::default()
    };
    let transport = saferpay::ReqwestTransport::new(&config).unwrap();
    SaferpayClient::builder(config)
        .transport(transport)
        .logger(TracingLogger)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_lifecycle_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hosting/CreatePayInit.asp"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("AMOUNT=1250"))
        .and(body_string_contains("ACCOUNTID=99867-94913159"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("https://www.saferpay.com/vt2/Pay.aspx?DATA=abc"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/hosting/VerifyPayConfirm.asp"))
        .and(body_string_contains("SIGNATURE=7b2bb163"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK:ID=WxWrIlA48W06rAjKKOp5bzS80E5A"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/hosting/PayCompleteV2.asp"))
        .and(body_string_contains("spPassword=XAjc3Kna"))
        .and(body_string_contains("ACTION=Settlement"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"OK:<IDP RESULT="0" ID="WxWrIlA48W06rAjKKOp5bzS80E5A"/>"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let init = PayInit::new()
        .account_id(TEST_ACCOUNT)
        .amount("1250")
        .currency("CHF")
        .description("Order 42");
    let redirect = client.create_pay_init(&init).await.unwrap();
    assert_eq!(redirect, "https://www.saferpay.com/vt2/Pay.aspx?DATA=abc");

    let confirm = client
        .verify_pay_confirm(CONFIRM_XML, "7b2bb163f4ef86d969d992b4e2d61ad48d3b9022")
        .await
        .unwrap();
    assert_eq!(confirm.id(), Some("WxWrIlA48W06rAjKKOp5bzS80E5A"));
    assert_eq!(confirm.currency(), Some("CHF"));

    let response = client
        .pay_complete(&confirm, Action::Settlement, None)
        .await
        .unwrap();
    assert_eq!(response.result(), Some("0"));
}

#[tokio::test]
async fn test_http_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .create_pay_init(&PayInit::new().amount("100"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport { status_code: 503 }));
}

#[tokio::test]
async fn test_gateway_error_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hosting/VerifyPayConfirm.asp"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ERROR: invalid signature"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .verify_pay_confirm(CONFIRM_XML, "forged")
        .await
        .unwrap_err();

    match err {
        Error::Gateway { body } => assert_eq!(body, "ERROR: invalid signature"),
        other => panic!("expected gateway error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_gateway_is_a_connection_error() {
    init_tracing();
    let config = Config {
        base_url: "http://127.0.0.1:1/hosting".to_string(),
        timeout_seconds: 2,
        ..Config::default()
    };
    let client = SaferpayClient::new(config).unwrap();

    let err = client
        .create_pay_init(&PayInit::new().amount("100"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Connection(_)));
    assert!(err.is_retryable());
}
