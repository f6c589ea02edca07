mod common;

use axum::http::{header, StatusCode};
use common::{TestApp, ADMIN_EMAIL, CUSTOMER_EMAIL};
use returns_service::models::decision::{ActionType, DecisionRecord, RETURN_EXCHANGE_META_KEY};

fn submission_body(nonce: &str, items: &[u64], extra: &str) -> String {
    let mut body = String::from("submit_action=1");
    for item in items {
        body.push_str(&format!("&return_items[]={}", item));
    }
    body.push_str(extra);
    body.push_str(&format!("&return_exchange_nonce={}", nonce));
    body
}

fn stored_decision(app: &TestApp, order_id: u64, item_id: u64) -> Option<DecisionRecord> {
    app.store
        .item_meta(order_id, item_id, RETURN_EXCHANGE_META_KEY)
        .map(|raw| serde_json::from_str(&raw).expect("decision meta is valid JSON"))
}

#[tokio::test]
async fn valid_return_writes_selected_items_and_redirects() {
    let app = TestApp::build();
    let body = submission_body(&app.valid_nonce(), &[11, 13], "&action_type=return");

    let response = app.post_form("/orders/1?key=wc_order_abc123", &body).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/orders/1?key=wc_order_abc123&return_action_success=1"
    );

    let shirt = stored_decision(&app, 1, 11).expect("item 11 decided");
    assert_eq!(
        shirt,
        DecisionRecord {
            product_name: "Linen Shirt".to_string(),
            quantity: 2,
            product_image: "https://cdn.example.com/linen-shirt.jpg".to_string(),
            action: ActionType::Return,
            reason: String::new(),
        }
    );

    let jacket = stored_decision(&app, 1, 13).expect("item 13 decided");
    assert_eq!(jacket.action, ActionType::Return);

    // The unselected item is untouched.
    assert!(stored_decision(&app, 1, 12).is_none());
}

#[tokio::test]
async fn notification_goes_identically_to_admin_and_customer() {
    let app = TestApp::build();
    let body = submission_body(&app.valid_nonce(), &[11], "&action_type=return");

    app.post_form("/orders/1?key=wc_order_abc123", &body).await;

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, ADMIN_EMAIL);
    assert_eq!(sent[1].to, CUSTOMER_EMAIL);
    assert_eq!(sent[0].subject, "Return/Exchange Request Received");
    assert_eq!(sent[0].subject, sent[1].subject);
    assert_eq!(sent[0].body_html, sent[1].body_html);

    assert!(sent[0]
        .body_html
        .starts_with("A return/exchange request has been submitted for Order #1."));
    assert!(sent[0].body_html.contains("Product: Linen Shirt<br>"));
    assert!(sent[0].body_html.contains("Quantity: 2<br>"));
    assert!(sent[0].body_html.contains("Action: Return<br>"));
    assert!(sent[0].body_html.contains("Reason: N/A<br>"));
}

#[tokio::test]
async fn size_exchange_stores_the_normalized_reason() {
    let app = TestApp::build();
    let body = submission_body(
        &app.valid_nonce(),
        &[11],
        "&action_type=exchange&exchange_reason=size_exchange&size_list=medium",
    );

    let response = app.post_form("/orders/1?key=wc_order_abc123", &body).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let record = stored_decision(&app, 1, 11).expect("item 11 decided");
    assert_eq!(record.reason, "Size Exchange - medium");
    assert_eq!(record.action, ActionType::Exchange);

    let sent = app.mailer.sent();
    assert!(sent[0].body_html.contains("Reason: Size Exchange - medium<br>"));
}

#[tokio::test]
async fn other_reason_stores_the_free_text() {
    let app = TestApp::build();
    let body = submission_body(
        &app.valid_nonce(),
        &[12],
        "&action_type=exchange&exchange_reason=other&other_reason=wrong+color",
    );

    app.post_form("/orders/1?key=wc_order_abc123", &body).await;

    let record = stored_decision(&app, 1, 12).expect("item 12 decided");
    assert_eq!(record.reason, "Other - wrong color");
    // Product 102 has no image.
    assert_eq!(record.product_image, "");
}

#[tokio::test]
async fn return_ignores_any_submitted_reason_fields() {
    let app = TestApp::build();
    let body = submission_body(
        &app.valid_nonce(),
        &[11],
        "&action_type=return&exchange_reason=size_exchange&size_list=medium&other_reason=ignored",
    );

    app.post_form("/orders/1?key=wc_order_abc123", &body).await;

    let record = stored_decision(&app, 1, 11).expect("item 11 decided");
    assert_eq!(record.reason, "");
}

#[tokio::test]
async fn resubmission_overwrites_the_previous_decision() {
    let app = TestApp::build();

    let first = submission_body(&app.valid_nonce(), &[11], "&action_type=return");
    app.post_form("/orders/1?key=wc_order_abc123", &first).await;
    assert_eq!(
        stored_decision(&app, 1, 11).unwrap().action,
        ActionType::Return
    );

    let second = submission_body(
        &app.valid_nonce(),
        &[11],
        "&action_type=exchange&exchange_reason=defective_product",
    );
    app.post_form("/orders/1?key=wc_order_abc123", &second).await;

    let record = stored_decision(&app, 1, 11).unwrap();
    assert_eq!(record.action, ActionType::Exchange);
    assert_eq!(record.reason, "defective_product");
}

#[tokio::test]
async fn tampered_nonce_is_rejected_without_side_effects() {
    let app = TestApp::build();
    let body = submission_body("not-a-valid-token", &[11], "&action_type=return");

    let response = app.post_form("/orders/1?key=wc_order_abc123", &body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = common::body_string(response).await;
    assert!(page.contains("Security check failed."));

    assert!(stored_decision(&app, 1, 11).is_none());
    assert_eq!(app.mailer.send_count(), 0);
}

#[tokio::test]
async fn missing_order_key_is_rejected() {
    let app = TestApp::build();
    let body = submission_body(&app.valid_nonce(), &[11], "&action_type=return");

    let response = app.post_form("/orders/1", &body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let page = common::body_string(response).await;
    assert!(page.contains("Invalid order key."));
    assert!(stored_decision(&app, 1, 11).is_none());
}

#[tokio::test]
async fn unresolvable_order_key_is_rejected() {
    let app = TestApp::build();
    let body = submission_body(&app.valid_nonce(), &[11], "&action_type=return");

    let response = app.post_form("/orders/1?key=wc_order_bogus", &body).await;

    let page = common::body_string(response).await;
    assert!(page.contains("Invalid order."));
    assert!(stored_decision(&app, 1, 11).is_none());
    assert_eq!(app.mailer.send_count(), 0);
}

#[tokio::test]
async fn non_completed_order_rejects_the_submission() {
    let app = TestApp::build();
    let body = submission_body(&app.valid_nonce(), &[21], "&action_type=return");

    let response = app.post_form("/orders/2?key=wc_order_pending", &body).await;

    let page = common::body_string(response).await;
    assert!(page.contains("Order is not completed."));
    assert!(stored_decision(&app, 2, 21).is_none());
}

#[tokio::test]
async fn invalid_action_type_is_rejected() {
    let app = TestApp::build();
    let body = submission_body(&app.valid_nonce(), &[11], "&action_type=refund");

    let response = app.post_form("/orders/1?key=wc_order_abc123", &body).await;

    let page = common::body_string(response).await;
    assert!(page.contains("Invalid action type."));
    assert!(stored_decision(&app, 1, 11).is_none());
    assert_eq!(app.mailer.send_count(), 0);
}

#[tokio::test]
async fn unknown_item_is_skipped_and_the_rest_applied() {
    let app = TestApp::build();
    let body = submission_body(&app.valid_nonce(), &[11, 99], "&action_type=return");

    let response = app.post_form("/orders/1?key=wc_order_abc123", &body).await;

    // The batch still completes.
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(stored_decision(&app, 1, 11).is_some());
    assert_eq!(app.mailer.send_count(), 2);

    // The skipped item contributed no email block.
    let sent = app.mailer.sent();
    assert_eq!(sent[0].body_html.matches("Product:").count(), 1);

    // The per-item notice survives the redirect for the same session.
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or("").to_string())
        .expect("session cookie set");
    let (_, page) = app
        .get_with_cookie(
            "/orders/1?key=wc_order_abc123&return_action_success=1",
            &cookie,
        )
        .await;
    assert!(page.contains("Invalid item selected."));
    assert!(page.contains("submitted successfully"));
}
