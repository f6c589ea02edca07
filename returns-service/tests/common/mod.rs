use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use returns_service::form::submission::RETURN_EXCHANGE_ACTION;
use returns_service::models::order::{LineItem, Order, OrderStatus, Product};
use returns_service::services::mailer::MockMailer;
use returns_service::services::store::InMemoryStore;
use returns_service::startup::build_router;
use returns_service::utils::nonce;
use returns_service::AppState;
use secrecy::Secret;
use std::collections::HashMap;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const CUSTOMER_EMAIL: &str = "customer@example.com";
pub const COMPLETED_ORDER_KEY: &str = "wc_order_abc123";
pub const PENDING_ORDER_KEY: &str = "wc_order_pending";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub mailer: Arc<MockMailer>,
    pub nonce_secret: Secret<String>,
}

impl TestApp {
    pub fn build() -> Self {
        let store = Arc::new(InMemoryStore::new());
        seed(&store);

        let mailer = Arc::new(MockMailer::new());
        let nonce_secret = Secret::new("test-nonce-secret".to_string());

        let state = AppState::new(
            store.clone(),
            store.clone(),
            mailer.clone(),
            ADMIN_EMAIL.to_string(),
            nonce_secret.clone(),
        );

        TestApp {
            router: build_router(state),
            store,
            mailer,
            nonce_secret,
        }
    }

    pub fn valid_nonce(&self) -> String {
        nonce::issue(&self.nonce_secret, RETURN_EXCHANGE_ACTION, nonce::now_ts())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, body_string(response).await)
    }

    pub async fn get_with_cookie(&self, uri: &str, cookie: &str) -> (StatusCode, String) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        (status, body_string(response).await)
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> Response<Body> {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(
                        header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    )
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn seed(store: &InMemoryStore) {
    store.insert_order(Order {
        id: 1,
        order_key: COMPLETED_ORDER_KEY.to_string(),
        status: OrderStatus::Completed,
        billing_email: CUSTOMER_EMAIL.to_string(),
        items: vec![
            item(11, 101, "Linen Shirt", 2),
            item(12, 102, "Wool Socks", 1),
            item(13, 103, "Denim Jacket", 3),
        ],
    });
    store.insert_order(Order {
        id: 2,
        order_key: PENDING_ORDER_KEY.to_string(),
        status: OrderStatus::Processing,
        billing_email: CUSTOMER_EMAIL.to_string(),
        items: vec![item(21, 102, "Wool Socks", 2)],
    });

    store.insert_product(Product {
        id: 101,
        name: "Linen Shirt".to_string(),
        image_url: Some("https://cdn.example.com/linen-shirt.jpg".to_string()),
    });
    store.insert_product(Product {
        id: 102,
        name: "Wool Socks".to_string(),
        image_url: None,
    });
    store.insert_product(Product {
        id: 103,
        name: "Denim Jacket".to_string(),
        image_url: Some("https://cdn.example.com/denim-jacket.jpg".to_string()),
    });
}

fn item(id: u64, product_id: u64, name: &str, quantity: u32) -> LineItem {
    LineItem {
        id,
        product_id,
        name: name.to_string(),
        quantity,
        meta: HashMap::new(),
    }
}
