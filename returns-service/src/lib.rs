pub mod config;
pub mod form;
pub mod handlers;
pub mod models;
pub mod notices;
pub mod services;
pub mod startup;
pub mod utils;

use secrecy::Secret;
use services::mailer::Mailer;
use services::store::{OrderStore, ProductStore};
use std::sync::Arc;

/// Shared application state: the store seams, the outbound mailer, and the
/// bits of configuration the handlers need.
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<dyn OrderStore>,
    pub products: Arc<dyn ProductStore>,
    pub mailer: Arc<dyn Mailer>,
    pub admin_email: String,
    pub nonce_secret: Secret<String>,
}

impl AppState {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        products: Arc<dyn ProductStore>,
        mailer: Arc<dyn Mailer>,
        admin_email: String,
        nonce_secret: Secret<String>,
    ) -> Self {
        Self {
            orders,
            products,
            mailer,
            admin_email,
            nonce_secret,
        }
    }
}
