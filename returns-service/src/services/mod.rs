pub mod mailer;
pub mod store;

pub use mailer::{EmailMessage, Mailer, MailerError, MockMailer, SmtpMailer};
pub use store::{InMemoryStore, OrderStore, ProductStore, StoreError};
