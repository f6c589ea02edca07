pub mod app;
pub mod orders;
