pub mod decision;
pub mod order;

pub use decision::{ActionType, DecisionRecord, RETURN_EXCHANGE_META_KEY};
pub use order::{LineItem, Order, OrderStatus, Product};
