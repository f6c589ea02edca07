use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Item-meta key the decision record is stored under.
pub const RETURN_EXCHANGE_META_KEY: &str = "_return_exchange";

/// What the customer asked for. Anything other than the two wire values is
/// rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Return,
    Exchange,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Return => "return",
            ActionType::Exchange => "exchange",
        }
    }

    /// Capitalized form used in the notification email.
    pub fn capitalized(&self) -> &'static str {
        match self {
            ActionType::Return => "Return",
            ActionType::Exchange => "Exchange",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "return" => Ok(ActionType::Return),
            "exchange" => Ok(ActionType::Exchange),
            _ => Err(()),
        }
    }
}

/// The JSON blob written onto a line item when a request is accepted.
/// Resubmitting overwrites the previous record; no history is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub product_name: String,
    pub quantity: u32,
    /// Product image URL, empty when the product has none.
    pub product_image: String,
    pub action: ActionType,
    pub reason: String,
}
