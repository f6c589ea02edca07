use crate::models::decision::ActionType;

/// Which optional form sections are visible for a given selection. Visibility
/// is pure state derived from the last round-trip resubmission; there is no
/// client-side interactivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldSet {
    pub show_exchange_reason: bool,
    pub show_size_list: bool,
    pub show_other_reason: bool,
}

impl FieldSet {
    pub fn for_selection(action: ActionType, reason: &str) -> Self {
        let exchanging = action == ActionType::Exchange;
        FieldSet {
            show_exchange_reason: exchanging,
            show_size_list: exchanging && reason == "size_exchange",
            show_other_reason: exchanging && reason == "other",
        }
    }
}

/// Transient client intent carried by the round-trip resubmission. Defaults
/// to the return action with no reason, matching a first page view.
#[derive(Debug, Clone)]
pub struct FormSelection {
    pub action: ActionType,
    pub reason: String,
}

impl Default for FormSelection {
    fn default() -> Self {
        FormSelection {
            action: ActionType::Return,
            reason: String::new(),
        }
    }
}

impl FormSelection {
    /// Unknown action values fall back to the default; the renderer only
    /// distinguishes the exchange path.
    pub fn from_posted(action: Option<&str>, reason: Option<&str>) -> Self {
        FormSelection {
            action: action
                .and_then(|value| value.parse().ok())
                .unwrap_or(ActionType::Return),
            reason: reason.unwrap_or_default().to_string(),
        }
    }

    pub fn field_set(&self) -> FieldSet {
        FieldSet::for_selection(self.action, &self.reason)
    }
}
