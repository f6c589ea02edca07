//! The submission pipeline as an explicit, transport-free contract: the
//! handler resolves everything up front into a `SubmissionContext`, and
//! `evaluate` runs the whole validation sequence to a tagged outcome.

use std::collections::HashMap;
use thiserror::Error;

use crate::models::decision::{ActionType, DecisionRecord};
use crate::models::order::Order;

/// Anti-forgery action name the form token is tied to.
pub const RETURN_EXCHANGE_ACTION: &str = "return_exchange_request";

/// Subject line shared by the admin and customer notifications.
pub const EMAIL_SUBJECT: &str = "Return/Exchange Request Received";

/// Why a submission was refused outright. The display text is the notice the
/// customer sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("Security check failed.")]
    SecurityCheckFailed,
    #[error("Invalid order key.")]
    MissingOrderKey,
    #[error("Invalid order.")]
    UnresolvableOrder,
    #[error("Order is not completed.")]
    OrderNotCompleted,
    #[error("No items selected.")]
    NoItemsSelected,
    #[error("Invalid action type.")]
    InvalidActionType,
}

/// Form fields relevant to the submission, after extraction.
#[derive(Debug, Default, Clone)]
pub struct SubmissionFields {
    pub return_items: Vec<String>,
    pub action_type: Option<String>,
    pub exchange_reason: Option<String>,
    pub size_list: Option<String>,
    pub other_reason: Option<String>,
}

/// Everything the validation sequence looks at, resolved up front so the
/// evaluation itself needs no request or store access.
#[derive(Debug)]
pub struct SubmissionContext<'a> {
    pub nonce_valid: bool,
    pub order_key: Option<&'a str>,
    /// The order the key resolved to; `None` when either lookup failed.
    pub order: Option<&'a Order>,
    pub fields: &'a SubmissionFields,
    /// Image URL per product id, empty string when the product has none.
    pub product_images: &'a HashMap<u64, String>,
}

/// One accepted line-item decision, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDecision {
    pub item_id: u64,
    pub record: DecisionRecord,
}

/// Outcome of a submission: refused outright, or applied with the decisions
/// to persist, the item ids that could not be resolved, and the composed
/// notification body.
#[derive(Debug)]
pub enum SubmissionOutcome {
    Rejected(RejectReason),
    Applied {
        order_id: u64,
        decisions: Vec<ItemDecision>,
        skipped: Vec<String>,
        email_body: String,
    },
}

/// Runs the fail-fast validation sequence, then iterates the selected items
/// in submission order, skipping unresolvable ids rather than aborting the
/// batch.
pub fn evaluate(ctx: &SubmissionContext<'_>) -> SubmissionOutcome {
    use SubmissionOutcome::Rejected;

    if !ctx.nonce_valid {
        return Rejected(RejectReason::SecurityCheckFailed);
    }
    if ctx.order_key.map_or(true, str::is_empty) {
        return Rejected(RejectReason::MissingOrderKey);
    }
    let Some(order) = ctx.order else {
        return Rejected(RejectReason::UnresolvableOrder);
    };
    if !order.status.is_completed() {
        return Rejected(RejectReason::OrderNotCompleted);
    }
    if ctx.fields.return_items.is_empty() {
        return Rejected(RejectReason::NoItemsSelected);
    }
    let action = match ctx
        .fields
        .action_type
        .as_deref()
        .and_then(|value| value.parse::<ActionType>().ok())
    {
        Some(action) => action,
        None => return Rejected(RejectReason::InvalidActionType),
    };

    let reason = normalize_reason(
        action,
        ctx.fields.exchange_reason.as_deref(),
        ctx.fields.size_list.as_deref(),
        ctx.fields.other_reason.as_deref(),
    );

    let mut decisions = Vec::new();
    let mut skipped = Vec::new();
    let mut blocks = String::new();

    for raw_id in &ctx.fields.return_items {
        let item = raw_id
            .parse::<u64>()
            .ok()
            .and_then(|item_id| order.item(item_id));
        let Some(item) = item else {
            skipped.push(raw_id.clone());
            continue;
        };

        let product_image = ctx
            .product_images
            .get(&item.product_id)
            .cloned()
            .unwrap_or_default();

        let record = DecisionRecord {
            product_name: item.name.clone(),
            quantity: item.quantity,
            product_image,
            action,
            reason: reason.clone(),
        };

        blocks.push_str(&item_block(&record));
        decisions.push(ItemDecision {
            item_id: item.id,
            record,
        });
    }

    SubmissionOutcome::Applied {
        order_id: order.id,
        decisions,
        skipped,
        email_body: compose_email_body(order.id, &blocks),
    }
}

/// Returns carry no reason. Exchanges fold the size or free-text sub-field
/// into the reason string; unrecognized reason values pass through as-is.
pub fn normalize_reason(
    action: ActionType,
    exchange_reason: Option<&str>,
    size: Option<&str>,
    other: Option<&str>,
) -> String {
    if action != ActionType::Exchange {
        return String::new();
    }
    match exchange_reason.unwrap_or("") {
        "size_exchange" => format!("Size Exchange - {}", size.unwrap_or("")),
        "other" => format!("Other - {}", other.unwrap_or("")),
        raw => raw.to_string(),
    }
}

fn item_block(record: &DecisionRecord) -> String {
    let reason = if record.action == ActionType::Exchange {
        record.reason.as_str()
    } else {
        "N/A"
    };
    format!(
        "Product: {}<br>Quantity: {}<br>Action: {}<br>Reason: {}<br><br>",
        escape_html(&record.product_name),
        record.quantity,
        record.action.capitalized(),
        escape_html(reason),
    )
}

fn compose_email_body(order_id: u64, blocks: &str) -> String {
    format!(
        "A return/exchange request has been submitted for Order #{}.<br><br>{}",
        order_id, blocks
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
