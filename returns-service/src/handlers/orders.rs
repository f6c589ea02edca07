use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;
use service_core::error::AppError;
use std::collections::HashMap;
use tower_sessions::Session;

use crate::form::fields::{FieldSet, FormSelection};
use crate::form::submission::{
    self, SubmissionContext, SubmissionFields, SubmissionOutcome, EMAIL_SUBJECT,
    RETURN_EXCHANGE_ACTION,
};
use crate::models::decision::{ActionType, RETURN_EXCHANGE_META_KEY};
use crate::models::order::Order;
use crate::notices::{self, Notice};
use crate::services::mailer::EmailMessage;
use crate::services::store::StoreError;
use crate::utils::nonce;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderViewParams {
    pub key: Option<String>,
    pub return_action_success: Option<String>,
}

/// The raw POST payload. All fields are optional because the same URL also
/// receives the onchange round-trip posts from the action/reason selectors.
#[derive(Debug, Default, Deserialize)]
pub struct ReturnExchangeForm {
    pub submit_action: Option<String>,
    #[serde(rename = "return_items[]", default)]
    pub return_items: Vec<String>,
    pub action_type: Option<String>,
    pub exchange_reason: Option<String>,
    pub size_list: Option<String>,
    pub other_reason: Option<String>,
    pub return_exchange_nonce: Option<String>,
}

impl ReturnExchangeForm {
    /// The submission path only engages when the submit marker, at least one
    /// selected item, and the token all arrived with the request.
    fn is_submission(&self) -> bool {
        self.submit_action.is_some()
            && !self.return_items.is_empty()
            && self.return_exchange_nonce.is_some()
    }

    fn fields(&self) -> SubmissionFields {
        SubmissionFields {
            return_items: self.return_items.clone(),
            action_type: self.action_type.clone(),
            exchange_reason: self.exchange_reason.clone(),
            size_list: self.size_list.clone(),
            other_reason: self.other_reason.clone(),
        }
    }

    fn selection(&self) -> FormSelection {
        FormSelection::from_posted(self.action_type.as_deref(), self.exchange_reason.as_deref())
    }
}

#[derive(Template)]
#[template(path = "order_view.html")]
struct OrderViewTemplate {
    order_id: u64,
    status_label: String,
    completed: bool,
    items: Vec<ItemRow>,
    action_is_exchange: bool,
    selected_reason: String,
    fields: FieldSet,
    form_action: String,
    nonce: String,
    success: bool,
    notices: Vec<Notice>,
}

struct ItemRow {
    id: u64,
    name: String,
    quantity: u32,
}

pub async fn order_page(
    State(state): State<AppState>,
    Path(order_id): Path<u64>,
    Query(params): Query<OrderViewParams>,
    session: Session,
) -> Result<Response, AppError> {
    let order = fetch_order(&state, order_id).await?;
    render_order_page(
        &state,
        &session,
        &order,
        FormSelection::default(),
        params.return_action_success.is_some(),
    )
    .await
}

pub async fn order_submit(
    State(state): State<AppState>,
    Path(order_id): Path<u64>,
    Query(params): Query<OrderViewParams>,
    session: Session,
    Form(form): Form<ReturnExchangeForm>,
) -> Result<Response, AppError> {
    if !form.is_submission() {
        // Onchange round-trip: re-render with visibility derived from the
        // posted selection.
        let order = fetch_order(&state, order_id).await?;
        return render_order_page(&state, &session, &order, form.selection(), false).await;
    }

    let nonce_valid = form
        .return_exchange_nonce
        .as_deref()
        .map(|token| {
            nonce::verify(
                &state.nonce_secret,
                RETURN_EXCHANGE_ACTION,
                token,
                nonce::now_ts(),
            )
        })
        .unwrap_or(false);

    // The order is resolved through the secret key, not the path id.
    let order = match params.key.as_deref().filter(|key| !key.is_empty()) {
        Some(key) => match state.orders.order_id_by_key(key).await.map_err(internal)? {
            Some(id) => state.orders.order(id).await.map_err(internal)?,
            None => None,
        },
        None => None,
    };

    let product_images = match &order {
        Some(order) => resolve_product_images(&state, order).await?,
        None => HashMap::new(),
    };

    let fields = form.fields();
    let ctx = SubmissionContext {
        nonce_valid,
        order_key: params.key.as_deref(),
        order: order.as_ref(),
        fields: &fields,
        product_images: &product_images,
    };
    let outcome = submission::evaluate(&ctx);

    match (outcome, order) {
        (SubmissionOutcome::Rejected(reason), _) => {
            tracing::info!(order_id, %reason, "Return/exchange submission rejected");
            notices::push(&session, Notice::error(reason.to_string())).await;
            let page_order = fetch_order(&state, order_id).await?;
            render_order_page(&state, &session, &page_order, form.selection(), false).await
        }
        (
            SubmissionOutcome::Applied {
                decisions,
                skipped,
                email_body,
                ..
            },
            Some(order),
        ) => {
            for decision in &decisions {
                let value = serde_json::to_string(&decision.record)?;
                state
                    .orders
                    .update_item_meta(order.id, decision.item_id, RETURN_EXCHANGE_META_KEY, value)
                    .await
                    .map_err(internal)?;
            }

            for raw_id in &skipped {
                tracing::warn!(order_id = order.id, item_id = %raw_id, "Selected item not found on order");
                notices::push(&session, Notice::error("Invalid item selected.")).await;
            }

            for to in [state.admin_email.as_str(), order.billing_email.as_str()] {
                let email = EmailMessage {
                    to: to.to_string(),
                    subject: EMAIL_SUBJECT.to_string(),
                    body_html: email_body.clone(),
                };
                // Fire-and-forget: a failed send is logged, never surfaced.
                if let Err(e) = state.mailer.send(&email).await {
                    tracing::warn!(to = %to, error = %e, "Failed to send return/exchange notification");
                }
            }

            tracing::info!(
                order_id = order.id,
                accepted = decisions.len(),
                skipped = skipped.len(),
                "Return/exchange request applied"
            );

            let target = format!("{}&return_action_success=1", order.view_url());
            Ok(Redirect::to(&target).into_response())
        }
        (SubmissionOutcome::Applied { .. }, None) => Err(AppError::InternalError(
            anyhow::anyhow!("applied outcome without a resolved order"),
        )),
    }
}

async fn fetch_order(state: &AppState, order_id: u64) -> Result<Order, AppError> {
    state
        .orders
        .order(order_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("order {} not found", order_id)))
}

async fn resolve_product_images(
    state: &AppState,
    order: &Order,
) -> Result<HashMap<u64, String>, AppError> {
    let mut images = HashMap::new();
    for item in &order.items {
        let image = state
            .products
            .product(item.product_id)
            .await
            .map_err(internal)?
            .and_then(|product| product.image_url)
            .unwrap_or_default();
        images.insert(item.product_id, image);
    }
    Ok(images)
}

async fn render_order_page(
    state: &AppState,
    session: &Session,
    order: &Order,
    selection: FormSelection,
    success: bool,
) -> Result<Response, AppError> {
    let template = OrderViewTemplate {
        order_id: order.id,
        status_label: order.status.to_string(),
        completed: order.status.is_completed(),
        items: order
            .items
            .iter()
            .map(|item| ItemRow {
                id: item.id,
                name: item.name.clone(),
                quantity: item.quantity,
            })
            .collect(),
        action_is_exchange: selection.action == ActionType::Exchange,
        selected_reason: selection.reason.clone(),
        fields: selection.field_set(),
        form_action: order.view_url(),
        nonce: nonce::issue(&state.nonce_secret, RETURN_EXCHANGE_ACTION, nonce::now_ts()),
        success,
        notices: notices::take(session).await,
    };

    let html = template
        .render()
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("template render failed: {}", e)))?;
    Ok(Html(html).into_response())
}

fn internal(err: StoreError) -> AppError {
    AppError::InternalError(anyhow::Error::new(err))
}
