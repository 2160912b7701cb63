//! Checkout handoff endpoint. Stateless: the client posts its cart snapshot
//! and gets back the composed message and the WhatsApp deep link.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::checkout as handoff;
use crate::domain::{Cart, CartLine, Money};
use crate::{Result, StoreError};

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub lines: Vec<CartLine>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub link: String,
    pub total: Money,
    pub total_items: u32,
}

pub async fn whatsapp(
    State(s): State<AppState>,
    Json(r): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    if r.lines.is_empty() {
        return Err(StoreError::Invalid("cart is empty".into()));
    }
    let cart = Cart::from_lines(r.lines);
    let message = handoff::compose_message(&cart);
    let link = handoff::whatsapp_link(&s.config.whatsapp_phone, &message);
    Ok(Json(CheckoutResponse {
        link,
        total: cart.total_price(),
        total_items: cart.total_items(),
        message,
    }))
}
