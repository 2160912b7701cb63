//! Checkout handoff: render the cart as a WhatsApp message and build the
//! deep link that opens it pre-filled. There is no payment flow; the
//! merchant takes over from the conversation.

use std::fmt::Write;

use crate::domain::cart::Cart;

pub const WHATSAPP_BASE_URL: &str = "https://wa.me";

const GREETING: &str = "¡Hola! Me interesan estos productos de mi carrito:";
const CLOSING: &str = "¿Están disponibles?";
const PRE_ORDER_ETA_FALLBACK: &str = "consultar";

/// Renders the cart contents in insertion order as the message a customer
/// sends to the shop.
pub fn compose_message(cart: &Cart) -> String {
    let mut message = format!("{GREETING}\n\n");
    for line in cart.lines() {
        let _ = write!(message, "📦 *{}*", line.name);
        if let Some(details) = &line.variant_details {
            let _ = write!(message, " ({details})");
        }
        if line.is_pre_order {
            let eta = line.pre_order_eta.as_deref().unwrap_or(PRE_ORDER_ETA_FALLBACK);
            let _ = write!(message, " (⚠️ Sobre pedido: {eta})");
        }
        let _ = writeln!(message);
        let _ = writeln!(
            message,
            "   Cant: {} | ${} MXN\n",
            line.quantity,
            line.line_total().format_mxn()
        );
    }
    let _ = writeln!(message, "💰 *Total:* ${} MXN\n", cart.total_price().format_mxn());
    message.push_str(CLOSING);
    message
}

/// Builds the deep link that opens WhatsApp with `message` pre-filled.
pub fn whatsapp_link(phone: &str, message: &str) -> String {
    format!("{WHATSAPP_BASE_URL}/{phone}?text={}", urlencoding::encode(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::{CartLine, PRE_ORDER_STOCK_LIMIT};
    use crate::domain::value_objects::Money;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn plain_line(name: &str, price: i64, quantity: u32) -> CartLine {
        CartLine {
            product_id: Uuid::new_v4(),
            variant_id: None,
            name: name.into(),
            unit_price: Money::new(Decimal::new(price, 0)),
            image_url: None,
            quantity,
            stock_limit: 10,
            is_pre_order: false,
            pre_order_eta: None,
            variant_details: None,
        }
    }

    #[test]
    fn message_matches_the_storefront_fixture() {
        let mut cart = Cart::new();
        cart.add(plain_line("Collar Luna", 100, 2));
        cart.add(plain_line("Aretes Sol", 50, 1));

        let expected = "¡Hola! Me interesan estos productos de mi carrito:\n\n\
                        📦 *Collar Luna*\n   Cant: 2 | $200.00 MXN\n\n\
                        📦 *Aretes Sol*\n   Cant: 1 | $50.00 MXN\n\n\
                        💰 *Total:* $250.00 MXN\n\n\
                        ¿Están disponibles?";
        assert_eq!(compose_message(&cart), expected);
    }

    #[test]
    fn message_lists_lines_in_insertion_order_with_grand_total() {
        let mut cart = Cart::new();
        cart.add(plain_line("Primero", 1200, 1));
        cart.add(plain_line("Segundo", 80, 3));

        let message = compose_message(&cart);
        let first = message.find("Primero").unwrap();
        let second = message.find("Segundo").unwrap();
        assert!(first < second);
        assert!(message.contains("$1,200.00 MXN"));
        assert!(message.contains("💰 *Total:* $1,440.00 MXN"));
    }

    #[test]
    fn variant_details_are_annotated() {
        let mut line = plain_line("Vestido Marea", 450, 1);
        line.variant_id = Some(Uuid::new_v4());
        line.variant_details = Some("Rojo - M".into());
        let mut cart = Cart::new();
        cart.add(line);

        assert!(compose_message(&cart).contains("📦 *Vestido Marea* (Rojo - M)\n"));
    }

    #[test]
    fn pre_order_lines_carry_the_eta_or_fallback() {
        let mut with_eta = plain_line("Bolsa Nube", 300, 1);
        with_eta.is_pre_order = true;
        with_eta.stock_limit = PRE_ORDER_STOCK_LIMIT;
        with_eta.pre_order_eta = Some("2-3 semanas".into());

        let mut without_eta = plain_line("Bolsa Sol", 300, 1);
        without_eta.is_pre_order = true;
        without_eta.stock_limit = PRE_ORDER_STOCK_LIMIT;

        let mut cart = Cart::new();
        cart.add(with_eta);
        cart.add(without_eta);

        let message = compose_message(&cart);
        assert!(message.contains("(⚠️ Sobre pedido: 2-3 semanas)"));
        assert!(message.contains("(⚠️ Sobre pedido: consultar)"));
    }

    #[test]
    fn link_embeds_the_encoded_message() {
        let link = whatsapp_link("5219516111552", "¡Hola! ¿Están disponibles?");
        assert!(link.starts_with("https://wa.me/5219516111552?text="));
        assert!(!link.contains(' '));
        assert!(link.contains("%20"));
    }
}
