//! Customer-facing email rendering.
//!
//! Templates are embedded so the renderer works without a template
//! directory; money values are pre-formatted to two decimals before they
//! reach tera, which has no decimal-aware formatting of its own.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use stocky_core::catalog::StorePolicy;
use stocky_core::domain::order::{OrderStatus, OrderSummary};

const CONFIRMATION_TEMPLATE: &str = include_str!("templates/confirmation.txt");
const PARTIAL_TEMPLATE: &str = include_str!("templates/partial.txt");
const UNAVAILABLE_TEMPLATE: &str = include_str!("templates/unavailable.txt");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    Confirmation,
    Partial,
    Unavailable,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
    pub kind: EmailKind,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("email template could not be registered: {0}")]
    Template(#[source] tera::Error),
    #[error("email rendering failed: {0}")]
    Render(#[source] tera::Error),
}

pub struct EmailRenderer {
    templates: Tera,
}

#[derive(Serialize)]
struct LineView {
    quantity: u32,
    product_name: String,
    subtotal: String,
}

impl EmailRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut templates = Tera::default();
        templates
            .add_raw_template("confirmation.txt", CONFIRMATION_TEMPLATE)
            .map_err(RenderError::Template)?;
        templates
            .add_raw_template("partial.txt", PARTIAL_TEMPLATE)
            .map_err(RenderError::Template)?;
        templates
            .add_raw_template("unavailable.txt", UNAVAILABLE_TEMPLATE)
            .map_err(RenderError::Template)?;
        Ok(Self { templates })
    }

    /// Renders the order-status email for an evaluated order. The template
    /// is chosen by the order's availability status.
    pub fn order_email(
        &self,
        order: &OrderSummary,
        policy: &StorePolicy,
        customer_name: Option<&str>,
        order_reference: &str,
    ) -> Result<EmailMessage, RenderError> {
        let (template, kind, subject) = match order.status {
            OrderStatus::Available => (
                "confirmation.txt",
                EmailKind::Confirmation,
                format!("Order Confirmation {order_reference} - All Items Available!"),
            ),
            OrderStatus::Partial => (
                "partial.txt",
                EmailKind::Partial,
                format!("Order {order_reference} - Some Items Available"),
            ),
            OrderStatus::Unavailable => (
                "unavailable.txt",
                EmailKind::Unavailable,
                format!("Order {order_reference} - Items Currently Unavailable"),
            ),
        };

        let mut context = Context::new();
        context.insert("customer_name", customer_name.unwrap_or("Valued Customer"));
        context.insert("order_reference", order_reference);
        context.insert("date", &Utc::now().format("%d/%m/%Y").to_string());
        context.insert(
            "lines",
            &order
                .lines
                .iter()
                .map(|line| LineView {
                    quantity: line.quantity,
                    product_name: line.product_name.clone(),
                    subtotal: money(line.subtotal),
                })
                .collect::<Vec<_>>(),
        );
        context.insert("unavailable_items", &order.unavailable_items);
        context.insert("subtotal", &money(order.subtotal));
        context.insert("tax", &money(order.tax));
        context.insert("tax_pct", &percent(policy.tax_rate));
        context.insert("shipping", &money(order.shipping));
        context.insert("free_shipping", &(order.shipping == Decimal::ZERO));
        context.insert("total", &money(order.total));
        context.insert("store_name", &policy.name);
        context.insert("store_location", &policy.location);
        context.insert("store_phone", &policy.phone);

        let body = self
            .templates
            .render(template, &context)
            .map_err(RenderError::Render)?
            .trim()
            .to_owned();

        Ok(EmailMessage { subject, body, kind })
    }

    /// Canned one-line answers for common store questions. Falls back to a
    /// general contact message when no keyword matches.
    pub fn quick_response(&self, message: &str, policy: &StorePolicy) -> String {
        let lowered = message.to_lowercase();

        if lowered.contains("hours") || lowered.contains("open") {
            return "Our store is open Monday-Saturday 9:00-18:00, Sunday 12:00-17:00. \
                    Online orders are processed 24/7!"
                .to_owned();
        }
        if lowered.contains("shipping") || lowered.contains("delivery") {
            return format!(
                "We offer free shipping on orders over €{}! Standard shipping is €{} \
                 and takes 1-3 business days.",
                money(policy.free_shipping_threshold),
                money(policy.shipping_cost),
            );
        }
        if lowered.contains("return") || lowered.contains("exchange") {
            return "Items can be returned within 14 days of purchase in original \
                    packaging. Store credit or exchanges are always possible!"
                .to_owned();
        }
        if lowered.contains("age") || lowered.contains("suitable") {
            return "All our toys include age recommendations. Feel free to ask about \
                    specific products - we're happy to help you choose age-appropriate toys!"
                .to_owned();
        }

        format!(
            "Thank you for contacting {}! For specific product questions, orders, or \
             store information, please call us at {} or visit our store in {}.",
            policy.name, policy.phone, policy.location,
        )
    }
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn percent(rate: Decimal) -> String {
    (rate * Decimal::ONE_HUNDRED).round_dp(0).to_string()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use stocky_core::catalog::StorePolicy;
    use stocky_core::domain::order::{OrderLine, OrderStatus, OrderSummary};
    use stocky_core::domain::product::ProductId;

    use super::{EmailKind, EmailRenderer};

    fn policy() -> StorePolicy {
        StorePolicy {
            name: "Toy Corner".to_owned(),
            location: "Amsterdam".to_owned(),
            phone: "+31 20 555 0199".to_owned(),
            email: "orders@toycorner.example".to_owned(),
            currency: "EUR".to_owned(),
            tax_rate: dec!(0.21),
            shipping_cost: dec!(4.95),
            free_shipping_threshold: dec!(50),
        }
    }

    fn summary(status: OrderStatus) -> OrderSummary {
        OrderSummary {
            lines: vec![OrderLine {
                product_id: ProductId("monopoly-classic".to_owned()),
                product_name: "Monopoly Classic".to_owned(),
                quantity: 2,
                unit_price: dec!(24.99),
                subtotal: dec!(49.98),
            }],
            subtotal: dec!(49.98),
            tax: dec!(10.4958),
            shipping: dec!(4.95),
            total: dec!(65.4258),
            status,
            unavailable_items: vec!["Barbie Dreamhouse: 2 available, 5 requested".to_owned()],
        }
    }

    #[test]
    fn confirmation_email_lists_items_and_totals() {
        let renderer = EmailRenderer::new().expect("renderer");
        let email = renderer
            .order_email(&summary(OrderStatus::Available), &policy(), None, "ORD-123")
            .expect("render");

        assert_eq!(email.kind, EmailKind::Confirmation);
        assert!(email.subject.contains("ORD-123"));
        assert!(email.body.contains("Dear Valued Customer"));
        assert!(email.body.contains("2x Monopoly Classic - €49.98"));
        assert!(email.body.contains("Tax (21%): €10.50"));
        assert!(email.body.contains("TOTAL: €65.43"));
        assert!(email.body.contains("CONFIRM ORDER"));
    }

    #[test]
    fn partial_email_includes_both_item_groups() {
        let renderer = EmailRenderer::new().expect("renderer");
        let email = renderer
            .order_email(
                &summary(OrderStatus::Partial),
                &policy(),
                Some("Robin"),
                "ORD-456",
            )
            .expect("render");

        assert_eq!(email.kind, EmailKind::Partial);
        assert!(email.body.contains("Dear Robin"));
        assert!(email.body.contains("Monopoly Classic"));
        assert!(email.body.contains("Barbie Dreamhouse: 2 available, 5 requested"));
        assert!(email.body.contains("CONFIRM PARTIAL"));
    }

    #[test]
    fn unavailable_email_offers_alternatives() {
        let renderer = EmailRenderer::new().expect("renderer");
        let email = renderer
            .order_email(&summary(OrderStatus::Unavailable), &policy(), None, "ORD-789")
            .expect("render");

        assert_eq!(email.kind, EmailKind::Unavailable);
        assert!(email.body.contains("ITEMS UNAVAILABLE"));
        assert!(email.body.contains("ALTERNATIVES"));
    }

    #[test]
    fn free_shipping_is_called_out() {
        let renderer = EmailRenderer::new().expect("renderer");
        let mut order = summary(OrderStatus::Available);
        order.shipping = dec!(0);

        let email = renderer.order_email(&order, &policy(), None, "ORD-1").expect("render");
        assert!(email.body.contains("Free shipping!"));
    }

    #[test]
    fn quick_responses_match_on_keywords() {
        let renderer = EmailRenderer::new().expect("renderer");
        let policy = policy();

        assert!(renderer.quick_response("what are your opening hours?", &policy).contains("9:00"));
        assert!(renderer.quick_response("how much is shipping?", &policy).contains("€4.95"));
        assert!(renderer.quick_response("can I return this?", &policy).contains("14 days"));
        assert!(renderer
            .quick_response("is this suitable for a toddler?", &policy)
            .contains("age recommendations"));
        assert!(renderer.quick_response("hello there", &policy).contains("Toy Corner"));
    }
}
