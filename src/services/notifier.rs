//! Outbound message handoff for new reservations.
//!
//! No delivery is performed or tracked; the only product is a ready-to-open
//! WhatsApp URL the visitor uses to contact the administrator.

use crate::db::{Store, setting_keys};
use crate::models::Customer;
use async_trait::async_trait;
use thiserror::Error;

const DEFAULT_TEMPLATE: &str = "Nueva reserva: {customer_name} - {ticket_number}";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("admin WhatsApp number is not configured")]
    MissingRecipient,

    #[error("failed to load notification settings: {0}")]
    Settings(String),
}

/// Turns a committed reservation into a handoff target. Injectable so tests
/// can exercise the post-commit failure path.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn reservation_created(
        &self,
        customer: &Customer,
        ticket_number: &str,
        raffle_title: &str,
    ) -> Result<String, NotifyError>;
}

pub struct WhatsAppNotifier {
    store: Store,
}

impl WhatsAppNotifier {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Notifier for WhatsAppNotifier {
    async fn reservation_created(
        &self,
        customer: &Customer,
        ticket_number: &str,
        raffle_title: &str,
    ) -> Result<String, NotifyError> {
        let template = self
            .store
            .get_setting(setting_keys::WHATSAPP_TEMPLATE)
            .await
            .map_err(|e| NotifyError::Settings(e.to_string()))?
            .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());

        let country_code = self
            .store
            .get_setting(setting_keys::COUNTRY_CODE)
            .await
            .map_err(|e| NotifyError::Settings(e.to_string()))?
            .unwrap_or_default();

        let admin_number = self
            .store
            .get_setting(setting_keys::ADMIN_WHATSAPP)
            .await
            .map_err(|e| NotifyError::Settings(e.to_string()))?
            .filter(|n| !n.is_empty())
            .ok_or(NotifyError::MissingRecipient)?;

        let message = render_template(&template, customer, ticket_number, raffle_title);
        Ok(build_whatsapp_url(
            &format!("{country_code}{admin_number}"),
            &message,
        ))
    }
}

fn render_template(
    template: &str,
    customer: &Customer,
    ticket_number: &str,
    raffle_title: &str,
) -> String {
    template
        .replace("{customer_name}", &customer.name)
        .replace("{customer_phone}", &customer.phone)
        .replace("{ticket_number}", ticket_number)
        .replace("{raffle_title}", raffle_title)
}

fn build_whatsapp_url(number: &str, message: &str) -> String {
    format!(
        "https://api.whatsapp.com/send?phone={number}&text={}",
        urlencoding::encode(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> Customer {
        Customer {
            name: "Ana".to_string(),
            phone: "5551234567".to_string(),
            email: None,
        }
    }

    #[test]
    fn renders_all_placeholders() {
        let message = render_template(
            "{customer_name} ({customer_phone}) quiere el boleto {ticket_number} de {raffle_title}",
            &customer(),
            "0007",
            "Gran Rifa",
        );
        assert_eq!(message, "Ana (5551234567) quiere el boleto 0007 de Gran Rifa");
    }

    #[test]
    fn default_template_mentions_name_and_number() {
        let message = render_template(DEFAULT_TEMPLATE, &customer(), "0007", "Gran Rifa");
        assert_eq!(message, "Nueva reserva: Ana - 0007");
    }

    #[test]
    fn url_is_percent_encoded() {
        let url = build_whatsapp_url("521234567890", "hola mundo & más");
        assert_eq!(
            url,
            "https://api.whatsapp.com/send?phone=521234567890&text=hola%20mundo%20%26%20m%C3%A1s"
        );
    }
}
