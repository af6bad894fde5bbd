//! WhatsApp deep links for order notifications.
//!
//! Nothing is sent from the server. Each notification is a pre-filled
//! `api.whatsapp.com` link that the store or the customer opens by hand.

use std::fmt::Write as _;

use chrono::FixedOffset;
use serde::Serialize;

use crate::order::Order;
use crate::types::{Money, OrderStatus};

const WHATSAPP_SEND_URL: &str = "https://api.whatsapp.com/send";

/// A message and the link that opens it in WhatsApp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Digits of the phone the link opens a chat with.
    pub recipient: String,
    pub message: String,
    pub url: String,
}

/// Builds order notifications for one store.
#[derive(Debug, Clone)]
pub struct WhatsAppNotifier {
    store_phone: String,
    store_name: String,
    tracking_base_url: Option<String>,
    utc_offset: FixedOffset,
}

impl WhatsAppNotifier {
    /// `store_phone` may contain formatting; only its digits are kept.
    #[must_use]
    pub fn new(
        store_phone: &str,
        store_name: impl Into<String>,
        tracking_base_url: Option<String>,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            store_phone: store_phone.chars().filter(char::is_ascii_digit).collect(),
            store_name: store_name.into(),
            tracking_base_url: tracking_base_url.map(|url| url.trim_end_matches('/').to_owned()),
            utc_offset,
        }
    }

    #[must_use]
    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    #[must_use]
    pub fn store_phone(&self) -> &str {
        &self.store_phone
    }

    /// The new-order summary, addressed to the store.
    #[must_use]
    pub fn order_placed(&self, order: &Order) -> Notification {
        let message = self.order_summary(order);
        Notification {
            url: link(&self.store_phone, &message),
            recipient: self.store_phone.clone(),
            message,
        }
    }

    /// A status update for the order's current status, addressed to the customer.
    #[must_use]
    pub fn status_changed(&self, order: &Order) -> Notification {
        let message = self.status_message(order);
        let recipient = order.customer.phone.whatsapp_number();
        Notification {
            url: link(&recipient, &message),
            recipient,
            message,
        }
    }

    fn tracking_url(&self, order: &Order) -> String {
        let path = order.tracking_path();
        match &self.tracking_base_url {
            Some(base) => format!("{base}{path}"),
            None => path,
        }
    }

    fn order_summary(&self, order: &Order) -> String {
        let customer = &order.customer;
        let address = &customer.address;

        let mut full_address = format!("{}, {}", address.street, address.number);
        if let Some(complement) = &address.complement {
            let _ = write!(full_address, ", {complement}");
        }
        let _ = write!(
            full_address,
            " - {}, {} - CEP: {}",
            address.neighborhood, address.city, address.postal_code
        );

        let mut msg = format!("🍕 *NOVO PEDIDO - #{}*\n\n", order.number);
        let _ = writeln!(msg, "👤 *Cliente:* {}", customer.name);
        let _ = writeln!(msg, "📱 *Telefone:* {}", customer.phone);
        let _ = write!(msg, "📍 *Endereço:* {full_address}\n\n");

        if let Some(reference) = &address.reference {
            let _ = write!(msg, "🏷️ *Ponto de Referência:* {reference}\n\n");
        }

        msg.push_str("🛒 *Itens do Pedido:*\n");
        for (index, item) in order.items.iter().enumerate() {
            let _ = writeln!(
                msg,
                "{}. {} - Qtd: {} - {}",
                index + 1,
                item.name,
                item.quantity,
                item.subtotal.display_brl()
            );
            if let Some(note) = &item.note {
                let _ = writeln!(msg, "   👉 _{note}_");
            }
        }

        let _ = write!(msg, "\n💰 *Subtotal:* {}", order.subtotal.display_brl());
        if order.delivery_fee > Money::ZERO {
            let _ = write!(msg, "\n🚚 *Taxa de Entrega:* {}", order.delivery_fee.display_brl());
        }
        if order.discount > Money::ZERO {
            let _ = write!(msg, "\n🎁 *Desconto:* -{}", order.discount.display_brl());
        }
        let _ = write!(msg, "\n💵 *TOTAL:* {}", order.total.display_brl());
        let _ = write!(msg, "\n\n💳 *Forma de Pagamento:* {}", order.payment_method.label());

        if let Some(note) = &order.note {
            let _ = write!(msg, "\n\n📝 *Observações:* {note}");
        }

        let placed_at = order
            .placed_at
            .with_timezone(&self.utc_offset)
            .format("%d/%m/%Y %H:%M:%S");
        let _ = write!(msg, "\n\n⏰ *Pedido realizado em:* {placed_at}");
        let _ = write!(msg, "\n⏱️ *Tempo estimado:* {} minutos", order.estimated_minutes);
        msg
    }

    fn status_message(&self, order: &Order) -> String {
        let name = &order.customer.name;
        let number = order.number;
        match order.status {
            OrderStatus::Confirmed => format!(
                "✅ Olá {name}! Seu pedido #{number} foi CONFIRMADO e já está sendo preparado!\n\n\
                 🕒 Tempo estimado: 25-35 minutos\n💰 Total: {}\n\n📱 Acompanhe em: {}",
                order.total.display_brl(),
                self.tracking_url(order)
            ),
            OrderStatus::Preparing => format!(
                "👨‍🍳 {name}, seu pedido #{number} está sendo PREPARADO com muito carinho!\n\n\
                 🕒 Tempo estimado: 15-25 minutos\n📱 Acompanhe: {}",
                self.tracking_url(order)
            ),
            OrderStatus::OutForDelivery => {
                let address = &order.customer.address;
                format!(
                    "🚚 {name}, seu pedido #{number} SAIU PARA ENTREGA!\n\n\
                     🕒 Chegará em aproximadamente 10-15 minutos\n📍 Endereço: {}, {}\n📱 Acompanhe: {}",
                    address.street,
                    address.number,
                    self.tracking_url(order)
                )
            }
            OrderStatus::Delivered => format!(
                "🎉 {name}, seu pedido #{number} foi ENTREGUE!\n\n\
                 ✨ Esperamos que tenha gostado!\n💝 Obrigado pela preferência!"
            ),
            OrderStatus::Cancelled => format!(
                "❌ {name}, infelizmente seu pedido #{number} foi CANCELADO.\n\n\
                 💬 Para mais informações, entre em contato conosco.\n📞 WhatsApp: {}",
                self.store_phone
            ),
            status @ (OrderStatus::Pending | OrderStatus::Ready) => format!(
                "📱 {name}, seu pedido #{number} foi atualizado para: {}",
                status.label()
            ),
        }
    }
}

/// `https://api.whatsapp.com/send?phone=<digits>&text=<encoded message>`.
#[must_use]
pub fn link(phone: &str, message: &str) -> String {
    format!(
        "{WHATSAPP_SEND_URL}?phone={phone}&text={}",
        urlencoding::encode(message)
    )
}
