//! Shared test data.

use chrono::{FixedOffset, Utc};

use crate::customer::{AddressInput, CustomerProfileInput};
use crate::ledger::compute_totals;
use crate::menu::MenuItemDraft;
use crate::notify::WhatsAppNotifier;
use crate::order::{CustomerSnapshot, LineItem, NewOrder};
use crate::types::{CustomerId, MenuCategory, MenuItemId, Money, PaymentMethod};

pub fn profile_input() -> CustomerProfileInput {
    CustomerProfileInput {
        name: "Maria Souza".to_string(),
        email: "Maria@Example.com".to_string(),
        phone: "(31) 98765-4321".to_string(),
        address: AddressInput {
            street: "Rua dos Timbiras".to_string(),
            number: "455".to_string(),
            complement: Some("Apto 301".to_string()),
            neighborhood: "Funcionários".to_string(),
            city: "Belo Horizonte".to_string(),
            postal_code: "30140060".to_string(),
            reference: None,
        },
        notes: None,
    }
}

pub fn menu_draft(name: &str, cents: i64, category: MenuCategory) -> MenuItemDraft {
    MenuItemDraft {
        name: name.to_string(),
        description: format!("{name} da casa"),
        price: Money::from_cents(cents),
        category,
        image_url: None,
        available: true,
        prep_minutes: 20,
        ingredients: Vec::new(),
        notes: None,
    }
}

pub fn notifier() -> WhatsAppNotifier {
    WhatsAppNotifier::new(
        "31 3333-4444",
        "Casa da Pizza",
        None,
        FixedOffset::west_opt(3 * 3600).unwrap(),
    )
}

fn line(id: i32, name: &str, cents: i64, quantity: u32) -> LineItem {
    let unit_price = Money::from_cents(cents);
    LineItem {
        menu_item_id: MenuItemId::new(id),
        name: name.to_string(),
        unit_price,
        quantity,
        note: None,
        subtotal: unit_price * quantity,
    }
}

/// X-Burger 35.90 x1 and Refrigerante 8.99 x2, delivery 5.00, no discount.
pub fn new_order() -> NewOrder {
    let profile = profile_input().validate().unwrap();
    let items = vec![line(1, "X-Burger", 3590, 1), line(2, "Refrigerante", 899, 2)];
    let delivery_fee = Money::from_cents(500);
    let totals = compute_totals(&items, delivery_fee, Money::ZERO).unwrap();

    NewOrder {
        customer: CustomerSnapshot {
            customer_id: CustomerId::new(1),
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            address: profile.address,
        },
        items,
        delivery_fee,
        discount: Money::ZERO,
        totals,
        payment_method: PaymentMethod::Pix,
        note: None,
        estimated_minutes: 45,
        placed_at: Utc::now(),
    }
}
