//! Status and category enums.
//!
//! Wire names are `snake_case`; [`label`](OrderStatus::label) gives the
//! Portuguese text shown to customers and used in WhatsApp messages.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown enum value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Where an order is in its lifecycle.
///
/// ```text
/// Pending -> Confirmed -> Preparing -> Ready -> OutForDelivery -> Delivered
/// Pending|Confirmed|Preparing|Ready|OutForDelivery -> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "delivery.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Confirmed,
        Self::Preparing,
        Self::Ready,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Customer-facing label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::Confirmed => "Confirmado",
            Self::Preparing => "Preparando",
            Self::Ready => "Pronto",
            Self::OutForDelivery => "Saiu para Entrega",
            Self::Delivered => "Entregue",
            Self::Cancelled => "Cancelado",
        }
    }

    /// `true` once the order can no longer move.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the lifecycle table allows moving from `self` to `next`.
    ///
    /// Repeating the current status is not a transition.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (*self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Confirmed, Self::Preparing)
                | (Self::Preparing, Self::Ready)
                | (Self::Ready, Self::OutForDelivery)
                | (Self::OutForDelivery, Self::Delivered)
                | (
                    Self::Pending
                        | Self::Confirmed
                        | Self::Preparing
                        | Self::Ready
                        | Self::OutForDelivery,
                    Self::Cancelled
                )
        )
    }

    /// What happens next, as shown on the tracking page.
    #[must_use]
    pub const fn next_step(&self) -> &'static str {
        match self {
            Self::Pending => "Confirmação do pedido",
            Self::Confirmed => "Início do preparo",
            Self::Preparing => "Pedido pronto para saída",
            Self::Ready => "Saída para entrega",
            Self::OutForDelivery => "Entrega do pedido",
            Self::Delivered => "Pedido finalizado",
            Self::Cancelled => "Pedido cancelado",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("order status", s))
    }
}

/// How the customer pays on delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "delivery.payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    DebitCard,
    CreditCard,
    Pix,
    MealVoucher,
}

impl PaymentMethod {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::DebitCard => "debit_card",
            Self::CreditCard => "credit_card",
            Self::Pix => "pix",
            Self::MealVoucher => "meal_voucher",
        }
    }

    /// Customer-facing label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Dinheiro",
            Self::DebitCard => "Cartão de Débito",
            Self::CreditCard => "Cartão de Crédito",
            Self::Pix => "PIX",
            Self::MealVoucher => "Vale Refeição",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(Self::Cash),
            "debit_card" => Ok(Self::DebitCard),
            "credit_card" => Ok(Self::CreditCard),
            "pix" => Ok(Self::Pix),
            "meal_voucher" => Ok(Self::MealVoucher),
            _ => Err(UnknownVariant::new("payment method", s)),
        }
    }
}

/// Menu section an item is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "delivery.menu_category", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MenuCategory {
    Starters,
    Snacks,
    Pizzas,
    MainCourses,
    Sides,
    Desserts,
    Drinks,
}

impl MenuCategory {
    /// Every category, in menu order.
    pub const ALL: [Self; 7] = [
        Self::Starters,
        Self::Snacks,
        Self::Pizzas,
        Self::MainCourses,
        Self::Sides,
        Self::Desserts,
        Self::Drinks,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Starters => "starters",
            Self::Snacks => "snacks",
            Self::Pizzas => "pizzas",
            Self::MainCourses => "main_courses",
            Self::Sides => "sides",
            Self::Desserts => "desserts",
            Self::Drinks => "drinks",
        }
    }

    /// Section heading on the menu.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Starters => "Entradas",
            Self::Snacks => "Lanches",
            Self::Pizzas => "Pizzas",
            Self::MainCourses => "Pratos Principais",
            Self::Sides => "Acompanhamentos",
            Self::Desserts => "Sobremesas",
            Self::Drinks => "Bebidas",
        }
    }
}

impl fmt::Display for MenuCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MenuCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("menu category", s))
    }
}
