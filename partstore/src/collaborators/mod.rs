//! Contracts for the third-party services the storefront talks to.
//!
//! The core only sees these traits; concrete SDK clients live outside the
//! crate and are handed to the router through `AppState`.

pub mod payment;
pub mod shipping;

use std::fmt;

pub use payment::{
    ContactDetails, PaymentIntent, PaymentIntentRequest, PaymentProvider, UnconfiguredPaymentProvider,
    create_payment_intent,
};
pub use shipping::{
    LoggingShipmentListener, ShipmentListener, ShippingEvent, ShippingEventType, ShippingWebhook,
    handle_shipping_webhook,
};

/// Failure reported by a collaborator; surfaced to clients as `502`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// No client is configured for this service
    Unavailable(String),
    /// The service refused the request
    Rejected(String),
    /// The service could not be reached
    Transport(String),
}

impl fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "service unavailable: {message}"),
            Self::Rejected(message) => write!(f, "request rejected: {message}"),
            Self::Transport(message) => write!(f, "transport error: {message}"),
        }
    }
}

impl std::error::Error for CollaboratorError {}
