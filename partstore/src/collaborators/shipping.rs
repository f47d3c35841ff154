use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;
use utoipa::ToSchema;

use super::CollaboratorError;
use crate::errors::ApiError;
use crate::validation::{ValidationError, ValidationErrors, validators};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingEventType {
    ItemOrderNotify,
    ItemShipNotify,
    ItemOrderRestore,
}

impl ShippingEventType {
    pub const ALL: [Self; 3] = [Self::ItemOrderNotify, Self::ItemShipNotify, Self::ItemOrderRestore];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ItemOrderNotify => "ITEM_ORDER_NOTIFY",
            Self::ItemShipNotify => "ITEM_SHIP_NOTIFY",
            Self::ItemOrderRestore => "ITEM_ORDER_RESTORE",
        }
    }
}

impl fmt::Display for ShippingEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ShippingEventType {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|event| event.code() == raw)
            .ok_or_else(|| ValidationError::new("event_type", format!("unknown event type '{raw}'")))
    }
}

/// Webhook body as posted by the shipping provider
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ShippingWebhook {
    pub event_type: String,
    /// Where the provider exposes the order or shipment details
    pub resource_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShippingEvent {
    pub event_type: ShippingEventType,
    pub resource_url: String,
}

impl TryFrom<ShippingWebhook> for ShippingEvent {
    type Error = ValidationErrors;

    fn try_from(webhook: ShippingWebhook) -> Result<Self, Self::Error> {
        let mut errors = ValidationErrors::new();
        let event_type = webhook.event_type.parse::<ShippingEventType>().map_err(|e| errors.add(e)).ok();

        let resource_url = webhook.resource_url.trim().to_string();
        errors.check(validators::validate_required("resource_url", &resource_url));
        if !resource_url.is_empty() && !resource_url.starts_with("https://") && !resource_url.starts_with("http://") {
            errors.add(ValidationError::new("resource_url", "must be an http(s) URL"));
        }

        match event_type {
            Some(event_type) if errors.is_empty() => Ok(Self {
                event_type,
                resource_url,
            }),
            _ => Err(errors),
        }
    }
}

#[async_trait]
pub trait ShipmentListener: Send + Sync {
    async fn on_event(&self, event: &ShippingEvent) -> Result<(), CollaboratorError>;
}

/// Default listener; order updates happen outside this service
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingShipmentListener;

#[async_trait]
impl ShipmentListener for LoggingShipmentListener {
    async fn on_event(&self, event: &ShippingEvent) -> Result<(), CollaboratorError> {
        info!(event_type = %event.event_type, resource_url = %event.resource_url, "shipping event received");
        Ok(())
    }
}

/// Validate a webhook and pass it to the listener
///
/// # Errors
///
/// `ValidationFailed` for an unknown event type or a bad URL,
/// `ExternalService` when the listener fails.
pub async fn handle_shipping_webhook(
    listener: &dyn ShipmentListener,
    webhook: ShippingWebhook,
) -> Result<ShippingEvent, ApiError> {
    let event = ShippingEvent::try_from(webhook)?;
    listener
        .on_event(&event)
        .await
        .map_err(|err| ApiError::external("shipping", err.to_string()))?;
    Ok(event)
}
