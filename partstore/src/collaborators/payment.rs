use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::CollaboratorError;
use crate::errors::ApiError;
use crate::validation::{Validatable, ValidationError, ValidationErrors, validators};

/// Smallest chargeable amount, in minor currency units
pub const MINIMUM_AMOUNT: i64 = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2
    pub country: String,
}

impl ContactDetails {
    fn check(&self, prefix: &str, errors: &mut ValidationErrors) {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("address_line1", &self.address_line1),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];
        for (field, value) in required {
            errors.check(validators::validate_required(&format!("{prefix}.{field}"), value));
        }
        if !self.email.trim().is_empty() && !self.email.contains('@') {
            errors.add(ValidationError::new(format!("{prefix}.email"), "must be an email address"));
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaymentIntentRequest {
    /// Minor currency units (cents)
    pub amount: i64,
    /// ISO 4217 code, e.g. `usd`
    pub currency: String,
    pub shipping: ContactDetails,
    /// Defaults to the shipping contact
    pub billing: Option<ContactDetails>,
    /// Number of cart lines being paid for
    pub line_count: u32,
}

impl PaymentIntentRequest {
    #[must_use]
    pub fn billing(&self) -> &ContactDetails {
        self.billing.as_ref().unwrap_or(&self.shipping)
    }
}

impl Validatable for PaymentIntentRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.amount < MINIMUM_AMOUNT {
            errors.add(ValidationError::new(
                "amount",
                format!("Must be at least {MINIMUM_AMOUNT} minor units"),
            ));
        }
        let currency = self.currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            errors.add(ValidationError::new("currency", "must be a three-letter ISO currency code"));
        }
        if self.line_count == 0 {
            errors.add(ValidationError::new("line_count", "cart must contain at least one line"));
        }
        self.shipping.check("shipping", &mut errors);
        if let Some(billing) = &self.billing {
            billing.check("billing", &mut errors);
        }
        errors.result()
    }
}

/// Handle the client uses to complete payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaymentIntent {
    pub intent_id: String,
    pub client_secret: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Name used in logs and error messages
    fn name(&self) -> &'static str;

    async fn create_intent(&self, request: &PaymentIntentRequest) -> Result<PaymentIntent, CollaboratorError>;
}

/// Used when no payment client is configured; every request fails with 502
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredPaymentProvider;

#[async_trait]
impl PaymentProvider for UnconfiguredPaymentProvider {
    fn name(&self) -> &'static str {
        "payments"
    }

    async fn create_intent(&self, _request: &PaymentIntentRequest) -> Result<PaymentIntent, CollaboratorError> {
        Err(CollaboratorError::Unavailable("no payment provider is configured".to_string()))
    }
}

/// Validate the request and hand it to the provider
///
/// # Errors
///
/// `ValidationFailed` for a bad request, `ExternalService` when the provider fails.
pub async fn create_payment_intent(
    provider: &dyn PaymentProvider,
    mut request: PaymentIntentRequest,
) -> Result<PaymentIntent, ApiError> {
    request.validate()?;
    request.currency = request.currency.trim().to_ascii_lowercase();

    let intent = provider
        .create_intent(&request)
        .await
        .map_err(|err| ApiError::external(provider.name(), err.to_string()))?;
    info!(
        provider = provider.name(),
        intent_id = %intent.intent_id,
        amount = request.amount,
        "created payment intent"
    );
    Ok(intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactDetails {
        ContactDetails {
            name: "Ada Driver".into(),
            email: "ada@example.com".into(),
            address_line1: "1 Gigafactory Rd".into(),
            city: "Austin".into(),
            postal_code: "78725".into(),
            country: "US".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_request() {
        let request = PaymentIntentRequest {
            amount: 4999,
            currency: "USD".into(),
            shipping: contact(),
            billing: None,
            line_count: 2,
        };
        assert!(request.validate().is_ok());
        assert_eq!(request.billing(), &request.shipping);
    }

    #[test]
    fn test_invalid_request_reports_each_field() {
        let request = PaymentIntentRequest {
            amount: 49,
            currency: "dollars".into(),
            shipping: ContactDetails {
                email: "not-an-email".into(),
                ..contact()
            },
            billing: None,
            line_count: 0,
        };
        let fields: Vec<String> = request
            .validate()
            .unwrap_err()
            .errors()
            .iter()
            .map(|e| e.field.clone())
            .collect();
        assert_eq!(fields, vec!["amount", "currency", "line_count", "shipping.email"]);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_maps_to_external_error() {
        let request = PaymentIntentRequest {
            amount: 100,
            currency: "usd".into(),
            shipping: contact(),
            billing: None,
            line_count: 1,
        };
        let err = create_payment_intent(&UnconfiguredPaymentProvider, request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
    }
}
