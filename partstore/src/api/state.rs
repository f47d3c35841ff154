use axum::extract::FromRef;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::collaborators::{LoggingShipmentListener, PaymentProvider, ShipmentListener, UnconfiguredPaymentProvider};
use crate::vehicle::VehicleModel;

/// Shared by every handler; cloned per request
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub payments: Arc<dyn PaymentProvider>,
    pub shipments: Arc<dyn ShipmentListener>,
    /// Applied to imported rows that name no compatible models
    pub default_model: VehicleModel,
}

impl AppState {
    /// State with the default collaborators: payments are unavailable and
    /// shipping events are only logged
    #[must_use]
    pub fn new(db: DatabaseConnection, default_model: VehicleModel) -> Self {
        Self {
            db,
            payments: Arc::new(UnconfiguredPaymentProvider),
            shipments: Arc::new(LoggingShipmentListener),
            default_model,
        }
    }

    #[must_use]
    pub fn with_payments(mut self, payments: Arc<dyn PaymentProvider>) -> Self {
        self.payments = payments;
        self
    }

    #[must_use]
    pub fn with_shipments(mut self, shipments: Arc<dyn ShipmentListener>) -> Self {
        self.shipments = shipments;
        self
    }
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
