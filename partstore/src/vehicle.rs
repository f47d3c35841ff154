//! Vehicle models a part can fit, and the comma-joined encoding stored on products.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleModel {
    #[serde(rename = "MODEL_3")]
    Model3,
    ModelY,
    ModelS,
    ModelX,
    Cybertruck,
}

impl VehicleModel {
    pub const ALL: [Self; 5] = [
        Self::Model3,
        Self::ModelY,
        Self::ModelS,
        Self::ModelX,
        Self::Cybertruck,
    ];

    /// Stable code used in storage and on the wire
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Model3 => "MODEL_3",
            Self::ModelY => "MODEL_Y",
            Self::ModelS => "MODEL_S",
            Self::ModelX => "MODEL_X",
            Self::Cybertruck => "CYBERTRUCK",
        }
    }

    /// Marketing name, used in generated descriptions
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Model3 => "Model 3",
            Self::ModelY => "Model Y",
            Self::ModelS => "Model S",
            Self::ModelX => "Model X",
            Self::Cybertruck => "Cybertruck",
        }
    }
}

impl fmt::Display for VehicleModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVehicleModel(pub String);

impl fmt::Display for UnknownVehicleModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown vehicle model '{}'", self.0)
    }
}

impl std::error::Error for UnknownVehicleModel {}

/// Accepts `MODEL_Y`, `Model Y`, `model-y` and similar spellings.
impl FromStr for VehicleModel {
    type Err = UnknownVehicleModel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        Self::ALL
            .into_iter()
            .find(|model| model.code() == normalized)
            .ok_or_else(|| UnknownVehicleModel(raw.trim().to_string()))
    }
}

/// Set of compatible models, kept in enumeration order without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibleModels(Vec<VehicleModel>);

impl CompatibleModels {
    #[must_use]
    pub fn single(model: VehicleModel) -> Self {
        Self(vec![model])
    }

    #[must_use]
    pub fn models(&self) -> &[VehicleModel] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Comma-joined codes, the storage encoding
    #[must_use]
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|model| model.code())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<VehicleModel> for CompatibleModels {
    fn from_iter<I: IntoIterator<Item = VehicleModel>>(iter: I) -> Self {
        let mut models: Vec<VehicleModel> = iter.into_iter().collect();
        models.sort();
        models.dedup();
        Self(models)
    }
}

/// Parses the comma-joined encoding; blank entries are skipped.
impl FromStr for CompatibleModels {
    type Err = UnknownVehicleModel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse::<VehicleModel>)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spellings() {
        assert_eq!("MODEL_Y".parse(), Ok(VehicleModel::ModelY));
        assert_eq!("Model Y".parse(), Ok(VehicleModel::ModelY));
        assert_eq!(" model-3 ".parse(), Ok(VehicleModel::Model3));
        assert_eq!("cybertruck".parse(), Ok(VehicleModel::Cybertruck));
        assert!("Roadster".parse::<VehicleModel>().is_err());
    }

    #[test]
    fn test_compatible_models_encoding_is_canonical() {
        let models: CompatibleModels = "Model Y, MODEL_3,model y".parse().unwrap();
        assert_eq!(models.encode(), "MODEL_3,MODEL_Y");
        assert_eq!(models.models().len(), 2);
    }

    #[test]
    fn test_compatible_models_reject_unknown_entries() {
        let err = "MODEL_3,Semi".parse::<CompatibleModels>().unwrap_err();
        assert_eq!(err.to_string(), "unknown vehicle model 'Semi'");
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&VehicleModel::Model3).unwrap();
        assert_eq!(json, "\"MODEL_3\"");
        let parsed: VehicleModel = serde_json::from_str("\"MODEL_X\"").unwrap();
        assert_eq!(parsed, VehicleModel::ModelX);
    }
}
