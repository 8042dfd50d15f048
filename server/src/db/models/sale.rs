//! Sale Model

use super::serde_helpers;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Sale ID type
pub type SaleId = RecordId;

/// Sale modality: over-the-counter or online storefront
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleModality {
    Fisica,
    Virtual,
}

impl SaleModality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fisica => "fisica",
            Self::Virtual => "virtual",
        }
    }
}

impl std::str::FromStr for SaleModality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fisica" => Ok(Self::Fisica),
            "virtual" => Ok(Self::Virtual),
            other => Err(format!("unknown modality: {other}")),
        }
    }
}

/// Sale lifecycle state
///
/// pending → completed | cancelled; terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleState {
    Pendiente,
    Completada,
    Cancelada,
}

impl SaleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::Completada => "completada",
            Self::Cancelada => "cancelada",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pendiente)
    }
}

impl std::str::FromStr for SaleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" => Ok(Self::Pendiente),
            "completada" => Ok(Self::Completada),
            "cancelada" => Ok(Self::Cancelada),
            other => Err(format!("unknown sale state: {other}")),
        }
    }
}

/// One line of a sale
///
/// Name and unit price are captured at checkout and never recomputed,
/// so later product edits do not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Sale model matching the `sale` table, lines embedded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<SaleId>,
    pub modality: SaleModality,
    pub state: SaleState,
    /// Buying customer; absent for over-the-counter sales
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub buyer: Option<RecordId>,
    /// Registering seller; absent for storefront sales
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub seller: Option<RecordId>,
    pub items: Vec<SaleLine>,
    pub total: Decimal,
    pub date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// ID as "sale:id" string, empty when unsaved
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|t| t.to_string()).unwrap_or_default()
    }

    /// Total units across all lines
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serialization() {
        assert_eq!(
            serde_json::to_string(&SaleState::Pendiente).unwrap(),
            "\"pendiente\""
        );
        assert_eq!(
            serde_json::to_string(&SaleModality::Fisica).unwrap(),
            "\"fisica\""
        );
    }

    #[test]
    fn test_state_transitions() {
        assert!(!SaleState::Pendiente.is_terminal());
        assert!(SaleState::Completada.is_terminal());
        assert!(SaleState::Cancelada.is_terminal());
    }

    #[test]
    fn test_parse_from_query_params() {
        assert_eq!(
            "virtual".parse::<SaleModality>().unwrap(),
            SaleModality::Virtual
        );
        assert_eq!(
            "cancelada".parse::<SaleState>().unwrap(),
            SaleState::Cancelada
        );
        assert!("express".parse::<SaleModality>().is_err());
    }
}
