//! In-app notification models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::norm::ViolationDetail;

/// A message shown in a user's notification bell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub composter_id: Option<Uuid>,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Build the alert message for a reading that broke its norm
pub fn violation_message(composter_name: &str, details: &[ViolationDetail]) -> String {
    let parts: Vec<String> = details
        .iter()
        .map(|d| format!("{} : {} {} {}", d.param, d.value, d.direction.symbol(), d.norm))
        .collect();

    format!("Composteur {} hors norme : {}", composter_name, parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, OdorLevel, Parameter, ParameterValue};
    use rust_decimal::Decimal;

    #[test]
    fn test_violation_message_lists_details() {
        let details = vec![
            ViolationDetail {
                param: Parameter::Oxygenation,
                value: ParameterValue::Measure(Decimal::from(8)),
                norm: ParameterValue::Measure(Decimal::from(12)),
                direction: Direction::Below,
            },
            ViolationDetail {
                param: Parameter::OdorLevel,
                value: ParameterValue::Level(OdorLevel::Fort),
                norm: ParameterValue::Level(OdorLevel::Moyen),
                direction: Direction::Above,
            },
        ];

        assert_eq!(
            violation_message("C-01", &details),
            "Composteur C-01 hors norme : Oxygène : 8 < 12, Niveau d'odeur : Fort > Moyen"
        );
    }
}
