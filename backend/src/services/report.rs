//! Report service: composter reports and CSV export

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::{ComposterService, NormService, ReadingService};
use shared::report::{generate_report, Report};

/// Column headers of the violations export
pub const VIOLATION_CSV_HEADERS: [&str; 6] =
    ["date", "recorded_by", "parameter", "value", "threshold", "direction"];

/// Report service
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
}

impl ReportService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Report over every reading of a composter visible to the caller
    pub async fn composter_report(&self, user: &AuthUser, composter_id: Uuid) -> AppResult<Report> {
        let composter = ComposterService::new(self.db.clone())
            .get_visible(user, composter_id)
            .await?;

        let readings = ReadingService::new(self.db.clone())
            .list_for_composter(composter_id, None)
            .await?;
        let norm = NormService::new(self.db.clone())
            .find_for_composter(composter_id)
            .await?;

        let report = generate_report(&composter.name, &readings, norm.as_ref());

        tracing::debug!(
            composter_id = %composter_id,
            total_records = report.total_records,
            violations = report.violations.len(),
            "Report generated"
        );

        Ok(report)
    }

    /// Export rows to CSV; the header line is written even without rows
    pub fn export_to_csv<T: Serialize>(headers: &[&str], data: &[T]) -> AppResult<String> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(vec![]);

        wtr.write_record(headers)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }

        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;

        Ok(csv_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use shared::models::{Norm, Reading};

    fn norm() -> Norm {
        Norm {
            id: Uuid::new_v4(),
            composter_id: Uuid::new_v4(),
            temperature_max: Some(Decimal::from(65)),
            humidity_max: None,
            compost_mass_max: None,
            oxygenation_min: Some(Decimal::from(12)),
            wood_chips_added_max: None,
            odor_level_max: Some("Moyen".to_string()),
            updated_at: Utc::now(),
        }
    }

    fn reading(temperature: i64, oxygenation: i64, odor: &str) -> Reading {
        Reading {
            id: Uuid::new_v4(),
            composter_id: Uuid::new_v4(),
            recorded_at: Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap(),
            recorded_by: None,
            temperature: Some(Decimal::from(temperature)),
            humidity: None,
            odor_level: Some(odor.to_string()),
            compost_mass: None,
            oxygenation: Some(Decimal::from(oxygenation)),
            dry_matter: false,
            wood_chips_added: None,
        }
    }

    #[test]
    fn test_violation_csv_has_one_row_per_exceeded_parameter() {
        let norm = norm();
        let report = generate_report("C-01", &[reading(70, 8, "Fort"), reading(50, 15, "Faible")], Some(&norm));
        let csv = ReportService::export_to_csv(&VIOLATION_CSV_HEADERS, &report.violation_rows()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "date,recorded_by,parameter,value,threshold,direction");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "2024-05-02 09:30,Inconnu,Température,70,65,>");
        assert_eq!(lines[2], "2024-05-02 09:30,Inconnu,Niveau d'odeur,Fort,Moyen,>");
        assert_eq!(lines[3], "2024-05-02 09:30,Inconnu,Oxygène,8,12,<");
    }

    #[test]
    fn test_empty_export_keeps_header() {
        let report = generate_report("C-01", &[], None);
        let csv = ReportService::export_to_csv(&VIOLATION_CSV_HEADERS, &report.violation_rows()).unwrap();

        assert_eq!(csv, "date,recorded_by,parameter,value,threshold,direction\n");
    }
}
