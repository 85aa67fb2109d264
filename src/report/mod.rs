//! Update report: recent-activity counts over the pricing table.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use log::{error, info};

use crate::domain::{BusinessModel, PricingRecord, Product, ValidationStatus};
use crate::error::AppError;
use crate::io::store::PricingStore;

pub mod format;

pub use format::*;

/// Counts shown in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub generated_at: NaiveDateTime,
    pub window_days: i64,
    pub total_rows: usize,
    pub recent: usize,
    pub pending: usize,
    pub by_product: Vec<(Product, usize)>,
    pub by_model: Vec<(BusinessModel, usize)>,
}

/// Count rows dated within the last `window_days` of `now`.
///
/// A row counts when its date, taken at midnight, is strictly after
/// `now - window_days`. A window reaching past the representable calendar
/// counts every row.
pub fn summarize(records: &[PricingRecord], now: NaiveDateTime, window_days: i64) -> ReportSummary {
    let cutoff = Duration::try_days(window_days).and_then(|window| now.checked_sub_signed(window));
    let recent: Vec<&PricingRecord> = records
        .iter()
        .filter(|r| cutoff.is_none_or(|cutoff| r.date.and_time(NaiveTime::MIN) > cutoff))
        .collect();

    let pending = recent
        .iter()
        .filter(|r| r.status == ValidationStatus::Pending)
        .count();

    let by_product = Product::ALL
        .into_iter()
        .map(|p| (p, recent.iter().filter(|r| r.product == p).count()))
        .collect();
    let by_model = BusinessModel::ALL
        .into_iter()
        .map(|m| (m, recent.iter().filter(|r| r.business_model == m).count()))
        .collect();

    ReportSummary {
        generated_at: now,
        window_days,
        total_rows: records.len(),
        recent: recent.len(),
        pending,
        by_product,
        by_model,
    }
}

/// Render the report for the current table contents.
///
/// Never fails: an unreadable table produces an error line in place of the
/// report.
pub fn generate_report(store: &PricingStore, now: DateTime<Local>, window_days: i64) -> String {
    match store.read_all() {
        Ok(records) => format_report(&summarize(&records, now.naive_local(), window_days)),
        Err(err) => {
            error!("Report generation failed: {err}");
            format!("Error generating report: {err}")
        }
    }
}

/// `ROI_Update_Report_YYYYMMDD.txt`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("ROI_Update_Report_{}.txt", date.format("%Y%m%d"))
}

/// Write the dated report file into `dir`, replacing any report from the same day.
pub fn write_report(dir: &Path, date: NaiveDate, report: &str) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::io(format!("Failed to create report dir '{}': {e}", dir.display())))?;
    let path = dir.join(report_file_name(date));
    fs::write(&path, report)
        .map_err(|e| AppError::io(format!("Failed to write report '{}': {e}", path.display())))?;
    info!("Report saved to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(product: Product, date: NaiveDate, status: ValidationStatus) -> PricingRecord {
        PricingRecord {
            date,
            source: "alibaba".to_string(),
            product,
            business_model: BusinessModel::Maquila,
            price_min: Some(250.0),
            price_max: None,
            cost_min: None,
            cost_max: None,
            roi_min: None,
            roi_max: None,
            notes: String::new(),
            status,
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 20)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn window_excludes_boundary_day() {
        let today = now().date();
        let records = vec![
            record(Product::Aceite, today, ValidationStatus::Pending),
            record(Product::Aceite, today - Duration::days(29), ValidationStatus::Pending),
            // Midnight 30 days back is before `now - 30d` at 09:30.
            record(Product::Aceite, today - Duration::days(30), ValidationStatus::Pending),
        ];
        let summary = summarize(&records, now(), 30);
        assert_eq!(summary.recent, 2);
        assert_eq!(summary.total_rows, 3);
    }

    #[test]
    fn oversized_window_counts_every_row() {
        let records = vec![
            record(Product::Aceite, now().date(), ValidationStatus::Pending),
            record(Product::Pulpa, NaiveDate::from_ymd_opt(1900, 1, 1).unwrap(), ValidationStatus::Pending),
        ];
        for window in [1_000_000_000, i64::MAX] {
            let summary = summarize(&records, now(), window);
            assert_eq!(summary.recent, 2, "window {window}");
            assert_eq!(summary.pending, 2);
        }
    }

    #[test]
    fn counts_pending_and_per_product() {
        let today = now().date();
        let old = today - Duration::days(90);
        let records = vec![
            record(Product::Aceite, today, ValidationStatus::Pending),
            record(Product::Aceite, today, ValidationStatus::Validated),
            record(Product::Pulpa, today, ValidationStatus::Pending),
            record(Product::Pulpa, today, ValidationStatus::Pending),
            record(Product::Nutraceutico, today, ValidationStatus::Rejected),
            record(Product::Aceite, old, ValidationStatus::Pending),
            record(Product::Pulpa, old, ValidationStatus::Pending),
            record(Product::Pulpa, old, ValidationStatus::Validated),
        ];

        let summary = summarize(&records, now(), 30);
        assert_eq!(summary.recent, 5);
        assert_eq!(summary.pending, 3);
        assert_eq!(
            summary.by_product,
            vec![(Product::Aceite, 2), (Product::Nutraceutico, 1), (Product::Pulpa, 2)]
        );
        assert_eq!(summary.by_model[0], (BusinessModel::Maquila, 5));
    }

    #[test]
    fn unreadable_table_yields_error_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = PricingStore::new(dir.path().join("missing.csv"));
        let report = generate_report(&store, Local::now(), 30);
        assert!(report.starts_with("Error generating report:"));
    }

    #[test]
    fn report_file_is_dated() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 10, 8).unwrap();
        let path = write_report(dir.path(), date, "body").unwrap();
        assert!(path.ends_with("ROI_Update_Report_20251008.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "body");
    }
}
