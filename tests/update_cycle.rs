use std::path::Path;
use std::sync::Once;

use chrono::{Duration, Local, NaiveDate};
use roi_updater::app::pipeline::run_cycle;
use roi_updater::data::{MarketDataFetcher, StubMarketFetcher};
use roi_updater::domain::{
    BusinessModel, FIELD_PRICE_MIN, FetchedData, PricingRecord, Product, SourceId, UpdaterConfig, ValidationStatus,
};
use roi_updater::io::presentation::{JsonBindingPatcher, PresentationData, publish};
use roi_updater::io::store::PricingStore;
use roi_updater::report::{generate_report, summarize};

fn ensure_test_env() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Quotes one price for every pair.
struct QuoteFetcher(f64);

impl MarketDataFetcher for QuoteFetcher {
    fn fetch(&self, _product: Product, _source: SourceId) -> Option<FetchedData> {
        Some(FetchedData::new("alibaba", Local::now()).with_field(FIELD_PRICE_MIN, self.0))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn row(product: Product, model: BusinessModel, date: NaiveDate, price_min: f64, status: ValidationStatus) -> PricingRecord {
    PricingRecord {
        date,
        source: "alibaba".to_string(),
        product,
        business_model: model,
        price_min: Some(price_min),
        price_max: Some(price_min + 70.0),
        cost_min: None,
        cost_max: None,
        roi_min: None,
        roi_max: None,
        notes: "seed".to_string(),
        status,
    }
}

fn single_pair_config(data_file: &Path) -> UpdaterConfig {
    UpdaterConfig {
        data_file: data_file.to_path_buf(),
        products: vec![Product::Aceite],
        models: vec![BusinessModel::Maquila],
        ..UpdaterConfig::default()
    }
}

fn seeded_store(dir: &Path) -> PricingStore {
    let store = PricingStore::new(dir.join("ROI_Data_Template.csv"));
    store
        .write_all(&[row(
            Product::Aceite,
            BusinessModel::Maquila,
            today(),
            250.0,
            ValidationStatus::Pending,
        )])
        .unwrap();
    store
}

#[test]
fn small_move_is_appended_as_pending() {
    ensure_test_env();
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path());
    let config = single_pair_config(store.path());

    let summary = run_cycle(&config, &QuoteFetcher(260.0), &store, today());

    assert_eq!(summary.written, 1);
    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].price_min, Some(260.0));
    assert_eq!(rows[1].status, ValidationStatus::Pending);
    assert_eq!(rows[1].notes, "Auto-updated from alibaba");

    let text = std::fs::read_to_string(store.path()).unwrap();
    assert!(text.lines().last().unwrap().ends_with(",PENDIENTE"));
}

#[test]
fn large_move_is_rejected_and_not_written() {
    ensure_test_env();
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path());
    let config = single_pair_config(store.path());
    let before = std::fs::read_to_string(store.path()).unwrap();

    let summary = run_cycle(&config, &QuoteFetcher(500.0), &store, today());

    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.written, 0);
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
}

#[test]
fn first_run_without_table_accepts_everything() {
    ensure_test_env();
    let dir = tempfile::tempdir().unwrap();
    let store = PricingStore::new(dir.path().join("ROI_Data_Template.csv"));
    assert!(store.read_all().unwrap_err().is_not_found());

    let config = UpdaterConfig {
        data_file: store.path().to_path_buf(),
        ..UpdaterConfig::default()
    };
    let fetcher = StubMarketFetcher::new(config.sources.clone());

    let summary = run_cycle(&config, &fetcher, &store, today());

    assert_eq!(summary.written, 9);
    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), 9);
    assert!(rows.iter().all(|r| r.source == "alibaba" && r.price_min == Some(250.0)));

    // A second cycle with identical quotes is consistent with the first.
    let again = run_cycle(&config, &fetcher, &store, today());
    assert_eq!(again.written, 9);
    assert_eq!(store.read_all().unwrap().len(), 18);
}

#[test]
fn empty_table_file_is_filled_by_the_cycle() {
    ensure_test_env();
    let dir = tempfile::tempdir().unwrap();
    let store = PricingStore::new(dir.path().join("ROI_Data_Template.csv"));
    std::fs::write(store.path(), "").unwrap();
    let config = UpdaterConfig {
        data_file: store.path().to_path_buf(),
        ..UpdaterConfig::default()
    };
    let fetcher = StubMarketFetcher::new(config.sources.clone());

    let summary = run_cycle(&config, &fetcher, &store, today());

    assert_eq!(summary.written, 9);
    assert_eq!(summary.failed, 0);
    assert_eq!(store.read_all().unwrap().len(), 9);
    let report = generate_report(&store, Local::now(), 30);
    assert!(report.contains("Recent Updates: 9\n"), "{report}");
}

#[test]
fn source_without_handler_writes_nothing() {
    ensure_test_env();
    let dir = tempfile::tempdir().unwrap();
    let store = PricingStore::new(dir.path().join("ROI_Data_Template.csv"));
    let config = UpdaterConfig {
        data_file: store.path().to_path_buf(),
        cycle_source: SourceId::XmEnergy,
        ..UpdaterConfig::default()
    };
    let fetcher = StubMarketFetcher::new(config.sources.clone());

    let summary = run_cycle(&config, &fetcher, &store, today());

    assert_eq!(summary.no_data, 9);
    assert!(store.read_all().unwrap_err().is_not_found());
}

#[test]
fn report_counts_recent_and_pending() {
    ensure_test_env();
    let dir = tempfile::tempdir().unwrap();
    let store = PricingStore::new(dir.path().join("ROI_Data_Template.csv"));
    let t = today();
    let old = t - Duration::days(60);
    store
        .write_all(&[
            row(Product::Aceite, BusinessModel::Maquila, t, 250.0, ValidationStatus::Pending),
            row(Product::Aceite, BusinessModel::Planta, t, 250.0, ValidationStatus::Pending),
            row(Product::Pulpa, BusinessModel::Hibrido, t - Duration::days(3), 40.0, ValidationStatus::Pending),
            row(Product::Pulpa, BusinessModel::Maquila, t - Duration::days(10), 40.0, ValidationStatus::Validated),
            row(Product::Nutraceutico, BusinessModel::Planta, t - Duration::days(20), 90.0, ValidationStatus::Rejected),
            row(Product::Aceite, BusinessModel::Maquila, old, 240.0, ValidationStatus::Pending),
            row(Product::Pulpa, BusinessModel::Maquila, old, 38.0, ValidationStatus::Validated),
            row(Product::Nutraceutico, BusinessModel::Hibrido, old, 88.0, ValidationStatus::Pending),
        ])
        .unwrap();

    let now = Local::now();
    let report = generate_report(&store, now, 30);
    assert!(report.contains("Recent Updates: 5\n"), "{report}");
    assert!(report.contains("Pending Validation: 3\n"), "{report}");
    assert!(report.contains("Aceite: 2 updates"), "{report}");
    assert!(report.contains("Pulpa: 2 updates"), "{report}");
    assert!(report.contains("Nutraceutico: 1 update\n"), "{report}");

    // Unchanged table, same counts.
    let first = summarize(&store.read_all().unwrap(), now.naive_local(), 30);
    let second = summarize(&store.read_all().unwrap(), now.naive_local(), 30);
    assert_eq!(first, second);
    assert_eq!(report, generate_report(&store, now, 30));
}

#[test]
fn publish_binds_only_validated_rows() {
    ensure_test_env();
    let dir = tempfile::tempdir().unwrap();
    let store = PricingStore::new(dir.path().join("ROI_Data_Template.csv"));
    let t = today();
    store
        .write_all(&[
            row(Product::Aceite, BusinessModel::Maquila, t, 250.0, ValidationStatus::Validated),
            row(Product::Aceite, BusinessModel::Planta, t, 260.0, ValidationStatus::Pending),
        ])
        .unwrap();
    let target = dir.path().join("product_data.json");

    let data = publish(&store, &JsonBindingPatcher::new(&target), Local::now()).unwrap();
    assert_eq!(data.entry_count(), 1);

    let written: PresentationData = serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(written.products, data.products);
}
