use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use price_forecast::data::ObservationTable;
use price_forecast::ForecastError;
use std::io::Write;
use tempfile::NamedTempFile;

// Helper function to create a small observation table on disk
fn create_sample_data() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();

    writeln!(file, "State,District,Market,Commodity,Variety,Arrival_Date,Min_Price,Max_Price,Modal_Price").unwrap();
    writeln!(file, "Kerala,Ernakulam,Aluva,Banana,Nendra,05/01/2024,3000,3600,3300").unwrap();
    writeln!(file, "Kerala,Ernakulam,Aluva,Banana,Nendra,04/01/2024,2900,3500,3250").unwrap();
    writeln!(file, "Kerala,Kollam,Kollam,Banana,Nendra,2024-01-04,2950,3550,3200").unwrap();
    writeln!(file, "Gujarat,Rajkot,Rajkot,Cotton,Other,04-01-2024,6000,6800,6500").unwrap();
    writeln!(file, "Gujarat,Rajkot,Rajkot,Cotton,Other,05-01-2024,6000,6800,0").unwrap();

    file
}

#[test]
fn test_load_from_csv() {
    let file = create_sample_data();
    let table = ObservationTable::from_csv(file.path()).unwrap();

    assert_eq!(table.len(), 4);
    assert_eq!(table.commodities(), vec!["Banana".to_string(), "Cotton".to_string()]);

    let first = &table.observations()[0];
    assert_eq!(first.market, "Aluva");
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    assert_eq!(first.modal_price, 3300.0);
}

#[test]
fn test_filter_narrows_by_state() {
    let file = create_sample_data();
    let table = ObservationTable::from_csv(file.path()).unwrap();

    let banana = table.filter("Banana", Some("Kerala"));
    assert_eq!(banana.len(), 3);
    assert!(table.filter("Banana", Some("Gujarat")).is_empty());
}

#[test]
fn test_summary_display() {
    let file = create_sample_data();
    let summary = ObservationTable::from_csv(file.path()).unwrap().summary();

    assert_eq!(summary.commodities, 2);
    assert_eq!(summary.states, 2);
    let text = summary.to_string();
    assert!(text.contains("Records:      4"));
    assert!(text.contains("2024-01-04 to 2024-01-05"));
}

#[test]
fn test_bad_date_is_an_error() {
    let csv = "Commodity,State,Market,Arrival_Date,Modal_Price\nRice,Punjab,Khanna,Jan 5,2000\n";
    let err = ObservationTable::from_reader(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, ForecastError::CsvError(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = ObservationTable::from_csv("/nonexistent/prices.csv").unwrap_err();
    assert!(matches!(err, ForecastError::IoError(_)));
}

#[test]
fn test_empty_table_summary() {
    let summary = ObservationTable::default().summary();
    assert_eq!(summary.total_records, 0);
    assert_eq!(summary.avg_modal_price, 0.0);
    assert_eq!(summary.date_range, None);
}
