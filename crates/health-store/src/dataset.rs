//! CSV exports of outbreak and vaccination records.
//!
//! Header names are trimmed and missing columns read as empty. Rows are
//! normalized on the way in: title-cased locations, lower-cased severity,
//! lenient dates and counts. A row the reader cannot decode is logged and
//! skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use alert_engine::{
    parse_date, AlertError, Location, OutbreakEvent, RecordSource, Severity, Subscriber,
    VaccinationEvent,
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::coerce;
use crate::error::Result;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OutbreakCsvRow {
    outbreak_id: String,
    disease: String,
    report_date: String,
    state: String,
    district: String,
    cases_reported: String,
    deaths: String,
    severity: String,
    confirmed: String,
    notes: String,
}

impl From<OutbreakCsvRow> for OutbreakEvent {
    fn from(row: OutbreakCsvRow) -> Self {
        OutbreakEvent {
            id: row.outbreak_id,
            disease: row.disease,
            report_date: parse_date(&row.report_date),
            location: Location::new(&row.state, &row.district),
            cases_reported: coerce::count_u32(&row.cases_reported),
            deaths: coerce::count_u32(&row.deaths),
            severity: Severity::parse(&row.severity),
            confirmed: coerce::flag(&row.confirmed),
            notes: row.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VaccinationCsvRow {
    campaign_id: String,
    state: String,
    district: String,
    start_date: String,
    end_date: String,
    vaccine_name: String,
    target_population: String,
    doses_allocated: String,
    doses_administered: String,
    partner_org: String,
}

impl From<VaccinationCsvRow> for VaccinationEvent {
    fn from(row: VaccinationCsvRow) -> Self {
        VaccinationEvent {
            id: row.campaign_id,
            location: Location::new(&row.state, &row.district),
            start_date: parse_date(&row.start_date),
            end_date: parse_date(&row.end_date),
            vaccine_name: row.vaccine_name,
            target_population: row.target_population,
            doses_allocated: coerce::count(&row.doses_allocated),
            doses_administered: coerce::count(&row.doses_administered),
            partner_org: row.partner_org,
        }
    }
}

fn read_rows<R, T, E>(reader: R, kind: &'static str) -> Result<Vec<E>>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
    E: From<T>,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    // Fail early on an unreadable header row.
    reader.headers()?;

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<T>().enumerate() {
        match row {
            Ok(row) => records.push(E::from(row)),
            Err(e) => warn!(kind, row = index + 1, error = %e, "Skipping unreadable CSV row"),
        }
    }
    Ok(records)
}

/// Read outbreak reports from CSV text.
pub fn read_outbreaks<R: Read>(reader: R) -> Result<Vec<OutbreakEvent>> {
    read_rows::<R, OutbreakCsvRow, OutbreakEvent>(reader, "outbreak")
}

/// Read vaccination campaigns from CSV text.
pub fn read_vaccinations<R: Read>(reader: R) -> Result<Vec<VaccinationEvent>> {
    read_rows::<R, VaccinationCsvRow, VaccinationEvent>(reader, "vaccination")
}

/// Records loaded from CSV exports.
///
/// Exports carry no subscriber data, so subscriber lookups return nothing.
#[derive(Debug, Clone, Default)]
pub struct CsvDataset {
    pub outbreaks: Vec<OutbreakEvent>,
    pub vaccinations: Vec<VaccinationEvent>,
}

impl CsvDataset {
    /// Load from export files. Either file may be omitted.
    pub fn load(outbreaks: Option<&Path>, vaccinations: Option<&Path>) -> Result<Self> {
        let mut dataset = Self::default();
        if let Some(path) = outbreaks {
            dataset.outbreaks = read_outbreaks(File::open(path).map_err(csv::Error::from)?)?;
        }
        if let Some(path) = vaccinations {
            dataset.vaccinations = read_vaccinations(File::open(path).map_err(csv::Error::from)?)?;
        }
        info!(
            outbreaks = dataset.outbreaks.len(),
            vaccinations = dataset.vaccinations.len(),
            "Loaded CSV dataset"
        );
        Ok(dataset)
    }

    pub fn from_readers<O: Read, V: Read>(outbreaks: O, vaccinations: V) -> Result<Self> {
        Ok(Self {
            outbreaks: read_outbreaks(outbreaks)?,
            vaccinations: read_vaccinations(vaccinations)?,
        })
    }
}

#[async_trait]
impl RecordSource for CsvDataset {
    async fn list_outbreaks(&self) -> std::result::Result<Vec<OutbreakEvent>, AlertError> {
        Ok(self.outbreaks.clone())
    }

    async fn list_vaccinations(&self) -> std::result::Result<Vec<VaccinationEvent>, AlertError> {
        Ok(self.vaccinations.clone())
    }

    async fn list_subscribers(
        &self,
        _location: &Location,
    ) -> std::result::Result<Vec<Subscriber>, AlertError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const OUTBREAKS: &str = "\
outbreak_id, disease ,report_date,country,state,district,cases_reported,deaths,severity,confirmed,source_url,notes
OUT001,Dengue,2024-01-15,India, delhi ,new  delhi,45,2, Moderate ,true,,Monsoon related
OUT002,Cholera,15/01/2024,India,Delhi,,n/a,,HIGH,no,,
OUT003,Flu,not a date,India,Delhi,North Delhi,12.0,0,low,1,,
";

    const VACCINATIONS: &str = "\
campaign_id,state,district,start_date,end_date,vaccine_name,target_population,doses_allocated
VAC001,Delhi,New Delhi,01/10/2024,12/31/2024,COVID-19 Booster,Adults 18+,10000
";

    #[test]
    fn test_read_outbreaks_normalizes_rows() {
        let outbreaks = read_outbreaks(OUTBREAKS.as_bytes()).unwrap();
        assert_eq!(outbreaks.len(), 3);

        let dengue = &outbreaks[0];
        assert_eq!(dengue.disease, "Dengue");
        assert_eq!(dengue.location, Location::new("Delhi", "New Delhi"));
        assert_eq!(dengue.location.district, "New Delhi");
        assert_eq!(dengue.report_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(dengue.cases_reported, 45);
        assert_eq!(dengue.severity, Severity::Moderate);
        assert!(dengue.confirmed);

        let cholera = &outbreaks[1];
        assert_eq!(cholera.report_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(cholera.cases_reported, 0);
        assert_eq!(cholera.severity, Severity::High);
        assert!(!cholera.location.has_district());
        assert!(!cholera.confirmed);

        let flu = &outbreaks[2];
        assert_eq!(flu.report_date, None);
        assert_eq!(flu.cases_reported, 12);
    }

    #[test]
    fn test_missing_columns_read_as_empty() {
        let campaigns = read_vaccinations(VACCINATIONS.as_bytes()).unwrap();
        assert_eq!(campaigns.len(), 1);

        let booster = &campaigns[0];
        assert_eq!(booster.start_date, NaiveDate::from_ymd_opt(2024, 1, 10));
        assert_eq!(booster.end_date, NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(booster.doses_allocated, 10000);
        assert_eq!(booster.doses_administered, 0);
        assert_eq!(booster.partner_org, "");
    }

    #[tokio::test]
    async fn test_dataset_as_record_source() {
        let dataset =
            CsvDataset::from_readers(OUTBREAKS.as_bytes(), VACCINATIONS.as_bytes()).unwrap();

        assert_eq!(dataset.list_outbreaks().await.unwrap().len(), 3);
        assert_eq!(dataset.list_vaccinations().await.unwrap().len(), 1);
        let subscribers = dataset
            .list_subscribers(&Location::state_wide("Delhi"))
            .await
            .unwrap();
        assert!(subscribers.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let result = CsvDataset::load(Some(Path::new("/nonexistent/outbreaks.csv")), None);
        assert!(result.is_err());
    }
}
