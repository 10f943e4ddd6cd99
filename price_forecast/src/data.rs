//! Market observation data for forecasting
//!
//! The observation table is read once and treated as read-only; callers
//! narrow it to one commodity (and optionally one state) before handing the
//! slice to the pipeline.

use crate::error::{ForecastError, Result};
use crate::utils::date_parser;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// One reported modal price for a commodity at a market on a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketObservation {
    #[serde(rename = "Commodity")]
    pub commodity: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Market")]
    pub market: String,
    #[serde(rename = "Arrival_Date", with = "date_parser")]
    pub date: NaiveDate,
    #[serde(rename = "Modal_Price")]
    pub modal_price: f64,
}

impl MarketObservation {
    /// Create a new observation, rejecting prices that are not positive
    pub fn new(
        commodity: impl Into<String>,
        state: impl Into<String>,
        market: impl Into<String>,
        date: NaiveDate,
        modal_price: f64,
    ) -> Result<Self> {
        if !(modal_price.is_finite() && modal_price > 0.0) {
            return Err(ForecastError::DataError(format!(
                "Modal price must be a positive number, got {}",
                modal_price
            )));
        }

        Ok(Self {
            commodity: commodity.into(),
            state: state.into(),
            market: market.into(),
            date,
            modal_price,
        })
    }

    fn has_valid_price(&self) -> bool {
        self.modal_price.is_finite() && self.modal_price > 0.0
    }
}

/// Summary statistics of an observation table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    pub total_records: usize,
    pub commodities: usize,
    pub states: usize,
    pub markets: usize,
    pub avg_modal_price: f64,
    pub max_modal_price: f64,
    pub min_modal_price: f64,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl std::fmt::Display for DataSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Observation Table Summary:")?;
        writeln!(f, "  Records:      {}", self.total_records)?;
        writeln!(f, "  Commodities:  {}", self.commodities)?;
        writeln!(f, "  States:       {}", self.states)?;
        writeln!(f, "  Markets:      {}", self.markets)?;
        writeln!(f, "  Avg price:    {:.2}", self.avg_modal_price)?;
        writeln!(
            f,
            "  Price range:  {:.2} - {:.2}",
            self.min_modal_price, self.max_modal_price
        )?;
        if let Some((start, end)) = self.date_range {
            writeln!(f, "  Dates:        {} to {}", start, end)?;
        }
        Ok(())
    }
}

/// Read-only table of market observations
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    observations: Vec<MarketObservation>,
}

impl ObservationTable {
    /// Load observations from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let table = Self::from_reader(file)?;
        info!(
            "Loaded {} observations from {}",
            table.len(),
            path.as_ref().display()
        );
        Ok(table)
    }

    /// Load observations from any CSV source with a header row
    ///
    /// Rows whose modal price is missing, non-finite or not positive are
    /// skipped; any other malformed row is an error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut observations = Vec::new();
        let mut skipped = 0usize;

        for record in csv_reader.deserialize::<RawObservation>() {
            let raw = record?;
            match raw.into_observation() {
                Some(observation) => observations.push(observation),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!("Skipped {} rows without a usable modal price", skipped);
        }

        Ok(Self { observations })
    }

    /// Build a table from observations already in memory
    pub fn from_observations(observations: Vec<MarketObservation>) -> Self {
        let total = observations.len();
        let observations: Vec<MarketObservation> = observations
            .into_iter()
            .filter(MarketObservation::has_valid_price)
            .collect();
        if observations.len() < total {
            warn!(
                "Dropped {} observations without a usable modal price",
                total - observations.len()
            );
        }
        Self { observations }
    }

    pub fn observations(&self) -> &[MarketObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Observations for one commodity, optionally narrowed to one state
    pub fn filter(&self, commodity: &str, state: Option<&str>) -> Vec<MarketObservation> {
        self.observations
            .iter()
            .filter(|o| o.commodity == commodity)
            .filter(|o| state.map_or(true, |s| o.state == s))
            .cloned()
            .collect()
    }

    /// Distinct commodity names, sorted
    pub fn commodities(&self) -> Vec<String> {
        self.distinct(|o| &o.commodity)
    }

    /// Distinct state names, sorted
    pub fn states(&self) -> Vec<String> {
        self.distinct(|o| &o.state)
    }

    fn distinct<F>(&self, field: F) -> Vec<String>
    where
        F: Fn(&MarketObservation) -> &String,
    {
        self.observations
            .iter()
            .map(field)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Summary statistics over the whole table
    pub fn summary(&self) -> DataSummary {
        let prices: Vec<f64> = self.observations.iter().map(|o| o.modal_price).collect();
        let avg_modal_price = market_math::descriptive::mean(&prices).unwrap_or(0.0);
        let max_modal_price = prices.iter().copied().fold(f64::NAN, f64::max);
        let min_modal_price = prices.iter().copied().fold(f64::NAN, f64::min);

        let markets = self
            .observations
            .iter()
            .map(|o| (&o.state, &o.market))
            .collect::<BTreeSet<_>>()
            .len();

        let date_range = self
            .observations
            .iter()
            .map(|o| o.date)
            .min()
            .zip(self.observations.iter().map(|o| o.date).max());

        DataSummary {
            total_records: self.len(),
            commodities: self.commodities().len(),
            states: self.states().len(),
            markets,
            avg_modal_price,
            max_modal_price: if prices.is_empty() { 0.0 } else { max_modal_price },
            min_modal_price: if prices.is_empty() { 0.0 } else { min_modal_price },
            date_range,
        }
    }
}

/// CSV row as it appears on disk; the price may be blank
#[derive(Debug, Deserialize)]
struct RawObservation {
    #[serde(rename = "Commodity")]
    commodity: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Market")]
    market: String,
    #[serde(rename = "Arrival_Date", with = "date_parser")]
    date: NaiveDate,
    #[serde(rename = "Modal_Price")]
    modal_price: Option<f64>,
}

impl RawObservation {
    fn into_observation(self) -> Option<MarketObservation> {
        let modal_price = self.modal_price?;
        MarketObservation::new(
            self.commodity,
            self.state,
            self.market,
            self.date,
            modal_price,
        )
        .ok()
    }
}
