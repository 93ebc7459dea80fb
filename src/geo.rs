use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Centroid {
    pub lat: f64,
    pub lon: f64,
}

/// Hand-placed centroids for countries the globe recentres on.
pub const MANUAL_CENTROIDS: &[(&str, f64, f64)] = &[
    ("United States", 37.0902, -95.7129),
    ("China", 35.8617, 104.1954),
    ("Russia", 61.5240, 105.3188),
    ("Turkey", 38.9637, 35.2433),
    ("Mexico", 23.6345, -102.5528),
    ("Canada", 56.1304, -106.3468),
    ("Brazil", -14.2350, -51.9253),
    ("Australia", -25.2744, 133.7751),
    ("India", 20.5937, 78.9629),
    ("United Kingdom", 55.3781, -3.4360),
    ("France", 46.2276, 2.2137),
    ("Germany", 51.1657, 10.4515),
    ("Japan", 36.2048, 138.2529),
    ("French Guiana", 3.9339, -53.1258),
    ("Palestine", 31.9522, 35.2332),
    ("Western Sahara", 24.2155, -12.8858),
];

/// Territories absent from the upstream CSV, as (code, name).
pub const MISSING_COUNTRIES: &[(&str, &str)] = &[
    ("ESH", "Western Sahara"),
    ("GUF", "French Guiana"),
    ("PSE", "Palestine"),
];

pub fn manual_centroid(name: &str) -> Option<Centroid> {
    MANUAL_CENTROIDS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|&(_, lat, lon)| Centroid { lat, lon })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRecord {
    pub name: String,
    pub code: String,
    pub centroid: Option<Centroid>,
}

impl CountryRecord {
    pub fn new(name: &str, code: &str) -> Self {
        CountryRecord {
            name: name.to_string(),
            code: code.to_string(),
            centroid: manual_centroid(name),
        }
    }
}

/// Country rows backing the globe. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoDataset {
    countries: Vec<CountryRecord>,
}

impl GeoDataset {
    pub fn new(countries: Vec<CountryRecord>) -> Self {
        GeoDataset { countries }
    }

    /// Single-row dataset used when the download fails.
    pub fn fallback() -> Self {
        GeoDataset::new(vec![CountryRecord::new("Turkey", "TUR")])
    }

    /// Parse the upstream CSV and append any missing territories.
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header = split_csv_line(lines.next().context("Country CSV is empty")?);

        let name_col = header
            .iter()
            .position(|h| h == "COUNTRY")
            .context("Country CSV has no COUNTRY column")?;
        let code_col = header
            .iter()
            .position(|h| h == "CODE")
            .context("Country CSV has no CODE column")?;

        let mut countries = Vec::new();
        for (i, line) in lines.enumerate() {
            let fields = split_csv_line(line);
            match (fields.get(name_col), fields.get(code_col)) {
                (Some(name), Some(code)) if !name.is_empty() && !code.is_empty() => {
                    countries.push(CountryRecord::new(name, code));
                }
                _ => warn!("Skipping malformed country row {}: {}", i + 2, line),
            }
        }

        if countries.is_empty() {
            anyhow::bail!("Country CSV has no rows");
        }

        let mut dataset = GeoDataset::new(countries);
        dataset.inject_missing();
        Ok(dataset)
    }

    fn inject_missing(&mut self) {
        for &(code, name) in MISSING_COUNTRIES {
            if !self.contains(name) {
                self.countries.push(CountryRecord::new(name, code));
            }
        }
    }

    /// Download the dataset; any failure degrades to [`GeoDataset::fallback`].
    pub async fn load(config: &Config) -> Self {
        match Self::fetch(config).await {
            Ok(dataset) => {
                info!("Loaded {} countries", dataset.len());
                dataset
            }
            Err(e) => {
                warn!("Country dataset unavailable, using fallback: {:#}", e);
                Self::fallback()
            }
        }
    }

    async fn fetch(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build dataset HTTP client")?;

        let response = client
            .get(&config.geo_dataset_url)
            .send()
            .await
            .context("Failed to download country dataset")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Country dataset returned {}", status);
        }

        let body = response
            .text()
            .await
            .context("Failed to read country dataset")?;
        Self::from_csv(&body)
    }

    pub fn countries(&self) -> &[CountryRecord] {
        &self.countries
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Row index of the first exact name match.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.countries.iter().position(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&CountryRecord> {
        self.index_of(name).map(|i| &self.countries[i])
    }
}

/// Split one CSV line, honouring double-quoted fields and `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}
