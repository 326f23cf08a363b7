use std::time::Duration;

use serde::Deserialize;
use time::Date;

use crate::data_source::SourceError;
use crate::domain::parse_iso_date;
use crate::upstream::Upstream;
use crate::{CountryCode, Holiday, ProviderId};

/// Nager.Date public-holiday API.
#[derive(Clone)]
pub struct NagerDateClient {
    upstream: Upstream,
    base_url: String,
    timeout: Duration,
}

impl NagerDateClient {
    pub fn new(upstream: Upstream, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            upstream,
            base_url: base_url.into(),
            timeout,
        }
    }

    pub async fn public_holidays(
        &self,
        year: i32,
        country: &CountryCode,
    ) -> Result<Vec<Holiday>, SourceError> {
        let url = format!("{}/PublicHolidays/{year}/{country}", self.base_url);
        self.fetch(&url, country).await
    }

    /// Upcoming holidays, soonest first.
    pub async fn next_public_holidays(
        &self,
        country: &CountryCode,
    ) -> Result<Vec<Holiday>, SourceError> {
        let url = format!("{}/NextPublicHolidays/{country}", self.base_url);
        self.fetch(&url, country).await
    }

    async fn fetch(&self, url: &str, country: &CountryCode) -> Result<Vec<Holiday>, SourceError> {
        let raw: Vec<NagerHoliday> = self
            .upstream
            .get_json(ProviderId::NagerDate, url, self.timeout)
            .await?;
        raw.into_iter()
            .map(|holiday| normalize_holiday(holiday, country))
            .collect()
    }
}

/// Holidays falling exactly on `date`.
pub fn holidays_on(holidays: &[Holiday], date: Date) -> Vec<Holiday> {
    holidays
        .iter()
        .filter(|holiday| holiday.date == date)
        .cloned()
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NagerHoliday {
    date: String,
    local_name: String,
    name: String,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    global: Option<bool>,
    #[serde(default)]
    types: Option<Vec<String>>,
}

fn normalize_holiday(raw: NagerHoliday, requested: &CountryCode) -> Result<Holiday, SourceError> {
    let date = parse_iso_date(&raw.date).map_err(|error| {
        SourceError::normalization(format!("nager_date holiday date '{}': {error}", raw.date))
    })?;
    let country = match raw.country_code.as_deref() {
        Some(code) => CountryCode::parse(code)
            .map_err(|error| SourceError::normalization(format!("nager_date payload: {error}")))?,
        None => requested.clone(),
    };

    Ok(Holiday {
        date,
        local_name: raw.local_name,
        name: raw.name,
        country,
        global: raw.global.unwrap_or(true),
        types: raw.types.unwrap_or_default(),
    })
}
