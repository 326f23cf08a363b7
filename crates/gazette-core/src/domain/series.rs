use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::Date;

use super::iso_date;

/// One dated observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint<T> {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub value: T,
}

/// Date-ordered series with at most one point per calendar date.
///
/// Construction sorts ascending and collapses duplicate dates, keeping the
/// value that appeared last in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries<T> {
    points: Vec<SeriesPoint<T>>,
}

impl<T> NormalizedSeries<T> {
    pub fn from_points(points: impl IntoIterator<Item = (Date, T)>) -> Self {
        let by_date: BTreeMap<Date, T> = points.into_iter().collect();
        Self {
            points: by_date
                .into_iter()
                .map(|(date, value)| SeriesPoint { date, value })
                .collect(),
        }
    }

    pub fn points(&self) -> &[SeriesPoint<T>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The most recent point.
    pub fn current(&self) -> Option<&SeriesPoint<T>> {
        self.points.last()
    }
}

impl<T> Default for NormalizedSeries<T> {
    fn default() -> Self {
        Self { points: Vec::new() }
    }
}

impl<T: Serialize> Serialize for NormalizedSeries<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.points.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for NormalizedSeries<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let points = Vec::<SeriesPoint<T>>::deserialize(deserializer)?;
        Ok(Self::from_points(
            points.into_iter().map(|point| (point.date, point.value)),
        ))
    }
}
