use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Canonical identifiers for every data source the service reads from.
///
/// `Dataset` is the bundled day-facts table; it never touches the network but
/// takes part in fallback chains like any upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    Frankfurter,
    Coingecko,
    NagerDate,
    Wikipedia,
    WikimediaCommons,
    UnsplashSource,
    Dataset,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Frankfurter => "frankfurter",
            Self::Coingecko => "coingecko",
            Self::NagerDate => "nager_date",
            Self::Wikipedia => "wikipedia",
            Self::WikimediaCommons => "wikimedia_commons",
            Self::UnsplashSource => "unsplash_source",
            Self::Dataset => "dataset",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
