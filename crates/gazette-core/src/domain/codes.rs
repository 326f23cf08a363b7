use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// ISO 4217 style currency code: three ASCII letters, uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse and normalize a currency code to uppercase.
    ///
    /// Surrounding whitespace is ignored; anything that is not exactly three
    /// ASCII letters is rejected rather than coerced.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        let is_valid =
            normalized.len() == 3 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());

        if !is_valid {
            return Err(ValidationError::InvalidCurrency {
                value: input.to_owned(),
            });
        }

        Ok(Self(normalized))
    }

    pub fn usd() -> Self {
        Self::from_static("USD")
    }

    /// Wraps a code known to be valid at compile time.
    pub(crate) fn from_static(code: &'static str) -> Self {
        debug_assert!(Self::parse(code).is_ok());
        Self(code.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

/// ISO 3166-1 alpha-2 country code, uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        let is_valid =
            normalized.len() == 2 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());

        if !is_valid {
            return Err(ValidationError::InvalidCountry {
                value: input.to_owned(),
            });
        }

        Ok(Self(normalized))
    }

    pub(crate) fn from_static(code: &'static str) -> Self {
        debug_assert!(Self::parse(code).is_ok());
        Self(code.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CountryCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for CountryCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CountryCode> for String {
    fn from(value: CountryCode) -> Self {
        value.0
    }
}

/// Coin identifiers the service is willing to forward upstream.
///
/// Arbitrary client-supplied ids are never sent to the price provider; the
/// enum is the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum CoinId {
    Bitcoin,
    Ethereum,
    Solana,
    Ripple,
    Cardano,
    Dogecoin,
}

impl CoinId {
    pub const ALL: [Self; 6] = [
        Self::Bitcoin,
        Self::Ethereum,
        Self::Solana,
        Self::Ripple,
        Self::Cardano,
        Self::Dogecoin,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bitcoin => "bitcoin",
            Self::Ethereum => "ethereum",
            Self::Solana => "solana",
            Self::Ripple => "ripple",
            Self::Cardano => "cardano",
            Self::Dogecoin => "dogecoin",
        }
    }
}

impl Display for CoinId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoinId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|coin| coin.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownCoin {
                value: value.to_owned(),
            })
    }
}

impl TryFrom<String> for CoinId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CoinId> for &'static str {
    fn from(value: CoinId) -> Self {
        value.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_and_uppercases_currency() {
        let parsed = CurrencyCode::parse(" brl ").expect("currency should parse");
        assert_eq!(parsed.as_str(), "BRL");
    }

    #[test]
    fn rejects_malformed_currency() {
        for raw in ["", "US", "USDT", "U5D", "€UR", "   "] {
            let err = CurrencyCode::parse(raw).expect_err("must fail");
            assert!(matches!(err, ValidationError::InvalidCurrency { .. }), "{raw}");
        }
    }

    proptest! {
        #[test]
        fn prop_three_ascii_letters_are_accepted_uppercased(raw in "[a-zA-Z]{3}") {
            let parsed = CurrencyCode::parse(&raw).expect("alphabetic code");
            prop_assert_eq!(parsed.as_str(), raw.to_ascii_uppercase());
        }

        /// Arbitrary input parses exactly when its trimmed form is three ASCII letters.
        #[test]
        fn prop_only_three_ascii_letters_parse(
            raw in prop_oneof!["\\PC{0,6}", " ?[a-zA-Z0-9$]{2,4} ?"],
        ) {
            let trimmed = raw.trim();
            let expected = trimmed.len() == 3 && trimmed.chars().all(|ch| ch.is_ascii_alphabetic());

            let parsed = CurrencyCode::parse(&raw);

            prop_assert_eq!(parsed.is_ok(), expected);
            if let Ok(code) = parsed {
                prop_assert!(code.as_str().chars().all(|ch| ch.is_ascii_uppercase()));
            }
        }
    }

    #[test]
    fn parses_country_code() {
        assert_eq!(CountryCode::parse("br").expect("valid").as_str(), "BR");
        assert!(matches!(
            CountryCode::parse("BRA"),
            Err(ValidationError::InvalidCountry { .. })
        ));
    }

    #[test]
    fn coin_ids_come_from_the_allow_list() {
        assert_eq!("Bitcoin".parse::<CoinId>(), Ok(CoinId::Bitcoin));
        assert!(matches!(
            "shibainu".parse::<CoinId>(),
            Err(ValidationError::UnknownCoin { .. })
        ));
    }

    #[test]
    fn coin_ids_serialize_as_lowercase_strings() {
        let json = serde_json::to_string(&CoinId::Dogecoin).expect("serialize");
        assert_eq!(json, "\"dogecoin\"");
        let parsed: CoinId = serde_json::from_str("\"solana\"").expect("deserialize");
        assert_eq!(parsed, CoinId::Solana);
    }
}
