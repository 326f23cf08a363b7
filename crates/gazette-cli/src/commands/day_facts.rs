use gazette_core::domain::parse_iso_date;
use gazette_core::FeedService;
use serde_json::Value;
use time::Date;

use crate::cli::DayFactsArgs;
use crate::error::CliError;

pub async fn run(args: &DayFactsArgs, feeds: &FeedService) -> Result<Value, CliError> {
    let date = resolve_date(args.date.as_deref(), feeds.today())?;
    let facts = feeds.get_day_facts(date).await;
    Ok(serde_json::to_value(facts)?)
}

fn resolve_date(raw: Option<&str>, today: Date) -> Result<Date, CliError> {
    match raw.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => parse_iso_date(text)
            .map_err(|error| CliError::Command(format!("invalid --date '{text}': {error}"))),
        None => Ok(today),
    }
}
