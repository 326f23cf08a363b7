//! "On this day" items: the Wikipedia feed, the bundled dataset, and the
//! deterministic blurb picker both of them use.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use time::{Date, Month};
use tracing::warn;

use crate::cache::{CacheMode, CacheStore};
use crate::data_source::{FactSource, SourceError};
use crate::domain::iso_date_string;
use crate::upstream::Upstream;
use crate::{DayFact, FactKind, ProviderId};

/// Upper bound on items returned for one date.
pub const MAX_FACTS: usize = 12;

const WIKI_VIBES: &[&str] = &[
    "Hoje tem dessas datas que ajudam a puxar contexto.",
    "Isso costuma passar batido, mas é bem interessante.",
    "Se você curte curiosidade prática: anota essa.",
    "Pra lembrar e comentar no dia: fica ótimo.",
];

const WIKI_WHYS: &[&str] = &[
    "Serve como referência cultural e aparece em calendários e notícias.",
    "Ajuda a entender por que algumas datas viram “marco” na conversa pública.",
    "É um ótimo gancho pra organizar agenda e conteúdo do dia.",
];

const DATASET_VIBES: &[&str] = &[
    "Hoje é um daqueles dias que vale marcar no calendário.",
    "Dá pra usar isso como gancho pra uma conversa boa.",
    "Se você gosta de contexto, essa data é um prato cheio.",
    "Curiosidade útil pra não passar batido no dia.",
];

const DATASET_WHYS: &[&str] = &[
    "Por que isso importa: muda a agenda, o humor do país ou a rotina de muita gente.",
    "Por que isso importa: vira referência cultural e aparece muito em notícias e calendários.",
    "Por que isso importa: é um marco que ajuda a entender o presente.",
];

/// Picks one of `options` as a pure function of `seed`.
///
/// The index is the first four bytes of the SHA-256 digest, big-endian,
/// modulo the option count. Empty option lists yield `""`.
pub fn stable_pick<'a>(seed: &str, options: &[&'a str]) -> &'a str {
    if options.is_empty() {
        return "";
    }
    let digest = Sha256::digest(seed.as_bytes());
    let prefix = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    options[prefix as usize % options.len()]
}

fn with_year(title: &str, year: Option<i64>) -> String {
    match year {
        Some(year) => format!("{title} ({year})"),
        None => title.to_owned(),
    }
}

/// Wikipedia REST "on this day" feed (holidays and events).
#[derive(Clone)]
pub struct WikipediaFacts {
    upstream: Upstream,
    base_url: String,
    timeout: Duration,
}

impl WikipediaFacts {
    pub fn new(upstream: Upstream, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            upstream,
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn feed_url(&self, feed: &str, date: Date) -> String {
        format!(
            "{}/feed/onthisday/{feed}/{}/{}",
            self.base_url,
            u8::from(date.month()),
            date.day()
        )
    }

    async fn feed(&self, feed: &str, date: Date) -> Result<OnThisDay, SourceError> {
        let url = self.feed_url(feed, date);
        self.upstream
            .get_json(ProviderId::Wikipedia, &url, self.timeout)
            .await
    }

    async fn collect(&self, date: Date) -> Result<Vec<DayFact>, SourceError> {
        let (holidays, events) = tokio::join!(self.feed("holidays", date), self.feed("events", date));

        let (holidays, events) = match (holidays, events) {
            (Err(holidays_error), Err(events_error)) => {
                warn!(%holidays_error, "wikipedia holidays feed failed");
                return Err(events_error);
            }
            (Ok(holidays), Err(error)) => {
                warn!(%error, "wikipedia events feed failed; using holidays only");
                (holidays.holidays, Vec::new())
            }
            (Err(error), Ok(events)) => {
                warn!(%error, "wikipedia holidays feed failed; using events only");
                (Vec::new(), events.events)
            }
            (Ok(holidays), Ok(events)) => (holidays.holidays, events.events),
        };

        let day = iso_date_string(date);
        let mut out = Vec::new();
        append_rows(&mut out, &day, FactKind::Observance, holidays);
        append_rows(&mut out, &day, FactKind::Event, events);
        Ok(out)
    }
}

impl FactSource for WikipediaFacts {
    fn id(&self) -> ProviderId {
        ProviderId::Wikipedia
    }

    fn facts<'a>(
        &'a self,
        date: Date,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DayFact>, SourceError>> + Send + 'a>> {
        Box::pin(self.collect(date))
    }
}

#[derive(Debug, Default, Deserialize)]
struct OnThisDay {
    #[serde(default)]
    holidays: Vec<FeedRow>,
    #[serde(default)]
    events: Vec<FeedRow>,
}

#[derive(Debug, Deserialize)]
struct FeedRow {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    year: Option<i64>,
}

fn append_rows(out: &mut Vec<DayFact>, day: &str, kind: FactKind, rows: Vec<FeedRow>) {
    for row in rows {
        if out.len() >= MAX_FACTS {
            return;
        }
        let text = row.text.as_deref().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            continue;
        }

        let seed = format!("wiki:{day}:{}:{text}", kind.as_str());
        let vibe = stable_pick(&seed, WIKI_VIBES);
        let why = stable_pick(&format!("{seed}:why"), WIKI_WHYS);

        out.push(DayFact {
            kind,
            title: with_year(text, row.year),
            about: String::new(),
            summary: format!("{vibe} {why}"),
            source: ProviderId::Wikipedia,
        });
    }
}

struct DatasetEntry {
    month: Month,
    day: u8,
    kind: FactKind,
    title: &'static str,
    year: Option<i64>,
    about: &'static str,
}

const fn entry(
    month: Month,
    day: u8,
    kind: FactKind,
    title: &'static str,
    year: Option<i64>,
    about: &'static str,
) -> DatasetEntry {
    DatasetEntry {
        month,
        day,
        kind,
        title,
        year,
        about,
    }
}

const DATASET: &[DatasetEntry] = &[
    entry(Month::January, 1, FactKind::Observance, "Ano Novo", None,
        "Primeiro dia do ano; muita gente usa como marco pra planos e recomeços."),
    entry(Month::March, 8, FactKind::Observance, "Dia Internacional da Mulher", None,
        "Data de reconhecimento e reflexão sobre direitos e igualdade."),
    entry(Month::April, 21, FactKind::Holiday, "Tiradentes (Brasil)", None,
        "Feriado nacional brasileiro em homenagem a Tiradentes."),
    entry(Month::May, 1, FactKind::Observance, "Dia do Trabalhador", None,
        "Data ligada à história do trabalho e direitos trabalhistas."),
    entry(Month::May, 8, FactKind::Event, "Fim da Segunda Guerra Mundial na Europa (VE Day)", Some(1945),
        "Marca a rendição da Alemanha na Europa e o encerramento do conflito no continente."),
    entry(Month::June, 5, FactKind::Observance, "Dia Mundial do Meio Ambiente", None,
        "Data global para lembrar ações de preservação ambiental."),
    entry(Month::July, 20, FactKind::Observance, "Dia do Amigo (Brasil)", None,
        "Data popular no Brasil para celebrar amizade e vínculos."),
    entry(Month::July, 30, FactKind::Observance, "Dia Internacional da Amizade (ONU)", None,
        "Data internacional para incentivar amizade e cooperação."),
    entry(Month::August, 11, FactKind::Observance, "Dia dos Pais (referência)", None,
        "No Brasil é celebrado em agosto (data variável por ano)."),
    entry(Month::September, 2, FactKind::Event,
        "Fim da Segunda Guerra Mundial (assinatura da rendição do Japão)", Some(1945),
        "Assinatura formal da rendição do Japão, marcando o fim do conflito em escala global."),
    entry(Month::September, 7, FactKind::Holiday, "Independência do Brasil", Some(1822),
        "Feriado nacional que marca a independência do Brasil."),
    entry(Month::October, 12, FactKind::Holiday, "Nossa Senhora Aparecida (Brasil)", None,
        "Feriado nacional e data religiosa importante no país."),
    entry(Month::October, 12, FactKind::Observance, "Dia das Crianças (Brasil)", None,
        "Data popular de celebração e consumo (presentes) no Brasil."),
    entry(Month::November, 2, FactKind::Holiday, "Finados (Brasil)", None,
        "Dia de memória e homenagem aos falecidos."),
    entry(Month::November, 15, FactKind::Holiday, "Proclamação da República (Brasil)", Some(1889),
        "Feriado nacional que marca a proclamação da República."),
    entry(Month::November, 20, FactKind::Holiday, "Dia da Consciência Negra (Brasil)", None,
        "Data de reflexão sobre a luta e contribuições da população negra."),
    entry(Month::December, 25, FactKind::Holiday, "Natal", None,
        "Data tradicional, com forte presença cultural e religiosa."),
];

/// Bundled month-day table; never touches the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct DatasetFacts;

impl DatasetFacts {
    pub fn facts_for(&self, date: Date) -> Vec<DayFact> {
        let day = iso_date_string(date);

        DATASET
            .iter()
            .filter(|entry| entry.month == date.month() && entry.day == date.day())
            .enumerate()
            .map(|(index, entry)| {
                let vibe = stable_pick(&format!("{day}:{}:{index}", entry.title), DATASET_VIBES);
                let why = stable_pick(&format!("{day}:{}:why:{index}", entry.title), DATASET_WHYS);
                let summary = [vibe, entry.about, why]
                    .into_iter()
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");

                DayFact {
                    kind: entry.kind,
                    title: with_year(entry.title, entry.year),
                    about: entry.about.to_owned(),
                    summary,
                    source: ProviderId::Dataset,
                }
            })
            .take(MAX_FACTS)
            .collect()
    }
}

impl FactSource for DatasetFacts {
    fn id(&self) -> ProviderId {
        ProviderId::Dataset
    }

    fn facts<'a>(
        &'a self,
        date: Date,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DayFact>, SourceError>> + Send + 'a>> {
        Box::pin(std::future::ready(Ok(self.facts_for(date))))
    }
}

/// Caches another fact source under `dayfacts:{provider}:{date}`.
#[derive(Clone)]
pub struct CachedFacts {
    inner: Arc<dyn FactSource>,
    cache: CacheStore,
    ttl: Duration,
    mode: CacheMode,
}

impl CachedFacts {
    pub fn new(inner: Arc<dyn FactSource>, cache: CacheStore, ttl: Duration, mode: CacheMode) -> Self {
        Self {
            inner,
            cache,
            ttl,
            mode,
        }
    }

    pub fn cache_key(&self, date: Date) -> String {
        format!("dayfacts:{}:{}", self.inner.id(), iso_date_string(date))
    }
}

impl FactSource for CachedFacts {
    fn id(&self) -> ProviderId {
        self.inner.id()
    }

    fn facts<'a>(
        &'a self,
        date: Date,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DayFact>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let key = self.cache_key(date);
            self.cache
                .get_or_fetch_with_mode(&key, self.ttl, self.mode, || self.inner.facts(date))
                .await
        })
    }
}
