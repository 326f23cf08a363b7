//! Stock-photo search queries derived from a post title and category.
//!
//! Titles are Portuguese; the topic hints are English because the photo
//! providers index mostly English descriptions.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MAX_QUERIES: usize = 5;
pub const MAX_KEYWORDS: usize = 8;
const MIN_KEYWORD_CHARS: usize = 4;

/// Last-resort query when neither the plan nor the title has anything.
pub const FALLBACK_QUERY: &str = "news";

const TITLE_HINTS: &[(&str, &[&str])] = &[
    ("olimp", &["Olympics", "Olympic games", "athletics"]),
    (
        "campeonat|t[áa]tica|jogo|futebol",
        &["football match", "soccer", "stadium"],
    ),
    ("startup|startups", &["startup", "entrepreneurship", "business"]),
    (
        r"\bia\b|intelig[êe]ncia artificial",
        &["artificial intelligence", "technology", "retail"],
    ),
    ("varejo", &["retail", "store", "shopping"]),
    (
        "congresso|lei|zoneamento",
        &["parliament", "congress", "city planning"],
    ),
    ("gastron", &["restaurant", "fine dining", "chef"]),
    ("alphaville", &["city skyline", "urban", "cityscape"]),
];

const CATEGORY_HINTS: &[(&str, &[&str])] = &[
    ("esportes", &["sports", "athletics"]),
    ("politica", &["politics", "government"]),
    ("empreendedorismo", &["business", "entrepreneurship"]),
    ("alphaville", &["city", "urban"]),
];

const STOPWORDS: &[&str] = &[
    "a", "o", "os", "as", "um", "uma", "uns", "umas", "de", "do", "da", "dos", "das", "em", "no",
    "na", "nos", "nas", "e", "ou", "com", "para", "por", "sobre", "sem", "como", "que", "se", "é",
    "ao", "à", "às", "aos", "mais", "menos", "nova", "novo",
];

static TITLE_PATTERNS: LazyLock<Vec<(Regex, &'static [&'static str])>> = LazyLock::new(|| {
    TITLE_HINTS
        .iter()
        .filter_map(|(pattern, hints)| {
            Regex::new(&format!("(?i){pattern}"))
                .ok()
                .map(|regex| (regex, *hints))
        })
        .collect()
});

static TOKEN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[\w'-]+").ok());

/// Ordered, de-duplicated search queries, best first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryPlan(Vec<String>);

impl QueryPlan {
    pub fn queries(&self) -> &[String] {
        &self.0
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Query for single-shot providers: the best query, else the title, else
    /// [`FALLBACK_QUERY`].
    pub fn single_query(&self, title: &str) -> String {
        self.first()
            .map(str::to_owned)
            .or_else(|| Some(title.trim().to_owned()).filter(|title| !title.is_empty()))
            .unwrap_or_else(|| String::from(FALLBACK_QUERY))
    }
}

impl IntoIterator for QueryPlan {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// English topic hints: first matching title rule, then first matching
/// category rule.
pub fn topic_hints(title: &str, category_slug: &str) -> Vec<&'static str> {
    let mut hints = Vec::new();

    if let Some((_, found)) = TITLE_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(title))
    {
        hints.extend_from_slice(found);
    }

    let category = category_slug.to_lowercase();
    if let Some((_, found)) = CATEGORY_HINTS
        .iter()
        .find(|(needle, _)| category.contains(needle))
    {
        hints.extend_from_slice(found);
    }

    hints
}

/// Distinctive title words: lower-cased, at least four characters, not a
/// stopword, first occurrence only, at most [`MAX_KEYWORDS`].
pub fn keywords(title: &str) -> Vec<String> {
    let Some(token) = TOKEN.as_ref() else {
        return Vec::new();
    };

    let lowered = title.to_lowercase();
    let mut seen = HashSet::new();

    token
        .find_iter(&lowered)
        .map(|word| word.as_str().trim_matches(|ch| ch == '\'' || ch == '-'))
        .filter(|word| word.chars().count() >= MIN_KEYWORD_CHARS)
        .filter(|word| !STOPWORDS.contains(word))
        .filter(|word| seen.insert(word.to_string()))
        .take(MAX_KEYWORDS)
        .map(str::to_owned)
        .collect()
}

pub fn build_queries(title: &str, category_slug: Option<&str>) -> QueryPlan {
    let title = title.trim();
    let hints = topic_hints(title, category_slug.unwrap_or_default());
    let keywords = keywords(title);

    let mut candidates: Vec<String> = Vec::new();

    if let Some(hint) = hints.first() {
        if !keywords.is_empty() {
            let mut parts = vec![*hint];
            parts.extend(keywords.iter().take(4).map(String::as_str));
            candidates.push(parts.join(" "));
        }
        candidates.push((*hint).to_owned());
    }

    candidates.push(title.to_owned());

    if !keywords.is_empty() {
        candidates.push(
            keywords
                .iter()
                .take(6)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        );
    }

    let mut out: Vec<String> = Vec::new();
    for query in candidates {
        let query = query.trim();
        if !query.is_empty() && !out.iter().any(|existing| existing == query) {
            out.push(query.to_owned());
        }
    }
    out.truncate(MAX_QUERIES);

    QueryPlan(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn football_title_with_sports_category() {
        let plan = build_queries(
            "Tática do jogo: como o campeonato mudou o futebol",
            Some("esportes"),
        );

        assert_eq!(
            plan.queries(),
            [
                "football match tática jogo campeonato mudou",
                "football match",
                "Tática do jogo: como o campeonato mudou o futebol",
                "tática jogo campeonato mudou futebol",
            ]
        );
    }

    #[test]
    fn title_hint_comes_first_and_category_hint_is_appended() {
        let hints = topic_hints("Nova lei de zoneamento", "politica-local");
        assert_eq!(
            hints,
            vec!["parliament", "congress", "city planning", "politics", "government"]
        );
    }

    #[test]
    fn ia_matches_only_as_a_word() {
        assert_eq!(topic_hints("A IA no varejo", "")[0], "artificial intelligence");
        assert!(topic_hints("Média da série", "").is_empty());
    }

    #[test]
    fn keywords_drop_short_words_and_stopwords() {
        assert_eq!(
            keywords("Startups de São Paulo crescem; startups crescem mais"),
            vec!["startups", "paulo", "crescem"]
        );
        assert_eq!(keywords("'olá-' --mundo--"), vec!["mundo"]);
    }

    #[test]
    fn keywords_are_capped() {
        let title = "alpha bravo charlie delta echoes foxtrot golfe hotel india juliet";
        assert_eq!(keywords(title).len(), MAX_KEYWORDS);
    }

    #[test]
    fn plan_without_hints_uses_title_and_keywords() {
        let plan = build_queries("Feira cultural reúne artistas", None);
        assert_eq!(
            plan.queries(),
            ["Feira cultural reúne artistas", "feira cultural reúne artistas"]
        );
    }

    #[test]
    fn plan_is_deduplicated_and_capped() {
        for title in ["", "futebol", "Olimpíadas", "gastronomia gastronomia gastronomia"] {
            let plan = build_queries(title, Some("esportes"));
            assert!(plan.len() <= MAX_QUERIES);
            let unique: HashSet<&String> = plan.queries().iter().collect();
            assert_eq!(unique.len(), plan.len());
            assert!(plan.queries().iter().all(|q| !q.trim().is_empty()));
        }
    }

    #[test]
    fn single_query_falls_back_to_title_then_news() {
        assert_eq!(build_queries("", None).single_query(""), "news");
        assert_eq!(QueryPlan::default().single_query(" Mercado "), "Mercado");
        assert_eq!(build_queries("futebol", None).single_query("futebol"), "football match futebol");
    }
}
