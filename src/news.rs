use anyhow::{Context, Result};
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::risk::{is_risky, CountryTier};

/// Retained items stop accumulating at this count.
pub const COLLECT_CAP: usize = 15;
/// Items shown in the intel panel.
pub const DISPLAY_CAP: usize = 12;
/// A first page shorter than this triggers a second page fetch.
pub const PAGINATION_THRESHOLD: usize = 10;
pub const RESULTS_PER_PAGE: u32 = 10;

/// A search result as scraped, before de-duplication and classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawNewsResult {
    pub title: String,
    pub desc: Option<String>,
    pub date: Option<String>,
    pub link: Option<String>,
    pub media: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub desc: String,
    pub date: String,
    pub link: String,
    pub media: String,
    pub risk: bool,
}

impl NewsItem {
    fn from_raw(raw: RawNewsResult) -> Self {
        let desc = raw.desc.unwrap_or_default();
        let risk = is_risky(&raw.title, &desc);
        NewsItem {
            title: raw.title,
            desc,
            date: raw.date.unwrap_or_else(|| "Recent".to_string()),
            link: raw.link.unwrap_or_else(|| "#".to_string()),
            media: raw.media.unwrap_or_else(|| "Unknown Source".to_string()),
            risk,
        }
    }
}

pub fn search_query(country: &str) -> String {
    format!("Artificial Intelligence {}", country)
}

/// Drop empty and repeated titles, classify risk, stop at [`COLLECT_CAP`].
/// Source order is preserved.
pub fn filter_results(results: Vec<RawNewsResult>) -> Vec<NewsItem> {
    let mut seen_titles: HashSet<String> = HashSet::new();
    let mut clean = Vec::new();

    for raw in results {
        if raw.title.is_empty() || seen_titles.contains(&raw.title) {
            continue;
        }
        seen_titles.insert(raw.title.clone());
        clean.push(NewsItem::from_raw(raw));

        if clean.len() >= COLLECT_CAP {
            break;
        }
    }

    clean
}

// ─── HTML parsing ──────────────────────────────────────

/// Selectors for one flavour of result-card markup.
struct CardLayout {
    card: &'static str,
    link: &'static str,
    title: &'static str,
    desc: &'static str,
    date: &'static str,
    media: &'static str,
}

/// Full desktop markup first, then the no-script markup served to plain clients.
const CARD_LAYOUTS: &[CardLayout] = &[
    CardLayout {
        card: "div.SoaBEf",
        link: "a[href]",
        title: "div[role=\"heading\"]",
        desc: "div.GI74Re",
        date: "div.OSrXXb span, div.LfVVr span",
        media: "div.NUnG9d span, div.MgUUmf span",
    },
    CardLayout {
        card: "div.Gx5Zad",
        link: "a[href]",
        title: "h3",
        desc: "div.s3v9rd",
        date: "span.r0bn4c",
        media: "div.UPmit",
    },
];

struct CompiledLayout {
    card: Selector,
    link: Selector,
    title: Selector,
    desc: Selector,
    date: Selector,
    media: Selector,
}

impl CardLayout {
    fn compile(&self) -> Option<CompiledLayout> {
        Some(CompiledLayout {
            card: Selector::parse(self.card).ok()?,
            link: Selector::parse(self.link).ok()?,
            title: Selector::parse(self.title).ok()?,
            desc: Selector::parse(self.desc).ok()?,
            date: Selector::parse(self.date).ok()?,
            media: Selector::parse(self.media).ok()?,
        })
    }
}

fn collapse_whitespace(text: &str) -> String {
    match Regex::new(r"\s+") {
        Ok(re) => re.replace_all(text.trim(), " ").into_owned(),
        Err(_) => text.trim().to_string(),
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// Resolve a result href against the search page and unwrap `/url?q=` redirects.
pub fn resolve_link(href: &str, base: &Url) -> Option<String> {
    let resolved = base.join(href).ok()?;
    if resolved.path() == "/url" {
        let target = resolved
            .query_pairs()
            .find(|(k, _)| k == "q" || k == "url")
            .map(|(_, v)| v.into_owned())?;
        if target.starts_with("http") {
            return Some(target);
        }
        return None;
    }
    Some(resolved.to_string())
}

/// Scrape result cards from a news-tab search page. Unparseable cards are skipped.
pub fn parse_results_page(html: &str, base: &Url) -> Vec<RawNewsResult> {
    let document = Html::parse_document(html);

    for layout in CARD_LAYOUTS {
        let Some(sel) = layout.compile() else {
            continue;
        };

        let results: Vec<RawNewsResult> = document
            .select(&sel.card)
            .filter_map(|card| {
                let title = first_text(card, &sel.title)?;
                let link = card
                    .select(&sel.link)
                    .filter_map(|a| a.value().attr("href"))
                    .find_map(|href| resolve_link(href, base));
                let date = first_text(card, &sel.date);
                let desc = first_text(card, &sel.desc).and_then(|d| {
                    // no-script snippets are prefixed with "<date> · "
                    let stripped = match &date {
                        Some(date) => d.strip_prefix(date.as_str()).unwrap_or(&d),
                        None => d.as_str(),
                    };
                    let stripped = stripped.trim_start_matches(['·', ' ']).trim();
                    (!stripped.is_empty()).then(|| stripped.to_string())
                });

                Some(RawNewsResult {
                    title,
                    desc,
                    date,
                    link,
                    media: first_text(card, &sel.media),
                })
            })
            .collect();

        if !results.is_empty() {
            return results;
        }
    }

    Vec::new()
}

// ─── Client ────────────────────────────────────────────

pub struct NewsClient {
    client: Client,
    search_url: String,
    language: String,
    window_days: u32,
}

impl NewsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build news HTTP client")?;

        Ok(NewsClient {
            client,
            search_url: config.news_search_url.clone(),
            language: config.news_language.clone(),
            window_days: config.news_window_days,
        })
    }

    /// Fetch one page (1-based) of news-tab results for `query`.
    pub async fn fetch_page(&self, query: &str, page: u32) -> Result<Vec<RawNewsResult>> {
        let start = RESULTS_PER_PAGE * page.saturating_sub(1);
        let lang_filter = format!("lang_{}", self.language);
        let tbs = format!("lr:lang_1{},qdr:d{}", self.language, self.window_days);

        let response = self
            .client
            .get(&self.search_url)
            .query(&[
                ("q", query),
                ("lr", lang_filter.as_str()),
                ("tbs", tbs.as_str()),
                ("tbm", "nws"),
                ("start", &start.to_string()),
            ])
            .send()
            .await
            .context("Failed to fetch news search page")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("News search returned {}", status);
        }

        let body = response
            .text()
            .await
            .context("Failed to read news search body")?;
        let base = Url::parse(&self.search_url).context("Invalid NEWS_SEARCH_URL")?;
        let results = parse_results_page(&body, &base);

        debug!("Fetched {} results for '{}' page {}", results.len(), query, page);
        Ok(results)
    }

    /// First page, plus the second page when the first is thin.
    pub async fn search(&self, query: &str) -> Result<Vec<RawNewsResult>> {
        let mut results = self.fetch_page(query, 1).await?;

        if results.len() < PAGINATION_THRESHOLD {
            debug!(
                "Only {} results for '{}', fetching page 2",
                results.len(),
                query
            );
            results.extend(self.fetch_page(query, 2).await?);
        }

        Ok(results)
    }

    /// Filtered AI news for `country`, or `None` when nothing usable came back.
    /// Fetch failures are logged, never propagated.
    pub async fn get_country_news(&self, country: &str) -> Option<Vec<NewsItem>> {
        let country = country.trim();
        if country.is_empty() {
            warn!("News requested for an empty country name");
            return None;
        }

        let tier = CountryTier::of(country);
        let query = search_query(country);

        match self.search(&query).await {
            Ok(mut results) => {
                results.truncate(tier.fetch_ceiling());
                let items = filter_results(results);
                let risky = items.iter().filter(|i| i.risk).count();
                info!(
                    "News for {} ({:?}): {} items, {} flagged",
                    country,
                    tier,
                    items.len(),
                    risky
                );
                if items.is_empty() {
                    None
                } else {
                    Some(items)
                }
            }
            Err(e) => {
                warn!("News fetch failed for {}: {:#}", country, e);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Desktop-layout result card.
    pub fn card(title: &str, desc: &str, media: &str, date: &str, href: &str) -> String {
        format!(
            r#"<div class="SoaBEf"><div><a class="WlydOe" href="{href}"><div>
<div class="MgUUmf NUnG9d"><span>{media}</span></div>
<div class="n0jPhd MBeuO" role="heading">{title}</div>
<div class="GI74Re nDgy9d">{desc}</div>
<div class="OSrXXb rbYSKb LfVVr"><span>{date}</span></div>
</div></a></div></div>"#
        )
    }

    pub fn page(cards: &[String]) -> String {
        format!(
            "<html><body><div id=\"search\">{}</div></body></html>",
            cards.join("\n")
        )
    }

    /// A page of `n` distinct, safe headlines numbered from `offset`.
    pub fn numbered_page(offset: usize, n: usize) -> String {
        let cards: Vec<String> = (offset..offset + n)
            .map(|i| {
                card(
                    &format!("AI policy update {}", i),
                    "Lawmakers discuss new rules",
                    "Example Times",
                    "1 day ago",
                    &format!("https://example.com/story-{}", i),
                )
            })
            .collect();
        page(&cards)
    }
}
