use serde::Serialize;
use url::Url;

use crate::news::{NewsItem, DISPLAY_CAP};
use crate::translate::{fold_turkish, Language, Translator};

const TRANSLATE_PROXY: &str = "https://translate.google.com/translate";

/// Side-panel content. `Clear` empties the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelContent {
    Clear,
    Intel {
        header: String,
        items: Vec<PanelItem>,
    },
    NoData {
        header: String,
        title: String,
        description: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelItem {
    pub title: String,
    pub description: String,
    pub meta: String,
    pub link: String,
    pub critical: bool,
    pub risk_label: Option<String>,
}

pub fn header_text(display_country: &str) -> String {
    format!("INTEL: {}", display_country)
}

/// Route an article link through the web translation proxy.
pub fn proxy_link(link: &str, language: Language) -> String {
    Url::parse_with_params(
        TRANSLATE_PROXY,
        &[("sl", "auto"), ("tl", language.code()), ("u", link)],
    )
    .map(|u| u.to_string())
    .unwrap_or_else(|_| link.to_string())
}

async fn display_country(country: &str, language: Language, translator: &Translator) -> String {
    if language.is_original() {
        return country.to_uppercase();
    }
    let translated = translator.translate(country, language).await;
    fold_turkish(&translated.to_uppercase())
}

/// Build the intel panel for `country` from already-fetched news.
pub async fn build_panel(
    country: &str,
    news: Option<&[NewsItem]>,
    language: Language,
    translator: &Translator,
) -> PanelContent {
    let header = header_text(&display_country(country, language, translator).await);

    let Some(news) = news.filter(|n| !n.is_empty()) else {
        return no_data_panel(country, header, language, translator).await;
    };

    let visible = &news[..news.len().min(DISPLAY_CAP)];

    let risk_label = if visible.iter().any(|n| n.risk) {
        let label = if language.is_original() {
            "CRITICAL".to_string()
        } else {
            fold_turkish(&translator.translate("CRITICAL", language).await.to_uppercase())
        };
        Some(label)
    } else {
        None
    };

    let texts: Vec<&str> = visible
        .iter()
        .flat_map(|n| [n.title.as_str(), n.desc.as_str()])
        .collect();
    let translated = translator.translate_all(&texts, language).await;

    let items = visible
        .iter()
        .zip(translated.chunks(2))
        .map(|(news, pair)| PanelItem {
            title: fold_turkish(&pair[0]),
            description: pair[1].clone(),
            meta: format!("SOURCE: {} | {}", news.media, news.date),
            link: proxy_link(&news.link, language),
            critical: news.risk,
            risk_label: news.risk.then(|| risk_label.clone()).flatten(),
        })
        .collect();

    PanelContent::Intel { header, items }
}

async fn no_data_panel(
    country: &str,
    header: String,
    language: Language,
    translator: &Translator,
) -> PanelContent {
    let title = "NO DATA DETECTED";
    let description = format!("No recent AI intelligence found for {}.", country);

    if language.is_original() {
        return PanelContent::NoData {
            header,
            title: title.to_string(),
            description,
        };
    }

    PanelContent::NoData {
        header,
        title: fold_turkish(&translator.translate(title, language).await),
        description: translator.translate(&description, language).await,
    }
}
