use serde::Serialize;

/// Substrings that mark a headline or snippet as high-salience.
/// Matched case-insensitively, in this order.
pub const RISK_KEYWORDS: &[&str] = &[
    "military",
    "nuclear",
    "weapon",
    "war",
    "army",
    "kill",
    "attack",
    "hack",
    "spy",
    "surveillance",
    "danger",
    "threat",
    "missile",
    "soldier",
    "death",
    "virus",
    "bioweapon",
    "cyber",
    "drone",
];

/// Major AI powers, granted a deeper news scan.
pub const TIER_1_COUNTRIES: &[&str] = &[
    "United States",
    "China",
    "United Kingdom",
    "Russia",
    "Japan",
    "Germany",
    "France",
    "Israel",
    "India",
    "Canada",
    "South Korea",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountryTier {
    Tier1,
    Standard,
}

impl CountryTier {
    pub fn of(country: &str) -> Self {
        if TIER_1_COUNTRIES.contains(&country) {
            CountryTier::Tier1
        } else {
            CountryTier::Standard
        }
    }

    /// Maximum number of raw search results considered for this tier.
    pub fn fetch_ceiling(self) -> usize {
        match self {
            CountryTier::Tier1 => 25,
            CountryTier::Standard => 15,
        }
    }
}

/// First risk keyword contained in `text`, if any.
pub fn matched_keyword(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    RISK_KEYWORDS.iter().copied().find(|kw| lower.contains(kw))
}

pub fn analyze_risk(text: &str) -> bool {
    matched_keyword(text).is_some()
}

/// Risky when either the title or the description trips a keyword.
pub fn is_risky(title: &str, description: &str) -> bool {
    analyze_risk(title) || analyze_risk(description)
}
