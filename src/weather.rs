//! Weather-keyword outfit rules.
//!
//! The input text is NFC-normalised and lower-cased, then checked for each
//! rule's keyword in a fixed order: rain, cold, hot, clear. Only the first
//! rule that matches is applied. Text matching none of them leaves the
//! wardrobe unfiltered and carries no advice.

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::model::WardrobeItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherRule {
    Rain,
    Cold,
    Hot,
    Clear,
}

impl WeatherRule {
    pub const PRIORITY: [WeatherRule; 4] = [
        WeatherRule::Rain,
        WeatherRule::Cold,
        WeatherRule::Hot,
        WeatherRule::Clear,
    ];
}

/// Keyword tokens and the column values the rules compare against.
///
/// Values are compared verbatim; they are never translated at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub rain: String,
    pub cold: String,
    pub hot: String,
    pub clear: String,
    pub outer: String,
    pub top: String,
    pub sporty: String,
    pub dark_colors: Vec<String>,
    pub advice: Advice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advice {
    pub rain: String,
    pub cold: String,
    pub hot: String,
    pub clear: String,
}

impl Vocabulary {
    pub fn korean() -> Self {
        Self {
            rain: "비".into(),
            cold: "추움".into(),
            hot: "더움".into(),
            clear: "맑음".into(),
            outer: "아우터".into(),
            top: "상의".into(),
            sporty: "스포티".into(),
            dark_colors: vec!["검정".into(), "네이비".into()],
            advice: Advice {
                rain: "비 오는 날엔 어두운 색 아우터를 추천합니다!".into(),
                cold: "추운 날엔 아우터나 긴팔 상의를 추천합니다!".into(),
                hot: "더운 날엔 밝은 색상의 상의를 추천합니다!".into(),
                clear: "맑은 날엔 모든 스타일이 어울려요!".into(),
            },
        }
    }

    pub fn english() -> Self {
        Self {
            rain: "rain".into(),
            cold: "cold".into(),
            hot: "hot".into(),
            clear: "clear".into(),
            outer: "Outer".into(),
            top: "Top".into(),
            sporty: "Sporty".into(),
            dark_colors: vec!["Black".into(), "Navy".into()],
            advice: Advice {
                rain: "Rainy day: go for a dark outer layer.".into(),
                cold: "Cold day: an outer layer or a long-sleeved top.".into(),
                hot: "Hot day: a light-coloured top.".into(),
                clear: "Clear day: anything goes.".into(),
            },
        }
    }

    fn keyword(&self, rule: WeatherRule) -> &str {
        match rule {
            WeatherRule::Rain => &self.rain,
            WeatherRule::Cold => &self.cold,
            WeatherRule::Hot => &self.hot,
            WeatherRule::Clear => &self.clear,
        }
    }

    pub fn advice_for(&self, rule: WeatherRule) -> &str {
        match rule {
            WeatherRule::Rain => &self.advice.rain,
            WeatherRule::Cold => &self.advice.cold,
            WeatherRule::Hot => &self.advice.hot,
            WeatherRule::Clear => &self.advice.clear,
        }
    }

    fn is_dark(&self, color: &str) -> bool {
        self.dark_colors.iter().any(|c| c == color)
    }

    fn admits(&self, rule: WeatherRule, item: &WardrobeItem) -> bool {
        match rule {
            WeatherRule::Rain => item.category == self.outer || self.is_dark(&item.color),
            WeatherRule::Cold => {
                (item.category == self.outer || item.category == self.top)
                    && item.style != self.sporty
            }
            WeatherRule::Hot => item.category == self.top && !self.is_dark(&item.color),
            WeatherRule::Clear => true,
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::korean()
    }
}

fn fold(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

/// First rule, in priority order, whose keyword occurs in `weather`.
pub fn match_rule(vocabulary: &Vocabulary, weather: &str) -> Option<WeatherRule> {
    let folded = fold(weather);
    WeatherRule::PRIORITY
        .into_iter()
        .find(|rule| folded.contains(&fold(vocabulary.keyword(*rule))))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub rule: Option<WeatherRule>,
    pub advice: Option<String>,
    pub items: Vec<WardrobeItem>,
}

pub fn recommend(
    vocabulary: &Vocabulary,
    wardrobe: &[WardrobeItem],
    weather: &str,
) -> Recommendation {
    let rule = match_rule(vocabulary, weather);
    let items = match rule {
        Some(rule) => wardrobe
            .iter()
            .filter(|item| vocabulary.admits(rule, item))
            .cloned()
            .collect(),
        None => wardrobe.to_vec(),
    };
    Recommendation {
        rule,
        advice: rule.map(|r| vocabulary.advice_for(r).to_string()),
        items,
    }
}

/// Items suited to `weather` using the default (Korean) vocabulary.
pub fn filter_by_weather(wardrobe: &[WardrobeItem], weather: &str) -> Vec<WardrobeItem> {
    recommend(&Vocabulary::default(), wardrobe, weather).items
}
