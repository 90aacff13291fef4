use serde::{Deserialize, Serialize};

/// Sector color used when a resolver knows no background at all.
pub const FALLBACK_BACKGROUND: &str = "#eeeeee";
/// Text color used when a resolver has no `chart-font-color`.
pub const FALLBACK_FONT_COLOR: &str = "#000000";

/// Looks up theme colors by key, e.g. `chart-background-m`.
pub trait ColorResolver {
    fn color(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub background_male: String,
    pub background_female: String,
    pub background_unknown: String,
    pub font_color: String,
}

impl Theme {
    pub fn webtrees() -> Self {
        Self {
            background_male: "#b1cff0".to_string(),
            background_female: "#e9daf1".to_string(),
            background_unknown: FALLBACK_BACKGROUND.to_string(),
            font_color: FALLBACK_FONT_COLOR.to_string(),
        }
    }

    pub fn colors() -> Self {
        Self {
            background_male: "#9bc4f2".to_string(),
            background_female: "#f2b8d8".to_string(),
            background_unknown: "#e5e5e5".to_string(),
            font_color: "#1c2430".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "webtrees" | "default" => Some(Self::webtrees()),
            "colors" => Some(Self::colors()),
            _ => None,
        }
    }

}

impl Default for Theme {
    fn default() -> Self {
        Self::webtrees()
    }
}

impl ColorResolver for Theme {
    fn color(&self, key: &str) -> Option<String> {
        let value = match key {
            "chart-background-m" => &self.background_male,
            "chart-background-f" => &self.background_female,
            "chart-background-u" => &self.background_unknown,
            "chart-font-color" => &self.font_color,
            _ => return None,
        };
        Some(value.clone())
    }
}
