use crate::chart::RouteTemplates;
use crate::i18n::Catalog;
use crate::theme::Theme;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

pub const MIN_GENERATIONS: u32 = 2;
pub const MAX_GENERATIONS: u32 = 10;
pub const DEFAULT_GENERATIONS: u32 = 4;
pub const MIN_FAN_DEGREE: u32 = 180;
pub const MAX_FAN_DEGREE: u32 = 360;
pub const DEFAULT_FAN_DEGREE: u32 = 210;
pub const MIN_FONT_SCALE: u32 = 0;
pub const MAX_FONT_SCALE: u32 = 200;
pub const DEFAULT_FONT_SCALE: u32 = 100;

/// Raw chart options as received from a request. Nothing here is validated.
///
/// Numeric options accept any number or numeric string; values beyond `i64`
/// saturate and fractions round, so out-of-range input is clamped later
/// instead of failing here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartOptions {
    #[serde(deserialize_with = "lenient_int")]
    pub generations: Option<i64>,
    #[serde(deserialize_with = "lenient_int")]
    pub fan_degree: Option<i64>,
    #[serde(deserialize_with = "lenient_int")]
    pub font_scale: Option<i64>,
    pub hide_empty_segments: Option<bool>,
    pub show_color_gradients: Option<bool>,
}

/// Chart options after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSettings {
    pub generations: u32,
    pub fan_degree: u32,
    pub font_scale: u32,
    pub hide_empty_segments: bool,
    pub show_color_gradients: bool,
}

impl ChartOptions {
    /// Clamps every option into range; `default_generations` is the tree preference.
    pub fn resolve(&self, default_generations: u32) -> ChartSettings {
        let generations = self.generations.unwrap_or(i64::from(default_generations));
        ChartSettings {
            generations: clamp(generations, MIN_GENERATIONS, MAX_GENERATIONS),
            fan_degree: clamp(
                self.fan_degree.unwrap_or(i64::from(DEFAULT_FAN_DEGREE)),
                MIN_FAN_DEGREE,
                MAX_FAN_DEGREE,
            ),
            font_scale: clamp(
                self.font_scale.unwrap_or(i64::from(DEFAULT_FONT_SCALE)),
                MIN_FONT_SCALE,
                MAX_FONT_SCALE,
            ),
            hide_empty_segments: self.hide_empty_segments.unwrap_or(false),
            show_color_gradients: self.show_color_gradients.unwrap_or(false),
        }
    }
}

/// Parses an integer option, saturating oversized and fractional values to `i64`.
pub fn parse_lenient_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(saturate_float))
}

fn saturate_float(value: f64) -> Option<i64> {
    if value.is_nan() {
        return None;
    }
    // Float to int casts saturate at the i64 bounds.
    Some(value.round() as i64)
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientIntVisitor)
}

struct LenientIntVisitor;

impl<'de> Visitor<'de> for LenientIntVisitor {
    type Value = Option<i64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Some(i64::try_from(value).unwrap_or(i64::MAX)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(saturate_float(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(parse_lenient_int(value))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

fn clamp(value: i64, min: u32, max: u32) -> u32 {
    // Bounds fit in u32, so the narrowing cannot truncate.
    value.clamp(i64::from(min), i64::from(max)) as u32
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub default_generations: u32,
    pub routes: RouteTemplates,
    pub catalog: Catalog,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::webtrees(),
            default_generations: DEFAULT_GENERATIONS,
            routes: RouteTemplates::default(),
            catalog: Catalog::english(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeColors {
    background_male: Option<String>,
    background_female: Option<String>,
    background_unknown: Option<String>,
    font_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutesFile {
    update: Option<String>,
    individual: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_colors: Option<ThemeColors>,
    #[serde(default, deserialize_with = "lenient_int")]
    default_generations: Option<i64>,
    routes: Option<RoutesFile>,
    locale: Option<String>,
    rtl: Option<bool>,
    translations: Option<HashMap<String, String>>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a JSON5 config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::by_name(theme_name) {
            Some(theme) => config.theme = theme,
            None => log::warn!("unknown theme '{theme_name}', keeping default"),
        }
    }

    if let Some(colors) = parsed.theme_colors {
        if let Some(v) = colors.background_male {
            config.theme.background_male = v;
        }
        if let Some(v) = colors.background_female {
            config.theme.background_female = v;
        }
        if let Some(v) = colors.background_unknown {
            config.theme.background_unknown = v;
        }
        if let Some(v) = colors.font_color {
            config.theme.font_color = v;
        }
    }

    if let Some(v) = parsed.default_generations {
        config.default_generations = clamp(v, MIN_GENERATIONS, MAX_GENERATIONS);
    }

    if let Some(routes) = parsed.routes {
        if let Some(v) = routes.update {
            config.routes.update = v;
        }
        if let Some(v) = routes.individual {
            config.routes.individual = v;
        }
    }

    if let Some(v) = parsed.locale {
        config.catalog.locale = v;
    }
    if parsed.rtl.is_some() {
        config.catalog.rtl = parsed.rtl;
    }
    if let Some(v) = parsed.translations {
        config.catalog.messages = v;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Translator;

    #[test]
    fn generations_clamp() {
        let resolve = |g| ChartOptions {
            generations: Some(g),
            ..Default::default()
        }
        .resolve(4)
        .generations;
        assert_eq!(resolve(15), 10);
        assert_eq!(resolve(1), 2);
        assert_eq!(resolve(-3), 2);
        assert_eq!(resolve(6), 6);
    }

    #[test]
    fn fan_degree_and_font_scale_clamp() {
        let options = ChartOptions {
            fan_degree: Some(90),
            font_scale: Some(500),
            ..Default::default()
        };
        let settings = options.resolve(4);
        assert_eq!(settings.fan_degree, 180);
        assert_eq!(settings.font_scale, 200);

        let options = ChartOptions {
            fan_degree: Some(400),
            font_scale: Some(-1),
            ..Default::default()
        };
        let settings = options.resolve(4);
        assert_eq!(settings.fan_degree, 360);
        assert_eq!(settings.font_scale, 0);
    }

    #[test]
    fn defaults_apply() {
        let settings = ChartOptions::default().resolve(5);
        assert_eq!(
            settings,
            ChartSettings {
                generations: 5,
                fan_degree: 210,
                font_scale: 100,
                hide_empty_segments: false,
                show_color_gradients: false,
            }
        );
        assert_eq!(ChartOptions::default().resolve(25).generations, 10);
    }

    #[test]
    fn options_from_json() {
        let options: ChartOptions =
            serde_json::from_str(r#"{"generations": 7, "hideEmptySegments": true}"#).unwrap();
        assert_eq!(options.generations, Some(7));
        assert_eq!(options.hide_empty_segments, Some(true));
        assert_eq!(options.fan_degree, None);
    }

    #[test]
    fn out_of_range_numbers_deserialize_and_clamp() {
        let options: ChartOptions =
            serde_json::from_str(r#"{"generations": 10000000000000000000}"#).unwrap();
        assert_eq!(options.generations, Some(i64::MAX));
        assert_eq!(options.resolve(4).generations, 10);

        let options: ChartOptions = serde_json::from_str(r#"{"fanDegree": 270.0}"#).unwrap();
        assert_eq!(options.fan_degree, Some(270));
        assert_eq!(options.resolve(4).fan_degree, 270);

        let options: ChartOptions =
            serde_json::from_str(r#"{"fanDegree": -1e300, "fontScale": "150", "generations": null}"#)
                .unwrap();
        assert_eq!(options.resolve(3).fan_degree, 180);
        assert_eq!(options.resolve(3).font_scale, 150);
        assert_eq!(options.resolve(3).generations, 3);
    }

    #[test]
    fn lenient_int_parsing() {
        assert_eq!(parse_lenient_int(" 7 "), Some(7));
        assert_eq!(parse_lenient_int("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_lenient_int("-2.6"), Some(-3));
        assert_eq!(parse_lenient_int("NaN"), None);
        assert_eq!(parse_lenient_int("many"), None);
    }

    #[test]
    fn parses_json5_config() {
        let config = parse_config(
            r##"{
                // comments are allowed
                theme: "colors",
                themeColors: { backgroundMale: "#0000ff" },
                defaultGenerations: 12,
                routes: { individual: "/people/{tree}/" },
                locale: "he",
                translations: { "Deceased": "נפטר" },
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.background_male, "#0000ff");
        assert_eq!(config.theme.background_female, Theme::colors().background_female);
        assert_eq!(config.default_generations, 10);
        assert_eq!(config.routes.individual, "/people/{tree}/");
        assert!(config.catalog.is_rtl());
        assert_eq!(config.catalog.translate("Deceased", &[]), "נפטר");
    }

    #[test]
    fn missing_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.default_generations, DEFAULT_GENERATIONS);
        assert_eq!(config.theme, Theme::webtrees());
    }
}
