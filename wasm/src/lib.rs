use fan_chart::{ChartOptions, Config, FanChart, MemoryRepository, Theme};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FanChartRequest {
    theme: Option<String>,
    locale: Option<String>,
    #[serde(flatten)]
    options: ChartOptions,
}

fn build_config(request: &FanChartRequest) -> Config {
    let mut config = Config::default();
    if let Some(theme) = request.theme.as_deref().and_then(Theme::by_name) {
        config.theme = theme;
    }
    if let Some(locale) = request.locale.as_deref() {
        config.catalog.locale = locale.to_string();
    }
    config
}

fn build_payload_json(tree_json: &str, root: &str, options_json: Option<&str>) -> Result<String, String> {
    let request = match options_json {
        Some(raw) => serde_json::from_str::<FanChartRequest>(raw).map_err(|error| error.to_string())?,
        None => FanChartRequest::default(),
    };
    let repo = MemoryRepository::from_json_str(tree_json).map_err(|error| format!("{error:#}"))?;
    let config = build_config(&request);
    let chart = FanChart::from_config(&repo, &config, &repo.name);
    let payload = chart
        .full_chart(root, &request.options)
        .map_err(|error| error.to_string())?;
    serde_json::to_string(&payload).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn render_fan_chart_json(
    tree_json: &str,
    root: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    build_payload_json(tree_json, root, options_json.as_deref())
        .map_err(|error| JsValue::from_str(&error))
}

#[cfg(test)]
mod tests {
    use crate::build_payload_json;

    const TREE: &str = r#"{
        "name": "demo",
        "individuals": [
            {"xref": "I1", "sex": "F", "name": "<surname>Smith</surname> Jane", "childFamily": "F1"},
            {"xref": "I2", "sex": "M", "name": "<surname>Smith</surname> John", "birth": 1900}
        ],
        "families": [{"xref": "F1", "husband": "I2"}]
    }"#;

    #[test]
    fn builds_payload_with_options() {
        let json = build_payload_json(TREE, "I1", Some(r#"{"generations": 40, "theme": "colors"}"#))
            .expect("payload should build");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["generations"], 10);
        assert_eq!(value["data"]["lastNames"][0], "Smith");
        assert_eq!(value["data"]["children"][0]["timespan"], "Born: 1900");
        assert_eq!(value["data"]["color"], "#f2b8d8");
    }

    #[test]
    fn out_of_range_options_are_clamped() {
        let options = r#"{"generations": 10000000000000000000, "fanDegree": 270.0, "fontScale": "250"}"#;
        let json = build_payload_json(TREE, "I1", Some(options)).expect("payload should build");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["generations"], 10);
        assert_eq!(value["fanDegree"], 270);
        assert_eq!(value["fontScale"], 200);
    }

    #[test]
    fn reports_missing_root() {
        let error = build_payload_json(TREE, "I7", None).unwrap_err();
        assert!(error.contains("I7"));
    }
}
