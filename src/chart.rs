//! Request-level entry points: root resolution, option clamping, payloads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ChartOptions, ChartSettings, Config, DEFAULT_GENERATIONS};
use crate::i18n::{MSG_MOVE_HINT, MSG_ZOOM_HINT, Translator};
use crate::ir::{AncestorNode, PersonRecord};
use crate::repository::Repository;
use crate::projector::background_color;
use crate::theme::{ColorResolver, FALLBACK_FONT_COLOR};
use crate::tree::{AncestorFilter, ChartContext, ShowAll, build_ancestor_tree};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("Individual not found: {0}")]
    NotFound(String),

    #[error("Access denied to individual: {0}")]
    AccessDenied(String),
}

/// Produces client-side URLs. Both end in an empty identifier slot.
pub trait RouteBuilder {
    fn update_url(&self, tree: &str, settings: &ChartSettings) -> String;

    fn individual_url(&self, tree: &str) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTemplates {
    /// Path of the update action; `{tree}` is replaced by the tree name.
    pub update: String,
    /// Individual page prefix; `{tree}` is replaced by the tree name.
    pub individual: String,
}

impl Default for RouteTemplates {
    fn default() -> Self {
        Self {
            update: "/tree/{tree}/fan-chart/update".to_string(),
            individual: "/tree/{tree}/individual/".to_string(),
        }
    }
}

impl RouteBuilder for RouteTemplates {
    fn update_url(&self, tree: &str, settings: &ChartSettings) -> String {
        let path = self.update.replace("{tree}", &encode_segment(tree));
        let separator = if path.contains('?') { '&' } else { '?' };
        format!(
            "{path}{separator}generations={}&fanDegree={}&fontScale={}&hideEmptySegments={}&showColorGradients={}&xref=",
            settings.generations,
            settings.fan_degree,
            settings.font_scale,
            u8::from(settings.hide_empty_segments),
            u8::from(settings.show_color_gradients),
        )
    }

    fn individual_url(&self, tree: &str) -> String {
        self.individual.replace("{tree}", &encode_segment(tree))
    }
}

fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartLabels {
    pub zoom: String,
    #[serde(rename = "move")]
    pub move_hint: String,
}

/// Everything the client needs to draw the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload {
    pub rtl: bool,
    pub fan_degree: u32,
    pub generations: u32,
    pub default_color: String,
    pub font_scale: u32,
    pub font_color: String,
    pub hide_empty_segments: bool,
    pub show_color_gradients: bool,
    pub update_url: String,
    pub individual_url: String,
    pub data: AncestorNode,
    pub labels: ChartLabels,
}

pub struct FanChart<'a> {
    repository: &'a dyn Repository,
    colors: &'a dyn ColorResolver,
    translator: &'a dyn Translator,
    routes: &'a dyn RouteBuilder,
    tree_name: String,
    default_generations: u32,
    filter: Option<&'a dyn AncestorFilter>,
}

impl<'a> FanChart<'a> {
    pub fn new(
        repository: &'a dyn Repository,
        colors: &'a dyn ColorResolver,
        translator: &'a dyn Translator,
        routes: &'a dyn RouteBuilder,
        tree_name: &str,
    ) -> Self {
        Self {
            repository,
            colors,
            translator,
            routes,
            tree_name: tree_name.to_string(),
            default_generations: DEFAULT_GENERATIONS,
            filter: None,
        }
    }

    pub fn from_config(repository: &'a dyn Repository, config: &'a Config, tree_name: &str) -> Self {
        Self::new(
            repository,
            &config.theme,
            &config.catalog,
            &config.routes,
            tree_name,
        )
        .with_default_generations(config.default_generations)
    }

    /// Generations shown when a request does not ask for a number.
    pub fn with_default_generations(mut self, generations: u32) -> Self {
        self.default_generations = generations;
        self
    }

    /// Restricts which ancestors above the root enter the tree.
    pub fn with_filter(mut self, filter: &'a dyn AncestorFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn full_chart(&self, root: &str, options: &ChartOptions) -> Result<ChartPayload, ChartError> {
        let person = self.resolve_root(root)?;
        let settings = options.resolve(self.default_generations);
        let data = self.build(&person, &settings);

        Ok(ChartPayload {
            rtl: self.translator.is_rtl(),
            fan_degree: settings.fan_degree,
            generations: settings.generations,
            default_color: background_color(None, self.colors),
            font_scale: settings.font_scale,
            font_color: self
                .colors
                .color("chart-font-color")
                .unwrap_or_else(|| FALLBACK_FONT_COLOR.to_string()),
            hide_empty_segments: settings.hide_empty_segments,
            show_color_gradients: settings.show_color_gradients,
            update_url: self.routes.update_url(&self.tree_name, &settings),
            individual_url: self.routes.individual_url(&self.tree_name),
            data,
            labels: ChartLabels {
                zoom: self.translator.translate(MSG_ZOOM_HINT, &[]),
                move_hint: self.translator.translate(MSG_MOVE_HINT, &[]),
            },
        })
    }

    /// Tree only, for re-centering the chart on another individual.
    pub fn update(&self, root: &str, options: &ChartOptions) -> Result<AncestorNode, ChartError> {
        let person = self.resolve_root(root)?;
        let settings = options.resolve(self.default_generations);
        Ok(self.build(&person, &settings))
    }

    fn resolve_root(&self, xref: &str) -> Result<PersonRecord, ChartError> {
        let Some(person) = self.repository.person(xref) else {
            log::debug!("root {xref} not found");
            return Err(ChartError::NotFound(xref.to_string()));
        };
        if !self.repository.can_show(&person) {
            log::debug!("root {xref} is not visible");
            return Err(ChartError::AccessDenied(xref.to_string()));
        }
        Ok(person)
    }

    fn build(&self, root: &PersonRecord, settings: &ChartSettings) -> AncestorNode {
        let ctx = ChartContext::new(
            settings.generations,
            self.colors,
            self.translator,
            self.filter.unwrap_or(&ShowAll),
        );
        build_ancestor_tree(self.repository, root, &ctx)
    }
}

impl std::fmt::Debug for FanChart<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanChart")
            .field("tree_name", &self.tree_name)
            .field("default_generations", &self.default_generations)
            .finish_non_exhaustive()
    }
}
