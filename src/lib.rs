pub mod chart;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod i18n;
pub mod ir;
pub mod names;
pub mod projector;
pub mod repository;
pub mod script;
pub mod theme;
pub mod tree;

pub use chart::{ChartError, ChartPayload, FanChart, RouteBuilder, RouteTemplates};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{ChartOptions, ChartSettings, Config, load_config, parse_config};
pub use i18n::{Catalog, Translator};
pub use ir::{AncestorNode, FamilyRecord, PersonRecord, Sex};
pub use repository::{MemoryRepository, Repository, TreeFile};
pub use theme::{ColorResolver, Theme};
pub use tree::{AncestorFilter, ChartContext, ShowAll, VisibleOnly, build_ancestor_tree};
