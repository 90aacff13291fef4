use crate::chart::FanChart;
use crate::config::{ChartOptions, load_config, parse_lenient_int};
use crate::repository::MemoryRepository;
use crate::tree::VisibleOnly;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "fanchart", version, about = "Ancestor fan chart data builder")]
pub struct Args {
    /// Tree document (JSON with individuals and families)
    #[arg(short = 'd', long = "data")]
    pub data: PathBuf,

    /// Identifier of the root individual
    #[arg(short = 'r', long = "root")]
    pub root: String,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config file (JSON5: theme, routes, locale, translations)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Emit only the ancestor tree, as for an update request
    #[arg(long = "update")]
    pub update: bool,

    /// Number of generations (clamped to 2..=10)
    #[arg(short = 'g', long = "generations", allow_negative_numbers = true, value_parser = parse_number)]
    pub generations: Option<i64>,

    /// Fan degree (clamped to 180..=360)
    #[arg(long = "fanDegree", allow_negative_numbers = true, value_parser = parse_number)]
    pub fan_degree: Option<i64>,

    /// Font scale in percent (clamped to 0..=200)
    #[arg(long = "fontScale", allow_negative_numbers = true, value_parser = parse_number)]
    pub font_scale: Option<i64>,

    #[arg(long = "hideEmptySegments")]
    pub hide_empty_segments: bool,

    #[arg(long = "showColorGradients")]
    pub show_color_gradients: bool,

    /// Leave out ancestors that are not visible, not just a hidden root
    #[arg(long = "visibleOnly")]
    pub visible_only: bool,

    /// Pretty-print the JSON output
    #[arg(long = "pretty")]
    pub pretty: bool,

    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

fn parse_number(raw: &str) -> Result<i64, String> {
    parse_lenient_int(raw).ok_or_else(|| format!("'{raw}' is not a number"))
}

impl Args {
    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            generations: self.generations,
            fan_degree: self.fan_degree,
            font_scale: self.font_scale,
            hide_empty_segments: Some(self.hide_empty_segments),
            show_color_gradients: Some(self.show_color_gradients),
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let config = load_config(args.config.as_deref())?;
    let repo = MemoryRepository::load(&args.data)?;
    let tree_name = tree_name(&repo, &args.data);
    let visible = VisibleOnly { repository: &repo };
    let mut chart = FanChart::from_config(&repo, &config, &tree_name);
    if args.visible_only {
        chart = chart.with_filter(&visible);
    }

    let options = args.chart_options();
    let json = if args.update {
        let tree = chart.update(&args.root, &options)?;
        to_json(&tree, args.pretty)?
    } else {
        let payload = chart.full_chart(&args.root, &options)?;
        to_json(&payload, args.pretty)?
    };
    write_output(&json, args.output.as_deref())
}

fn init_logging(args: &Args) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn tree_name(repo: &MemoryRepository, path: &Path) -> String {
    if !repo.name.is_empty() {
        return repo.name.clone();
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("tree")
        .to_string()
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn write_output(json: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            println!("{}", json);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chart_flags() {
        let args = Args::try_parse_from([
            "fanchart",
            "-d",
            "tree.json",
            "-r",
            "I1",
            "-g",
            "15",
            "--fanDegree",
            "90",
            "--hideEmptySegments",
        ])
        .unwrap();
        let settings = args.chart_options().resolve(4);
        assert_eq!(settings.generations, 10);
        assert_eq!(settings.fan_degree, 180);
        assert!(settings.hide_empty_segments);
        assert!(!settings.show_color_gradients);
        assert!(!args.update);
    }

    #[test]
    fn oversized_and_fractional_numbers_clamp() {
        let args = Args::try_parse_from([
            "fanchart",
            "-d",
            "tree.json",
            "-r",
            "I1",
            "-g",
            "99999999999999999999",
            "--fanDegree",
            "270.4",
            "--fontScale",
            "-500",
        ])
        .unwrap();
        let settings = args.chart_options().resolve(4);
        assert_eq!(settings.generations, 10);
        assert_eq!(settings.fan_degree, 270);
        assert_eq!(settings.font_scale, 0);

        assert!(
            Args::try_parse_from(["fanchart", "-d", "t.json", "-r", "I1", "-g", "many"]).is_err()
        );
    }

    #[test]
    fn root_is_required() {
        assert!(Args::try_parse_from(["fanchart", "-d", "tree.json"]).is_err());
    }

    #[test]
    fn tree_name_falls_back_to_file_stem() {
        let repo = MemoryRepository::new("");
        assert_eq!(tree_name(&repo, Path::new("/data/kennedy.json")), "kennedy");
        let repo = MemoryRepository::new("royals");
        assert_eq!(tree_name(&repo, Path::new("/data/kennedy.json")), "royals");
    }
}
