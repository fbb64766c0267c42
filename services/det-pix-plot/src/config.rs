//! Environment-driven settings.
//!
//! Settings never come from the command line, whose grammar is fixed; they are
//! read from `DET_PIX_*` variables, optionally seeded from a `.env` file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use renderer::figure::{MIN_HEIGHT, MIN_WIDTH};
use renderer::FigureOptions;
use tracing::Level;

use crate::args::BIN_NAME;

#[derive(Parser, Debug, Clone)]
#[command(name = BIN_NAME)]
pub struct Settings {
    /// Log level
    #[arg(long, env = "DET_PIX_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(
        long,
        env = "DET_PIX_LOG_JSON",
        default_value_t = false,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: bool,

    /// Directory figures are written to
    #[arg(long, env = "DET_PIX_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Command used to show a written figure; the figure path is appended
    #[arg(long, env = "DET_PIX_VIEWER")]
    pub viewer: Option<String>,

    /// Figure width in pixels
    #[arg(
        long,
        env = "DET_PIX_FIGURE_WIDTH",
        default_value_t = 800,
        value_parser = clap::value_parser!(u32).range(MIN_WIDTH as i64..)
    )]
    pub figure_width: u32,

    /// Figure height in pixels
    #[arg(
        long,
        env = "DET_PIX_FIGURE_HEIGHT",
        default_value_t = 640,
        value_parser = clap::value_parser!(u32).range(MIN_HEIGHT as i64..)
    )]
    pub figure_height: u32,
}

impl Settings {
    /// Read settings from the environment only.
    pub fn from_env() -> Result<Self> {
        Settings::try_parse_from([BIN_NAME]).context("Invalid DET_PIX_* environment settings")
    }

    pub fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Non-empty viewer command, if one is configured.
    pub fn viewer(&self) -> Option<&str> {
        self.viewer
            .as_deref()
            .map(str::trim)
            .filter(|cmd| !cmd.is_empty())
    }

    pub fn figure_options(&self, title: Option<String>) -> FigureOptions {
        FigureOptions {
            width: self.figure_width,
            height: self.figure_height,
            labels: true,
            title,
        }
    }
}
