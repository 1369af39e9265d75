//! Splits a font into subsets of characters ranked by how frequently they are used, so that
//! browsers only download the parts of a large (typically CJK) font that a page needs.

mod config;
mod emitter;
mod fonts;
mod frequency;
mod partition;
mod ranges;
mod render;
mod subsetter;

pub use config::{SplitterConfig, StylesheetConfig, SubsetterConfig};
pub use emitter::{write_stylesheet, EmitReport, SubsetEmitter};
pub use fonts::{is_renderable, CharacterSet, LoadedFont};
pub use frequency::FrequencyTable;
pub use partition::{group_bounds, partition, rank_characters, split_ranked, Group};
pub use ranges::{decode_range, unicode_range, UnicodeRange};
pub use render::{extract_name, subset_file_name, FontFaceStyle, StyleRule, Stylesheet};
pub use subsetter::{PyftSubset, Subsetter};

use anyhow::*;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;

/// Everything needed to split one font.
#[derive(Clone, Debug)]
pub struct SplitPlan {
    pub input: PathBuf,
    pub freq: PathBuf,
    pub output_dir: PathBuf,
    pub css: PathBuf,
    pub groups: usize,
    pub jobs: usize,
    pub config: SplitterConfig,
}
impl SplitPlan {
    pub fn new(input: &Path, freq: &Path) -> SplitPlan {
        SplitPlan {
            input: input.to_path_buf(),
            freq: freq.to_path_buf(),
            output_dir: PathBuf::from("subsets"),
            css: PathBuf::from("result.css"),
            groups: 80,
            jobs: 1,
            config: SplitterConfig::default(),
        }
    }

    /// Checks the plan before anything is read or written.
    pub fn validate(&self) -> Result<()> {
        if !self.input.is_file() {
            bail!("Input file does not exist: {}", self.input.display());
        }
        if !self.freq.is_file() {
            bail!("Frequency file does not exist: {}", self.freq.display());
        }
        ensure!(self.groups > 0, "The group count must be at least 1.");
        Ok(())
    }
}

/// The result of a completed split.
#[derive(Clone, Debug)]
pub struct SplitReport {
    pub font_family: String,
    pub character_count: usize,
    pub emitted: usize,
    pub failed: Vec<usize>,
}
impl SplitReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Splits a font using `pyftsubset` as configured in the plan.
pub fn split_font(plan: &SplitPlan) -> Result<SplitReport> {
    let subsetter = Arc::new(PyftSubset::new(plan.config.subsetter.clone()));
    split_font_with(plan, subsetter)
}

/// Splits a font using the given subsetter.
pub fn split_font_with(plan: &SplitPlan, subsetter: Arc<dyn Subsetter>) -> Result<SplitReport> {
    plan.validate()?;

    info!("Loading character frequencies from {}...", plan.freq.display());
    let freq = FrequencyTable::load(&plan.freq)?;
    info!("Loaded {} character frequencies.", freq.len());

    info!("Reading characters from {}...", plan.input.display());
    let font = LoadedFont::load(&plan.input)?;
    info!("Font contains {} characters.", font.characters().len());

    let style = &plan.config.stylesheet;
    let font_family = style.font_family.clone().unwrap_or_else(|| font.font_family().to_string());
    let file_prefix = style.file_prefix.clone().unwrap_or_else(|| extract_name(&font_family));

    info!("Splitting characters into {} groups...", plan.groups);
    let groups = partition(font.characters(), &freq, plan.groups)?;

    info!("Generating subsets in {}...", plan.output_dir.display());
    let report = SubsetEmitter::new(&plan.input, &plan.output_dir, &file_prefix, subsetter)
        .with_url_prefix(style.url_prefix.clone())
        .with_jobs(plan.jobs)
        .emit(&groups)?;

    info!("Writing stylesheet to {}...", plan.css.display());
    let stylesheet =
        Stylesheet { style: FontFaceStyle::new(&font_family, style), rules: report.rules };
    write_stylesheet(&plan.css, &stylesheet)?;
    info!("Generated {} subsets.", stylesheet.rule_count());

    Ok(SplitReport {
        font_family,
        character_count: font.characters().len(),
        emitted: stylesheet.rule_count(),
        failed: report.failed,
    })
}
