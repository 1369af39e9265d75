use crate::{
    partition::Group,
    ranges::unicode_range,
    render::{subset_file_name, StyleRule, Stylesheet},
    subsetter::Subsetter,
};
use anyhow::{Context, Result};
use fontsplit_common::{join_set::JoinSet, paths::store_url};
use std::{
    fs,
    ops::Deref,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, error, info, info_span};
use unicode_blocks::find_unicode_block;

/// The outcome of emitting every group.
#[derive(Clone, Debug, Default)]
pub struct EmitReport {
    /// The rules of every successfully generated subset, in group order.
    pub rules: Vec<StyleRule>,
    /// The indices of groups whose subset could not be generated.
    pub failed: Vec<usize>,
}

/// Writes one subset file per group.
#[derive(Clone)]
pub struct SubsetEmitter(Arc<SubsetEmitterData>);
impl Deref for SubsetEmitter {
    type Target = SubsetEmitterData;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
pub struct SubsetEmitterData {
    pub font: PathBuf,
    pub store: PathBuf,
    pub file_prefix: String,
    pub url_prefix: Option<String>,
    pub jobs: usize,
    subsetter: Arc<dyn Subsetter>,
}
impl SubsetEmitter {
    pub fn new(font: &Path, store: &Path, file_prefix: &str, subsetter: Arc<dyn Subsetter>) -> Self {
        SubsetEmitter(Arc::new(SubsetEmitterData {
            font: font.to_path_buf(),
            store: store.to_path_buf(),
            file_prefix: file_prefix.to_string(),
            url_prefix: None,
            jobs: 1,
            subsetter,
        }))
    }

    /// Sets the URL prefix used in place of the store directory in stylesheets.
    pub fn with_url_prefix(self, url_prefix: Option<String>) -> Self {
        self.modify(|data| data.url_prefix = url_prefix)
    }

    /// Sets how many subsets may be generated at once.
    pub fn with_jobs(self, jobs: usize) -> Self {
        self.modify(|data| data.jobs = jobs.max(1))
    }

    fn modify(self, func: impl FnOnce(&mut SubsetEmitterData)) -> Self {
        let mut data = Arc::try_unwrap(self.0).unwrap_or_else(|arc| SubsetEmitterData {
            font: arc.font.clone(),
            store: arc.store.clone(),
            file_prefix: arc.file_prefix.clone(),
            url_prefix: arc.url_prefix.clone(),
            jobs: arc.jobs,
            subsetter: arc.subsetter.clone(),
        });
        func(&mut data);
        SubsetEmitter(Arc::new(data))
    }

    /// Generates the subset of every non-empty group.
    ///
    /// A group that fails to subset is logged and recorded in the report, and does not stop the
    /// remaining groups.
    pub fn emit(&self, groups: &[Group]) -> Result<EmitReport> {
        fs::create_dir_all(&self.store)
            .with_context(|| format!("Could not create directory: {}", self.store.display()))?;

        let mut outcomes = Vec::new();
        if self.jobs <= 1 {
            for group in groups {
                if group.is_empty() {
                    debug!("Skipping empty group {:03}.", group.index());
                    continue;
                }
                outcomes.push((group.index(), self.emit_group(group)));
            }
        } else {
            outcomes = self.emit_parallel(groups)?;
        }

        let mut report = EmitReport::default();
        for (index, outcome) in outcomes {
            match outcome {
                Ok(rule) => report.rules.push(rule),
                Err(e) => {
                    error!("Failed to generate subset {index:03}: {e:#}");
                    report.failed.push(index);
                }
            }
        }
        Ok(report)
    }

    fn emit_parallel(&self, groups: &[Group]) -> Result<Vec<(usize, Result<StyleRule>)>> {
        debug!("Generating subsets with {} jobs.", self.jobs);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.jobs)
            .build()
            .context("Could not start the job runtime")?;
        runtime.block_on(async {
            let mut joins = JoinSet::new(self.jobs);
            for group in groups {
                if group.is_empty() {
                    debug!("Skipping empty group {:03}.", group.index());
                    continue;
                }
                let emitter = self.clone();
                let group = group.clone();
                joins.spawn_blocking(move || Ok((group.index(), emitter.emit_group(&group))));
            }
            joins.join().await
        })
    }

    fn emit_group(&self, group: &Group) -> Result<StyleRule> {
        let _span = info_span!("group", index = group.index()).entered();

        let file_name = subset_file_name(&self.file_prefix, group.index());
        let path = self.store.join(&file_name);
        self.subsetter.subset(&self.font, &group.text(), &path)?;

        let size = fs::metadata(&path).map(|x| x.len()).unwrap_or(0);
        info!(
            "Subset {:03}: {} characters, {:.2} KiB",
            group.index(),
            group.len(),
            size as f64 / 1024.0,
        );
        debug!("Subset {:03} blocks: {}", group.index(), block_names(group).join(", "));

        Ok(StyleRule {
            group: group.index(),
            url: store_url(&self.store, self.url_prefix.as_deref(), &file_name),
            unicode_range: unicode_range(group.codepoints()),
        })
    }
}

/// Writes a stylesheet to disk.
pub fn write_stylesheet(path: &Path, stylesheet: &Stylesheet) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Could not create directory: {}", parent.display()))?;
        }
    }
    fs::write(path, stylesheet.to_string())
        .with_context(|| format!("Could not write stylesheet: {}", path.display()))
}

fn block_names(group: &Group) -> Vec<&'static str> {
    let mut chars: Vec<_> = group.chars().collect();
    chars.sort();

    let mut names: Vec<&'static str> = Vec::new();
    for ch in chars {
        let name = find_unicode_block(ch).map(|x| x.name()).unwrap_or("Unknown");
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}
