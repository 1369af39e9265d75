use anyhow::{Context, Result};
use std::{collections::HashMap, fs, path::Path};
use tracing::{debug, warn};

/// A table of how frequently each character is used.
#[derive(Clone, Debug, Default)]
pub struct FrequencyTable {
    entries: HashMap<char, u64>,
}
impl FrequencyTable {
    /// Loads a frequency table from a file.
    ///
    /// Malformed lines are reported and skipped. Only failing to read the file is an error.
    pub fn load(path: &Path) -> Result<FrequencyTable> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read frequency table: {}", path.display()))?;
        let table = Self::parse(&text);
        debug!("Loaded {} character frequencies from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parses a frequency table from text.
    ///
    /// Each line holds a character and its frequency, separated by a tab if the line contains
    /// one, or a comma otherwise. Blank lines and lines starting with `#` are ignored.
    pub fn parse(text: &str) -> FrequencyTable {
        let mut entries = HashMap::new();
        for (idx, line) in text.lines().enumerate() {
            let line_num = idx + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = if line.contains('\t') { line.split('\t') } else { line.split(',') };
            let (Some(ch), Some(freq)) = (fields.next(), fields.next()) else {
                warn!("Line {line_num} is malformed: {line}");
                continue;
            };

            let mut chars = ch.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => {
                    warn!("Line {line_num} does not start with a single character: {line}");
                    continue;
                }
            };
            let Some(value) = freq.trim().parse::<u64>().ok() else {
                warn!("Line {line_num} has an invalid frequency: {freq}");
                continue;
            };
            entries.insert(ch, value);
        }
        FrequencyTable { entries }
    }

    /// Returns the frequency of a character, or 0 if it is not in the table.
    pub fn get(&self, ch: char) -> u64 {
        self.entries.get(&ch).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
impl FromIterator<(char, u64)> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = (char, u64)>>(iter: T) -> Self {
        FrequencyTable { entries: iter.into_iter().collect() }
    }
}
