use crate::{fonts::CharacterSet, frequency::FrequencyTable};
use anyhow::*;
use std::ops::Range;

/// A run of characters that will be placed into one subset.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Group {
    index: usize,
    chars: Vec<(char, u64)>,
}
impl Group {
    /// Returns the position of this group in frequency rank.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the characters of this group, most frequent first.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().map(|(ch, _)| *ch)
    }

    /// Returns the characters and their frequencies.
    pub fn entries(&self) -> &[(char, u64)] {
        &self.chars
    }

    /// Returns the characters concatenated into a string.
    pub fn text(&self) -> String {
        self.chars().collect()
    }

    pub fn codepoints(&self) -> impl Iterator<Item = u32> + '_ {
        self.chars().map(|ch| ch as u32)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Pairs every character of the set with its frequency, sorted by descending frequency.
///
/// Characters with the same frequency stay in codepoint order.
pub fn rank_characters(chars: &CharacterSet, freq: &FrequencyTable) -> Vec<(char, u64)> {
    let mut ranked: Vec<_> = chars.chars().map(|ch| (ch, freq.get(ch))).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Returns the index range of group `idx` when splitting `total` items into `count` groups.
pub fn group_bounds(idx: usize, total: usize, count: usize) -> Range<usize> {
    idx * total / count..(idx + 1) * total / count
}

/// Splits ranked characters into exactly `count` contiguous groups of nearly equal size.
pub fn split_ranked(ranked: &[(char, u64)], count: usize) -> Result<Vec<Group>> {
    ensure!(count > 0, "The group count must be at least 1.");
    let total = ranked.len();
    Ok((0..count)
        .map(|index| Group { index, chars: ranked[group_bounds(index, total, count)].to_vec() })
        .collect())
}

/// Ranks the characters of a font by frequency and splits them into `count` groups.
pub fn partition(chars: &CharacterSet, freq: &FrequencyTable, count: usize) -> Result<Vec<Group>> {
    ensure!(count > 0, "The group count must be at least 1.");
    split_ranked(&rank_characters(chars, freq), count)
}
