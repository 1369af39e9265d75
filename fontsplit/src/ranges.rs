use roaring::RoaringBitmap;
use std::{
    fmt::{Display, Formatter},
    ops::RangeInclusive,
};

/// Merges the codepoints of a bitmap into runs of consecutive values.
pub fn decode_range(bitmap: &RoaringBitmap) -> Vec<RangeInclusive<u32>> {
    let mut range_start = None;
    let mut range_last = 0;
    let mut ranges = Vec::new();
    for ch in bitmap {
        if let Some(start) = range_start {
            if ch != range_last + 1 {
                ranges.push(start..=range_last);
                range_start = Some(ch);
            }
        } else {
            range_start = Some(ch);
        }
        range_last = ch;
    }
    if let Some(start) = range_start {
        ranges.push(start..=range_last);
    }
    ranges
}

/// Formats a list of ranges as the value of a CSS `unicode-range` property.
pub struct UnicodeRange<'a>(pub &'a [RangeInclusive<u32>]);
impl<'a> Display for UnicodeRange<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for range in self.0 {
            if first {
                first = false;
            } else {
                f.write_str(", ")?;
            }

            if range.start() == range.end() {
                write!(f, "U+{:04X}", range.start())?;
            } else {
                write!(f, "U+{:04X}-{:04X}", range.start(), range.end())?;
            }
        }
        Ok(())
    }
}

/// Computes the `unicode-range` expression covering the given codepoints, in any order.
pub fn unicode_range(codes: impl IntoIterator<Item = u32>) -> String {
    let bitmap: RoaringBitmap = codes.into_iter().collect();
    UnicodeRange(&decode_range(&bitmap)).to_string()
}
