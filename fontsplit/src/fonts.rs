use anyhow::*;
use roaring::RoaringBitmap;
use std::{
    fmt::{Debug, Formatter},
    fs,
    path::Path,
};
use tracing::debug;
use ttf_parser::{name_id, Face};
use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

/// Returns whether a character can be placed into a subset.
///
/// Excludes the null character and anything in the `C*` general categories (control, format,
/// surrogate, private use and unassigned).
pub fn is_renderable(ch: char) -> bool {
    ch != '\0' && ch.general_category_group() != GeneralCategoryGroup::Other
}

/// The set of renderable characters covered by a font, in codepoint order.
#[derive(Clone, Default, PartialEq)]
pub struct CharacterSet(RoaringBitmap);
impl CharacterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from raw codepoints, dropping invalid and non-renderable ones.
    pub fn from_codepoints(codepoints: impl IntoIterator<Item = u32>) -> Self {
        let mut set = CharacterSet::new();
        for cp in codepoints {
            if let Some(ch) = char::from_u32(cp) {
                set.insert(ch);
            }
        }
        set
    }

    /// Inserts a character, returning whether it was accepted.
    pub fn insert(&mut self, ch: char) -> bool {
        is_renderable(ch) && self.0.insert(ch as u32)
    }

    pub fn len(&self) -> usize {
        self.0.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the characters in ascending codepoint order.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().filter_map(char::from_u32)
    }

    pub fn codepoints(&self) -> &RoaringBitmap {
        &self.0
    }
}
impl Debug for CharacterSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[set of {} characters]", self.0.len())
    }
}

/// The information needed from a font to split it.
#[derive(Clone, Debug)]
pub struct LoadedFont {
    font_family: String,
    characters: CharacterSet,
}
impl LoadedFont {
    /// Reads a font file.
    ///
    /// The font data is only held for the duration of this call.
    pub fn load(path: &Path) -> Result<LoadedFont> {
        let buffer = fs::read(path)
            .with_context(|| format!("Could not read font file: {}", path.display()))?;
        let fallback_name = path
            .file_stem()
            .map(|x| x.to_string_lossy().to_string())
            .unwrap_or_else(|| "font".to_string());
        Self::parse(&buffer, &fallback_name)
            .with_context(|| format!("Could not load font: {}", path.display()))
    }

    /// Parses in-memory font data. `fallback_name` is used if the font has no family name.
    pub fn parse(buffer: &[u8], fallback_name: &str) -> Result<LoadedFont> {
        let is_woff = buffer.len() >= 4 && &buffer[0..4] == b"wOFF";
        let is_woff2 = buffer.len() >= 4 && &buffer[0..4] == b"wOF2";
        if is_woff || is_woff2 {
            bail!("woff/woff2 input is not supported. Please convert to .ttf or .otf first.");
        }

        let face = Face::parse(buffer, 0)?;
        let Some(cmap) = face.tables().cmap else {
            bail!("Font has no character map.");
        };

        let mut codepoints = Vec::new();
        let mut subtable_count = 0;
        for subtable in cmap.subtables {
            subtable.codepoints(|cp| codepoints.push(cp));
            subtable_count += 1;
        }
        let characters = CharacterSet::from_codepoints(codepoints);

        let font_family = Self::find_name(&face, name_id::TYPOGRAPHIC_FAMILY)
            .or_else(|| Self::find_name(&face, name_id::FAMILY))
            .unwrap_or_else(|| fallback_name.to_string());

        debug!(
            "Loaded font: {font_family} / {} characters from {subtable_count} cmap subtables",
            characters.len(),
        );

        Ok(LoadedFont { font_family, characters })
    }

    fn find_name(face: &Face, id: u16) -> Option<String> {
        face.names()
            .into_iter()
            .filter(|name| name.name_id == id && name.is_unicode())
            .find_map(|name| name.to_string())
            .filter(|name| !name.trim().is_empty())
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn characters(&self) -> &CharacterSet {
        &self.characters
    }
}
