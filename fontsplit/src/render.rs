use crate::config::StylesheetConfig;
use std::fmt::{Display, Formatter};

/// Strips a font family name down to a string usable as a file name prefix.
pub fn extract_name(str: &str) -> String {
    let mut out = String::new();
    for char in str.chars() {
        if char.is_ascii_alphanumeric() {
            out.push(char);
        }
        if out.len() == 20 {
            break;
        }
    }
    if out.is_empty() {
        out.push_str("font");
    }
    out
}

/// Returns the file name of the subset with the given group index.
pub fn subset_file_name(prefix: &str, index: usize) -> String {
    format!("{prefix}-subset-{index:03}.woff2")
}

/// Values shared by every `@font-face` rule of a stylesheet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FontFaceStyle {
    pub font_family: String,
    pub font_style: String,
    pub font_weight: String,
    pub font_display: String,
}
impl FontFaceStyle {
    pub fn new(font_family: &str, config: &StylesheetConfig) -> Self {
        FontFaceStyle {
            font_family: font_family.to_string(),
            font_style: config.font_style.clone(),
            font_weight: config.font_weight.clone(),
            font_display: config.font_display.clone(),
        }
    }
}

/// One `@font-face` rule, binding a subset file to the characters it covers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StyleRule {
    pub group: usize,
    pub url: String,
    pub unicode_range: String,
}

/// Writes a value as a quoted CSS string.
struct CssString<'a>(&'a str);
impl<'a> Display for CssString<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("\"")?;
        for ch in self.0.chars() {
            match ch {
                '"' | '\\' => write!(f, "\\{ch}")?,
                // The trailing space ends the hex escape.
                ch if ch.is_control() => write!(f, "\\{:x} ", ch as u32)?,
                ch => write!(f, "{ch}")?,
            }
        }
        f.write_str("\"")
    }
}

struct StyleRuleDisplay<'a> {
    style: &'a FontFaceStyle,
    rule: &'a StyleRule,
}
impl<'a> Display for StyleRuleDisplay<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "@font-face {{")?;
        writeln!(f, "  font-family: {};", CssString(&self.style.font_family))?;
        writeln!(f, "  font-style: {};", self.style.font_style)?;
        writeln!(f, "  font-weight: {};", self.style.font_weight)?;
        writeln!(f, "  font-display: {};", self.style.font_display)?;
        writeln!(f, "  src: url({}) format(\"woff2\");", CssString(&self.rule.url))?;
        writeln!(f, "  unicode-range: {};", self.rule.unicode_range)?;
        write!(f, "}}")
    }
}

/// A stylesheet with one rule per generated subset.
#[derive(Clone, Debug)]
pub struct Stylesheet {
    pub style: FontFaceStyle,
    pub rules: Vec<StyleRule>,
}
impl Stylesheet {
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
impl Display for Stylesheet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "/* {} subset webfont */", self.style.font_family.replace("*/", "* /"))?;
        writeln!(f, "/* Generated by fontsplit {} */", env!("CARGO_PKG_VERSION"))?;
        writeln!(f, "/* Contains {} subsets */", self.rules.len())?;
        writeln!(f)?;

        let mut first = true;
        for rule in &self.rules {
            if first {
                first = false;
            } else {
                writeln!(f)?;
                writeln!(f)?;
            }
            write!(f, "{}", StyleRuleDisplay { style: &self.style, rule })?;
        }
        Ok(())
    }
}
