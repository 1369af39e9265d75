use anyhow::*;
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::debug;

/// Settings read from a TOML configuration file.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SplitterConfig {
    pub stylesheet: StylesheetConfig,
    pub subsetter: SubsetterConfig,
}
impl SplitterConfig {
    pub fn load(path: &Path) -> Result<SplitterConfig> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read configuration: {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("Invalid configuration: {}", path.display()))?;
        debug!("Configuration: {config:#?}");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<SplitterConfig> {
        Ok(toml::from_str(text)?)
    }
}

/// How the `@font-face` rules are written.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StylesheetConfig {
    /// The `font-family` name. Defaults to the family name stored in the font.
    pub font_family: Option<String>,
    /// The prefix of subset file names. Defaults to one derived from the family name.
    pub file_prefix: Option<String>,
    /// Replaces the output directory in `src` URLs.
    pub url_prefix: Option<String>,
    pub font_style: String,
    pub font_weight: String,
    pub font_display: String,
}
impl Default for StylesheetConfig {
    fn default() -> Self {
        StylesheetConfig {
            font_family: None,
            file_prefix: None,
            url_prefix: None,
            font_style: "normal".to_string(),
            font_weight: "400".to_string(),
            font_display: "swap".to_string(),
        }
    }
}

/// How the external subsetting tool is invoked.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SubsetterConfig {
    pub program: String,
    pub flavor: String,
    pub with_zopfli: bool,
    pub desubroutinize: bool,
    pub hinting_tables: Option<String>,
    pub extra_args: Vec<String>,
}
impl Default for SubsetterConfig {
    fn default() -> Self {
        SubsetterConfig {
            program: "pyftsubset".to_string(),
            flavor: "woff2".to_string(),
            with_zopfli: true,
            desubroutinize: true,
            hinting_tables: Some("*".to_string()),
            extra_args: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(SplitterConfig::parse("").unwrap(), SplitterConfig::default());
    }

    #[test]
    fn partial_config() {
        let config = SplitterConfig::parse(
            r#"
            [stylesheet]
            font_family = "Alibaba PuHuiTi 3.0"
            url_prefix = "/fonts/"

            [subsetter]
            program = "/opt/fonttools/bin/pyftsubset"
            with_zopfli = false
            extra_args = ["--no-layout-closure"]
            "#,
        )
        .unwrap();

        assert_eq!(config.stylesheet.font_family.as_deref(), Some("Alibaba PuHuiTi 3.0"));
        assert_eq!(config.stylesheet.url_prefix.as_deref(), Some("/fonts/"));
        assert_eq!(config.stylesheet.font_weight, "400");
        assert_eq!(config.subsetter.program, "/opt/fonttools/bin/pyftsubset");
        assert!(!config.subsetter.with_zopfli);
        assert!(config.subsetter.desubroutinize);
        assert_eq!(config.subsetter.extra_args, vec!["--no-layout-closure"]);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(SplitterConfig::parse("[stylesheet]\nfont_colour = \"red\"\n").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SplitterConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("nope.toml"));
    }
}
