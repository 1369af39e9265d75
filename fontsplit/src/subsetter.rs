use crate::config::SubsetterConfig;
use anyhow::{bail, Context, Result};
use std::{
    ffi::OsString,
    fs, io,
    io::Write,
    path::Path,
    process::{Command, Stdio},
};
use tracing::debug;

/// Produces a subset of a font containing the glyphs needed to render some text.
///
/// Implementations write exactly one file at `output` on success.
pub trait Subsetter: Send + Sync {
    fn subset(&self, font: &Path, text: &str, output: &Path) -> Result<()>;
}

/// Subsets fonts by running fontTools' `pyftsubset`.
#[derive(Clone, Debug, Default)]
pub struct PyftSubset {
    config: SubsetterConfig,
}
impl PyftSubset {
    pub fn new(config: SubsetterConfig) -> Self {
        PyftSubset { config }
    }

    /// Returns the arguments passed to the subsetting program.
    ///
    /// The text is read from `text_file`, as a large group does not fit in one argument.
    pub fn args(&self, font: &Path, text_file: &Path, output: &Path) -> Vec<OsString> {
        let mut args = vec![font.as_os_str().to_owned()];

        let mut text_arg = OsString::from("--text-file=");
        text_arg.push(text_file);
        args.push(text_arg);

        let mut output_arg = OsString::from("--output-file=");
        output_arg.push(output);
        args.push(output_arg);

        args.push(format!("--flavor={}", self.config.flavor).into());
        if self.config.with_zopfli {
            args.push("--with-zopfli".into());
        }
        if self.config.desubroutinize {
            args.push("--desubroutinize".into());
        }
        if let Some(tables) = &self.config.hinting_tables {
            args.push(format!("--hinting-tables={tables}").into());
        }
        args.extend(self.config.extra_args.iter().map(OsString::from));
        args
    }
}
impl Subsetter for PyftSubset {
    fn subset(&self, font: &Path, text: &str, output: &Path) -> Result<()> {
        // A file left by an earlier run must not pass for this run's output.
        match fs::remove_file(output) {
            Ok(()) => debug!("Removed stale {}", output.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Could not remove stale {}", output.display()))
            }
        }

        let mut text_file = tempfile::Builder::new()
            .prefix("fontsplit-")
            .suffix(".txt")
            .tempfile()
            .context("Could not create text file")?;
        text_file.write_all(text.as_bytes())?;
        text_file.flush()?;

        debug!("Running {} for {}...", self.config.program, output.display());
        let result = Command::new(&self.config.program)
            .args(self.args(font, text_file.path(), output))
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Could not run '{}'", self.config.program))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            bail!("'{}' failed ({}): {}", self.config.program, result.status, stderr.trim());
        }
        if !fs::metadata(output).map(|x| x.is_file()).unwrap_or(false) {
            bail!("'{}' did not write {}", self.config.program, output.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(config: SubsetterConfig) -> Vec<String> {
        PyftSubset::new(config)
            .args(Path::new("in.ttf"), Path::new("text.txt"), Path::new("out/a-000.woff2"))
            .into_iter()
            .map(|x| x.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn default_arguments() {
        assert_eq!(
            args(SubsetterConfig::default()),
            vec![
                "in.ttf",
                "--text-file=text.txt",
                "--output-file=out/a-000.woff2",
                "--flavor=woff2",
                "--with-zopfli",
                "--desubroutinize",
                "--hinting-tables=*",
            ],
        );
    }

    #[test]
    fn configured_arguments() {
        let config = SubsetterConfig {
            with_zopfli: false,
            desubroutinize: false,
            hinting_tables: None,
            extra_args: vec!["--no-hinting".to_string()],
            ..SubsetterConfig::default()
        };
        assert_eq!(
            args(config),
            vec!["in.ttf", "--text-file=text.txt", "--output-file=out/a-000.woff2", "--flavor=woff2", "--no-hinting"],
        );
    }

    #[test]
    fn missing_program_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let subsetter = PyftSubset::new(SubsetterConfig {
            program: "fontsplit-test-no-such-program".to_string(),
            ..SubsetterConfig::default()
        });
        let out = dir.path().join("out.woff2");
        assert!(subsetter.subset(Path::new("in.ttf"), "a", &out).is_err());
        assert!(!out.exists());
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let subsetter =
            PyftSubset::new(SubsetterConfig { program: "false".to_string(), ..SubsetterConfig::default() });
        assert!(subsetter.subset(Path::new("in.ttf"), "a", &dir.path().join("o.woff2")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn program_without_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let subsetter =
            PyftSubset::new(SubsetterConfig { program: "true".to_string(), ..SubsetterConfig::default() });
        let err = subsetter.subset(Path::new("in.ttf"), "a", &dir.path().join("o.woff2")).unwrap_err();
        assert!(err.to_string().contains("did not write"));
    }

    #[cfg(unix)]
    #[test]
    fn stale_output_does_not_count_as_success() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("o.woff2");
        fs::write(&out, "from an earlier run").unwrap();

        let subsetter =
            PyftSubset::new(SubsetterConfig { program: "true".to_string(), ..SubsetterConfig::default() });
        assert!(subsetter.subset(Path::new("in.ttf"), "a", &out).is_err());
        assert!(!out.exists());
    }

    #[cfg(unix)]
    #[test]
    fn stale_output_is_removed_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("o.woff2");
        fs::write(&out, "from an earlier run").unwrap();

        let subsetter =
            PyftSubset::new(SubsetterConfig { program: "false".to_string(), ..SubsetterConfig::default() });
        assert!(subsetter.subset(Path::new("in.ttf"), "a", &out).is_err());
        assert!(!out.exists());
    }

    #[cfg(unix)]
    #[test]
    fn text_is_passed_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        // `sh` runs the font argument as a script, which copies the text file to the output.
        let script = dir.path().join("copy.sh");
        fs::write(
            &script,
            r#"for arg in "$@"; do
  case "$arg" in
    --text-file=*) text="${arg#--text-file=}" ;;
    --output-file=*) out="${arg#--output-file=}" ;;
  esac
done
cp "$text" "$out"
"#,
        )
        .unwrap();

        let out = dir.path().join("o.woff2");
        let text: String = ('\u{4E00}'..='\u{9FA5}').collect();
        let subsetter =
            PyftSubset::new(SubsetterConfig { program: "sh".to_string(), ..SubsetterConfig::default() });
        subsetter.subset(&script, &text, &out).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), text);
    }
}
