use std::path::Path;

/// Renders a path with forward slashes, as used in stylesheet URLs.
pub fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Returns the URL a stylesheet should use to reference `file_name`.
///
/// With a prefix, the prefix is joined to the file name with exactly one `/` between them.
/// Without one, the file is referenced through `store_dir` as given on the command line.
pub fn store_url(store_dir: &Path, prefix: Option<&str>, file_name: &str) -> String {
    match prefix {
        Some("") => file_name.to_string(),
        Some(prefix) => format!("{}/{file_name}", prefix.trim_end_matches('/')),
        None => path_to_string(&store_dir.join(file_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_from_store_dir() {
        assert_eq!(store_url(Path::new("subsets"), None, "a-000.woff2"), "subsets/a-000.woff2");
    }

    #[test]
    fn url_from_prefix() {
        assert_eq!(store_url(Path::new("x"), Some("/fonts/"), "a.woff2"), "/fonts/a.woff2");
        assert_eq!(store_url(Path::new("x"), Some("/fonts"), "a.woff2"), "/fonts/a.woff2");
        assert_eq!(store_url(Path::new("x"), Some(""), "a.woff2"), "a.woff2");
    }
}
