use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;
use tracing::debug;

/// Directory-walk filter: `.gitignore`, `.ignore`, built-in defaults and
/// configured excludes
pub struct IgnoreFilter {
    inner: Gitignore,
}

impl IgnoreFilter {
    pub fn new(root: &Path, extra_excludes: &[String]) -> Self {
        let mut builder = GitignoreBuilder::new(root);

        // Missing files are reported as errors; they simply contribute nothing
        if let Some(err) = builder.add(root.join(".gitignore")) {
            debug!("no usable .gitignore: {}", err);
        }
        if let Some(err) = builder.add(root.join(".ignore")) {
            debug!("no usable .ignore: {}", err);
        }

        let defaults = [
            // Dependency and build output
            "node_modules/", "bower_components/", "jspm_packages/", "vendor/",
            "dist/", "build/", "out/", "coverage/", ".next/", ".nuxt/", ".cache/",
            ".git/", ".vscode/", ".idea/", "target/",

            // Generated bundles
            "*.min.js", "*.bundle.js", "*.map",
        ];

        for pattern in defaults.iter().copied().chain(extra_excludes.iter().map(String::as_str)) {
            if let Err(err) = builder.add_line(None, pattern) {
                debug!(pattern, "skipping ignore pattern: {}", err);
            }
        }

        Self {
            inner: builder.build().unwrap_or_else(|_| Gitignore::empty()),
        }
    }

    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self.inner.matched(path, is_dir).is_ignore()
    }
}
