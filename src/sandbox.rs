//! Isolated viewer for service-supplied explanation markup.
//!
//! LIME and SHAP explanations arrive as complete HTML documents with inline
//! scripts. They are untrusted: the document is never interpreted by the app
//! itself. Instead it is wrapped in a host page as the `srcdoc` of an iframe
//! carrying `sandbox="allow-scripts"` and opened in the system browser. Without
//! `allow-same-origin` the embedded document gets an opaque origin, so its
//! scripts run but cannot reach host state, cookies or storage, and without
//! `allow-top-navigation`/`allow-popups` it cannot navigate the host.

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

/// Sandbox tokens granted to the embedded document.
pub const SANDBOX_POLICY: &str = "allow-scripts";
/// Number of viewer pages kept on disk besides the one just written.
pub const KEEP_VIEWER_PAGES: usize = 10;
const PAGE_PREFIX: &str = "explanation-";
const PAGE_EXTENSION: &str = ".html";

/// Errors raised while materializing a sandboxed page.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// The viewer directory could not be prepared.
    #[error("Viewer directory unavailable: {0}")]
    Dir(#[from] crate::app_dirs::AppDirError),
    /// The host page could not be written.
    #[error("Failed to write explanation page {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Old viewer pages could not be listed or removed.
    #[error("Failed to prune explanation page {path}: {source}")]
    Prune {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The system browser could not be launched.
    #[error("Failed to open explanation page {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// An untrusted HTML document paired with its isolating host page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SandboxedDocument {
    html: String,
}

impl SandboxedDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// The embedded document exactly as the service sent it.
    pub fn embedded_html(&self) -> &str {
        &self.html
    }

    /// Host page embedding the document in a sandboxed iframe.
    pub fn host_page(&self) -> String {
        format!(
            concat!(
                "<!DOCTYPE html>\n",
                "<html>\n<head>\n",
                "<meta charset=\"utf-8\">\n",
                "<meta name=\"referrer\" content=\"no-referrer\">\n",
                "<title>Explanation</title>\n",
                "<style>html,body{{margin:0;height:100%;background:#fff}}",
                "iframe{{border:0;width:100%;height:100%}}</style>\n",
                "</head>\n<body>\n",
                "<iframe title=\"explanation\" sandbox=\"{policy}\" srcdoc=\"{srcdoc}\"></iframe>\n",
                "</body>\n</html>\n"
            ),
            policy = SANDBOX_POLICY,
            srcdoc = escape_attribute(&self.html),
        )
    }

    /// Write the host page as `explanation-<run_id>.html` inside `dir`.
    pub fn write_to(&self, dir: &Path, run_id: u64) -> Result<PathBuf, SandboxError> {
        let path = dir.join(format!("{PAGE_PREFIX}{run_id}{PAGE_EXTENSION}"));
        std::fs::write(&path, self.host_page()).map_err(|source| SandboxError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Write the host page to the app viewer directory and open it.
    pub fn open_in_browser(&self, run_id: u64) -> Result<PathBuf, SandboxError> {
        let dir = crate::app_dirs::viewer_dir()?;
        let path = self.write_to(&dir, run_id)?;
        match prune_pages(&dir, KEEP_VIEWER_PAGES, &path) {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "Pruned old explanation pages"),
            Err(err) => tracing::warn!("{err}"),
        }
        open::that(&path).map_err(|source| SandboxError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn is_viewer_page(name: &str) -> bool {
    name.starts_with(PAGE_PREFIX) && name.ends_with(PAGE_EXTENSION)
}

/// Delete the least recently written viewer pages in `dir` beyond `keep`,
/// never touching `current`; returns how many went.
///
/// Run ids restart every launch, so age comes from modification time.
fn prune_pages(dir: &Path, keep: usize, current: &Path) -> Result<usize, SandboxError> {
    let mut pages: Vec<(SystemTime, PathBuf)> = fs::read_dir(dir)
        .map_err(|source| SandboxError::Prune {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_str().is_some_and(is_viewer_page))
        .filter(|entry| entry.path() != current)
        .filter_map(|entry| {
            let meta = entry.metadata().ok().filter(|meta| meta.is_file())?;
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            Some((modified, entry.path()))
        })
        .collect();
    pages.sort();

    let excess = pages.len().saturating_sub(keep);
    for (_, path) in pages.into_iter().take(excess) {
        fs::remove_file(&path).map_err(|source| SandboxError::Prune { path, source })?;
    }
    Ok(excess)
}

fn escape_attribute(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}
