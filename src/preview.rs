//! Preview rendering and site bundle output
//!
//! Composes the generated fragments into one standalone document (the same
//! shape the live preview frame is fed) and writes the bundle to disk.

use crate::models::GeneratedSite;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths written by [`write_site`].
#[derive(Debug, Clone)]
pub struct SiteFiles {
    pub index: PathBuf,
    pub body: PathBuf,
    pub css: PathBuf,
    pub javascript: PathBuf,
}

/// Assemble a complete HTML document: CSS in `<head>`, the HTML fragment as
/// the body, and the script last so it runs after the markup exists.
pub fn render_document(site: &GeneratedSite) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\">\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n    \
         <style>\n{}\n    </style>\n  </head>\n  <body>\n{}\n    <script>\n{}\n    </script>\n  \
         </body>\n</html>\n",
        site.css, site.html, site.javascript
    )
}

pub fn write_site(dir: &Path, site: &GeneratedSite) -> Result<SiteFiles> {
    fs::create_dir_all(dir)?;

    let files = SiteFiles {
        index: dir.join("index.html"),
        body: dir.join("body.html"),
        css: dir.join("style.css"),
        javascript: dir.join("script.js"),
    };

    fs::write(&files.index, render_document(site))?;
    fs::write(&files.body, &site.html)?;
    fs::write(&files.css, &site.css)?;
    fs::write(&files.javascript, &site.javascript)?;

    tracing::debug!("Wrote site bundle to {}", dir.display());
    Ok(files)
}
