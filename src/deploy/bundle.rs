use anyhow::{Context, Result};
use base64::Engine;
use serde::Serialize;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::pipeline::link_assets;

pub const INDEX_FILE: &str = "index.html";
pub const STYLES_FILE: &str = "styles.css";
pub const SCRIPT_FILE: &str = "script.js";
pub const REDIRECTS_FILE: &str = "_redirects";
pub const SPA_REDIRECT_RULE: &str = "/*    /index.html   200";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    pub path: &'static str,
    pub contents: String,
}

/// Base64 file entry in a Vercel deployment payload.
#[derive(Debug, Clone, Serialize)]
pub struct InlineFile {
    pub file: String,
    pub data: String,
}

/// Static site ready to upload: linked `index.html`, optional stylesheet and
/// script, and a catch-all redirect for client-side routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteBundle {
    files: Vec<BundleFile>,
}

impl SiteBundle {
    pub fn build(html: &str, css: &str, js: &str) -> Self {
        let mut files = vec![BundleFile {
            path: INDEX_FILE,
            contents: link_assets(html, css, js),
        }];

        if !css.trim().is_empty() {
            files.push(BundleFile {
                path: STYLES_FILE,
                contents: css.to_string(),
            });
        }
        if !js.trim().is_empty() {
            files.push(BundleFile {
                path: SCRIPT_FILE,
                contents: js.to_string(),
            });
        }
        files.push(BundleFile {
            path: REDIRECTS_FILE,
            contents: SPA_REDIRECT_RULE.to_string(),
        });

        Self { files }
    }

    /// A single-page bundle, used by diagnostics test deployments.
    pub fn single_page(html: &str) -> Self {
        Self {
            files: vec![BundleFile {
                path: INDEX_FILE,
                contents: html.to_string(),
            }],
        }
    }

    pub fn files(&self) -> &[BundleFile] {
        &self.files
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.contents.as_str())
    }

    pub fn index_html(&self) -> &str {
        self.get(INDEX_FILE).unwrap_or_default()
    }

    pub fn to_zip(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for file in &self.files {
            writer
                .start_file(file.path, options)
                .with_context(|| format!("Failed to add {} to archive", file.path))?;
            writer.write_all(file.contents.as_bytes())?;
            debug!("Added {} to ZIP ({} bytes)", file.path, file.contents.len());
        }

        let data = writer.finish()?.into_inner();
        debug!("Created deployment ZIP with size: {} bytes", data.len());
        Ok(data)
    }

    /// Files for the Vercel JSON API. Vercel ignores `_redirects`, so it is left out.
    pub fn to_inline_files(&self) -> Vec<InlineFile> {
        let engine = base64::engine::general_purpose::STANDARD;
        self.files
            .iter()
            .filter(|f| f.path != REDIRECTS_FILE)
            .map(|f| InlineFile {
                file: f.path.to_string(),
                data: engine.encode(f.contents.as_bytes()),
            })
            .collect()
    }
}

/// Sanitized project slug plus the files to publish under it.
#[derive(Debug, Clone)]
pub struct DeploymentDescriptor {
    pub project_name: String,
    pub bundle: SiteBundle,
}

impl DeploymentDescriptor {
    pub fn new(project_name: impl Into<String>, html: &str, css: &str, js: &str) -> Self {
        Self {
            project_name: project_name.into(),
            bundle: SiteBundle::build(html, css, js),
        }
    }
}
