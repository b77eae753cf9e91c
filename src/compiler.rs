//! Catalog compiler - artwork directory tree -> layer catalog + image store.
//!
//! Layout: `<root>/<category>/<breed>/<attribute>[_token]*.<ext>`.
//! Tokens after the attribute name pick the part (`left`, `right`,
//! `partA`, `partB`, ...) and the channel (`area`, `outline`).
//!
//! Entries are visited in file-name order, which fixes attribute and breed
//! indices for a given tree. Index mutation is strictly sequential.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::GeneratorConfig;
use crate::error::{KittyError, Result};
use crate::hashing::ContentHash;
use crate::images::ImageStore;
use crate::layers::LayerCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Area,
    Outline,
}

/// What an artwork file name says about its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkName {
    pub attribute: String,
    pub part: usize,
    pub channel: Channel,
    /// Neither or both of `area`/`outline` were present; treated as outline.
    pub ambiguous: bool,
}

impl ArtworkName {
    /// Parse a file stem such as `pointy_right_area` or `tabby_partB`.
    pub fn parse(stem: &str) -> Result<Self> {
        let mut tokens = stem.split('_');
        let attribute = match tokens.next() {
            Some(a) if !a.is_empty() => a.to_string(),
            _ => {
                return Err(KittyError::InvalidFileName {
                    name: stem.to_string(),
                    reason: "missing attribute name".to_string(),
                })
            }
        };

        let mut part = 0;
        let (mut is_area, mut is_outline) = (false, false);
        for token in tokens {
            match token {
                "left" => part = 0,
                "right" => part = 1,
                "area" => is_area = true,
                "outline" => is_outline = true,
                t if t.starts_with("part") => part = parse_part_index(stem, t)?,
                _ => {}
            }
        }

        let ambiguous = is_area == is_outline;
        let channel = if is_area && !ambiguous { Channel::Area } else { Channel::Outline };
        Ok(Self { attribute, part, channel, ambiguous })
    }
}

/// `partA` is part 0, `partB` part 1, and so on.
fn parse_part_index(stem: &str, token: &str) -> Result<usize> {
    match token.as_bytes() {
        [b'p', b'a', b'r', b't', b @ b'A'..=b'Z'] => Ok((b - b'A') as usize),
        _ => Err(KittyError::InvalidFileName {
            name: stem.to_string(),
            reason: format!("unrecognized part token `{}`, expected part<A-Z>", token),
        }),
    }
}

/// Summary of one compile run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompileReport {
    pub categories: usize,
    pub breeds: usize,
    pub attributes: usize,
    pub layers: usize,
    pub images: usize,
    pub files_compiled: usize,
    pub files_skipped: usize,
    pub duplicate_images: usize,
    pub ambiguous_files: Vec<PathBuf>,
}

pub struct CatalogCompiler<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> CatalogCompiler<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Compile `root` into `catalog` and `images`.
    ///
    /// Only an unreadable root is fatal. Unreadable subdirectories and bad
    /// files are logged and skipped.
    pub fn compile(
        &self,
        root: &Path,
        catalog: &mut LayerCatalog,
        images: &mut ImageStore,
    ) -> Result<CompileReport> {
        let mut report = CompileReport::default();

        let category_dirs = sorted_subdirs(root)?;
        for (name, _) in &category_dirs {
            if let Err(e) = catalog.add_trait_category(name) {
                debug!(category = %name, error = %e, "trait category already registered");
            }
        }

        for (category, dir) in &category_dirs {
            let breed_dirs = match sorted_subdirs(dir) {
                Ok(d) => d,
                Err(e) => {
                    error!(category = %category, dir = %dir.display(), error = %e, "failed to read directory");
                    continue;
                }
            };
            info!(category = %category, breed_count = breed_dirs.len(), "compiling trait category");

            for (breed, breed_dir) in &breed_dirs {
                if catalog.add_breed(breed).is_ok() {
                    info!(breed = %breed, "breed added");
                }
                if let Err(e) = self.compile_breed_dir(category, breed, breed_dir, catalog, images, &mut report) {
                    error!(category = %category, breed = %breed, dir = %breed_dir.display(), error = %e, "failed to read directory");
                }
            }
        }

        report.categories = catalog.category_count();
        report.breeds = catalog.breed_count();
        report.attributes = catalog.categories().map(|c| c.attribute_count()).sum();
        report.layers = catalog.layer_count();
        report.images = images.len();
        info!(
            categories = report.categories,
            breeds = report.breeds,
            attributes = report.attributes,
            layers = report.layers,
            images = report.images,
            skipped = report.files_skipped,
            "compile finished"
        );
        Ok(report)
    }

    fn compile_breed_dir(
        &self,
        category: &str,
        breed: &str,
        dir: &Path,
        catalog: &mut LayerCatalog,
        images: &mut ImageStore,
        report: &mut CompileReport,
    ) -> Result<()> {
        for path in sorted_files(dir)? {
            let stem = match self.artwork_stem(&path) {
                Some(s) => s,
                None => continue,
            };
            let name = match ArtworkName::parse(stem) {
                Ok(n) => n,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping artwork");
                    report.files_skipped += 1;
                    continue;
                }
            };
            if name.ambiguous {
                warn!(
                    path = %path.display(),
                    "file name marks neither or both of area/outline; treating as outline"
                );
                report.ambiguous_files.push(path.clone());
            }

            let raw = match fs::read(&path) {
                Ok(raw) => raw,
                Err(e) => {
                    error!(path = %path.display(), error = %e, "failed to read image file");
                    report.files_skipped += 1;
                    continue;
                }
            };
            let hash = ContentHash::of(&raw);
            if let Err(e) = images.add(raw) {
                debug!(path = %path.display(), hash = %hash, error = %e, "identical artwork reused");
                report.duplicate_images += 1;
            }

            match catalog.add_attribute(category, &name.attribute) {
                Ok(index) => info!(
                    category = %category,
                    breed = %breed,
                    attribute = %name.attribute,
                    index,
                    "attribute added"
                ),
                Err(e) if e.is_already_exists() => {}
                Err(e) => return Err(e),
            }

            let layer = catalog.upsert_layer(category, &name.attribute, breed)?;
            match name.channel {
                Channel::Area => layer.set_area(name.part, hash),
                Channel::Outline => layer.set_outline(name.part, hash),
            }
            report.files_compiled += 1;
        }
        Ok(())
    }

    /// Stem of a file carrying the configured image extension.
    fn artwork_stem<'p>(&self, path: &'p Path) -> Option<&'p str> {
        let ext = path.extension()?.to_str()?;
        if !ext.eq_ignore_ascii_case(&self.config.image_extension) {
            return None;
        }
        path.file_stem()?.to_str()
    }
}

/// Subdirectories of `dir` as `(name, path)`, sorted by name.
fn sorted_subdirs(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => out.push((name.to_string(), path.clone())),
            None => warn!(path = %path.display(), "skipping directory with non UTF-8 name"),
        }
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}
