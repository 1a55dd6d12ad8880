//! JWalk-based source enumeration.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use globset::{Glob, GlobSet, GlobSetBuilder};
use jwalk::{Parallelism, WalkDir};

use hatch_core::{FileDescriptor, ScanConfig, ScanError, ScanWarning, WarningKind};

/// Descriptors produced by an enumeration, plus the paths that were skipped.
#[derive(Debug, Clone, Default)]
pub struct Enumeration {
    /// Leaf files, in input order then walk order.
    pub files: Vec<FileDescriptor>,
    /// Paths that could not be read.
    pub warnings: Vec<ScanWarning>,
}

impl Enumeration {
    /// Sum of all descriptor sizes.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Check if any path was skipped.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Flattens user selections (files and directories) into file descriptors.
#[derive(Debug, Clone)]
pub struct SourceEnumerator {
    config: ScanConfig,
    ignore: Arc<GlobSet>,
}

impl SourceEnumerator {
    /// Create an enumerator with default settings.
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
            ignore: Arc::new(GlobSet::empty()),
        }
    }

    /// Create an enumerator with a custom configuration.
    pub fn with_config(config: ScanConfig) -> Result<Self, ScanError> {
        let ignore = build_ignore_set(&config.ignore_patterns)?;
        Ok(Self {
            config,
            ignore: Arc::new(ignore),
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Enumerate every input path in order.
    ///
    /// Paths that cannot be read are recorded as warnings and skipped;
    /// the remaining inputs are still enumerated.
    pub fn enumerate<P: AsRef<Path>>(&self, paths: &[P]) -> Enumeration {
        let mut result = Enumeration::default();

        for input in paths {
            let input = input.as_ref();
            match self.enumerate_path(input, &mut result.warnings) {
                Ok(files) => result.files.extend(files),
                Err(warning) => {
                    tracing::warn!(path = %input.display(), "skipping source: {}", warning.message);
                    result.warnings.push(warning);
                }
            }
        }

        tracing::debug!(
            files = result.files.len(),
            warnings = result.warnings.len(),
            "enumeration finished"
        );
        result
    }

    /// Enumerate a single input path.
    ///
    /// Names and relative paths come from the path as selected; symlinks
    /// are only resolved to classify and walk it.
    fn enumerate_path(
        &self,
        input: &Path,
        warnings: &mut Vec<ScanWarning>,
    ) -> Result<Vec<FileDescriptor>, ScanWarning> {
        let resolved = input
            .canonicalize()
            .map_err(|e| ScanWarning::from_io(input, &e))?;
        let selected = match std::path::absolute(input) {
            Ok(path) if path.file_name().is_some() => path,
            _ => resolved.clone(),
        };
        let metadata =
            std::fs::metadata(&resolved).map_err(|e| ScanWarning::from_io(&selected, &e))?;

        if metadata.is_file() {
            let name = file_name(&selected);
            if self.config.should_skip_hidden(&name) || self.ignore.is_match(&name) {
                tracing::debug!(path = %selected.display(), "skipping hidden or ignored file");
                return Ok(Vec::new());
            }
            return Ok(vec![FileDescriptor::new(
                selected.clone(),
                name.as_str(),
                metadata.len(),
                name.as_str(),
            )]);
        }

        if metadata.is_dir() {
            return Ok(self.walk_directory(&selected, &resolved, warnings));
        }

        tracing::debug!(path = %selected.display(), "skipping non-regular file");
        Ok(Vec::new())
    }

    /// Collect every regular file under `selected`, relative to its parent.
    ///
    /// The walk runs over `resolved`, the canonical form of `selected`.
    fn walk_directory(
        &self,
        selected: &Path,
        resolved: &Path,
        warnings: &mut Vec<ScanWarning>,
    ) -> Vec<FileDescriptor> {
        let anchor = PathBuf::from(file_name(selected));
        let ignore = Arc::clone(&self.ignore);

        let walker = WalkDir::new(resolved)
            .parallelism(self.parallelism())
            .skip_hidden(!self.config.include_hidden)
            .follow_links(self.config.follow_symlinks)
            .sort(true)
            .process_read_dir(move |_depth, _path, _state, children| {
                children.retain(|entry| {
                    entry
                        .as_ref()
                        .map(|e| !ignore.is_match(e.file_name()))
                        .unwrap_or(true)
                });
            });

        let mut files = Vec::new();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    tracing::warn!(path = %path.display(), "unreadable entry: {err}");
                    warnings.push(ScanWarning::new(path, err.to_string(), WarningKind::ReadError));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(err) => {
                    tracing::warn!(path = %path.display(), "unreadable metadata: {err}");
                    warnings.push(ScanWarning::new(
                        &path,
                        err.to_string(),
                        WarningKind::MetadataError,
                    ));
                    continue;
                }
            };

            let within = path
                .strip_prefix(resolved)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| PathBuf::from(entry.file_name()));

            files.push(FileDescriptor::new(
                selected.join(&within),
                entry.file_name().to_string_lossy().into_owned(),
                metadata.len(),
                anchor.join(&within),
            ));
        }

        files
    }

    fn parallelism(&self) -> Parallelism {
        match self.config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            1 => Parallelism::Serial,
            n => Parallelism::RayonNewPool(n),
        }
    }
}

impl Default for SourceEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Enumerate paths with the default configuration.
pub fn scan_paths<P: AsRef<Path>>(paths: &[P]) -> Vec<FileDescriptor> {
    SourceEnumerator::new().enumerate(paths).files
}

fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidConfig {
            message: format!("bad ignore pattern '{pattern}': {e}"),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ScanError::InvalidConfig {
        message: e.to_string(),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
