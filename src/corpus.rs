//! Loading the school-information corpus from disk.
//!
//! The corpus directory holds one or more JSON files, each an array of
//! NEIS school records. Files are discovered with `walkdir`, filtered by
//! the `[corpus].include_globs` patterns, and read in file-name order so
//! that index construction is deterministic.
//!
//! A file that cannot be read or parsed is reported and skipped; the load
//! only fails outright when the directory is missing, holds no matching
//! files, or yields no usable school records at all.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use school_meal_core::corpus::identities_from_json;
use school_meal_core::{SchoolIdentity, SchoolIndex};

use crate::config::CorpusConfig;

/// What happened to a single corpus file during loading.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusFileReport {
    /// Path relative to the corpus directory.
    pub file: String,
    /// Records that became school identities.
    pub loaded: usize,
    /// Records skipped for missing or empty fields.
    pub dropped: usize,
    /// Set when the whole file was skipped.
    pub error: Option<String>,
}

/// All school identities found in the corpus, in file then record order.
#[derive(Debug, Clone)]
pub struct LoadedCorpus {
    pub identities: Vec<SchoolIdentity>,
    pub files: Vec<CorpusFileReport>,
}

/// Paths of the files under `config.dir` that match the include globs.
pub fn discover_files(config: &CorpusConfig) -> Result<Vec<PathBuf>> {
    let root = &config.dir;
    if !root.exists() {
        bail!("Corpus directory does not exist: {}", root.display());
    }
    if !root.is_dir() {
        bail!("Corpus path is not a directory: {}", root.display());
    }

    let include_set = build_globset(&config.include_globs)?;
    let max_depth = if config.recursive { usize::MAX } else { 1 };

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if include_set.is_match(relative) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Read every corpus file and collect its school identities.
pub fn load_corpus(config: &CorpusConfig) -> Result<LoadedCorpus> {
    let files = discover_files(config)?;
    if files.is_empty() {
        bail!(
            "No corpus files matching {:?} in {}",
            config.include_globs,
            config.dir.display()
        );
    }

    let mut identities = Vec::new();
    let mut reports = Vec::with_capacity(files.len());

    for path in &files {
        let file = path
            .strip_prefix(&config.dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        match read_corpus_file(path) {
            Ok(batch) => {
                if batch.dropped > 0 {
                    tracing::warn!(file = %file, dropped = batch.dropped, "skipped incomplete school records");
                }
                reports.push(CorpusFileReport {
                    file,
                    loaded: batch.identities.len(),
                    dropped: batch.dropped,
                    error: None,
                });
                identities.extend(batch.identities);
            }
            Err(e) => {
                tracing::warn!(file = %file, error = %format!("{:#}", e), "skipping corpus file");
                reports.push(CorpusFileReport {
                    file,
                    loaded: 0,
                    dropped: 0,
                    error: Some(format!("{:#}", e)),
                });
            }
        }
    }

    if identities.is_empty() {
        bail!(
            "No valid school records found in {}",
            config.dir.display()
        );
    }

    tracing::info!(
        files = reports.len(),
        schools = identities.len(),
        "loaded school corpus"
    );

    Ok(LoadedCorpus {
        identities,
        files: reports,
    })
}

/// Load the corpus and build the name index from it.
pub fn build_index(config: &CorpusConfig) -> Result<SchoolIndex> {
    let corpus = load_corpus(config)?;
    Ok(SchoolIndex::build(corpus.identities))
}

/// `schoolmeal corpus`: print one row per discovered corpus file.
pub fn list_corpus(config: &CorpusConfig) -> Result<()> {
    let corpus = load_corpus(config)?;

    println!("{:<40} {:>8} {:>8}  STATUS", "FILE", "LOADED", "DROPPED");
    for report in &corpus.files {
        let status = match &report.error {
            Some(e) => format!("SKIPPED ({})", e),
            None => "OK".to_string(),
        };
        println!(
            "{:<40} {:>8} {:>8}  {}",
            report.file, report.loaded, report.dropped, status
        );
    }

    let index = SchoolIndex::build(corpus.identities);
    println!();
    println!(
        "{} schools, {} distinct names",
        index.len(),
        index.name_count()
    );

    Ok(())
}

fn read_corpus_file(path: &Path) -> Result<school_meal_core::corpus::RecordBatch> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).with_context(|| "invalid JSON")?;
    identities_from_json(&value)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(office: &str, code: &str, name: &str) -> serde_json::Value {
        serde_json::json!({
            "ATPT_OFCDC_SC_CODE": office,
            "ATPT_OFCDC_SC_NM": format!("{} office", office),
            "SD_SCHUL_CODE": code,
            "SCHUL_NM": name,
        })
    }

    fn config_for(dir: &Path) -> CorpusConfig {
        CorpusConfig {
            dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_loads_files_in_name_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("b.json"),
            serde_json::to_string(&vec![record("J10", "2", "A")]).unwrap(),
        )
        .unwrap();
        fs::write(
            tmp.path().join("a.json"),
            serde_json::to_string(&vec![record("B10", "1", "A")]).unwrap(),
        )
        .unwrap();

        let corpus = load_corpus(&config_for(tmp.path())).unwrap();
        let offices: Vec<&str> = corpus
            .identities
            .iter()
            .map(|s| s.office_code.as_str())
            .collect();
        assert_eq!(offices, vec!["B10", "J10"]);
        assert_eq!(corpus.files.len(), 2);
    }

    #[test]
    fn test_bad_file_is_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("bad.json"), "{ not json").unwrap();
        fs::write(tmp.path().join("object.json"), "{\"a\": 1}").unwrap();
        fs::write(
            tmp.path().join("good.json"),
            serde_json::to_string(&vec![record("B10", "1", "A")]).unwrap(),
        )
        .unwrap();

        let corpus = load_corpus(&config_for(tmp.path())).unwrap();
        assert_eq!(corpus.identities.len(), 1);
        let skipped: Vec<&str> = corpus
            .files
            .iter()
            .filter(|f| f.error.is_some())
            .map(|f| f.file.as_str())
            .collect();
        assert_eq!(skipped, vec!["bad.json", "object.json"]);
    }

    #[test]
    fn test_incomplete_records_counted() {
        let tmp = TempDir::new().unwrap();
        let records = serde_json::json!([
            record("B10", "1", "A"),
            { "SCHUL_NM": "no codes" },
        ]);
        fs::write(tmp.path().join("s.json"), records.to_string()).unwrap();

        let corpus = load_corpus(&config_for(tmp.path())).unwrap();
        assert_eq!(corpus.files[0].loaded, 1);
        assert_eq!(corpus.files[0].dropped, 1);
    }

    #[test]
    fn test_non_matching_files_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.txt"), "hello").unwrap();
        let err = load_corpus(&config_for(tmp.path())).unwrap_err();
        assert!(err.to_string().contains("No corpus files"));
    }

    #[test]
    fn test_recursive_flag() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        fs::write(
            tmp.path().join("nested").join("s.json"),
            serde_json::to_string(&vec![record("B10", "1", "A")]).unwrap(),
        )
        .unwrap();

        assert!(load_corpus(&config_for(tmp.path())).is_err());

        let config = CorpusConfig {
            recursive: true,
            ..config_for(tmp.path())
        };
        assert_eq!(load_corpus(&config).unwrap().identities.len(), 1);
    }

    #[test]
    fn test_missing_dir_is_fatal() {
        let err = load_corpus(&config_for(Path::new("/nonexistent/corpus"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_all_invalid_is_fatal() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("bad.json"), "[]").unwrap();
        let err = load_corpus(&config_for(tmp.path())).unwrap_err();
        assert!(err.to_string().contains("No valid school records"));
    }
}
