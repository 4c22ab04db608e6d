//src/config.rs

use std::path::{Path, PathBuf};

use crate::blast::TopHitPolicy;
use crate::consts::{CACHE_DIR_NAME, DEFAULT_EVALUE};

/// Parameters of one classification run.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Query protein FASTA.
    pub query: PathBuf,
    pub outdir: PathBuf,
    /// Where NCBI resources are cached between runs.
    pub download_dir: PathBuf,
    /// RPS-BLAST `-num_threads`.
    pub thread_num: usize,
    /// RPS-BLAST `-evalue`.
    pub evalue: f64,
    pub top_hit_policy: TopHitPolicy,
    /// Local COG definition table used instead of downloading `cog-24.def.tab`.
    pub cog_definition_file: Option<PathBuf>,
    /// Local functional category table used instead of the bundled one.
    pub cog_func_category_file: Option<PathBuf>,
}

impl ClassifierConfig {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(query: P, outdir: Q) -> Self {
        Self {
            query: query.as_ref().to_path_buf(),
            outdir: outdir.as_ref().to_path_buf(),
            download_dir: default_download_dir(),
            thread_num: default_thread_num(),
            evalue: DEFAULT_EVALUE,
            top_hit_policy: TopHitPolicy::default(),
            cog_definition_file: None,
            cog_func_category_file: None,
        }
    }
}

/// `$HOME/.cache/cogclassifier_rs`, or `./.cache/...` without a home dir.
pub fn default_download_dir() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache").join(CACHE_DIR_NAME)
}

/// All cores but one, and at least one.
pub fn default_thread_num() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClassifierConfig::new("q.faa", "out");
        assert_eq!(config.evalue, 1e-2);
        assert!(config.thread_num >= 1);
        assert!(config.download_dir.ends_with(".cache/cogclassifier_rs"));
        assert_eq!(config.top_hit_policy, TopHitPolicy::FirstOccurrence);
        assert!(config.cog_definition_file.is_none());
    }
}
