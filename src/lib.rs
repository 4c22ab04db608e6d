// src/lib.rs
pub mod blast;
pub mod cddid;
pub mod classify;
pub mod cogdef;
pub mod config;
pub mod consts;
pub mod download;
pub mod error;
pub mod fasta;
pub mod funcat;
pub mod rpsblast;
pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use crate::blast::{AlignmentHitTable, TopHitPolicy};
use crate::cddid::CogCddIdTable;
use crate::classify::CogClassifyStats;
use crate::cogdef::CogDefinitionTable;
use crate::config::ClassifierConfig;
use crate::consts::{COG_CLASSIFY_OUTFILE, COG_COUNT_OUTFILE, RPSBLAST_OUTFILE};
use crate::download::prepare_resources;
use crate::error::{CogError, Result};
use crate::funcat::CogFuncCategoryTable;
use crate::rpsblast::RpsBlast;
use crate::types::{ClassifyRow, CountSummaryRow};

/// The three reference tables, loaded once per run.
pub struct ReferenceTables {
    pub fc_table: CogFuncCategoryTable,
    pub def_table: CogDefinitionTable,
    pub cddid_table: CogCddIdTable,
}

impl ReferenceTables {
    /// `fc_path = None` selects the bundled functional category table.
    pub fn load(
        fc_path: Option<&Path>,
        def_path: &Path,
        cddid_path: &Path,
    ) -> Result<Self> {
        let fc_table = match fc_path {
            Some(path) => {
                log::info!("Load COG Functional Category {}", path.display());
                CogFuncCategoryTable::from_path(path)?
            }
            None => {
                log::info!("Load bundled COG Functional Category");
                CogFuncCategoryTable::bundled()?
            }
        };
        log::info!("Load COG Definition {}", def_path.display());
        let def_table = CogDefinitionTable::from_path(def_path)?;
        log::info!("Load COG <=> CDD ID Conversion Table {}", cddid_path.display());
        let cddid_table = CogCddIdTable::from_path(cddid_path)?;

        log::debug!(
            "{} categories, {} definitions, {} CDD ids",
            fc_table.len(),
            def_table.len(),
            cddid_table.len()
        );
        Ok(Self {
            fc_table,
            def_table,
            cddid_table,
        })
    }
}

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct ClassificationResults {
    pub classify_rows: Vec<ClassifyRow>,
    pub count_summary: Vec<CountSummaryRow>,
    pub classify_count: usize,
    pub query_count: usize,
    pub classify_ratio: f64,
    pub rpsblast_file: PathBuf,
    pub cog_count_file: PathBuf,
    pub cog_classify_file: PathBuf,
}

/// Long-running stages of [`run_classifier_with`], reported as each begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStep {
    Download,
    LoadTables,
    Search,
    Write,
}

impl RunStep {
    pub fn message(&self) -> &'static str {
        match self {
            RunStep::Download => "Preparing COG & CDD resources...",
            RunStep::LoadTables => "Loading reference tables...",
            RunStep::Search => "Running RPS-BLAST search...",
            RunStep::Write => "Classifying and writing results...",
        }
    }
}

/// Full workflow: fetch NCBI resources, run RPS-BLAST on the query and
/// write the classification tables to `config.outdir`.
pub fn run_classifier(config: &ClassifierConfig) -> Result<ClassificationResults> {
    run_classifier_with(config, |_| {})
}

/// [`run_classifier`], calling `on_step` at the start of every stage.
pub fn run_classifier_with<F: FnMut(RunStep)>(
    config: &ClassifierConfig,
    mut on_step: F,
) -> Result<ClassificationResults> {
    on_step(RunStep::Download);
    let resources = prepare_resources(config)?;

    on_step(RunStep::LoadTables);
    let tables = ReferenceTables::load(
        config.cog_func_category_file.as_deref(),
        &resources.cog_definition,
        &resources.cddid_table,
    )?;

    on_step(RunStep::Search);
    create_outdir(&config.outdir)?;
    let rpsblast_file = config.outdir.join(RPSBLAST_OUTFILE);
    let blast_table = RpsBlast::new(&config.query, &resources.rpsblast_db, &rpsblast_file)
        .evalue(config.evalue)
        .threads(config.thread_num)
        .run()?
        .with_top_hit_policy(config.top_hit_policy);

    on_step(RunStep::Write);
    classify_and_write(&config.query, &blast_table, &tables, &config.outdir)
}

/// Classifies an existing RPS-BLAST `-outfmt 6` file against local
/// reference tables. No download, no search.
pub fn classify_from_files(
    query: &Path,
    alignment_file: &Path,
    tables: &ReferenceTables,
    top_hit_policy: TopHitPolicy,
    outdir: &Path,
) -> Result<ClassificationResults> {
    let blast_table =
        AlignmentHitTable::from_path(alignment_file)?.with_top_hit_policy(top_hit_policy);
    create_outdir(outdir)?;
    classify_and_write(query, &blast_table, tables, outdir)
}

fn classify_and_write(
    query: &Path,
    blast_table: &AlignmentHitTable,
    tables: &ReferenceTables,
    outdir: &Path,
) -> Result<ClassificationResults> {
    let stats = CogClassifyStats::new(
        query,
        blast_table,
        &tables.fc_table,
        &tables.def_table,
        &tables.cddid_table,
    );

    // Everything is computed before the first file is written.
    let classify_tsv = stats.classify_tsv()?;
    let count_tsv = stats.count_summary_tsv()?;
    let classify_count = stats.classify_count()?;
    let query_count = stats.query_count()?;
    let classify_ratio = stats.classify_ratio()?;
    log::info!(
        "{:.2}% ({} / {}) sequences are classified into COG functional category",
        classify_ratio * 100.0,
        classify_count,
        query_count
    );

    let rpsblast_file = outdir.join(RPSBLAST_OUTFILE);
    if blast_table.source() != rpsblast_file {
        write_file(&rpsblast_file, &blast_table.to_tsv())?;
    }
    log::info!("Write rpsblast search result");
    log::info!("=> {}", rpsblast_file.display());

    let cog_count_file = outdir.join(COG_COUNT_OUTFILE);
    write_file(&cog_count_file, &count_tsv)?;
    log::info!("Write summary of COG functional category count");
    log::info!("=> {}", cog_count_file.display());

    let cog_classify_file = outdir.join(COG_CLASSIFY_OUTFILE);
    write_file(&cog_classify_file, &classify_tsv)?;
    log::info!("Write result of COG classification per query");
    log::info!("=> {}", cog_classify_file.display());

    Ok(ClassificationResults {
        classify_rows: stats.classify_rows()?.to_vec(),
        count_summary: stats.count_summary()?.to_vec(),
        classify_count,
        query_count,
        classify_ratio,
        rpsblast_file,
        cog_count_file,
        cog_classify_file,
    })
}

fn create_outdir(outdir: &Path) -> Result<()> {
    fs::create_dir_all(outdir).map_err(|e| CogError::io(outdir, e))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| CogError::io(path, e))
}
