pub mod classify_rows;
pub mod classify_stats;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::blast::AlignmentHitTable;
use crate::cddid::CogCddIdTable;
use crate::cogdef::CogDefinitionTable;
use crate::error::Result;
use crate::fasta::count_fasta_records;
use crate::funcat::CogFuncCategoryTable;
use crate::types::{ClassifyRow, CountSummaryRow};

use classify_rows::classify_top_hits;
use classify_stats::{build_count_summary, classify_ratio};

/// COG classification of one query file.
///
/// Holds the loaded reference tables by reference and computes the
/// per-query rows, the per-category counts and the query count on first
/// access. Every input is read-only, so the cached values never go stale.
pub struct CogClassifyStats<'a> {
    query: PathBuf,
    pub blast_table: &'a AlignmentHitTable,
    pub fc_table: &'a CogFuncCategoryTable,
    pub def_table: &'a CogDefinitionTable,
    pub cddid_table: &'a CogCddIdTable,

    classify_rows: OnceLock<Vec<ClassifyRow>>,
    count_summary: OnceLock<Vec<CountSummaryRow>>,
    query_count: OnceLock<usize>,
}

impl<'a> CogClassifyStats<'a> {
    pub fn new<P: AsRef<Path>>(
        query: P,
        blast_table: &'a AlignmentHitTable,
        fc_table: &'a CogFuncCategoryTable,
        def_table: &'a CogDefinitionTable,
        cddid_table: &'a CogCddIdTable,
    ) -> Self {
        Self {
            query: query.as_ref().to_path_buf(),
            blast_table,
            fc_table,
            def_table,
            cddid_table,
            classify_rows: OnceLock::new(),
            count_summary: OnceLock::new(),
            query_count: OnceLock::new(),
        }
    }

    /// Classified top hits, one per query, in alignment file order.
    pub fn classify_rows(&self) -> Result<&[ClassifyRow]> {
        if let Some(rows) = self.classify_rows.get() {
            return Ok(rows);
        }
        let rows = classify_top_hits(
            self.blast_table,
            self.fc_table,
            self.def_table,
            self.cddid_table,
        )?;
        Ok(self.classify_rows.get_or_init(|| rows))
    }

    /// Number of classified sequences per functional category.
    pub fn count_summary(&self) -> Result<&[CountSummaryRow]> {
        if let Some(summary) = self.count_summary.get() {
            return Ok(summary);
        }
        let summary = build_count_summary(self.classify_rows()?, self.fc_table);
        Ok(self.count_summary.get_or_init(|| summary))
    }

    pub fn classify_count(&self) -> Result<usize> {
        Ok(self.classify_rows()?.len())
    }

    /// Number of sequences in the query FASTA.
    pub fn query_count(&self) -> Result<usize> {
        if let Some(&n) = self.query_count.get() {
            return Ok(n);
        }
        let n = count_fasta_records(&self.query)?;
        Ok(*self.query_count.get_or_init(|| n))
    }

    pub fn classify_ratio(&self) -> Result<f64> {
        classify_ratio(self.classify_count()?, self.query_count()?, &self.query)
    }

    /// `cog_classify.tsv` content.
    pub fn classify_tsv(&self) -> Result<String> {
        let mut out = String::from(ClassifyRow::HEADER);
        out.push('\n');
        for row in self.classify_rows()? {
            out.push_str(&row.as_tsv());
            out.push('\n');
        }
        Ok(out)
    }

    /// `cog_count.tsv` content.
    pub fn count_summary_tsv(&self) -> Result<String> {
        let mut out = String::from(CountSummaryRow::HEADER);
        out.push('\n');
        for row in self.count_summary()? {
            out.push_str(&row.as_tsv());
            out.push('\n');
        }
        Ok(out)
    }
}
