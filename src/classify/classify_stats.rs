// src/classify/classify_stats.rs

use ahash::AHashMap;
use std::path::Path;

use crate::error::{CogError, Result};
use crate::funcat::CogFuncCategoryTable;
use crate::types::{ClassifyRow, CountSummaryRow};

/// One row per functional category, in category-table order, including
/// categories nothing was assigned to.
pub fn build_count_summary(
    rows: &[ClassifyRow],
    fc_table: &CogFuncCategoryTable,
) -> Vec<CountSummaryRow> {
    let mut letter_counts: AHashMap<&str, usize> = AHashMap::new();
    for row in rows {
        *letter_counts.entry(row.cog_letter.as_str()).or_insert(0) += 1;
    }

    fc_table
        .all()
        .iter()
        .map(|cog_fc| CountSummaryRow {
            letter: cog_fc.letter.clone(),
            count: letter_counts.get(cog_fc.letter.as_str()).copied().unwrap_or(0),
            group: cog_fc.group.clone(),
            color: cog_fc.color.clone(),
            description: cog_fc.desc.clone(),
        })
        .collect()
}

/// Fraction of query sequences that received a category.
pub fn classify_ratio(classify_count: usize, query_count: usize, query: &Path) -> Result<f64> {
    if query_count == 0 {
        return Err(CogError::EmptyInput(query.to_path_buf()));
    }
    Ok(classify_count as f64 / query_count as f64)
}
