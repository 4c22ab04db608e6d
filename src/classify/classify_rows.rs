// src/classify/classify_rows.rs

use crate::blast::AlignmentHitTable;
use crate::cddid::CogCddIdTable;
use crate::cogdef::CogDefinitionTable;
use crate::consts::CDD_SUBJECT_PREFIX;
use crate::error::Result;
use crate::funcat::CogFuncCategoryTable;
use crate::types::{AlignmentHit, ClassifyRow};

/// `CDD:223096` -> `223096`. Ids without the tag are returned unchanged.
pub fn strip_cdd_prefix(saccver: &str) -> &str {
    saccver.strip_prefix(CDD_SUBJECT_PREFIX).unwrap_or(saccver)
}

/// Resolves one top hit to a classification row.
///
/// `Ok(None)` when the COG has no definition entry; that hit is left
/// unclassified. An unknown CDD id or category letter is an error.
pub fn classify_hit(
    aln: &AlignmentHit,
    fc_table: &CogFuncCategoryTable,
    def_table: &CogDefinitionTable,
    cddid_table: &CogCddIdTable,
) -> Result<Option<ClassifyRow>> {
    let query_id = aln.qaccver.as_str();
    let cdd_id = strip_cdd_prefix(&aln.saccver);

    let cog_id = cddid_table.to_cog_id(cdd_id)?;

    let cog_def = match def_table.get(cog_id) {
        Some(def) => def,
        None => {
            log::debug!(
                "cog_id={cog_id} is not found in COG definition (query_id={query_id}, cdd_id={cdd_id})"
            );
            return Ok(None);
        }
    };

    let letter = cog_def.one_letter();
    let cog_fc = fc_table.get(letter)?;

    Ok(Some(ClassifyRow {
        query_id: query_id.to_string(),
        cog_id: cog_id.to_string(),
        cdd_id: cdd_id.to_string(),
        evalue: aln.evalue,
        identity: aln.pident,
        gene_name: cog_def.gene_name.clone(),
        cog_name: cog_def.cog_name.clone(),
        cog_letter: letter.to_string(),
        cog_description: cog_fc.desc.clone(),
    }))
}

/// Classifies every top hit, in top-hit order.
pub fn classify_top_hits(
    blast_table: &AlignmentHitTable,
    fc_table: &CogFuncCategoryTable,
    def_table: &CogDefinitionTable,
    cddid_table: &CogCddIdTable,
) -> Result<Vec<ClassifyRow>> {
    let top_hits = blast_table.top_hits();
    let mut rows = Vec::with_capacity(top_hits.len());

    for aln in top_hits {
        if let Some(row) = classify_hit(aln, fc_table, def_table, cddid_table)? {
            rows.push(row);
        }
    }

    log::debug!(
        "{} of {} top hit(s) resolved to a COG definition",
        rows.len(),
        top_hits.len()
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_cdd_prefix() {
        assert_eq!(strip_cdd_prefix("CDD:223096"), "223096");
        assert_eq!(strip_cdd_prefix("223096"), "223096");
    }
}
