//src/cddid.rs

use ahash::AHashMap;
use std::io::BufRead;
use std::path::Path;

use crate::error::{CogError, Result};
use crate::fasta::open_text;

/// Accession prefix of COG entries in `cddid.tbl`.
pub const COG_ACCESSION_PREFIX: &str = "COG";

/// CDD id <-> COG id conversion table, built from NCBI's `cddid.tbl(.gz)`:
/// ```text
/// <cdd_id>\t<accession>\t<short name>\t<description>\t<length>
/// ```
/// Rows whose accession is not a COG (pfam, smart, cd, ...) are ignored.
#[derive(Debug, Clone, Default)]
pub struct CogCddIdTable {
    cdd_to_cog: AHashMap<String, String>,
    cog_to_cdd: AHashMap<String, String>,
}

impl CogCddIdTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = open_text(path)?;
        Self::from_reader(reader, path)
    }

    pub fn from_reader<R: BufRead, P: AsRef<Path>>(reader: R, source: P) -> Result<Self> {
        let source = source.as_ref();
        let mut table = Self::default();

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| CogError::io(source, e))?;
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split('\t');
            let (cdd_id, acc_id) = match (parts.next(), parts.next()) {
                (Some(cdd), Some(acc)) => (cdd, acc),
                _ => {
                    return Err(CogError::parse(
                        source,
                        idx + 1,
                        "expected at least 2 columns",
                    ))
                }
            };

            if acc_id.starts_with(COG_ACCESSION_PREFIX) {
                table.insert(cdd_id, acc_id);
            }
        }

        log::debug!(
            "Loaded {} CDD <=> COG id pairs from {}",
            table.len(),
            source.display()
        );
        Ok(table)
    }

    pub fn insert(&mut self, cdd_id: &str, cog_id: &str) {
        self.cdd_to_cog.insert(cdd_id.to_string(), cog_id.to_string());
        self.cog_to_cdd.insert(cog_id.to_string(), cdd_id.to_string());
    }

    /// Fails when the id is unknown: RPS-BLAST hits against the Cog database
    /// always map to a COG, so a miss means the database and `cddid.tbl`
    /// are from different releases.
    pub fn to_cog_id(&self, cdd_id: &str) -> Result<&str> {
        self.cdd_to_cog
            .get(cdd_id)
            .map(String::as_str)
            .ok_or_else(|| CogError::KeyNotFound {
                table: "CDD id table",
                key: cdd_id.to_string(),
            })
    }

    pub fn to_cdd_id(&self, cog_id: &str) -> Result<&str> {
        self.cog_to_cdd
            .get(cog_id)
            .map(String::as_str)
            .ok_or_else(|| CogError::KeyNotFound {
                table: "COG id table",
                key: cog_id.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.cdd_to_cog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cdd_to_cog.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs::File;
    use std::io::{Cursor, Write};

    const CDDID: &str = "\
223096\tCOG0001\tHemL\tGlutamate-1-semialdehyde aminotransferase\t432
214330\tcd00001\tPTS_IIB_man\tPTS_IIB_man\t151
395444\tpfam00001\t7tm_1\t7 transmembrane receptor\t251
223097\tCOG0002\tArgC\tN-acetyl-gamma-glutamylphosphate reductase\t350
";

    #[test]
    fn test_keeps_only_cog_rows() {
        let table = CogCddIdTable::from_reader(Cursor::new(CDDID), "cddid.tbl").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.to_cog_id("223096").unwrap(), "COG0001");
        assert_eq!(table.to_cdd_id("COG0002").unwrap(), "223097");
        assert!(matches!(
            table.to_cog_id("214330"),
            Err(CogError::KeyNotFound { .. })
        ));
        assert!(table.to_cdd_id("pfam00001").is_err());
    }

    #[test]
    fn test_gz_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cddid.tbl.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(CDDID.as_bytes()).unwrap();
        enc.finish().unwrap();

        let table = CogCddIdTable::from_path(&path).unwrap();
        assert_eq!(table.to_cog_id("223097").unwrap(), "COG0002");
    }

    #[test]
    fn test_single_column_row() {
        let err = CogCddIdTable::from_reader(Cursor::new("223096\n"), "cddid.tbl").unwrap_err();
        assert!(matches!(err, CogError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_duplicate_cdd_id_last_row_wins() {
        let text = "223096\tCOG0001\tHemL\n223096\tCOG0099\tHemX\n";
        let table = CogCddIdTable::from_reader(Cursor::new(text), "cddid.tbl").unwrap();
        assert_eq!(table.to_cog_id("223096").unwrap(), "COG0099");
        assert_eq!(table.to_cdd_id("COG0099").unwrap(), "223096");
    }
}
