//src/cogdef.rs

use ahash::AHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{CogError, Result};
use crate::types::CogDefinition;

/// COG definitions keyed by COG id (`COG0001`).
///
/// NCBI's `cog-24.def.tab` does not have a fixed number of columns per line:
/// ```text
/// <cog_id>\t<letters>\t<name>\t<gene>[\t<pathway>[\t<pubmed;..>[\t<pdb;..>]]]
/// ```
/// Only the first four are required. The file is not guaranteed to be UTF-8,
/// so lines are decoded lossily.
#[derive(Debug, Clone, Default)]
pub struct CogDefinitionTable {
    definitions: Vec<CogDefinition>,
    id_to_idx: AHashMap<String, usize>,
}

impl CogDefinitionTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CogError::io(path, e))?;
        Self::from_reader(BufReader::new(file), path)
    }

    pub fn from_reader<R: BufRead, P: AsRef<Path>>(mut reader: R, source: P) -> Result<Self> {
        let source = source.as_ref();
        let mut table = Self::default();
        let mut buf = Vec::new();
        let mut line_no = 0;

        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| CogError::io(source, e))?;
            if n == 0 {
                break; // EOF
            }
            line_no += 1;

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }

            let def = parse_definition_line(line).ok_or_else(|| {
                CogError::parse(
                    source,
                    line_no,
                    format!(
                        "expected at least 4 columns, found {}",
                        line.split('\t').count()
                    ),
                )
            })?;

            if table.id_to_idx.contains_key(&def.id) {
                log::warn!(
                    "Duplicate COG definition {} at line {line_no}, keeping the first",
                    def.id
                );
                continue;
            }
            table.id_to_idx.insert(def.id.clone(), table.definitions.len());
            table.definitions.push(def);
        }

        Ok(table)
    }

    /// A missing id is a normal outcome: some COGs referenced by CDD have no
    /// definition row.
    pub fn get(&self, cog_id: &str) -> Option<&CogDefinition> {
        self.id_to_idx.get(cog_id).map(|&i| &self.definitions[i])
    }

    pub fn all(&self) -> &[CogDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        for d in &self.definitions {
            out.push_str(&d.as_tsv());
            out.push('\n');
        }
        out
    }
}

/// Returns `None` when a mandatory column is missing.
fn parse_definition_line(line: &str) -> Option<CogDefinition> {
    let mut cols = line.split('\t');

    let id = cols.next()?.to_string();
    let letter = cols.next()?.to_string();
    let cog_name = cols.next()?.to_string();
    let gene_name = cols.next()?.to_string();

    let func_pathway = cols.next().filter(|s| !s.is_empty()).map(str::to_string);
    let pubmed_ids = cols.next().map(split_id_list).unwrap_or_default();
    let pdb_ids = cols.next().map(split_id_list).unwrap_or_default();

    Some(CogDefinition {
        id,
        letter,
        cog_name,
        gene_name,
        func_pathway,
        pubmed_ids,
        pdb_ids,
    })
}

fn split_id_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DEFS: &str = "\
COG0001\tH\tGlutamate-1-semialdehyde aminotransferase\tHemL\tHeme biosynthesis\t2568355;8952491\t2CFB
COG0002\tE\tN-acetyl-gamma-glutamylphosphate reductase\tArgC\tArginine biosynthesis\t9457856
COG0003\tP\tArsenite/tail-anchored protein-transporting ATPase, ArsA/GET3 family\tArsA
COG0004\tP\tAmmonia channel protein AmtB\tAmtB\t\t\t
COG0005\tF\tPurine nucleoside phosphorylase\tXapA\t\t
";

    #[test]
    fn test_variable_columns() {
        let table = CogDefinitionTable::from_reader(Cursor::new(DEFS), "def.tab").unwrap();
        assert_eq!(table.len(), 5);

        let full = table.get("COG0001").unwrap();
        assert_eq!(full.func_pathway.as_deref(), Some("Heme biosynthesis"));
        assert_eq!(full.pubmed_ids, vec!["2568355", "8952491"]);
        assert_eq!(full.pdb_ids, vec!["2CFB"]);

        let partial = table.get("COG0002").unwrap();
        assert_eq!(partial.pubmed_ids, vec!["9457856"]);
        assert!(partial.pdb_ids.is_empty());
    }

    #[test]
    fn test_four_column_row() {
        let table = CogDefinitionTable::from_reader(Cursor::new(DEFS), "def.tab").unwrap();
        let short = table.get("COG0003").unwrap();
        assert_eq!(short.gene_name, "ArsA");
        assert_eq!(short.func_pathway, None);
        assert!(short.pubmed_ids.is_empty());
        assert!(short.pdb_ids.is_empty());
        assert_eq!(short.one_letter(), "P");
    }

    #[test]
    fn test_trailing_empty_columns() {
        let table = CogDefinitionTable::from_reader(Cursor::new(DEFS), "def.tab").unwrap();
        let d = table.get("COG0004").unwrap();
        assert_eq!(d.func_pathway, None);
        assert!(d.pubmed_ids.is_empty());
        assert!(d.pdb_ids.is_empty());
    }

    #[test]
    fn test_missing_is_none() {
        let table = CogDefinitionTable::from_reader(Cursor::new(DEFS), "def.tab").unwrap();
        assert!(table.get("COG9999").is_none());
    }

    #[test]
    fn test_too_few_columns() {
        let err = CogDefinitionTable::from_reader(Cursor::new("COG0001\tH\tname\n"), "def.tab")
            .unwrap_err();
        assert!(matches!(err, CogError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_non_utf8_is_tolerated() {
        let bytes: &[u8] = b"COG0006\tE\tXaa-Pro aminopeptidase \xb5\tPepP\n";
        let table = CogDefinitionTable::from_reader(Cursor::new(bytes), "def.tab").unwrap();
        assert_eq!(table.get("COG0006").unwrap().gene_name, "PepP");
    }

    #[test]
    fn test_to_tsv_first_row() {
        let table = CogDefinitionTable::from_reader(Cursor::new(DEFS), "def.tab").unwrap();
        let text = table.to_tsv();
        let first = text.lines().next().unwrap();
        assert_eq!(
            first,
            "COG0001\tH\tGlutamate-1-semialdehyde aminotransferase\tHemL\tHeme biosynthesis\t2568355;8952491\t2CFB"
        );
    }
}
