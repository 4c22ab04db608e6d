//src/blast.rs

use ahash::AHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{CogError, Result};
use crate::types::AlignmentHit;

/// Number of columns in `-outfmt 6`.
pub const OUTFMT6_COLUMNS: usize = 12;

/// How a single hit is chosen among all hits of one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopHitPolicy {
    /// Keep the first hit seen for a query. RPS-BLAST writes the hits of a
    /// query sorted by descending score, so the first one is the best one.
    #[default]
    FirstOccurrence,
    /// Keep the hit with the highest bit score; ties go to the earlier hit.
    MaxBitScore,
}

/// Parsed RPS-BLAST tabular output.
#[derive(Debug)]
pub struct AlignmentHitTable {
    source: PathBuf,
    alignments: Vec<AlignmentHit>,
    policy: TopHitPolicy,
    top_hits: OnceLock<Vec<AlignmentHit>>,
}

impl AlignmentHitTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CogError::io(path, e))?;
        Self::from_reader(BufReader::new(file), path)
    }

    /// Parses tabular output from any reader; `source` is only used in errors.
    pub fn from_reader<R: BufRead, P: AsRef<Path>>(reader: R, source: P) -> Result<Self> {
        let source = source.as_ref().to_path_buf();
        let mut alignments = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| CogError::io(&source, e))?;
            // outfmt 7 style comments and trailing blank lines
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            alignments.push(parse_hit_line(&line, &source, idx + 1)?);
        }

        log::debug!(
            "Parsed {} alignment(s) from {}",
            alignments.len(),
            source.display()
        );

        Ok(Self {
            source,
            alignments,
            policy: TopHitPolicy::default(),
            top_hits: OnceLock::new(),
        })
    }

    pub fn with_top_hit_policy(mut self, policy: TopHitPolicy) -> Self {
        self.policy = policy;
        self.top_hits = OnceLock::new();
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Every hit, in file order.
    pub fn alignments(&self) -> &[AlignmentHit] {
        &self.alignments
    }

    /// One hit per query, queries in order of first appearance.
    pub fn top_hits(&self) -> &[AlignmentHit] {
        self.top_hits
            .get_or_init(|| select_top_hits(&self.alignments, self.policy))
    }

    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        for aln in &self.alignments {
            out.push_str(&aln.as_tsv());
            out.push('\n');
        }
        out
    }
}

fn select_top_hits(alignments: &[AlignmentHit], policy: TopHitPolicy) -> Vec<AlignmentHit> {
    let mut slot_of: AHashMap<&str, usize> = AHashMap::new();
    let mut top: Vec<AlignmentHit> = Vec::new();

    for aln in alignments {
        match slot_of.get(aln.qaccver.as_str()) {
            None => {
                slot_of.insert(aln.qaccver.as_str(), top.len());
                top.push(aln.clone());
            }
            Some(&slot) => {
                if policy == TopHitPolicy::MaxBitScore && aln.bitscore > top[slot].bitscore {
                    top[slot] = aln.clone();
                }
            }
        }
    }
    top
}

fn parse_hit_line(line: &str, source: &Path, line_no: usize) -> Result<AlignmentHit> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != OUTFMT6_COLUMNS {
        return Err(CogError::parse(
            source,
            line_no,
            format!(
                "expected {} columns, found {}",
                OUTFMT6_COLUMNS,
                fields.len()
            ),
        ));
    }

    Ok(AlignmentHit {
        qaccver: fields[0].to_string(),
        saccver: fields[1].to_string(),
        pident: parse_score(fields[2], "pident", source, line_no)?,
        length: parse_field(fields[3], "length", source, line_no)?,
        mismatch: parse_field(fields[4], "mismatch", source, line_no)?,
        gapopen: parse_field(fields[5], "gapopen", source, line_no)?,
        qstart: parse_field(fields[6], "qstart", source, line_no)?,
        qend: parse_field(fields[7], "qend", source, line_no)?,
        sstart: parse_field(fields[8], "sstart", source, line_no)?,
        send: parse_field(fields[9], "send", source, line_no)?,
        evalue: parse_score(fields[10], "evalue", source, line_no)?,
        bitscore: parse_score(fields[11], "bitscore", source, line_no)?,
    })
}

fn parse_field<T: FromStr>(raw: &str, name: &str, source: &Path, line_no: usize) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        CogError::parse(
            source,
            line_no,
            format!("field '{name}' has invalid value '{raw}'"),
        )
    })
}

/// Identity, e-value and bit score: finite and not negative.
fn parse_score(raw: &str, name: &str, source: &Path, line_no: usize) -> Result<f64> {
    let value: f64 = parse_field(raw, name, source, line_no)?;
    if !value.is_finite() || value < 0.0 {
        return Err(CogError::parse(
            source,
            line_no,
            format!("field '{name}' must be a finite non-negative number, got '{raw}'"),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn table(text: &str) -> AlignmentHitTable {
        AlignmentHitTable::from_reader(Cursor::new(text.to_string()), "test.tsv")
            .expect("parse failed")
    }

    const HITS: &str = "\
# RPSBLAST 2.15.0+
Q1\tCDD:223\t40.0\t100\t2\t0\t1\t100\t1\t100\t1e-20\t90.0
Q1\tCDD:224\t50.0\t100\t2\t0\t1\t100\t1\t100\t1e-30\t120.0
Q2\tCDD:300\t30.0\t80\t5\t1\t3\t82\t2\t81\t0.001\t40.5
Q1\tCDD:225\t60.0\t100\t2\t0\t1\t100\t1\t100\t1e-40\t120.0
Q3\tCDD:301\t99.5\t50\t0\t0\t1\t50\t1\t50\t2e-5\t70.0
";

    #[test]
    fn test_parse_skips_comments() {
        let t = table(HITS);
        assert_eq!(t.alignments().len(), 5);
        let first = &t.alignments()[0];
        assert_eq!(first.qaccver, "Q1");
        assert_eq!(first.saccver, "CDD:223");
        assert_eq!(first.length, 100);
        assert_eq!(first.evalue, 1e-20);
    }

    #[test]
    fn test_top_hits_first_occurrence() {
        let t = table(HITS);
        let top: Vec<(&str, &str)> = t
            .top_hits()
            .iter()
            .map(|h| (h.qaccver.as_str(), h.saccver.as_str()))
            .collect();
        assert_eq!(
            top,
            vec![("Q1", "CDD:223"), ("Q2", "CDD:300"), ("Q3", "CDD:301")]
        );
    }

    #[test]
    fn test_top_hits_follow_file_order_within_query() {
        // Reordering the rows of Q1 changes which one is kept.
        let reordered = "\
Q1\tCDD:225\t60.0\t100\t2\t0\t1\t100\t1\t100\t1e-40\t120.0
Q2\tCDD:300\t30.0\t80\t5\t1\t3\t82\t2\t81\t0.001\t40.5
Q1\tCDD:223\t40.0\t100\t2\t0\t1\t100\t1\t100\t1e-20\t90.0
";
        let t = table(reordered);
        assert_eq!(t.top_hits().len(), 2);
        assert_eq!(t.top_hits()[0].saccver, "CDD:225");
        assert_eq!(t.top_hits()[1].qaccver, "Q2");
    }

    #[test]
    fn test_top_hits_max_bitscore() {
        let t = table(HITS).with_top_hit_policy(TopHitPolicy::MaxBitScore);
        let q1 = &t.top_hits()[0];
        // 120.0 appears twice; the earlier row wins the tie
        assert_eq!(q1.saccver, "CDD:224");
        assert_eq!(t.top_hits().len(), 3);
    }

    #[test]
    fn test_top_hits_memoized() {
        let t = table(HITS);
        let a = t.top_hits().as_ptr();
        let b = t.top_hits().as_ptr();
        assert_eq!(a, b);
    }

    #[test]
    fn test_wrong_column_count() {
        let err = AlignmentHitTable::from_reader(Cursor::new("Q1\tCDD:1\t40.0\n"), "bad.tsv")
            .unwrap_err();
        match err {
            CogError::Parse { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_field() {
        let text = "# header\nQ1\tCDD:1\tabc\t100\t2\t0\t1\t100\t1\t100\t1e-10\t150.0\n";
        let err = AlignmentHitTable::from_reader(Cursor::new(text), "bad.tsv").unwrap_err();
        match err {
            CogError::Parse { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("pident"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_out_of_range_scores() {
        let cases = [
            ("NaN", "1e-10", "150.0", "pident"),
            ("45.0", "-1e-10", "150.0", "evalue"),
            ("45.0", "1e-10", "inf", "bitscore"),
        ];
        for (pident, evalue, bitscore, field) in cases {
            let text = format!(
                "Q1\tCDD:1\t{pident}\t100\t2\t0\t1\t100\t1\t100\t{evalue}\t{bitscore}\n"
            );
            let err = AlignmentHitTable::from_reader(Cursor::new(text), "bad.tsv").unwrap_err();
            match err {
                CogError::Parse { line, reason, .. } => {
                    assert_eq!(line, 1);
                    assert!(reason.contains(field), "{reason}");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_to_tsv() {
        let t = table("Q1\tCDD:999\t45.0\t100\t2\t0\t1\t100\t1\t100\t1e-10\t150.0\n");
        assert_eq!(
            t.to_tsv(),
            "Q1\tCDD:999\t45.0\t100\t2\t0\t1\t100\t1\t100\t1e-10\t150.0\n"
        );
    }
}
