//src/types.rs

/// One row of RPS-BLAST tabular output (`-outfmt 6`).
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentHit {
    pub qaccver: String,
    pub saccver: String,
    pub pident: f64,
    pub length: u32,
    pub mismatch: u32,
    pub gapopen: u32,
    pub qstart: u32,
    pub qend: u32,
    pub sstart: u32,
    pub send: u32,
    pub evalue: f64,
    pub bitscore: f64,
}

impl AlignmentHit {
    pub fn as_tsv(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.qaccver,
            self.saccver,
            format_float(self.pident),
            self.length,
            self.mismatch,
            self.gapopen,
            self.qstart,
            self.qend,
            self.sstart,
            self.send,
            format_float(self.evalue),
            format_float(self.bitscore),
        )
    }
}

/// A COG functional category, e.g. `J` / Translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CogFuncCategory {
    pub letter: String,
    pub group: String,
    /// Hex color without the leading `#`.
    pub color: String,
    pub desc: String,
}

impl CogFuncCategory {
    pub fn as_tsv(&self) -> String {
        format!("{}\t{}\t{}\t{}", self.letter, self.group, self.color, self.desc)
    }
}

/// One COG definition row. Only the first four columns are mandatory in the
/// NCBI file, so the trailing ones are optional here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CogDefinition {
    pub id: String,
    /// May hold several letters (e.g. `KT`).
    pub letter: String,
    pub cog_name: String,
    pub gene_name: String,
    pub func_pathway: Option<String>,
    pub pubmed_ids: Vec<String>,
    pub pdb_ids: Vec<String>,
}

impl CogDefinition {
    /// Effective category letter (`KT` -> `K`).
    pub fn one_letter(&self) -> &str {
        match self.letter.chars().next() {
            Some(c) => &self.letter[..c.len_utf8()],
            None => "",
        }
    }

    pub fn as_tsv(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.id,
            self.letter,
            self.cog_name,
            self.gene_name,
            self.func_pathway.as_deref().unwrap_or(""),
            self.pubmed_ids.join(";"),
            self.pdb_ids.join(";"),
        )
    }
}

/// Per-query classification result.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyRow {
    pub query_id: String,
    pub cog_id: String,
    pub cdd_id: String,
    pub evalue: f64,
    pub identity: f64,
    pub gene_name: String,
    pub cog_name: String,
    pub cog_letter: String,
    pub cog_description: String,
}

impl ClassifyRow {
    pub const HEADER: &'static str =
        "QUERY_ID\tCOG_ID\tCDD_ID\tEVALUE\tIDENTITY\tGENE_NAME\tCOG_NAME\tCOG_LETTER\tCOG_DESCRIPTION";

    pub fn as_tsv(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.query_id,
            self.cog_id,
            self.cdd_id,
            format_float(self.evalue),
            format_float(self.identity),
            self.gene_name,
            self.cog_name,
            self.cog_letter,
            self.cog_description,
        )
    }
}

/// Per-category count row; one exists for every category, even at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountSummaryRow {
    pub letter: String,
    pub count: usize,
    pub group: String,
    pub color: String,
    pub description: String,
}

impl CountSummaryRow {
    pub const HEADER: &'static str = "LETTER\tCOUNT\tGROUP\tCOLOR\tDESCRIPTION";

    pub fn as_tsv(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.letter, self.count, self.group, self.color, self.description
        )
    }
}

/// Writes a float the way BLAST users expect to read it back:
/// `45.0`, `150.0`, `1e-10`, `3e-05`, `0.002`, `1e+16`.
pub fn format_float(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let abs = v.abs();
    if abs != 0.0 && (abs < 1e-4 || abs >= 1e16) {
        return pad_exponent(&format!("{:e}", v));
    }
    let s = v.to_string();
    if s.contains('.') {
        s
    } else {
        format!("{s}.0")
    }
}

/// `3e-5` -> `3e-05`, `1e16` -> `1e+16`: signed, at least two exponent digits.
fn pad_exponent(sci: &str) -> String {
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci.to_string();
    };
    let (sign, digits) = match exp.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exp),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(45.0), "45.0");
        assert_eq!(format_float(1e-10), "1e-10");
        assert_eq!(format_float(0.002), "0.002");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(98.765), "98.765");
        assert_eq!(format_float(3e-5), "3e-05");
        assert_eq!(format_float(2.5e-7), "2.5e-07");
        assert_eq!(format_float(1e-100), "1e-100");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1e15), "1000000000000000.0");
    }

    #[test]
    fn test_one_letter() {
        let def = CogDefinition {
            id: "COG0001".into(),
            letter: "KT".into(),
            cog_name: "name".into(),
            gene_name: "gene".into(),
            func_pathway: None,
            pubmed_ids: vec![],
            pdb_ids: vec![],
        };
        assert_eq!(def.one_letter(), "K");
        assert_eq!(def.as_tsv(), "COG0001\tKT\tname\tgene\t\t\t");
    }
}
