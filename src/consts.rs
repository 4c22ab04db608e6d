//src/consts.rs

/// COG 2024 definition table (`<cog_id> <letters> <name> <gene> ...`).
pub const COG_DEF_URL: &str = "https://ftp.ncbi.nih.gov/pub/COG/COG2024/data/cog-24.def.tab";

pub const CDDID_TBL_URL: &str = "https://ftp.ncbi.nih.gov/pub/mmdb/cdd/cddid.tbl.gz";
/// Pre-built RPS-BLAST database of the COG models (little endian).
pub const COG_LE_URL: &str = "https://ftp.ncbi.nih.gov/pub/mmdb/cdd/little_endian/Cog_LE.tar.gz";

/// Directory `Cog_LE.tar.gz` is unpacked into, and the database name inside it.
pub const COG_LE_DIR: &str = "Cog_LE";
pub const COG_LE_DB_NAME: &str = "Cog";

/// RPS-BLAST reports CDD subjects as `CDD:<cdd_id>`.
pub const CDD_SUBJECT_PREFIX: &str = "CDD:";

pub const DEFAULT_EVALUE: f64 = 1e-2;
pub const CACHE_DIR_NAME: &str = "cogclassifier_rs";

pub const RPSBLAST_OUTFILE: &str = "rpsblast.tsv";
pub const COG_COUNT_OUTFILE: &str = "cog_count.tsv";
pub const COG_CLASSIFY_OUTFILE: &str = "cog_classify.tsv";
pub const LOG_FILE: &str = "cogclassifier.log";

pub const UNKNOWN_VERSION: &str = "?.?.?";
