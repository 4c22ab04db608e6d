use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::{CogError, Result};

/// Opens a text file for line reading, transparently decompressing it when
/// the name ends with `.gz`.
pub fn open_text<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| CogError::io(path, e))?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    Ok(reader)
}

/// Counts FASTA records (lines starting with `>`). Supports `.gz`.
pub fn count_fasta_records<P: AsRef<Path>>(path: P) -> Result<usize> {
    let path = path.as_ref();
    let mut reader = open_text(path)?;

    let mut count = 0;
    let mut line = Vec::new();
    loop {
        line.clear();
        // byte lines: headers of some FASTA files are not valid UTF-8
        if reader
            .read_until(b'\n', &mut line)
            .map_err(|e| CogError::io(path, e))?
            == 0
        {
            break; // EOF
        }
        if line.first() == Some(&b'>') {
            count += 1;
        }
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const FASTA: &str = ">seq1 desc\nMKV\nLLA\n>seq2\nMAAA\n\n>seq3\nM\n";

    #[test]
    fn test_count_plain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("query.faa");
        std::fs::write(&path, FASTA).unwrap();
        assert_eq!(count_fasta_records(&path).unwrap(), 3);
    }

    #[test]
    fn test_count_gz() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("query.faa.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(FASTA.as_bytes()).unwrap();
        enc.finish().unwrap();
        assert_eq!(count_fasta_records(&path).unwrap(), 3);
    }

    #[test]
    fn test_count_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.faa");
        std::fs::write(&path, "").unwrap();
        assert_eq!(count_fasta_records(&path).unwrap(), 0);
    }

    #[test]
    fn test_missing_file() {
        let err = count_fasta_records("/nonexistent/query.faa").unwrap_err();
        assert!(matches!(err, CogError::Io { .. }));
    }
}
