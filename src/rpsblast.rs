//src/rpsblast.rs

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::blast::AlignmentHitTable;
use crate::consts::{DEFAULT_EVALUE, UNKNOWN_VERSION};
use crate::error::{CogError, Result};

/// Binary names RPS-BLAST is installed under, in lookup order.
/// Debian packages it as `rpsblast+`.
pub const RPSBLAST_BINARIES: [&str; 2] = ["rpsblast", "rpsblast+"];

/// Runs RPS-BLAST (`-outfmt 6`) for a query FASTA against a CDD database.
#[derive(Debug, Clone)]
pub struct RpsBlast {
    query: PathBuf,
    db: PathBuf,
    outfile: PathBuf,
    evalue: f64,
    threads: usize,
}

impl RpsBlast {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(query: P, db: Q, outfile: R) -> Self {
        Self {
            query: query.as_ref().to_path_buf(),
            db: db.as_ref().to_path_buf(),
            outfile: outfile.as_ref().to_path_buf(),
            evalue: DEFAULT_EVALUE,
            threads: 1,
        }
    }

    pub fn evalue(mut self, evalue: f64) -> Self {
        self.evalue = evalue;
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Arguments passed to the binary.
    pub fn args(&self) -> Vec<String> {
        vec![
            "-query".into(),
            self.query.display().to_string(),
            "-db".into(),
            self.db.display().to_string(),
            "-outfmt".into(),
            "6".into(),
            "-out".into(),
            self.outfile.display().to_string(),
            "-evalue".into(),
            self.evalue.to_string(),
            "-num_threads".into(),
            self.threads.to_string(),
            "-mt_mode".into(),
            "1".into(),
        ]
    }

    /// Runs the search and parses the written output file.
    pub fn run(&self) -> Result<AlignmentHitTable> {
        let binary = binary_name()?;
        let args = self.args();
        let cmd_line = format!("{} {}", binary, args.join(" "));

        log::info!("Start RPS-BLAST (v{}) search", version());
        log::info!("$ {cmd_line}");

        let output = Command::new(&binary)
            .args(&args)
            .output()
            .map_err(|e| CogError::io(&binary, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            log::error!("Failed to run command below ({})", output.status);
            log::error!("$ {cmd_line}");
            for line in stderr.lines() {
                log::error!("> {line}");
            }
            return Err(CogError::Command {
                cmd: cmd_line,
                status: output.status.to_string(),
                stderr,
            });
        }

        log::info!("Finished RPS-BLAST search");
        AlignmentHitTable::from_path(&self.outfile)
    }
}

/// First installed RPS-BLAST binary name.
pub fn binary_name() -> Result<String> {
    binary_name_in(std::env::var_os("PATH"))
}

fn binary_name_in(paths: Option<OsString>) -> Result<String> {
    let cwd = std::env::current_dir().map_err(|e| CogError::io(".", e))?;
    RPSBLAST_BINARIES
        .iter()
        .find(|name| which::which_in(name, paths.as_ref(), &cwd).is_ok())
        .map(|name| name.to_string())
        .ok_or_else(|| CogError::ToolNotFound("rpsblast".to_string()))
}

/// RPS-BLAST version (e.g. `2.15.0`), or `?.?.?` when it can't be determined.
pub fn version() -> String {
    let Ok(binary) = binary_name() else {
        return UNKNOWN_VERSION.to_string();
    };
    match Command::new(binary).arg("-version").output() {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let text = if stdout.trim().is_empty() {
                String::from_utf8_lossy(&output.stderr).into_owned()
            } else {
                stdout.into_owned()
            };
            parse_version(&text).unwrap_or_else(|| UNKNOWN_VERSION.to_string())
        }
        Err(_) => UNKNOWN_VERSION.to_string(),
    }
}

/// Extracts `X.Y.Z` from `rpsblast: 2.15.0+\n Package: blast 2.15.0, ...`.
pub fn parse_version(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let idx = line.find("blast ")?;
        let rest = &line[idx + "blast ".len()..];
        let version: String = rest
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        (version.split('.').count() == 3 && !version.ends_with('.')).then_some(version)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        let text = "rpsblast: 2.15.0+\n Package: blast 2.15.0, build Oct 19 2023 12:35:51\n";
        assert_eq!(parse_version(text).as_deref(), Some("2.15.0"));
        assert_eq!(parse_version("no version here"), None);
    }

    #[test]
    fn test_args() {
        let rps = RpsBlast::new("q.faa", "Cog_LE/Cog", "out.tsv")
            .evalue(1e-3)
            .threads(0);
        let args = rps.args();
        assert_eq!(args[0..2], ["-query", "q.faa"]);
        assert!(args.windows(2).any(|w| w == ["-num_threads", "1"]));
        assert!(args.windows(2).any(|w| w == ["-evalue", "0.001"]));
        assert!(args.windows(2).any(|w| w == ["-outfmt", "6"]));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_does_not_shadow_binary() {
        use std::os::unix::fs::PermissionsExt;

        let stray = tempfile::tempdir().unwrap();
        let installed = tempfile::tempdir().unwrap();

        let plain = stray.path().join("rpsblast");
        std::fs::write(&plain, "").unwrap();
        std::fs::set_permissions(&plain, std::fs::Permissions::from_mode(0o644)).unwrap();

        let exe = installed.path().join("rpsblast+");
        std::fs::write(&exe, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let paths = std::env::join_paths([stray.path(), installed.path()]).unwrap();
        assert_eq!(binary_name_in(Some(paths)).unwrap(), "rpsblast+");

        let only_stray = std::env::join_paths([stray.path()]).unwrap();
        assert!(matches!(
            binary_name_in(Some(only_stray)),
            Err(CogError::ToolNotFound(_))
        ));
    }
}
