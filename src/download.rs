//src/download.rs

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use flate2::read::GzDecoder;
use tar::Archive;

use crate::config::ClassifierConfig;
use crate::consts::{CDDID_TBL_URL, COG_DEF_URL, COG_LE_DB_NAME, COG_LE_DIR, COG_LE_URL};
use crate::error::{CogError, Result};

/// Large archives (Cog_LE is a few hundred MB) need a generous timeout.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Local paths of the NCBI resources a run needs.
#[derive(Debug, Clone)]
pub struct ResourcePaths {
    pub cddid_table: PathBuf,
    pub cog_definition: PathBuf,
    /// RPS-BLAST database prefix, `<download_dir>/Cog_LE/Cog`.
    pub rpsblast_db: PathBuf,
}

/// File name a URL is saved under.
pub fn url_file_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Downloads `url` into `outdir`. An existing file is reused unless
/// `overwrite` is set.
pub fn ftp_download<P: AsRef<Path>>(url: &str, outdir: P, overwrite: bool) -> Result<PathBuf> {
    let outdir = outdir.as_ref();
    fs::create_dir_all(outdir).map_err(|e| CogError::io(outdir, e))?;
    let download_file = outdir.join(url_file_name(url));

    log::info!("Download {url}");
    if download_file.exists() && !overwrite {
        log::info!("=> Already file exists {}", download_file.display());
        return Ok(download_file);
    }

    let response = ureq::get(url)
        .timeout(DOWNLOAD_TIMEOUT)
        .call()
        .map_err(|e| CogError::Download {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    // renamed into place only once the body is complete
    let partial = download_file.with_extension("part");
    {
        let file = File::create(&partial).map_err(|e| CogError::io(&partial, e))?;
        let mut writer = BufWriter::new(file);
        let mut reader = response.into_reader();
        io::copy(&mut reader, &mut writer).map_err(|e| CogError::Download {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    }
    fs::rename(&partial, &download_file).map_err(|e| CogError::io(&download_file, e))?;

    log::info!("=> Successfully downloaded {}", download_file.display());
    Ok(download_file)
}

/// Unpacks a `.tar.gz` archive into `dest`, unless `dest` already exists.
pub fn unpack_targz<P: AsRef<Path>, Q: AsRef<Path>>(archive: P, dest: Q) -> Result<()> {
    let archive = archive.as_ref();
    let dest = dest.as_ref();
    if dest.exists() {
        log::debug!("{} already unpacked", dest.display());
        return Ok(());
    }

    log::info!("Unpack {} => {}", archive.display(), dest.display());
    let file = File::open(archive).map_err(|e| CogError::io(archive, e))?;
    fs::create_dir_all(dest).map_err(|e| CogError::io(dest, e))?;

    let mut tar = Archive::new(GzDecoder::new(file));
    if let Err(e) = tar.unpack(dest) {
        // leave no half-unpacked directory behind
        let _ = fs::remove_dir_all(dest);
        return Err(CogError::io(archive, e));
    }
    Ok(())
}

/// Fetches (or reuses) every resource the classifier needs.
pub fn prepare_resources(config: &ClassifierConfig) -> Result<ResourcePaths> {
    let download_dir = &config.download_dir;
    log::info!("Download COG & CDD resources in NCBI FTP site");

    let cddid_table = ftp_download(CDDID_TBL_URL, download_dir, false)?;

    let cog_le_targz = ftp_download(COG_LE_URL, download_dir, false)?;
    let cog_le_dir = download_dir.join(COG_LE_DIR);
    unpack_targz(&cog_le_targz, &cog_le_dir)?;

    let cog_definition = match &config.cog_definition_file {
        Some(path) => path.clone(),
        None => ftp_download(COG_DEF_URL, download_dir, false)?,
    };
    // definition release in use
    let def_size = fs::metadata(&cog_definition)
        .map_err(|e| CogError::io(&cog_definition, e))?
        .len();
    log::info!(
        "COG definition: {} ({} bytes)",
        cog_definition.display(),
        def_size
    );

    Ok(ResourcePaths {
        cddid_table,
        cog_definition,
        rpsblast_db: cog_le_dir.join(COG_LE_DB_NAME),
    })
}
