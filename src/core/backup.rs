use crate::config::Config;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::ensure_writable;
use crate::ui::messages::{info, success, warning};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Copy the database to `dest_file`, optionally compressing it
    /// (zip on Windows, tar.gz elsewhere). Returns the final file path.
    pub fn backup(
        pool: &mut DbPool,
        cfg: &Config,
        dest_file: &str,
        compress: bool,
        force: bool,
    ) -> AppResult<PathBuf> {
        let src = Path::new(&cfg.database);
        let dest = Path::new(dest_file);

        // 1️⃣ Check DB exists
        if !src.exists() {
            return Err(AppError::from(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Database not found: {}", src.display()),
            )));
        }

        if !dest.is_absolute() {
            return Err(AppError::Validation(format!(
                "Backup file path must be absolute: {dest_file}"
            )));
        }

        // 2️⃣ Ensure destination folder exists
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        ensure_writable(dest, force)?;

        // 3️⃣ Flush pending WAL pages, then copy
        pool.conn.execute_batch("PRAGMA wal_checkpoint(FULL);").ok();
        fs::copy(src, dest)?;
        success(format!("Backup created: {}", dest.display()));

        // 4️⃣ Optional compression
        let final_path = if compress {
            let compressed = compress_backup(dest)?;

            if let Err(e) = fs::remove_file(dest) {
                warning(format!("Failed to remove uncompressed backup: {}", e));
            } else {
                info(format!("Removed uncompressed backup: {}", dest.display()));
            }

            compressed
        } else {
            dest.to_path_buf()
        };

        // 5️⃣ Log in DB
        ttlog(
            &pool.conn,
            "backup",
            &final_path.to_string_lossy(),
            if compress {
                "Backup created and compressed"
            } else {
                "Backup created"
            },
        )?;

        Ok(final_path)
    }
}

fn entry_name(path: &Path) -> AppResult<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| AppError::Validation(format!("Not a file path: {}", path.display())))
}

#[cfg(target_os = "windows")]
fn compress_backup(path: &Path) -> AppResult<PathBuf> {
    let zip_path = path.with_extension("zip");
    write_zip(path, &zip_path)?;
    info(format!("Compressed: {}", zip_path.display()));
    Ok(zip_path)
}

#[cfg(not(target_os = "windows"))]
fn compress_backup(path: &Path) -> AppResult<PathBuf> {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    let gz_path = PathBuf::from(format!("{}.tar.gz", path.display()));
    let file = fs::File::create(&gz_path)?;
    let encoder = GzEncoder::new(file, Compression::default());

    let mut archive = tar::Builder::new(encoder);
    archive.append_path_with_name(path, entry_name(path)?)?;
    archive.into_inner()?.finish()?;

    info(format!("Compressed: {}", gz_path.display()));
    Ok(gz_path)
}

fn write_zip(src: &Path, zip_path: &Path) -> AppResult<()> {
    let file = fs::File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut f = fs::File::open(src)?;
    zip.start_file(entry_name(src)?, options)
        .map_err(std::io::Error::other)?;

    std::io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(std::io::Error::other)?;
    Ok(())
}

/// Zip the database next to itself before a schema upgrade touches it.
pub fn snapshot_before_migration(db_path: &str) -> AppResult<PathBuf> {
    let src = Path::new(db_path);
    let stamp = Local::now().format("%Y%m%d%H%M%S");
    let zip_path = PathBuf::from(format!("{}.pre-migration-{}.zip", db_path, stamp));

    write_zip(src, &zip_path)?;
    success(format!("Safety backup created: {}", zip_path.display()));
    Ok(zip_path)
}
