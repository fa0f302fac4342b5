use crate::{InstanceError, InstanceResult};

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::info;
use tokio::fs;

/// Number of previous generations kept next to a rotated directory.
pub const GENERATIONS: usize = 2;

fn generation(dir: &Path, n: usize) -> PathBuf {
    let mut name = dir.as_os_str().to_os_string();
    name.push(format!(".{n}"));
    PathBuf::from(name)
}

/// Shift `dir` into its backup generations and leave an empty `dir`.
///
/// 1. The oldest generation (`dir.2`) is deleted
/// 2. `dir.1` becomes `dir.2`, `dir` becomes `dir.1`
/// 3. A new empty `dir` is created
///
/// Missing generations are skipped, so the first rotations of a fresh
/// directory work too.
pub async fn rotate_dir(dir: &Path) -> InstanceResult<()> {
    let oldest = generation(dir, GENERATIONS);
    match fs::remove_dir_all(&oldest).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(InstanceError::file(oldest, e)),
    }

    for n in (1..GENERATIONS).rev() {
        shift(&generation(dir, n), &generation(dir, n + 1)).await?;
    }
    shift(dir, &generation(dir, 1)).await?;

    fs::create_dir_all(dir)
        .await
        .map_err(|e| InstanceError::file(dir, e))?;

    info!("Rotated {}", dir.display());
    Ok(())
}

async fn shift(from: &Path, to: &Path) -> InstanceResult<()> {
    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(InstanceError::file(from, e)),
    }
}
