use std::{fs, io, path::Path};

use walkdir::WalkDir;
use zip::ZipArchive;

use crate::acquire::AcquireError;

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Path exists but is not a directory: {}", path.display()),
            ));
        }
    } else {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Extracts the given `.zip` file to the target directory.
/// If `delete_after` is `true`, removes the `.zip` file once extraction has been attempted.
pub(crate) fn extract_zip(zip_path: &Path, dest_dir: &Path, delete_after: bool) -> Result<(), AcquireError> {
    let result = (|| {
        let file = fs::File::open(zip_path)
            .map_err(|source| AcquireError::io(format!("failed to open {}", zip_path.display()), source))?;
        let mut archive = ZipArchive::new(file)
            .map_err(|source| AcquireError::Archive { path: zip_path.to_path_buf(), source })?;

        archive.extract(dest_dir)
            .map_err(|source| AcquireError::Archive { path: zip_path.to_path_buf(), source })
    })();

    if !delete_after { return result }

    // An extraction failure outranks a failure to clean up after it.
    let removed = fs::remove_file(zip_path)
        .map_err(|source| AcquireError::io(format!("failed to delete {}", zip_path.display()), source));
    result.and(removed)
}

/// Moves every file under `from` into the same relative location under `to`.
/// Files whose extension equals `last_ext` are moved after all others, so that
/// their presence implies the rest of the tree has landed.
pub(crate) fn move_tree(from: &Path, to: &Path, last_ext: &str) -> io::Result<()> {
    let mut files = WalkDir::new(from).into_iter()
        .filter_map(|entry| match entry {
            Ok(e) if e.file_type().is_file() => Some(Ok(e.into_path())),
            Ok(_) => None,
            Err(err) => Some(Err(io::Error::other(err))),
        })
        .collect::<io::Result<Vec<_>>>()?;

    files.sort_by_key(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case(last_ext)));

    for path in files {
        let rel = path.strip_prefix(from).map_err(io::Error::other)?;
        let target = to.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&path, &target)?;
    }

    Ok(())
}
