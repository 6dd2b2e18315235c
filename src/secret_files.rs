//! # Secret File Discovery
//!
//! Finds `name.secret` files in a directory. The file stem is the secret
//! name, the file content is the secret value.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;
use zeroize::Zeroizing;

use crate::constants::SECRET_FILE_EXTENSION;
use crate::error::DiscoveryError;

/// A secret read from disk, not yet pushed anywhere
pub struct LocalSecret {
    pub name: String,
    pub data: Zeroizing<String>,
}

impl std::fmt::Debug for LocalSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSecret")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Every `*.secret` regular file directly inside `dir`, sorted by name
///
/// Subdirectories are not searched. Finding nothing is an error.
pub fn find_secret_files(dir: &Path) -> Result<Vec<LocalSecret>, DiscoveryError> {
    if !dir.is_dir() {
        return Err(DiscoveryError::MissingDirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut secrets = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| DiscoveryError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();

        if !entry.file_type().is_file()
            || path.extension().and_then(|ext| ext.to_str()) != Some(SECRET_FILE_EXTENSION)
        {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };

        let data = fs::read_to_string(path).map_err(|source| DiscoveryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        secrets.push(LocalSecret {
            name: name.to_string(),
            data: Zeroizing::new(data),
        });
    }

    if secrets.is_empty() {
        return Err(DiscoveryError::NoSecrets {
            path: dir.to_path_buf(),
        });
    }
    Ok(secrets)
}
