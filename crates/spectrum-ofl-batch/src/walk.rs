//! Two-level fixture tree discovery
//!
//! The input root holds one directory per manufacturer, each holding one file
//! per fixture. Anything else at either level is ignored.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::BatchError;

/// A fixture file found in the input tree
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FixtureFile {
    /// Manufacturer directory name
    pub manufacturer: OsString,
    /// Fixture file name inside the manufacturer directory
    pub file_name: OsString,
    /// Absolute or root-relative path of the source file
    pub source: PathBuf,
}

impl FixtureFile {
    /// `manufacturer/file_name`, shared by input and output trees
    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.manufacturer).join(&self.file_name)
    }

    /// Mirrored location of this fixture under the output root
    pub fn output_path(&self, output_root: &Path) -> PathBuf {
        output_root.join(self.relative_path())
    }

    pub fn display_path(&self) -> String {
        self.relative_path().to_string_lossy().into_owned()
    }
}

/// Result of walking the input tree
#[derive(Debug, Default)]
pub struct FixtureTree {
    /// Fixture files sorted by manufacturer, then file name
    pub files: Vec<FixtureFile>,
    /// Manufacturer directories that could not be listed
    pub unreadable: Vec<BatchError>,
}

/// Check that the input root exists and is a directory
pub async fn check_input_root(input_root: &Path) -> Result<(), BatchError> {
    match tokio::fs::metadata(input_root).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(BatchError::NotADirectory(input_root.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(BatchError::InputNotFound(input_root.to_path_buf()))
        }
        Err(source) => Err(BatchError::List {
            path: input_root.to_path_buf(),
            source,
        }),
    }
}

/// An existing output root must be a directory; a missing one is created later
pub async fn check_output_root(output_root: &Path) -> Result<(), BatchError> {
    match tokio::fs::metadata(output_root).await {
        Ok(meta) if !meta.is_dir() => Err(BatchError::NotADirectory(output_root.to_path_buf())),
        _ => Ok(()),
    }
}

/// Find every `manufacturer/fixture` file under the input root
///
/// Failing to list the root itself is fatal. Failing to list one manufacturer
/// directory is recorded in [`FixtureTree::unreadable`] and the walk goes on.
pub async fn discover_fixtures(input_root: &Path) -> Result<FixtureTree, BatchError> {
    check_input_root(input_root).await?;

    let mut tree = FixtureTree::default();

    for manufacturer_path in list_entries(input_root).await? {
        if !is_dir(&manufacturer_path).await {
            debug!(path = %manufacturer_path.display(), "Ignoring non-directory entry");
            continue;
        }
        let Some(manufacturer) = manufacturer_path.file_name().map(OsString::from) else {
            continue;
        };

        let fixture_paths = match list_entries(&manufacturer_path).await {
            Ok(paths) => paths,
            Err(e) => {
                tree.unreadable.push(e);
                continue;
            }
        };

        let mut found = 0;
        for source in fixture_paths {
            if !is_file(&source).await {
                debug!(path = %source.display(), "Ignoring non-file entry");
                continue;
            }
            let Some(file_name) = source.file_name().map(OsString::from) else {
                continue;
            };
            tree.files.push(FixtureFile {
                manufacturer: manufacturer.clone(),
                file_name,
                source,
            });
            found += 1;
        }

        debug!(
            manufacturer = %manufacturer.to_string_lossy(),
            fixtures = found,
            "Scanned manufacturer directory"
        );
    }

    Ok(tree)
}

/// Directory entries sorted by file name
async fn list_entries(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let list_error = |source| BatchError::List {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(list_error)?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

// Symlinks are followed; broken links count as neither file nor directory.
async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::capture_logs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "{}").unwrap();
    }

    #[tokio::test]
    async fn test_discover_two_levels_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("martin/mac-aura.json"));
        touch(&root.join("cameo/zenit.json"));
        touch(&root.join("cameo/flat-par.json"));
        touch(&root.join("manufacturers.json"));
        touch(&root.join("cameo/nested/deep.json"));

        let tree = discover_fixtures(root).await.unwrap();
        let found: Vec<_> = tree.files.iter().map(FixtureFile::display_path).collect();
        assert_eq!(
            found,
            vec![
                Path::new("cameo").join("flat-par.json").to_string_lossy().into_owned(),
                Path::new("cameo").join("zenit.json").to_string_lossy().into_owned(),
                Path::new("martin").join("mac-aura.json").to_string_lossy().into_owned(),
            ]
        );
        assert!(tree.unreadable.is_empty());
    }

    #[tokio::test]
    async fn test_ignored_entries_logged_at_debug() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("manufacturers.json"));
        touch(&root.join("cameo/nested/deep.json"));
        let (logs, _guard) = capture_logs();

        let tree = discover_fixtures(root).await.unwrap();
        assert!(tree.files.is_empty());

        let logs = logs.contents();
        assert!(logs.contains("DEBUG"));
        assert!(logs.contains("Ignoring non-directory entry"));
        assert!(logs.contains("Ignoring non-file entry"));
    }

    #[tokio::test]
    async fn test_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let err = discover_fixtures(&temp_dir.path().join("nope")).await.unwrap_err();
        assert!(matches!(err, BatchError::InputNotFound(_)));
    }

    #[tokio::test]
    async fn test_root_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("fixture.json");
        touch(&file);
        let err = discover_fixtures(&file).await.unwrap_err();
        assert!(matches!(err, BatchError::NotADirectory(_)));
    }

    #[tokio::test]
    async fn test_output_root_checks() {
        let temp_dir = TempDir::new().unwrap();
        assert!(check_output_root(&temp_dir.path().join("new")).await.is_ok());

        let file = temp_dir.path().join("occupied");
        touch(&file);
        assert!(matches!(
            check_output_root(&file).await,
            Err(BatchError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_output_path_mirrors_input() {
        let file = FixtureFile {
            manufacturer: OsString::from("cameo"),
            file_name: OsString::from("zenit.json"),
            source: PathBuf::from("/ofl/fixtures/cameo/zenit.json"),
        };
        assert_eq!(
            file.output_path(Path::new("/out")),
            PathBuf::from("/out/cameo/zenit.json")
        );
    }
}
