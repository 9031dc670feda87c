use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub(crate) trait FileStore {
    /// Every file next to `primary` whose name starts with its stem
    /// (subtitles, artwork, nfo), `primary` included. Sorted.
    fn sibling_files(&self, primary: &Path) -> io::Result<Vec<PathBuf>>;

    fn delete_file(&self, path: &Path) -> io::Result<()>;
}

pub(crate) struct LocalFiles;

impl FileStore for LocalFiles {
    fn sibling_files(&self, primary: &Path) -> io::Result<Vec<PathBuf>> {
        let Some(stem) = primary.file_stem().map(|stem| stem.to_string_lossy().into_owned())
        else {
            return Ok(Vec::new());
        };
        let dir = match primary.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let mut siblings = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().starts_with(&stem) {
                siblings.push(entry.path());
            }
        }
        siblings.sort();
        Ok(siblings)
    }

    fn delete_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}
