use std::env;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use log::trace;

/// Answers "does some PATH directory hold an entry with this exact name".
///
/// Only the entry name is checked: a directory, a dangling symlink or a
/// non-executable file all count as a hit.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    path: Option<OsString>,
}

impl PathResolver {
    /// Reads `PATH` afresh at every query.
    pub fn new() -> Self {
        PathResolver { path: None }
    }

    pub fn with_path(path: impl Into<OsString>) -> Self {
        PathResolver {
            path: Some(path.into()),
        }
    }

    pub fn resolve(&self, name: impl AsRef<[u8]>) -> bool {
        let name = name.as_ref();
        let path = match &self.path {
            Some(p) => p.clone(),
            None => match env::var_os("PATH") {
                Some(p) => p,
                None => return false,
            },
        };
        if path.is_empty() {
            return false;
        }

        for dir in search_dirs(&path) {
            let Ok(entries) = fs::read_dir(&dir) else {
                trace!("skipping unreadable PATH entry {:?}", dir);
                continue;
            };
            let found = entries
                .filter_map(Result::ok)
                .any(|entry| entry.file_name().as_bytes() == name);
            if found {
                trace!("found {} in {:?}", String::from_utf8_lossy(name), dir);
                return true;
            }
        }
        false
    }
}

/// Splits a PATH value on ':'. Empty components are kept as empty paths.
pub fn search_dirs(path: &OsStr) -> Vec<PathBuf> {
    path.as_bytes()
        .split(|&b| b == b':')
        .map(|dir| PathBuf::from(OsStr::from_bytes(dir)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_search_dirs_keeps_order_and_empties() {
        let dirs = search_dirs(OsStr::new("/usr/bin::/bin:"));
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/usr/bin"),
                PathBuf::from(""),
                PathBuf::from("/bin"),
                PathBuf::from(""),
            ]
        );
    }

    #[test]
    fn test_resolve_exact_name_only() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("python3")).unwrap();
        let resolver = PathResolver::with_path(dir.path());

        assert!(resolver.resolve("python3"));
        assert!(!resolver.resolve("python"));
        assert!(!resolver.resolve("Python3"));
    }

    #[test]
    fn test_resolve_searches_every_directory() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        File::create(second.path().join("tool")).unwrap();

        let mut path = OsString::from("/definitely/not/here:");
        path.push(first.path());
        path.push(":");
        path.push(second.path());
        let resolver = PathResolver::with_path(path);

        assert!(resolver.resolve("tool"));
        assert!(!resolver.resolve("other"));
    }

    #[test]
    fn test_resolve_accepts_non_executable_entries() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        let resolver = PathResolver::with_path(dir.path());

        assert!(resolver.resolve("subdir"));
        assert!(resolver.resolve("notes.txt"));
    }

    #[test]
    fn test_resolve_empty_path() {
        let resolver = PathResolver::with_path("");
        assert!(!resolver.resolve("ls"));
    }
}
