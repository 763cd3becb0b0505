use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::{Project, ProjectError};

/// Named project persistence. Projects are stored as their JSON text so
/// every backend validates them the same way on load.
pub trait ProjectStore {
    fn list(&self) -> Result<Vec<String>, ProjectError>;
    fn load(&self, name: &str) -> Result<Option<Project>, ProjectError>;
    fn save(&mut self, name: &str, project: &Project) -> Result<(), ProjectError>;
    fn delete(&mut self, name: &str) -> Result<bool, ProjectError>;
}

#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    entries: BTreeMap<String, String>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn list(&self) -> Result<Vec<String>, ProjectError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn load(&self, name: &str) -> Result<Option<Project>, ProjectError> {
        self.entries
            .get(name)
            .map(|raw| Project::from_json(raw))
            .transpose()
    }

    fn save(&mut self, name: &str, project: &Project) -> Result<(), ProjectError> {
        self.entries.insert(name.to_string(), project.to_json()?);
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<bool, ProjectError> {
        Ok(self.entries.remove(name).is_some())
    }
}

/// One `<name>.json` file per project inside a directory.
#[derive(Debug)]
pub struct DirectoryProjectStore {
    root: PathBuf,
}

impl DirectoryProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ProjectError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| ProjectError::Io(format!("create {}: {e}", root.display())))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, ProjectError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(ProjectError::Io(format!("invalid project name '{name}'")));
        }
        Ok(self.root.join(format!("{name}.json")))
    }
}

impl ProjectStore for DirectoryProjectStore {
    fn list(&self) -> Result<Vec<String>, ProjectError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| ProjectError::Io(format!("list {}: {e}", self.root.display())))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| ProjectError::Io(e.to_string()))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn load(&self, name: &str) -> Result<Option<Project>, ProjectError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .map_err(|e| ProjectError::Io(format!("read {}: {e}", path.display())))?;
        Project::from_json(&raw).map(Some)
    }

    fn save(&mut self, name: &str, project: &Project) -> Result<(), ProjectError> {
        let path = self.path_for(name)?;
        let raw = project.to_json()?;
        // Atomic replace.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(|e| ProjectError::Io(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path)
            .map_err(|e| ProjectError::Io(format!("rename {}: {e}", path.display())))?;
        info!(path = %path.display(), "saved project");
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<bool, ProjectError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .map_err(|e| ProjectError::Io(format!("delete {}: {e}", path.display())))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::{DirectoryProjectStore, InMemoryProjectStore, ProjectStore};
    use crate::{Project, ProjectError};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use survey::Horizon;

    fn temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("seis-catalog-{tag}-{}-{nanos}", std::process::id()))
    }

    fn project() -> Project {
        Project {
            horizons: vec![Horizon::new(1, "Top")],
            ..Project::default()
        }
    }

    #[test]
    fn in_memory_store_round_trip() {
        let mut store = InMemoryProjectStore::new();
        store.save("b", &project()).unwrap();
        store.save("a", &Project::default()).unwrap();
        assert_eq!(store.list().unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.load("b").unwrap(), Some(project()));
        assert!(store.delete("b").unwrap());
        assert!(!store.delete("b").unwrap());
        assert_eq!(store.load("b").unwrap(), None);
    }

    #[test]
    fn directory_store_round_trip() {
        let dir = temp_dir("roundtrip");
        let mut store = DirectoryProjectStore::new(&dir).unwrap();
        store.save("survey", &project()).unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();
        assert_eq!(store.list().unwrap(), vec!["survey".to_string()]);
        assert_eq!(store.load("survey").unwrap(), Some(project()));
        assert_eq!(store.load("missing").unwrap(), None);
        assert!(store.delete("survey").unwrap());
        assert!(store.list().unwrap().is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn directory_store_rejects_path_names() {
        let dir = temp_dir("names");
        let mut store = DirectoryProjectStore::new(&dir).unwrap();
        assert!(matches!(
            store.save("../escape", &project()),
            Err(ProjectError::Io(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn directory_store_surfaces_corrupt_files() {
        let dir = temp_dir("corrupt");
        let store = DirectoryProjectStore::new(&dir).unwrap();
        std::fs::write(dir.join("broken.json"), "{").unwrap();
        assert!(matches!(store.load("broken"), Err(ProjectError::Parse(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
