use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;
use whisper_api::{Error, PostStorage, Result};

/// 本地文件系统上的文章私有文件存储
///
/// 目录结构：`<base>/<slug>/<相对路径>`
pub struct LocalPostStorage {
    base_path: PathBuf,
}

impl LocalPostStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// 拼接文章目录下的相对路径，拒绝绝对路径和`..`
    fn build_path(&self, slug: &str, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(Error::NotFound(format!("{}/{}", slug, path)));
        }
        Ok(self.post_dir(slug).join(relative))
    }
}

impl PostStorage for LocalPostStorage {
    fn post_dir(&self, slug: &str) -> PathBuf {
        self.base_path.join(slug)
    }

    fn list_files(&self, slug: &str) -> Result<Vec<String>> {
        let dir = self.post_dir(slug);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&dir).follow_links(false) {
            let entry = entry.map_err(|e| Error::Storage(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&dir)
                .map_err(|e| Error::Storage(e.to_string()))?;
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            files.push(parts.join("/"));
        }
        files.sort();
        Ok(files)
    }

    fn resolve(&self, slug: &str, path: &str) -> Result<PathBuf> {
        let full = self.build_path(slug, path)?;
        // 符号链接也不能越出文章目录
        let dir = self
            .post_dir(slug)
            .canonicalize()
            .map_err(|_| Error::NotFound(format!("{}/{}", slug, path)))?;
        let canonical = full
            .canonicalize()
            .map_err(|_| Error::NotFound(format!("{}/{}", slug, path)))?;
        if !canonical.starts_with(&dir) || !canonical.is_file() {
            return Err(Error::NotFound(format!("{}/{}", slug, path)));
        }
        Ok(canonical)
    }

    fn read(&self, slug: &str, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(slug, path)?;
        Ok(fs::read(full)?)
    }

    fn save(&self, slug: &str, path: &str, content: &[u8]) -> Result<()> {
        let full = self.build_path(slug, path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, content)?;
        debug!("Saved {} bytes to {}", content.len(), full.display());
        Ok(())
    }

    fn delete_file(&self, slug: &str, path: &str) -> Result<()> {
        let full = self.resolve(slug, path)?;
        fs::remove_file(full)?;
        Ok(())
    }

    fn rename_dir(&self, from: &str, to: &str) -> Result<()> {
        let source = self.post_dir(from);
        if !source.exists() {
            return Ok(());
        }
        let target = self.post_dir(to);
        if target.exists() {
            return Err(Error::Storage(format!(
                "cannot rename {} to {}: target exists",
                from, to
            )));
        }
        fs::rename(source, target)?;
        Ok(())
    }

    fn remove_dir(&self, slug: &str) -> Result<()> {
        let dir = self.post_dir(slug);
        if !dir.exists() {
            return Ok(());
        }
        fs::remove_dir_all(dir)?;
        Ok(())
    }
}
