//! Scene source references to opened clip handles.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::foundation::error::{MontageError, MontageResult};
use crate::media::{ClipHandle, MediaBackend};
use crate::script::model::SourceRef;
use crate::script::validate::{ValidScene, ValidatedScript};

/// Ordered source clip paths. Entry `i` is what ordinal reference `i` points at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceSet {
    paths: Vec<PathBuf>,
}

impl SourceSet {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Map a reference to a supplied path.
    ///
    /// Names match the basename of each entry (case-sensitive, first match wins), then the full
    /// path as written.
    pub fn locate(&self, reference: &SourceRef) -> Result<&Path, String> {
        match reference {
            SourceRef::Index(i) => usize::try_from(*i)
                .ok()
                .and_then(|i| self.paths.get(i))
                .map(PathBuf::as_path)
                .ok_or_else(|| format!("index out of range for {} supplied clip(s)", self.len())),
            SourceRef::Name(name) => self
                .paths
                .iter()
                .find(|p| p.file_name() == Some(OsStr::new(name)))
                .or_else(|| self.paths.iter().find(|p| p.as_path() == Path::new(name)))
                .map(PathBuf::as_path)
                .ok_or_else(|| "no supplied clip has this file name".to_string()),
        }
    }
}

/// Per-composition handle cache. Each distinct path is opened at most once; every handle is
/// closed by [`ClipResolver::release`] or on drop.
pub struct ClipResolver<'a> {
    backend: &'a dyn MediaBackend,
    cache: Mutex<HashMap<PathBuf, ClipHandle>>,
}

impl<'a> ClipResolver<'a> {
    pub fn new(backend: &'a dyn MediaBackend) -> Self {
        Self {
            backend,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<PathBuf, ClipHandle>> {
        self.cache.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Resolve one scene's source to a shared handle, opening it on first use.
    pub fn resolve(&self, scene: &ValidScene, sources: &SourceSet) -> MontageResult<ClipHandle> {
        let fail = |reason: String| MontageError::SourceResolution {
            scene_id: scene.scene_id,
            reference: scene.source.to_string(),
            reason,
        };
        let path = sources.locate(&scene.source).map_err(fail)?;

        let mut cache = self.cache();
        if let Some(handle) = cache.get(path) {
            return Ok(Arc::clone(handle));
        }
        let handle = self
            .backend
            .open_clip(path)
            .map_err(|e| fail(format!("cannot open '{}': {e}", path.display())))?;
        tracing::debug!(scene_id = scene.scene_id, path = %path.display(), "opened source clip");
        cache.insert(path.to_path_buf(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Resolve every scene, in order. Nothing is extracted until all of them resolve.
    #[tracing::instrument(skip_all, fields(scenes = script.scenes.len()))]
    pub fn resolve_all(
        &self,
        script: &ValidatedScript,
        sources: &SourceSet,
    ) -> MontageResult<Vec<ClipHandle>> {
        let handles = script
            .scenes
            .iter()
            .map(|scene| self.resolve(scene, sources))
            .collect::<MontageResult<Vec<_>>>()?;
        tracing::info!(
            scenes = handles.len(),
            distinct_sources = self.open_count(),
            "sources resolved"
        );
        Ok(handles)
    }

    /// Number of handles currently cached.
    pub fn open_count(&self) -> usize {
        self.cache().len()
    }

    /// Close and forget every cached handle.
    pub fn release(&self) {
        let drained: Vec<_> = self.cache().drain().collect();
        for (path, handle) in drained {
            handle.close();
            tracing::trace!(path = %path.display(), "closed source clip");
        }
    }
}

impl Drop for ClipResolver<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "../tests/unit/resolve.rs"]
mod tests;
