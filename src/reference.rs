//! Scene identifiers and the scene catalog.

use serde::{Deserialize, Serialize};

/// A reference to a scene, by path or by build index.
///
/// Scene references are the currency of the whole crate: requests collect
/// them, actions store them, and the loader resolves them against the host's
/// [`SceneCatalog`] just before handing a path to the engine.
///
/// A reference is cheap to clone and immutable once constructed. Whether it
/// actually points at a real scene depends on the catalog it is resolved
/// against, which is why [`SceneRef::is_valid`] takes one.
///
/// # Example
///
/// ```
/// use skene::{SceneCatalog, SceneRef};
///
/// let catalog = SceneCatalog::from_paths(["scenes/menu.scene", "scenes/level_1.scene"]);
///
/// let by_path = SceneRef::path("scenes/level_1.scene");
/// let by_index = SceneRef::index(0);
///
/// assert!(by_path.is_valid(&catalog));
/// assert_eq!(by_index.resolve(&catalog), Some("scenes/menu.scene"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneRef {
    /// A scene identified by its asset path.
    Path(String),
    /// A scene identified by its position in the build's scene list.
    Index(usize),
}

impl SceneRef {
    /// Create a reference from a scene path.
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    /// Create a reference from a build index.
    pub fn index(index: usize) -> Self {
        Self::Index(index)
    }

    /// Check whether this reference resolves to a real catalog entry.
    ///
    /// Returns `false` if the referenced scene was removed from the build
    /// or the index is out of range.
    pub fn is_valid(&self, catalog: &SceneCatalog) -> bool {
        self.resolve(catalog).is_some()
    }

    /// Resolve this reference to the stable path key the host loader expects.
    ///
    /// Read-only; returns `None` for references that no longer point at a
    /// catalog entry.
    pub fn resolve<'a>(&'a self, catalog: &'a SceneCatalog) -> Option<&'a str> {
        match self {
            SceneRef::Path(path) => catalog.contains(path).then_some(path.as_str()),
            SceneRef::Index(index) => catalog.path_at(*index),
        }
    }
}

impl std::fmt::Display for SceneRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneRef::Path(path) => write!(f, "{}", path),
            SceneRef::Index(index) => write!(f, "#{}", index),
        }
    }
}

impl From<&str> for SceneRef {
    fn from(path: &str) -> Self {
        Self::path(path)
    }
}

impl From<String> for SceneRef {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<usize> for SceneRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// The ordered list of scenes known to the current build.
///
/// This is the loader-side view of the host's build configuration. The host
/// owns it; the loader only reads it to validate references before starting
/// operations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneCatalog {
    paths: Vec<String>,
}

impl SceneCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog from an ordered list of scene paths.
    pub fn from_paths(paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a scene path, returning its build index.
    pub fn add(&mut self, path: impl Into<String>) -> usize {
        self.paths.push(path.into());
        self.paths.len() - 1
    }

    /// Check whether a path is part of the build.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Look up the path at a build index.
    pub fn path_at(&self, index: usize) -> Option<&str> {
        self.paths.get(index).map(String::as_str)
    }

    /// Look up the build index of a path.
    pub fn index_of(&self, path: &str) -> Option<usize> {
        self.paths.iter().position(|p| p == path)
    }

    /// Number of scenes in the build.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the build has no scenes at all.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SceneCatalog {
        SceneCatalog::from_paths(["scenes/menu.scene", "scenes/level_1.scene"])
    }

    #[test]
    fn path_ref_resolves_against_catalog() {
        let catalog = catalog();
        assert_eq!(
            SceneRef::path("scenes/level_1.scene").resolve(&catalog),
            Some("scenes/level_1.scene")
        );
        assert_eq!(SceneRef::path("scenes/deleted.scene").resolve(&catalog), None);
    }

    #[test]
    fn index_ref_resolves_against_catalog() {
        let catalog = catalog();
        assert_eq!(SceneRef::index(1).resolve(&catalog), Some("scenes/level_1.scene"));
        assert_eq!(SceneRef::index(2).resolve(&catalog), None);
    }

    #[test]
    fn validity_tracks_catalog_membership() {
        let mut catalog = catalog();
        let scene = SceneRef::path("scenes/boss.scene");
        assert!(!scene.is_valid(&catalog));

        let index = catalog.add("scenes/boss.scene");
        assert!(scene.is_valid(&catalog));
        assert!(SceneRef::index(index).is_valid(&catalog));
    }

    #[test]
    fn conversions_pick_the_right_variant() {
        assert_eq!(SceneRef::from("scenes/menu.scene"), SceneRef::path("scenes/menu.scene"));
        assert_eq!(SceneRef::from(3), SceneRef::Index(3));
    }

    #[test]
    fn catalog_lookups() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.index_of("scenes/level_1.scene"), Some(1));
        assert_eq!(catalog.index_of("nope"), None);
        assert!(!catalog.is_empty());
    }
}
