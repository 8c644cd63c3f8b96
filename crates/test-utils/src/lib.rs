//! Shared test utilities for dipia crates.
//!
//! This crate provides common test fixtures and utilities used across
//! multiple crates in the dipia workspace.

use dipia_catalog::{Material, MaterialId, OwnerId, DEFAULT_CATEGORY};
use std::path::PathBuf;
use std::sync::{LazyLock, Mutex, MutexGuard};
use time::OffsetDateTime;

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = dipia_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is set to "value"
/// // When _guard drops, MY_VAR is restored to its original value
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Temporary home directory with a `.dipia` folder.
///
/// The tempdir is automatically cleaned up when this struct is dropped.
pub struct TestFixture {
    pub tempdir: tempfile::TempDir,
    /// Path to `~/.dipia` in the temp environment
    pub dipia_dir: PathBuf,
}

impl TestFixture {
    /// Does NOT set HOME env var - use `home_guard()` for that.
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let dipia_dir = tempdir.path().join(".dipia");
        std::fs::create_dir_all(&dipia_dir)?;
        Ok(Self { tempdir, dipia_dir })
    }

    /// Get the path that should be set as HOME.
    pub fn home_path(&self) -> &std::path::Path {
        self.tempdir.path()
    }

    /// Create an RAII guard that sets HOME to this fixture's temp directory.
    pub fn home_guard(&self) -> EnvVarGuard {
        set_env_var("HOME", Some(&self.home_path().to_string_lossy()))
    }

    /// Where the catalog file lives inside this fixture.
    pub fn store_path(&self) -> PathBuf {
        self.dipia_dir.join("catalog.json")
    }

    /// Write `~/.dipia/config.toml` and return its path.
    pub fn write_config(&self, content: &str) -> std::io::Result<PathBuf> {
        let path = self.dipia_dir.join("config.toml");
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// Builds fully-populated `Material` values for catalog fixtures.
///
/// ```
/// use dipia_test_utils::MaterialBuilder;
///
/// let m = MaterialBuilder::new(1).category("Humedad").price(80.0).favorite().build();
/// assert!(m.is_favorite);
/// ```
#[derive(Debug, Clone)]
pub struct MaterialBuilder {
    material: Material,
}

impl MaterialBuilder {
    /// A material owned by owner 1, priced at 100, created `id` seconds after the epoch.
    pub fn new(id: u64) -> Self {
        Self {
            material: Material {
                id: MaterialId(id),
                name: format!("Material {id}"),
                supplier: "Proveedor".to_string(),
                price: 100.0,
                unit: "u".to_string(),
                category: DEFAULT_CATEGORY.to_string(),
                pathology_tags: Vec::new(),
                image: String::new(),
                is_favorite: false,
                usage_count: 0,
                owner_id: OwnerId(1),
                created_at: OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(id as i64),
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.material.name = name.to_string();
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.material.price = price;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.material.category = category.to_string();
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.material.pathology_tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn favorite(mut self) -> Self {
        self.material.is_favorite = true;
        self
    }

    pub fn usage(mut self, count: u64) -> Self {
        self.material.usage_count = count;
        self
    }

    pub fn owner(mut self, owner: u64) -> Self {
        self.material.owner_id = OwnerId(owner);
        self
    }

    pub fn build(self) -> Material {
        self.material
    }
}

/// The two-material catalog used by the end-to-end recommendation scenario:
/// a favorite humidity sealant and a well-used crack mesh.
pub fn scenario_catalog() -> Vec<Material> {
    vec![
        MaterialBuilder::new(1)
            .name("Sellador")
            .category("Humedad")
            .price(80.0)
            .favorite()
            .build(),
        MaterialBuilder::new(2)
            .name("Malla")
            .tags(&["grieta"])
            .price(600.0)
            .usage(12)
            .build(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_env_var_sets_and_restores() {
        let _g = env_guard();
        const KEY: &str = "DIPIA_TEST_UTILS_TEST_VAR";
        std::env::remove_var(KEY);

        {
            let _guard = set_env_var(KEY, Some("test_value"));
            assert_eq!(std::env::var(KEY).ok(), Some("test_value".to_string()));
        }
        assert!(std::env::var(KEY).is_err());
    }

    #[test]
    fn test_set_env_var_removes_when_none() {
        let _g = env_guard();
        const KEY: &str = "DIPIA_TEST_REMOVE_VAR";
        std::env::set_var(KEY, "exists");

        {
            let _guard = set_env_var(KEY, None);
            assert!(std::env::var(KEY).is_err());
        }
        assert_eq!(std::env::var(KEY).ok(), Some("exists".to_string()));

        std::env::remove_var(KEY);
    }

    #[test]
    fn test_fixture_creates_dipia_dir() {
        let fixture = TestFixture::new().expect("fixture creation");
        assert!(fixture.dipia_dir.is_dir());
        assert_eq!(fixture.store_path(), fixture.dipia_dir.join("catalog.json"));
    }

    #[test]
    fn test_fixture_write_config() {
        let fixture = TestFixture::new().expect("fixture creation");
        let path = fixture.write_config("[serve]\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[serve]\n");
    }

    #[test]
    fn test_fixture_home_guard() {
        let _g = env_guard();
        let fixture = TestFixture::new().expect("fixture creation");

        let original_home = std::env::var("HOME").ok();
        {
            let _home_guard = fixture.home_guard();
            assert_eq!(
                std::env::var("HOME").unwrap(),
                fixture.home_path().to_str().unwrap()
            );
        }
        assert_eq!(std::env::var("HOME").ok(), original_home);
    }

    #[test]
    fn builder_defaults_are_complete() {
        let m = MaterialBuilder::new(3).build();
        assert_eq!(m.id, MaterialId(3));
        assert_eq!(m.owner_id, OwnerId(1));
        assert_eq!(m.category, DEFAULT_CATEGORY);
        assert!(!m.is_favorite);
    }

    #[test]
    fn scenario_catalog_has_two_materials() {
        let catalog = scenario_catalog();
        assert_eq!(catalog.len(), 2);
        assert!(catalog[0].is_favorite);
        assert_eq!(catalog[1].usage_count, 12);
    }
}
