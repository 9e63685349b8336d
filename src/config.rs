//! @ai:module:intent Configuration structs for the harness driver
//! @ai:module:layer infrastructure
//! @ai:module:public_api HarnessConfig, ToolchainConfig, PathConfig, RunConfig
//! @ai:module:stateless true

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// @ai:intent Main configuration for one harness invocation
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// @ai:intent Location of the primary toolchain
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    #[serde(default = "default_go_root")]
    pub go_root: PathBuf,
}

/// @ai:intent Path configuration for source, binaries, scratch and results
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Per-workload `src`, `bin` and `tmp` directories live below this.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Source of the benchmark driver built next to the workload.
    #[serde(default = "default_bench_dir")]
    pub bench_dir: PathBuf,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

/// @ai:intent Run configuration for benchmark execution
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub short: bool,
    /// Extra arguments passed through to the benchmark driver.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            go_root: default_go_root(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            bench_dir: default_bench_dir(),
            results_dir: default_results_dir(),
        }
    }
}

fn default_go_root() -> PathBuf {
    PathBuf::from("/usr/local/go")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("work")
}

fn default_bench_dir() -> PathBuf {
    PathBuf::from("benchmarks/cockroachdb")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

impl PathConfig {
    /// @ai:effects pure
    pub fn src_dir(&self, harness: &str) -> PathBuf {
        self.work_dir.join(harness).join("src")
    }

    /// @ai:effects pure
    pub fn bin_dir(&self, harness: &str) -> PathBuf {
        self.work_dir.join(harness).join("bin")
    }

    /// @ai:effects pure
    pub fn tmp_dir(&self, harness: &str) -> PathBuf {
        self.work_dir.join(harness).join("tmp")
    }
}

impl HarnessConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_derived_paths() {
        let paths = PathConfig::default();
        assert_eq!(paths.src_dir("cockroachdb"), PathBuf::from("work/cockroachdb/src"));
        assert_eq!(paths.bin_dir("cockroachdb"), PathBuf::from("work/cockroachdb/bin"));
        assert_eq!(paths.tmp_dir("cockroachdb"), PathBuf::from("work/cockroachdb/tmp"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: HarnessConfig = toml::from_str(
            r#"
            [toolchain]
            go_root = "/opt/go1.23"

            [run]
            short = true
            "#,
        )
        .unwrap();

        assert_eq!(config.toolchain.go_root, PathBuf::from("/opt/go1.23"));
        assert!(config.run.short);
        assert!(config.run.args.is_empty());
        assert_eq!(config.paths.work_dir, PathBuf::from("work"));
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("harness.toml");
        let mut config = HarnessConfig::default();
        config.run.args = vec!["-count".into(), "3".into()];

        config.save(&path).unwrap();
        let loaded = HarnessConfig::load(&path).unwrap();

        assert_eq!(loaded.run.args, vec!["-count", "3"]);
        assert_eq!(loaded.toolchain.go_root, PathBuf::from("/usr/local/go"));
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = HarnessConfig::load(Path::new("/nonexistent/harness.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/harness.toml"));
    }
}
