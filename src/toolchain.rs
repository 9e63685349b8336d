//! @ai:module:intent Go toolchain invocations, auxiliary tool install, host tool check
//! @ai:module:layer infrastructure
//! @ai:module:public_api GoTool, AuxTool, install_tool, ToolchainCheck, ToolchainStatus, MissingTool

use crate::env::Env;
use crate::error::{HarnessError, Result};
use crate::exec::{CommandRunner, Invocation};
use std::path::{Path, PathBuf};
use std::process::Command;

/// @ai:intent The primary toolchain rooted at a resolved GOROOT
///
/// Every invocation carries the build environment: the caller's environment
/// with `<root>/bin:` prefixed onto `PATH` and `GOROOT` pinned.
#[derive(Debug, Clone)]
pub struct GoTool {
    root: PathBuf,
    env: Env,
}

impl GoTool {
    /// @ai:intent Derive the toolchain and its build environment from `base`
    /// @ai:effects pure
    pub fn new(root: impl Into<PathBuf>, base: &Env) -> Self {
        let root = root.into();
        let env = base
            .clone()
            .prefix("PATH", format!("{}:", root.join("bin").display()))
            .set("GOROOT", root.display().to_string());

        Self { root, env }
    }

    /// @ai:intent Path of the `go` binary
    /// @ai:effects pure
    pub fn program(&self) -> PathBuf {
        self.root.join("bin").join("go")
    }

    /// @ai:intent The layered build environment
    /// @ai:effects pure
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// @ai:intent `go install <package>` forced into `bin_dir` via GOBIN
    /// @ai:effects pure
    pub fn install(&self, bin_dir: &Path, package: &str) -> Invocation {
        Invocation::new(self.program())
            .args(["install", package])
            .current_dir(bin_dir)
            .env(self.env.clone().set("GOBIN", bin_dir.display().to_string()))
    }

    /// @ai:intent `go build -o <out> [flags]` run inside the package directory
    /// @ai:effects pure
    pub fn build(&self, package_dir: &Path, out: &Path, flags: &[&str]) -> Invocation {
        Invocation::new(self.program())
            .args(["build", "-o"])
            .arg(out)
            .args(flags.iter().copied())
            .current_dir(package_dir)
            .env(self.env.clone())
    }
}

/// @ai:intent An auxiliary build tool fetched from source on every run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxTool {
    /// Binary name produced by `go install`.
    pub name: &'static str,
    /// Module path with version, e.g. `example.com/tool@latest`.
    pub package: &'static str,
}

/// @ai:intent Install `tool` into `bin_dir` and return the binary path
/// @ai:pre bin_dir exists
/// @ai:post bin_dir contains a freshly installed copy of the tool
/// @ai:effects io, network, fs:write
pub fn install_tool<R: CommandRunner>(
    runner: &R,
    go: &GoTool,
    bin_dir: &Path,
    tool: AuxTool,
) -> Result<PathBuf> {
    tracing::info!("Installing {} into {}", tool.package, bin_dir.display());

    runner
        .run(&go.install(bin_dir, tool.package))
        .map_err(|source| HarnessError::ToolchainInstall {
            tool: tool.name.to_string(),
            source,
        })?;

    Ok(bin_dir.join(tool.name))
}

/// @ai:intent Status of the host tool check
#[derive(Debug, Default)]
pub struct ToolchainStatus {
    pub missing_tools: Vec<MissingTool>,
}

impl ToolchainStatus {
    /// @ai:effects pure
    pub fn is_complete(&self) -> bool {
        self.missing_tools.is_empty()
    }
}

/// @ai:intent Information about a missing host tool
#[derive(Debug)]
pub struct MissingTool {
    pub tool_name: String,
    pub install_hint: &'static str,
}

/// @ai:intent Probes for the host tools the harness shells out to
pub struct ToolchainCheck;

impl ToolchainCheck {
    /// @ai:effects pure
    fn required_tools(go_root: &Path) -> Vec<(PathBuf, &'static [&'static str])> {
        vec![
            (go_root.join("bin").join("go"), &["version"][..]),
            (PathBuf::from("git"), &["--version"][..]),
        ]
    }

    /// @ai:effects pure
    fn get_install_hint(tool: &str) -> &'static str {
        match tool {
            "go" => "Install Go: https://go.dev/dl/ and point toolchain.go_root at it",
            "git" => "Install Git: https://git-scm.com/downloads",
            _ => "Check tool documentation for installation instructions",
        }
    }

    /// @ai:effects io
    fn is_tool_available(tool: &Path, args: &[&str]) -> bool {
        Command::new(tool)
            .args(args)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// @ai:intent Check every required tool and collect the missing ones
    /// @ai:effects io
    pub fn validate(go_root: &Path) -> ToolchainStatus {
        let missing_tools = Self::required_tools(go_root)
            .into_iter()
            .filter(|(tool, args)| !Self::is_tool_available(tool, args))
            .map(|(tool, _)| {
                let name = tool
                    .file_name()
                    .unwrap_or(tool.as_os_str())
                    .to_string_lossy()
                    .to_string();
                let install_hint = Self::get_install_hint(&name);
                MissingTool {
                    tool_name: tool.display().to_string(),
                    install_hint,
                }
            })
            .collect();

        ToolchainStatus { missing_tools }
    }

    /// @ai:effects io
    pub fn log_warnings(status: &ToolchainStatus) {
        for missing in &status.missing_tools {
            tracing::warn!(
                "Tool '{}' not found - get/build will fail. {}",
                missing.tool_name,
                missing.install_hint
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::exec::testing::{failure, RecordingRunner};
    use pretty_assertions::assert_eq;

    const BAZELISK: AuxTool = AuxTool {
        name: "bazelisk",
        package: "github.com/bazelbuild/bazelisk@latest",
    };

    #[test]
    fn test_build_env_prefixes_path_and_pins_root() {
        let base = Env::new([("PATH", "/usr/bin"), ("GOROOT", "/stale")]);
        let go = GoTool::new("/opt/go", &base);

        assert_eq!(go.env().get("PATH").as_deref(), Some("/opt/go/bin:/usr/bin"));
        assert_eq!(go.env().get("GOROOT").as_deref(), Some("/opt/go"));
        assert_eq!(base.get("GOROOT").as_deref(), Some("/stale"));
    }

    #[test]
    fn test_install_overrides_gobin() {
        let base = Env::new([("GOBIN", "/home/user/go/bin")]);
        let go = GoTool::new("/opt/go", &base);

        let inv = go.install(Path::new("/work/bin"), BAZELISK.package);
        assert_eq!(inv.program, PathBuf::from("/opt/go/bin/go"));
        assert_eq!(
            inv.arg_strings(),
            vec!["install", "github.com/bazelbuild/bazelisk@latest"]
        );
        assert_eq!(
            inv.env.as_ref().and_then(|e| e.get("GOBIN")).as_deref(),
            Some("/work/bin")
        );
    }

    #[test]
    fn test_build_places_flags_after_output() {
        let go = GoTool::new("/opt/go", &Env::default());
        let inv = go.build(Path::new("/src/pkg"), Path::new("/bin"), &["-x"]);

        assert_eq!(inv.arg_strings(), vec!["build", "-o", "/bin", "-x"]);
        assert_eq!(inv.current_dir, Some(PathBuf::from("/src/pkg")));
    }

    #[test]
    fn test_install_tool_returns_binary_path() {
        let runner = RecordingRunner::succeeding();
        let go = GoTool::new("/opt/go", &Env::default());

        let path = install_tool(&runner, &go, Path::new("/work/bin"), BAZELISK).unwrap();
        assert_eq!(path, PathBuf::from("/work/bin/bazelisk"));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_install_tool_failure_is_fatal() {
        let runner = RecordingRunner::with(|inv| Err(failure(inv, "network unreachable")));
        let go = GoTool::new("/opt/go", &Env::default());

        let err = install_tool(&runner, &go, Path::new("/work/bin"), BAZELISK).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolchainInstall);
        assert!(err.to_string().contains("error building bazelisk"));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_get_install_hint_known_tools() {
        assert!(ToolchainCheck::get_install_hint("go").contains("go.dev"));
        assert!(ToolchainCheck::get_install_hint("git").contains("git-scm"));
    }

    #[test]
    fn test_validate_reports_missing_go() {
        let status = ToolchainCheck::validate(Path::new("/nonexistent/goroot"));
        assert!(status
            .missing_tools
            .iter()
            .any(|t| t.tool_name.ends_with("bin/go")));
    }
}
