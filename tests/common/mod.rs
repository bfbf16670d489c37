//! Shared test utilities for E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_manifest(manifests::LAYERED);
//!     fixture.command().arg("order").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    pub use super::TestFixture;
}

/// Solution manifests used across tests.
#[allow(dead_code)]
pub mod manifests {
    /// Three layered modules, one script, everything resolvable.
    pub const LAYERED: &str = r#"
modules:
  - name: Contoso.App
    requiredModules: [Contoso.Core, Contoso.Util]
    symbols:
      defined: [Start-App]
      referenced: [Get-Widget, Format-Widget]
  - name: Contoso.Core
    version: 1.2.0
    requiredModules:
      - Contoso.Util
      - name: Pester
        version: 5.3.1
    externalModuleDependencies: [Pester]
    symbols:
      defined: [Get-Widget]
      referenced: [Format-Widget]
  - name: Contoso.Util
    version: 1.0.0
    symbols:
      defined: [Format-Widget]
scripts:
  - name: Deploy
    sourceDirectory: scripts
    requiredModules: [Contoso.App]
    symbols:
      referenced: ['Contoso.App\Start-App']
"#;

    /// Two modules that depend on each other, and one that depends on them.
    pub const CIRCULAR: &str = r#"
modules:
  - name: Left
    requiredModules: [Right]
  - name: Right
    requiredModules: [Left]
  - name: Top
    requiredModules: [Left]
  - name: Free
"#;

    /// A module referencing a command nobody provides.
    pub const UNRESOLVED: &str = r#"
modules:
  - name: App
    symbols:
      defined: [Do-Thing]
      referenced: [Do-Thing, Get-Gadget]
"#;

    /// A script entry without a source directory.
    pub const BAD_SCRIPT: &str = r#"
modules:
  - name: Core
scripts:
  - name: Deploy
"#;

    /// Build configuration that enables checking and excludes a command.
    pub const CHECK_CONFIG: &str = r#"
checkCommandReferences:
  enabled: true
  excludedCommands: [Get-Gadget]
"#;
}

/// A temporary directory holding a `solution.yaml` manifest and any other
/// input files a command needs.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `solution.yaml` manifest with the given content.
    pub fn with_manifest(self, content: &str) -> Self {
        self.with_file("solution.yaml", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A `solution-build` command running in the fixture directory, with
    /// plain output and no inherited registry location.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("solution-build");
        cmd.current_dir(self.path())
            .env_remove("SOLUTION_BUILD_REGISTRY")
            .env_remove("RUST_LOG")
            .env("XDG_CACHE_HOME", self.path().join(".cache"))
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
