//! End-to-end compilation tests
//!
//! Each test runs the whole pipeline, from `package.yaml` text to rendered
//! output, against in-memory files and defaults documents.

use pkgspec_core::{CompileOptions, Compiled, Compiler, Error, GithubRef, MemoryFetcher, Result};
use pkgspec_fs::{DiskFiles, MemoryFiles, NormalizedPath};
use pkgspec_test_utils::TestProject;
use pretty_assertions::assert_eq;

fn compile_with(manifest: &str, files: &[&str], fetch: &MemoryFetcher) -> Result<Compiled> {
    let files = MemoryFiles::from_paths(files.iter().copied());
    let mut compiler = Compiler::new(fetch, &files)
        .with_options(CompileOptions::default().with_generator_version("0.1.0"));
    compiler.compile(&NormalizedPath::new("package.yaml"), manifest, None)
}

fn compile(manifest: &str, files: &[&str]) -> Compiled {
    compile_with(manifest, files, &MemoryFetcher::new()).unwrap()
}

fn remote(revision: &str) -> GithubRef {
    GithubRef {
        owner: "foo".into(),
        repo: "bar".into(),
        path: "defaults.yaml".into(),
        revision: revision.into(),
    }
}

fn warnings(compiled: &Compiled) -> Vec<String> {
    compiled.warnings.iter().map(ToString::to_string).collect()
}

#[test]
fn unclaimed_modules_become_other_modules_with_paths_module() {
    let compiled = compile(
        "\
name: my-pkg
library:
  source-dirs: src
  exposed-modules: Foo
",
        &["src/Foo.hs", "src/Bar.hs"],
    );
    insta::assert_snapshot!(compiled.text.trim_end(), @r"
cabal-version: 1.12

-- This file has been generated from package.yaml by pkgspec version 0.1.0.
--
-- see: https://github.com/user/pkgspec

name:           my-pkg
version:        0.0.0
build-type:     Simple

library
  exposed-modules:
      Foo
  other-modules:
      Bar
      Paths_my_pkg
  hs-source-dirs:
      src
  default-language: Haskell2010
");
}

#[test]
fn nested_remote_defaults_apply_innermost_first() {
    let fetch = MemoryFetcher::new()
        .with_remote(&remote("v1"), "defaults: foo/bar@v2\ndefault-extensions: FromV1\n")
        .with_remote(&remote("v2"), "default-extensions: FromV2\n");
    let compiled = compile_with(
        "name: pkg\ndefaults: foo/bar@v1\ndefault-extensions: FromManifest\nlibrary: {}\n",
        &[],
        &fetch,
    )
    .unwrap();
    assert!(
        compiled
            .text
            .contains("  default-extensions:\n      FromV2\n      FromV1\n      FromManifest\n"),
        "{}",
        compiled.text
    );
}

#[test]
fn listed_defaults_apply_in_order() {
    let fetch = MemoryFetcher::new()
        .with_remote(&remote("v1"), "default-extensions: FromV1\n")
        .with_remote(&remote("v2"), "default-extensions: FromV2\n");
    let compiled = compile_with(
        "name: pkg\ndefaults: [foo/bar@v1, foo/bar@v2]\nlibrary: {}\n",
        &[],
        &fetch,
    )
    .unwrap();
    assert!(
        compiled
            .text
            .contains("  default-extensions:\n      FromV1\n      FromV2\n"),
        "{}",
        compiled.text
    );
}

#[test]
fn branch_only_modules_stay_inside_their_branch() {
    let compiled = compile(
        "\
name: platform
library:
  source-dirs: src
  when:
    condition: os(windows)
    then:
      source-dirs: win
    else:
      source-dirs: posix
",
        &["src/Foo.hs", "win/Platform.hs", "posix/Platform.hs"],
    );
    let body = compiled.text.split_once("library\n").unwrap().1;
    assert_eq!(
        body,
        "\
  exposed-modules:
      Foo
  other-modules:
      Paths_platform
  hs-source-dirs:
      src
  default-language: Haskell2010
  if os(windows)
    other-modules:
        Platform
    hs-source-dirs:
        win
  else
    other-modules:
        Platform
    hs-source-dirs:
        posix
"
    );
}

#[test]
fn empty_glob_warns_once_and_omits_the_field() {
    let compiled = compile("name: pkg\nextra-source-files: CHANGES*\n", &["README.md"]);
    assert_eq!(
        warnings(&compiled),
        vec!["Specified pattern \"CHANGES*\" for extra-source-files does not match any files"]
    );
    assert!(!compiled.text.contains("extra-source-files"));
}

#[test]
fn precedence_runs_defaults_global_section_verbatim() {
    let fetch = MemoryFetcher::new().with_local(
        "defaults.yaml",
        "language: Haskell98\nghc-options: -Wdefaults\n",
    );
    let compiled = compile_with(
        "\
name: pkg
defaults:
  local: defaults.yaml
ghc-options: -Wglobal
executables:
  app:
    main: Main.hs
    language: GHC2021
    ghc-options: -Wsection
  tool:
    main: Tool.hs
    verbatim:
      default-language: Haskell2010
",
        &[],
        &fetch,
    )
    .unwrap();
    let app = compiled.text.split_once("executable app\n").unwrap().1;
    assert!(app.contains("  ghc-options: -Wdefaults -Wglobal -Wsection\n"), "{app}");
    assert!(app.contains("  default-language: GHC2021\n"), "{app}");
    let tool = compiled.text.split_once("executable tool\n").unwrap().1;
    assert!(tool.contains("  default-language: Haskell2010\n"), "{tool}");
}

#[test]
fn unknown_fields_in_defaults_are_attributed_to_the_defaults_file() {
    let fetch = MemoryFetcher::new().with_local("shared.yaml", "bogus: 1\nlibrary:\n  extra: 2\n");
    let compiled = compile_with("name: pkg\ndefaults:\n  local: shared.yaml\n", &[], &fetch).unwrap();
    assert_eq!(
        warnings(&compiled),
        vec![
            "shared.yaml: Ignoring unrecognized field $.bogus",
            "shared.yaml: Ignoring unrecognized field $.library.extra",
        ]
    );
}

#[test]
fn malformed_values_in_defaults_are_attributed_to_the_defaults_file() {
    let fetch = MemoryFetcher::new().with_local("shared.yaml", "ghc-options:\n  level: 2\n");
    let error = compile_with("name: pkg\ndefaults:\n  local: shared.yaml\nlibrary: {}\n", &[], &fetch)
        .unwrap_err();
    assert!(
        error.to_string().starts_with("shared.yaml: Error while parsing $.ghc-options"),
        "{error}"
    );
}

#[test]
fn missing_remote_defaults_name_the_url() {
    let error = compile_with("name: pkg\ndefaults: foo/bar@v9\n", &[], &MemoryFetcher::new()).unwrap_err();
    assert_eq!(
        error.to_string(),
        "Invalid value for \"defaults\"! File https://raw.githubusercontent.com/foo/bar/v9/defaults.yaml does not exist!"
    );
}

#[test]
fn conflicting_defaults_sources_are_rejected() {
    let error = compile_with(
        "name: pkg\ndefaults:\n  github: foo/bar\n  ref: v1\n  local: x.yaml\n",
        &[],
        &MemoryFetcher::new(),
    )
    .unwrap_err();
    assert!(matches!(error, Error::ConflictingDefaultsSource { .. }), "{error}");
}

#[test]
fn previous_output_keeps_its_layout_and_order() {
    let manifest = "name: pkg\nversion: 1.0.1\nsynopsis: Tools\nlibrary:\n  source-dirs: src\n";
    let files = ["src/A.hs", "src/B.hs"];
    let previous = "\
cabal-version: 1.12

name:     pkg
synopsis: Tools
version:  1.0.1

library
    hs-source-dirs:
          src
    exposed-modules:
          B
          A
";
    let memory = MemoryFiles::from_paths(files);
    let fetch = MemoryFetcher::new();
    let mut compiler = Compiler::new(&fetch, &memory)
        .with_options(CompileOptions::default().with_generator_version("0.1.0"));
    let compiled = compiler
        .compile(&NormalizedPath::new("package.yaml"), manifest, Some(previous))
        .unwrap();
    let body = compiled.text.split_once("\n\nname").unwrap().1;
    assert_eq!(
        body,
        "\
:     pkg
synopsis: Tools
build-type: Simple
version:  1.0.1

library
    hs-source-dirs:
          src
    default-language: Haskell2010
    exposed-modules:
          B
          A
    other-modules:
          Paths_pkg
"
    );
}

#[test]
fn generated_modules_raise_the_version_and_are_autogen() {
    let compiled = compile(
        "\
name: pkg
library:
  source-dirs: src
  exposed-modules: A
  generated-other-modules: Gen
",
        &["src/A.hs"],
    );
    assert!(compiled.text.starts_with("cabal-version: 2.0\n"));
    assert!(
        compiled.text.contains(
            "  other-modules:\n      Paths_pkg\n      Gen\n  autogen-modules:\n      Gen\n      Paths_pkg\n"
        ),
        "{}",
        compiled.text
    );
}

#[test]
fn disk_and_memory_trees_compile_identically() {
    let manifest = "name: tree\nlibrary:\n  source-dirs: src\nexecutables:\n  tree:\n    main: Main.hs\n    source-dirs: app\n";
    let sources = ["src/Tree.hs", "src/Tree/Node.hs", "app/Main.hs", "app/Cli.hs"];

    let project = sources
        .iter()
        .fold(TestProject::new().manifest(manifest), |project, source| project.source(source));
    let fetch = MemoryFetcher::new();
    let disk = DiskFiles::new();
    let mut compiler = Compiler::new(&fetch, &disk)
        .with_options(CompileOptions::default().with_generator_version("0.1.0"));
    let on_disk = compiler
        .compile(&NormalizedPath::new(project.path("package.yaml")), manifest, None)
        .unwrap();

    let in_memory = compile(manifest, &sources);
    assert_eq!(on_disk.text, in_memory.text);
    assert!(in_memory.text.contains("  other-modules:\n      Cli\n      Paths_tree\n"));
}
