//! Property tests for pipeline-wide laws: defaults cycles are always
//! reported with their full path, declared modules are never re-inferred at
//! any conditional depth, and rendering is a fixed point of hint sniffing.

use pkgspec_core::merge::merge_package;
use pkgspec_core::{
    CompileOptions, Compiler, Error, FormattingHints, MemoryFetcher, PackageConfig,
    RenderOptions, render_package, sniff_hints,
};
use pkgspec_fs::{MemoryFiles, NormalizedPath};
use proptest::prelude::*;
use serde_json::{Value, json};

fn compiler_options() -> CompileOptions {
    CompileOptions::default().with_generator_version("0.1.0")
}

fn render_options() -> RenderOptions {
    RenderOptions {
        generator_version: "0.1.0".into(),
        emit_hash: false,
    }
}

/// `/p/d0.yaml -> /p/d1.yaml -> ... -> /p/d{length-1}.yaml`, the last one
/// pointing back at `target`.
fn chained_defaults(length: usize, target: &str) -> MemoryFetcher {
    (0..length).fold(MemoryFetcher::new(), |fetch, index| {
        let next = if index + 1 == length {
            target.to_string()
        } else {
            format!("d{}.yaml", index + 1)
        };
        fetch.with_local(
            &format!("/p/d{index}.yaml"),
            &format!("defaults:\n  local: {next}\n"),
        )
    })
}

fn compile_chain(fetch: &MemoryFetcher) -> Error {
    let files = MemoryFiles::new();
    let mut compiler = Compiler::new(fetch, &files).with_options(compiler_options());
    compiler
        .compile(
            &NormalizedPath::new("/p/package.yaml"),
            "name: pkg\ndefaults:\n  local: d0.yaml\n",
            None,
        )
        .unwrap_err()
}

/// A library whose innermost conditional, `depth` levels down, declares
/// `Hidden` as an other-module.
fn nested_library(depth: usize) -> Value {
    let mut branch = json!({"other-modules": "Hidden"});
    for level in (0..depth).rev() {
        let mut conditional = json!({"condition": format!("os(os{level})")});
        if let (Value::Object(target), Value::Object(fields)) = (&mut conditional, branch) {
            target.extend(fields);
        }
        branch = json!({"when": conditional});
    }
    let mut library = json!({"source-dirs": "src"});
    if let (Value::Object(target), Value::Object(fields)) = (&mut library, branch) {
        target.extend(fields);
    }
    json!({"name": "pkg", "library": library})
}

fn package_document(
    synopsis: Option<String>,
    maintainers: Vec<String>,
    dependencies: Vec<&'static str>,
    executables: usize,
    conditional: bool,
) -> Value {
    let mut document = json!({"name": "pkg", "version": "1.2.3"});
    if let Some(synopsis) = synopsis {
        document["synopsis"] = json!(synopsis);
    }
    if !maintainers.is_empty() {
        document["maintainer"] = json!(maintainers);
    }
    let mut library = json!({"source-dirs": "src", "dependencies": dependencies});
    if conditional {
        library["when"] = json!({"condition": "os(windows)", "ghc-options": "-threaded"});
    }
    document["library"] = library;
    let executables: serde_json::Map<String, Value> = (0..executables)
        .map(|index| {
            (
                format!("app{index}"),
                json!({"main": "Main.hs", "ghc-options": ["-Wall", "-O2"]}),
            )
        })
        .collect();
    if !executables.is_empty() {
        document["executables"] = Value::Object(executables);
    }
    document
}

fn render(document: &Value, hints: &FormattingHints) -> String {
    let package = merge_package(PackageConfig::decode(document, "package.yaml").unwrap());
    render_package(&package, hints, &render_options())
}

fn dependency_subset() -> impl Strategy<Value = Vec<&'static str>> {
    proptest::sample::subsequence(vec!["base", "text", "containers", "mtl"], 0..=4)
}

fn header_order() -> impl Strategy<Value = Vec<String>> {
    Just(vec!["name", "version", "synopsis", "maintainer", "build-type"])
        .prop_shuffle()
        .prop_map(|names| names.into_iter().map(String::from).collect())
}

proptest! {
    #[test]
    fn cycles_report_every_document_on_the_loop(length in 1usize..6, seed in any::<usize>()) {
        let start = seed % length;
        let error = compile_chain(&chained_defaults(length, &format!("d{start}.yaml")));

        let mut expected: Vec<String> = (start..length).map(|index| format!("/p/d{index}.yaml")).collect();
        expected.push(format!("/p/d{start}.yaml"));
        prop_assert_eq!(error.to_string(), format!("cycle in defaults ({})", expected.join(" -> ")));
    }

    #[test]
    fn cycles_through_the_manifest_start_at_the_manifest(length in 1usize..6) {
        let error = compile_chain(&chained_defaults(length, "package.yaml"));
        let cycle = match error {
            Error::CyclicDefaults { cycle } => cycle,
            other => return Err(TestCaseError::fail(other.to_string())),
        };
        prop_assert_eq!(cycle.len(), length + 2);
        prop_assert_eq!(cycle.first().map(String::as_str), Some("/p/package.yaml"));
        prop_assert_eq!(cycle.last().map(String::as_str), Some("/p/package.yaml"));
    }

    #[test]
    fn modules_declared_at_any_depth_are_not_inferred(depth in 1usize..5) {
        let files = MemoryFiles::from_paths(["src/Hidden.hs", "src/Visible.hs"]);
        let fetch = MemoryFetcher::new();
        let mut compiler = Compiler::new(&fetch, &files).with_options(compiler_options());
        let manifest = serde_json::to_string(&nested_library(depth)).unwrap();
        let compiled = compiler
            .compile(&NormalizedPath::new("package.yaml"), &manifest, None)
            .unwrap();

        prop_assert!(compiled.text.contains("  exposed-modules:\n      Visible\n"), "{}", compiled.text);
        prop_assert_eq!(compiled.text.matches("Hidden").count(), 1);
    }

    #[test]
    fn rendering_is_stable_under_its_own_hints(
        synopsis in proptest::option::of("[A-Z][a-z]{1,8}"),
        maintainers in proptest::collection::vec("[A-Z][a-z]{1,5}", 0..3),
        dependencies in dependency_subset(),
        executables in 0usize..3,
        conditional in any::<bool>(),
        alignment in 0usize..24,
        section_indent in 1usize..6,
        list_indent in 2usize..8,
        order in header_order(),
    ) {
        let document = package_document(synopsis, maintainers, dependencies, executables, conditional);

        let fresh = render(&document, &FormattingHints::default());
        prop_assert_eq!(&render(&document, &sniff_hints(&fresh)), &fresh);

        let styled = FormattingHints {
            alignment: Some(alignment),
            section_indent: Some(section_indent),
            list_indent: Some(list_indent),
            header_order: order,
            ..Default::default()
        };
        let first = render(&document, &styled);
        prop_assert_eq!(&render(&document, &sniff_hints(&first)), &first);
    }
}
