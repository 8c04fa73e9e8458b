//! Tests for the include preprocessor: textual splicing, relative path
//! resolution, duplicate suppression, and recovery behavior.

use std::fs;
use std::path::Path;

use olangc::preprocess::preprocess;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn include_splices_file_contents_in_place() {
    let dir = tempdir().unwrap();
    write(dir.path(), "lib.ol", "fn helper() -> i32 { return 1; }\n");
    let root = write(
        dir.path(),
        "main.ol",
        "include \"lib.ol\";\nexport fn main() -> i32 { return helper(); }\n",
    );

    let merged = preprocess(&root).unwrap();
    assert!(merged.contains("fn helper"));
    assert!(merged.contains("export fn main"));
    assert!(!merged.contains("include"));
}

#[test]
fn includes_resolve_relative_to_the_including_file() {
    let dir = tempdir().unwrap();
    write(dir.path(), "sub/inner.ol", "fn inner() {}\n");
    write(dir.path(), "sub/outer.ol", "include \"inner.ol\";\nfn outer() {}\n");
    let root = write(dir.path(), "main.ol", "include \"sub/outer.ol\";\nfn main() {}\n");

    let merged = preprocess(&root).unwrap();
    assert!(merged.contains("fn inner"));
    assert!(merged.contains("fn outer"));
    assert!(merged.contains("fn main"));
}

#[test]
fn duplicate_includes_are_suppressed() {
    let dir = tempdir().unwrap();
    write(dir.path(), "shared.ol", "fn shared() {}\n");
    write(dir.path(), "a.ol", "include \"shared.ol\";\nfn a() {}\n");
    write(dir.path(), "b.ol", "include \"shared.ol\";\nfn b() {}\n");
    let root = write(
        dir.path(),
        "main.ol",
        "include \"a.ol\";\ninclude \"b.ol\";\nfn main() {}\n",
    );

    let merged = preprocess(&root).unwrap();
    assert_eq!(merged.matches("fn shared").count(), 1);
}

#[test]
fn include_cycles_terminate() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.ol", "include \"b.ol\";\nfn a() {}\n");
    write(dir.path(), "b.ol", "include \"a.ol\";\nfn b() {}\n");
    let root = write(dir.path(), "main.ol", "include \"a.ol\";\nfn main() {}\n");

    let merged = preprocess(&root).unwrap();
    assert_eq!(merged.matches("fn a").count(), 1);
    assert_eq!(merged.matches("fn b").count(), 1);
}

#[test]
fn self_inclusion_is_suppressed() {
    let dir = tempdir().unwrap();
    let root = write(dir.path(), "main.ol", "include \"main.ol\";\nfn main() {}\n");

    let merged = preprocess(&root).unwrap();
    assert_eq!(merged.matches("fn main").count(), 1);
}

#[test]
fn missing_include_becomes_empty_text() {
    let _guard = olangc::diagnostics::suppress();
    let dir = tempdir().unwrap();
    let root = write(
        dir.path(),
        "main.ol",
        "include \"gone.ol\";\nfn main() {}\n",
    );

    let merged = preprocess(&root).unwrap();
    assert!(merged.contains("fn main"));
    assert!(!merged.contains("include"));
}

#[test]
fn missing_root_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(preprocess(&dir.path().join("nope.ol")).is_err());
}

#[test]
fn directive_without_terminator_passes_through() {
    let dir = tempdir().unwrap();
    write(dir.path(), "lib.ol", "fn lib() {}\n");
    let root = write(
        dir.path(),
        "main.ol",
        "include \"lib.ol\"\nfn main() {}\n",
    );

    let merged = preprocess(&root).unwrap();
    // Malformed directive is left for the parser to reject or skip.
    assert!(merged.contains("include \"lib.ol\""));
    assert!(merged.contains("fn main"));
}

#[test]
fn text_around_directives_is_preserved() {
    let dir = tempdir().unwrap();
    write(dir.path(), "mid.ol", "fn mid() {}\n");
    let root = write(
        dir.path(),
        "main.ol",
        "fn before() {}\ninclude \"mid.ol\";\nfn after() {}\n",
    );

    let merged = preprocess(&root).unwrap();
    let before = merged.find("fn before").unwrap();
    let mid = merged.find("fn mid").unwrap();
    let after = merged.find("fn after").unwrap();
    assert!(before < mid && mid < after);
}
