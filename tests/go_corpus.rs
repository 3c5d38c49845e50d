use std::path::Path;

use ridicule::{generate, SynthOptions};
use walkdir::WalkDir;

/// Generates mocks for every `.go` file under `$RIDICULE_GO_CORPUS` that
/// declares an interface; each output must re-parse.
#[test]
fn generates_for_go_corpus_if_configured() {
    let Some(root) = std::env::var_os("RIDICULE_GO_CORPUS") else {
        eprintln!("RIDICULE_GO_CORPUS not set; skipping corpus test");
        return;
    };

    let mut total = 0usize;
    let mut mocked = 0usize;

    for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("go") {
            continue;
        }
        if path.to_string_lossy().contains("testdata") {
            continue;
        }
        let Ok(src) = std::fs::read_to_string(path) else {
            continue;
        };
        if !src.contains("interface") {
            continue;
        }

        total += 1;
        match generate(&src, path, &SynthOptions::default()) {
            Ok(generated) => {
                if !generated.normalized {
                    panic!("{}: generated mocks do not re-parse", path.display());
                }
                mocked += generated.contract.interfaces.len();
            }
            Err(err) => {
                eprintln!("FAILED: {}", path.display());
                panic!("{err}");
            }
        }
    }

    eprintln!("Generated {mocked} mocks from {total} files under {}.", Path::new(&root).display());
}
