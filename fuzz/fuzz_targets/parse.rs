#![no_main]

use std::path::Path;

use go_decl_parser::parse_source;
use libfuzzer_sys::fuzz_target;
use ridicule::{generate, SynthOptions};

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    match parse_source(&s) {
        Ok(parsed) => {
            for spec in parsed.imports() {
                let _ = parsed.import_path(spec);
            }
            // accepted input must make it through the whole pipeline
            match generate(&s, Path::new("fuzz.go"), &SynthOptions::default()) {
                Ok(generated) => assert!(generated.normalized, "mocks do not re-parse:\n{}", generated.text),
                Err(err) => panic!("parsed input failed to generate: {err}"),
            }
        }
        Err(failure) => {
            assert!(!failure.diags.is_empty());
            for d in &failure.diags {
                assert!(d.span.start <= d.span.end);
                assert!(d.span.end as usize <= s.len());
                let _ = d.render(&s);
            }
        }
    }
});
