//! Fuzz target for the delimited-file parser.
//!
//! Parsing and profiling must never panic on malformed input.

#![no_main]

use gapwise::Gapwise;
use gapwise::input::Parser;
use indexmap::IndexMap;
use libfuzzer_sys::fuzz_target;
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok(mut temp_file) = tempfile::NamedTempFile::new() {
        if temp_file.write_all(data).is_ok() {
            if let Ok((rows, _)) = Parser::new().parse_file(temp_file.path()) {
                let _ = Gapwise::new().profile(&rows, &IndexMap::new());
            }
        }
    }
});
