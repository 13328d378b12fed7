//! Every library source file carries the project license header

use std::fs;
use std::path::{Path, PathBuf};

const HEADER: &str = "// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors\n\
                      // SPDX-License-Identifier: Apache-2.0\n";

fn rust_sources(dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            rust_sources(&path, out);
        } else if path.extension().map_or(false, |e| e == "rs") {
            out.push(path);
        }
    }
}

#[test]
fn test_sources_start_with_license_header() {
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut files = Vec::new();
    rust_sources(&src, &mut files);
    assert!(!files.is_empty());

    for file in files {
        let text = fs::read_to_string(&file).unwrap();
        assert!(text.starts_with(HEADER), "{} lacks the license header", file.display());
    }
}
