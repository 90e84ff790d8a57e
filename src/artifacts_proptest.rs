//! Property-based tests for artifact placement and revision parsing.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::artifacts::{collect, is_header_file};
    use crate::context::{LibraryRecord, RunRoots};
    use crate::git::parse_revision;
    use crate::platform::Platform;
    use crate::registry::Registry;
    use proptest::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    // ============================================================================
    // is_header_file property tests
    // ============================================================================

    proptest! {
        /// Property: every header extension is recognised, whatever the stem
        #[test]
        fn header_extensions_are_headers(
            stem in "[a-zA-Z0-9_]{1,12}",
            ext in prop::sample::select(vec!["h", "hpp", "inl", "inc"]),
        ) {
            let name = format!("{}.{}", stem, ext);
            prop_assert!(is_header_file(Path::new(&name)));
        }

        /// Property: other extensions are never headers
        #[test]
        fn other_extensions_are_not_headers(
            stem in "[a-zA-Z0-9_]{1,12}",
            ext in prop::sample::select(vec!["c", "cpp", "a", "so", "lib", "dll", "txt", "cmake"]),
        ) {
            let name = format!("{}.{}", stem, ext);
            prop_assert!(!is_header_file(Path::new(&name)));
        }
    }

    // ============================================================================
    // placement property tests
    // ============================================================================

    fn record_with(temp: &TempDir, yaml: &str) -> LibraryRecord {
        let registry = Registry::parse(yaml).unwrap();
        let roots = RunRoots::resolve(Some(temp.path()), None, None, None, None).unwrap();
        LibraryRecord::new(registry.libraries()[0].clone(), &roots, false)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: an explicit file lands in its kind subtree by file name,
        /// below the prefix, however deep it sits in the origin tree
        #[test]
        fn explicit_files_land_by_file_name(
            dirs in prop::collection::vec("[a-z]{1,8}", 0..4),
            stem in "[a-z]{1,8}",
            prefix in prop::option::of("[a-z]{1,6}"),
        ) {
            let temp = TempDir::new().unwrap();
            let relative: PathBuf = dirs.iter().collect::<PathBuf>().join(format!("{}.h", stem));
            let relative_str = relative.to_string_lossy().replace('\\', "/");
            let prefix_line = prefix
                .as_ref()
                .map(|p| format!(", prefix: {}", p))
                .unwrap_or_default();
            let record = record_with(
                &temp,
                &format!(
                    "- name: lib\n  repo: https://example.com/lib.git\n  platforms: [linux]\n  artifacts:\n    - {{ kind: header, origin: source, files: [\"{}\"]{} }}\n",
                    relative_str, prefix_line
                ),
            );
            fs::create_dir_all(&record.source_dir).unwrap();

            let files = collect(&record, Platform::Linux).unwrap();

            let mut expected = record.output_dir.join("include");
            if let Some(prefix) = &prefix {
                expected = expected.join(prefix);
            }
            expected = expected.join(format!("{}.h", stem));
            prop_assert_eq!(files.len(), 1);
            prop_assert_eq!(&files[0].target_path, &expected);
            prop_assert_eq!(&files[0].relative_path, &relative);
        }

        /// Property: a scanned file keeps its path relative to the scanned
        /// directory
        #[test]
        fn scanned_files_keep_relative_layout(
            dirs in prop::collection::vec("[a-z]{1,8}", 0..4),
            stem in "[a-z]{1,8}",
        ) {
            let temp = TempDir::new().unwrap();
            let record = record_with(
                &temp,
                "- name: lib\n  repo: https://example.com/lib.git\n  platforms: [linux]\n  artifacts:\n    - { kind: library, origin: build, dirs: [lib] }\n",
            );
            let nested: PathBuf = dirs.iter().collect::<PathBuf>().join(format!("lib{}.a", stem));
            let source = record.build_dir.join("lib").join(&nested);
            fs::create_dir_all(source.parent().unwrap()).unwrap();
            fs::write(&source, "").unwrap();

            let files = collect(&record, Platform::Linux).unwrap();

            prop_assert_eq!(files.len(), 1);
            prop_assert_eq!(&files[0].source_path, &source);
            prop_assert_eq!(&files[0].target_path, &record.output_dir.join("lib").join(&nested));
        }
    }

    // ============================================================================
    // parse_revision property tests
    // ============================================================================

    proptest! {
        /// Property: any 40-digit hex string is a valid revision
        #[test]
        fn full_hashes_are_accepted(hash in "[0-9a-fA-F]{40}") {
            prop_assert_eq!(parse_revision(&hash), Some(hash.clone()));
        }

        /// Property: hex strings of any other length are rejected
        #[test]
        fn other_lengths_are_rejected(hash in "[0-9a-f]{0,39}|[0-9a-f]{41,60}") {
            prop_assert_eq!(parse_revision(&hash), None);
        }
    }
}
