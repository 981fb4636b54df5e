//! Parser fuzz target: feed arbitrary bytes through tokenizer and parser.
//! Neither may panic; the result is Ok(Root) or Err(Error).
//! Build with: cargo fuzz run parser_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    if let Ok(root) = bite::parse_reader(data) {
        // Canonical form must parse back to the same tree.
        let again = bite::parse(&root.to_string()).expect("canonical form parses");
        assert_eq!(root, again);
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run parser_fuzz");
}
