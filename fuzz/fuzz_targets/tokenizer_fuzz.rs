//! Tokenizer fuzz target: arbitrary bytes, read one byte per chunk so every
//! lookahead crosses a read boundary.

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let whole = bite::tokenize(data);
    let bytewise = bite::Tokenizer::new().chunk_size(1).tokenize(data);
    assert_eq!(whole.ok(), bytewise.ok());
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run tokenizer_fuzz");
}
