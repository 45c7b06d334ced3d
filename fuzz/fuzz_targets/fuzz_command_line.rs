#![no_main]

use commandant::CommandLine;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Cap length to keep fuzzing fast.
    if text.len() > 2048 {
        return;
    }

    // The tokenizer must never panic regardless of input.
    let Ok(line) = CommandLine::parse(text) else {
        return;
    };

    // A parsed line always has a non-empty, whitespace-free name.
    assert!(!line.name().is_empty(), "empty command name");
    assert!(
        !line.name().chars().any(char::is_whitespace),
        "whitespace in command name: {:?}",
        line.name()
    );

    // Parsing is deterministic.
    let again = CommandLine::parse(text).expect("reparse of accepted input failed");
    assert_eq!(line, again, "parse not deterministic");

    // Typed lookups must never panic either.
    for index in 0..line.num_params() {
        let _ = line.param_name(index);
        let _ = line.param_value(index);
    }
    let _ = line.value_as::<i64>("value");
    let _ = line.value_as_bool("flag");

    // Display renders back into parseable text, except for values mixing
    // quote and brace characters, which the grammar cannot represent.
    let representable = (0..line.num_params()).all(|index| {
        let value = line.param_value(index).unwrap_or_default();
        !(value.contains('"') && (value.contains('{') || value.contains('}')))
    });
    if representable {
        let rendered = line.to_string();
        let reparsed = CommandLine::parse(&rendered)
            .unwrap_or_else(|err| panic!("rendered line {rendered:?} failed to parse: {err}"));
        assert_eq!(line, reparsed, "display round-trip changed the line");
    }
});
