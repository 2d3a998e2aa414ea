#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|source: &str| {
    let tokens = seven::tokenize(source).collect::<Result<Vec<_>, _>>();

    if let Ok(tokens) = tokens {
        assert_eq!(tokens.iter().filter(|token| **token == seven::Token::EndOfStream).count(), 1);
        for _ in seven::parse(tokens) {}
    }
});
