//! Tests for verification code generators

use std::collections::HashSet;

use crate::services::verification::mock::SequenceCodeGenerator;
use crate::services::verification::{CodeGenerator, OsRngCodeGenerator, CODE_MAX, CODE_MIN};

#[test]
fn test_os_rng_codes_are_six_digits_in_range() {
    let generator = OsRngCodeGenerator;
    for _ in 0..1000 {
        let code = generator.generate();
        assert_eq!(code.len(), 6);
        let value: u32 = code.parse().expect("code should be numeric");
        assert!((CODE_MIN..=CODE_MAX).contains(&value));
    }
}

#[test]
fn test_os_rng_codes_vary() {
    let generator = OsRngCodeGenerator;
    let codes: HashSet<String> = (0..100).map(|_| generator.generate()).collect();
    assert!(codes.len() > 90);
}

#[test]
fn test_os_rng_covers_both_halves_of_range() {
    let generator = OsRngCodeGenerator;
    let midpoint = (CODE_MIN + CODE_MAX) / 2;
    let values: Vec<u32> = (0..500)
        .map(|_| generator.generate().parse().unwrap())
        .collect();

    assert!(values.iter().any(|v| *v < midpoint));
    assert!(values.iter().any(|v| *v > midpoint));
}

#[test]
fn test_sequence_generator_scripted_then_counting() {
    let generator = SequenceCodeGenerator::new(vec!["123456", "654321"]);
    assert_eq!(generator.generate(), "123456");
    assert_eq!(generator.generate(), "654321");
    assert_eq!(generator.generate(), "100000");
    assert_eq!(generator.generate(), "100001");
}
