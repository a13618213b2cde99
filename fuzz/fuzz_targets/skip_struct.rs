#![no_main]

use libfuzzer_sys::fuzz_target;
use wire::{skip_value, ByteReader, Limits, TypeId};

// Arbitrary bytes treated as a struct body must never panic or loop; every
// outcome is Ok or a structured error.
fuzz_target!(|data: &[u8]| {
    let limits = Limits::for_testing();
    let mut reader = ByteReader::new(data);
    let _ = skip_value(&mut reader, TypeId::Struct, &limits);
});
