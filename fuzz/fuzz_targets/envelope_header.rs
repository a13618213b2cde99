#![no_main]

use libfuzzer_sys::fuzz_target;
use wire::{read_message_header, write_message_header, ByteReader, ByteWriter, Limits};

// Header parsing must be total, and any header it accepts must re-encode to
// a header it accepts again.
fuzz_target!(|data: &[u8]| {
    let limits = Limits::for_testing();
    let mut reader = ByteReader::new(data);
    if let Ok(header) = read_message_header(&mut reader, &limits) {
        let mut buf = vec![0u8; header.encoded_len()];
        let mut writer = ByteWriter::new(&mut buf);
        write_message_header(&header, &mut writer).unwrap();
        let decoded = read_message_header(&mut ByteReader::new(&buf), &limits).unwrap();
        assert_eq!(decoded, header);
    }
});
