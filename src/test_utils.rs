//! Helpers for tests that compare written PLY data with reference files in
//! `src/test_files/`.

use std::fmt::Write;


/// Panics with a readable diff-like message showing both files. Binary data is
/// printed as hex dump. The actual data is also dumped into `dump.ply` so
/// that it can be inspected with other tools.
pub(crate) fn file_failure(actual: &[u8], expected: &[u8], filename: &str) {
    let mut msg = String::new();

    writeln!(msg, "===== Expected data ('{}')", filename).unwrap();
    write_data(&mut msg, expected);
    writeln!(msg).unwrap();

    writeln!(msg, "===== Actual data (written to 'dump.ply')").unwrap();
    std::fs::write("dump.ply", actual).expect("failed to dump actual data");
    write_data(&mut msg, actual);

    panic!("assertion failed: \n{}", msg);
}

fn write_data(msg: &mut String, data: &[u8]) {
    // The header is always ASCII, only the body might be binary.
    let split = find_end_of_header(data).unwrap_or(data.len());
    let (header, body) = data.split_at(split);

    match std::str::from_utf8(header) {
        Ok(s) => msg.push_str(s),
        Err(_) => write_hex(msg, header),
    }

    if body.iter().any(|b| *b == 0 || *b > 0x7F) {
        write_hex(msg, body);
    } else {
        msg.push_str(&String::from_utf8_lossy(body));
        writeln!(msg).unwrap();
    }
}

fn write_hex(msg: &mut String, data: &[u8]) {
    for chunk in data.chunks(32) {
        for b in chunk {
            write!(msg, "{:02x} ", b).unwrap();
        }
        writeln!(msg).unwrap();
    }
}

fn find_end_of_header(data: &[u8]) -> Option<usize> {
    const END: &[u8] = b"end_header\n";
    data.windows(END.len())
        .position(|w| w == END)
        .map(|pos| pos + END.len())
}

macro_rules! assert_eq_file {
    ($actual:expr, $filename:expr) => {
        let actual = $actual as &[u8];
        let expected = include_bytes!(concat!("test_files/", $filename)) as &[u8];
        if actual != expected {
            crate::test_utils::file_failure(actual, expected, $filename);
        }
    }
}

macro_rules! include_test_file {
    ($filename:expr) => {{
        let bytes = include_bytes!(concat!("test_files/", $filename)) as &[u8];
        std::io::Cursor::new(bytes)
    }}
}
