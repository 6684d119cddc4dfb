//! Framing properties: chunk-boundary independence and length limits

use nntpd::protocol::{FramerError, LineFramer};
use proptest::prelude::*;

/// Feed a byte stream in one call and collect every complete line
fn frame_all_at_once(input: &[u8], max_line: usize) -> Result<Vec<Vec<u8>>, FramerError> {
    let mut framer = LineFramer::new(max_line);
    framer.feed(input);
    let mut lines = Vec::new();
    while let Some(line) = framer.next_line()? {
        lines.push(line.as_bytes().to_vec());
    }
    Ok(lines)
}

/// Feed the same stream split at the given boundaries
fn frame_chunked(
    input: &[u8],
    boundaries: &[usize],
    max_line: usize,
) -> Result<Vec<Vec<u8>>, FramerError> {
    let mut framer = LineFramer::new(max_line);
    let mut lines = Vec::new();
    let mut start = 0;
    let mut cuts: Vec<usize> = boundaries
        .iter()
        .map(|&b| b % (input.len() + 1))
        .collect();
    cuts.sort_unstable();
    cuts.push(input.len());
    for cut in cuts {
        if cut > start {
            framer.feed(&input[start..cut]);
            start = cut;
        }
        while let Some(line) = framer.next_line()? {
            lines.push(line.as_bytes().to_vec());
        }
    }
    Ok(lines)
}

proptest! {
    /// Framing must not depend on where socket reads happen to split
    #[test]
    fn prop_chunk_boundary_independent(
        lines in proptest::collection::vec("[a-zA-Z0-9 .<>@-]{0,40}", 0..8),
        boundaries in proptest::collection::vec(0usize..200, 0..6),
    ) {
        let mut stream = Vec::new();
        for line in &lines {
            stream.extend_from_slice(line.as_bytes());
            stream.extend_from_slice(b"\r\n");
        }

        let whole = frame_all_at_once(&stream, 512).unwrap();
        let chunked = frame_chunked(&stream, &boundaries, 512).unwrap();
        prop_assert_eq!(whole, chunked);
    }

    /// Any payload within the limit frames without error
    #[test]
    fn prop_no_error_within_limit(payload in "[ -~]{0,512}") {
        // Printable ASCII never contains CR/LF
        let mut stream = payload.as_bytes().to_vec();
        stream.extend_from_slice(b"\r\n");
        let lines = frame_all_at_once(&stream, 512).unwrap();
        prop_assert_eq!(lines.len(), 1);
        prop_assert_eq!(&lines[0], payload.as_bytes());
    }

    /// Byte-at-a-time delivery is the worst-case chunking
    #[test]
    fn prop_byte_at_a_time(line in "[a-z ]{0,64}") {
        let mut stream = line.as_bytes().to_vec();
        stream.extend_from_slice(b"\r\n");

        let mut framer = LineFramer::new(512);
        let mut collected = Vec::new();
        for &byte in &stream {
            framer.feed(&[byte]);
            while let Some(l) = framer.next_line().unwrap() {
                collected.push(l.as_bytes().to_vec());
            }
        }
        prop_assert_eq!(collected, vec![line.as_bytes().to_vec()]);
    }
}

#[test]
fn test_exact_limit_boundary() {
    let payload = vec![b'a'; 512];
    let mut stream = payload.clone();
    stream.extend_from_slice(b"\r\n");
    let lines = frame_all_at_once(&stream, 512).unwrap();
    assert_eq!(lines, vec![payload]);
}

#[test]
fn test_one_byte_over_limit_fails_without_terminator() {
    let mut framer = LineFramer::new(512);
    framer.feed(&vec![b'a'; 513]);
    assert_eq!(
        framer.next_line(),
        Err(FramerError::LineTooLong { limit: 512 })
    );
}

#[test]
fn test_over_limit_fails_even_when_terminated() {
    let mut stream = vec![b'a'; 513];
    stream.extend_from_slice(b"\r\n");
    assert_eq!(
        frame_all_at_once(&stream, 512),
        Err(FramerError::LineTooLong { limit: 512 })
    );
}

#[test]
fn test_mixed_terminators() {
    let lines = frame_all_at_once(b"one\r\ntwo\nthree\r\n", 512).unwrap();
    assert_eq!(lines, vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
}
