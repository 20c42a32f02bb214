//! Unit tests for the shared output buffer.
//!
//! Validates that:
//! - Appends from one handle are visible through clones.
//! - `drain` returns the contents and leaves the buffer empty.
//! - `find` reports byte offsets usable for sentinel splitting.
//! - Bytes are decoded only on read, so a multibyte character split
//!   across two appends survives intact.

use evalbox::session::OutputBuffer;

// ─── Shared visibility ─────────────────────────────────────────────────

#[test]
fn appends_are_visible_through_clones() {
    let writer = OutputBuffer::new();
    let reader = writer.clone();

    writer.push_str("hello ");
    writer.push_str("world");

    assert_eq!(reader.snapshot(), "hello world");
}

#[test]
fn new_buffer_is_empty() {
    let buffer = OutputBuffer::new();
    assert!(buffer.is_empty());
    assert_eq!(buffer.snapshot(), "");
}

// ─── drain / clear ─────────────────────────────────────────────────────

#[test]
fn drain_takes_contents_and_resets() {
    let buffer = OutputBuffer::new();
    buffer.push_str("command output\n");

    let taken = buffer.drain();

    assert_eq!(taken, "command output\n");
    assert!(buffer.is_empty());
}

#[test]
fn clear_discards_contents() {
    let buffer = OutputBuffer::new();
    buffer.push_str("stale");

    buffer.clear();

    assert!(buffer.is_empty());
    assert_eq!(buffer.drain(), "");
}

#[test]
fn drain_on_empty_buffer_returns_empty_string() {
    let buffer = OutputBuffer::new();
    assert_eq!(buffer.drain(), "");
}

// ─── find ──────────────────────────────────────────────────────────────

#[test]
fn find_reports_byte_offset_of_needle() {
    let buffer = OutputBuffer::new();
    buffer.push_str("hi\n<<exit:abc>>\n");

    assert_eq!(buffer.find("<<exit:abc>>"), Some(3));
    assert_eq!(buffer.find("<<exit:zzz>>"), None);
}

#[test]
fn find_sees_needle_split_across_appends() {
    let buffer = OutputBuffer::new();
    buffer.push_str("output <<ex");
    buffer.push_str("it:tok>> tail");

    assert_eq!(buffer.find("<<exit:tok>>"), Some(7));
}

// ─── Byte-level appends ────────────────────────────────────────────────

#[test]
fn multibyte_char_split_across_appends_decodes_intact() {
    let buffer = OutputBuffer::new();
    let euro = "€".as_bytes();

    // A pipe read can end mid-character; decoding happens only on read.
    buffer.extend(&euro[..1]);
    buffer.extend(&euro[1..]);

    assert_eq!(buffer.snapshot(), "€");
    assert_eq!(buffer.drain(), "€");
    assert!(buffer.is_empty());
}

#[test]
fn drain_to_cuts_at_the_given_byte_offset() {
    let buffer = OutputBuffer::new();
    buffer.push_str("héllo<<exit:tok>>\n");

    let index = buffer.find("<<exit:tok>>").expect("sentinel present");
    assert_eq!(buffer.drain_to(index), "héllo");
    assert!(buffer.is_empty());
}
