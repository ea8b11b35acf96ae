//! Integration tests for the gamepad-core public API.
//!
//! These tests push encoded frames through decode, duplicate suppression and
//! batch construction together, the same path the daemon takes per datagram.

use gamepad_core::{
    decode_broadcast_frame, decode_radio_frame, encode_broadcast_frame, encode_radio_frame,
    protocol::{BroadcastFrame, MessageIdSequence},
    Button, ButtonBatch, ButtonEvent, ButtonMask, DedupWindow, FrameError, MessageId, SenderId,
};

fn broadcast(sender: u32, msg: u32, mask: u16) -> [u8; 32] {
    encode_broadcast_frame(&BroadcastFrame::gamepad(
        SenderId::new(sender),
        MessageId::new(msg),
        ButtonMask(mask),
    ))
}

#[test]
fn test_retransmitted_broadcast_frame_yields_one_batch() {
    // Arrange – the same transmission arrives three times
    let datagrams = [broadcast(1, 5, 0x0001); 3];
    let mut window = DedupWindow::new();

    // Act
    let batches: Vec<ButtonBatch> = datagrams
        .iter()
        .filter_map(|d| decode_broadcast_frame(d).ok())
        .map(|f| f.packet())
        .filter(|p| window.accept(p.message_id))
        .map(|p| ButtonBatch::from_mask(p.buttons))
        .collect();

    // Assert
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].events()[0], ButtonEvent::Press(Button::A));
}

#[test]
fn test_message_id_is_shared_across_senders() {
    // Two senders reusing one message id: the key is the id alone.
    let mut window = DedupWindow::new();
    let first = decode_broadcast_frame(&broadcast(1, 9, 0)).unwrap().packet();
    let second = decode_broadcast_frame(&broadcast(2, 9, 0)).unwrap().packet();

    assert!(window.accept(first.message_id));
    assert!(!window.accept(second.message_id));
}

#[test]
fn test_radio_frames_stamped_from_sequence_are_never_duplicates() {
    // Arrange – identical radio frames, ids supplied by the receiver
    let frame = encode_radio_frame(ButtonMask(0x0008));
    let seq = MessageIdSequence::new();
    let mut window = DedupWindow::new();

    // Act
    let accepted = (0..100)
        .filter(|_| decode_radio_frame(&frame).is_ok())
        .filter(|_| window.accept(seq.next()))
        .count();

    // Assert
    assert_eq!(accepted, 100);
}

#[test]
fn test_radio_decoder_rejects_broadcast_frame() {
    let bytes = broadcast(1, 1, 1);

    assert_eq!(decode_radio_frame(&bytes), Err(FrameError::BadMagic));
}

#[test]
fn test_eviction_after_32_newer_ids_allows_reuse() {
    let mut window = DedupWindow::new();
    assert!(window.accept(MessageId::new(1)));
    for raw in 100..132 {
        assert!(window.accept(MessageId::new(raw)));
    }

    assert!(window.accept(MessageId::new(1)));
}
