//! Integration tests for the dispatch pipeline.
//!
//! These tests drive `Dispatcher` end-to-end with a scripted transport and
//! the recording device backend, and one test runs it against a real UDP
//! socket through the broadcast transport.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use gamepad_core::{Button, ButtonEvent, ButtonMask, MessageId, Packet, SenderId};
use gamepad_daemon::application::{
    device_registry::DeviceRegistry,
    dispatch::{
        DaemonState, Dispatcher, PacketOutcome, ShutdownCause, StepOutcome,
        DEFAULT_POLL_INTERVAL,
    },
};
use gamepad_daemon::infrastructure::{
    input_device::mock::{DeviceCall, RecordingDeviceFactory},
    transport::mock::ScriptedTransport,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn packet(sender: u32, msg: u32, mask: u16) -> Packet {
    Packet {
        sender: SenderId::new(sender),
        message_id: MessageId::new(msg),
        buttons: ButtonMask(mask),
    }
}

fn dispatcher_with(transport: ScriptedTransport) -> (Dispatcher, RecordingDeviceFactory) {
    let factory = RecordingDeviceFactory::new();
    let registry = DeviceRegistry::new(Box::new(factory.clone()));
    let dispatcher = Dispatcher::new(Box::new(transport), registry, DEFAULT_POLL_INTERVAL);
    (dispatcher, factory)
}

/// Steps until the transport script is exhausted (first `Idle`) or lost.
fn step_through(dispatcher: &mut Dispatcher) -> Vec<StepOutcome> {
    let mut outcomes = Vec::new();
    loop {
        match dispatcher.step() {
            StepOutcome::Idle => return outcomes,
            other @ (StepOutcome::TransportLost | StepOutcome::NotRunning) => {
                outcomes.push(other);
                return outcomes;
            }
            other => outcomes.push(other),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_duplicate_packet_produces_one_creation_and_one_batch() {
    // Arrange
    let transport = ScriptedTransport::new()
        .then_packet(packet(1, 5, 0x0001))
        .then_packet(packet(1, 5, 0x0001));
    let (mut dispatcher, factory) = dispatcher_with(transport);

    // Act
    let outcomes = step_through(&mut dispatcher);

    // Assert
    assert_eq!(
        outcomes,
        vec![
            StepOutcome::Processed(PacketOutcome::Committed),
            StepOutcome::Processed(PacketOutcome::Duplicate),
        ]
    );
    let journal = factory.journal();
    assert_eq!(journal.created(), vec![SenderId::new(1)]);
    let batches = journal.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(
        batches[0].1,
        vec![
            ButtonEvent::Press(Button::A),
            ButtonEvent::Release(Button::B),
            ButtonEvent::Release(Button::Select),
            ButtonEvent::Release(Button::Start),
            ButtonEvent::Release(Button::Up),
            ButtonEvent::Release(Button::Down),
            ButtonEvent::Release(Button::Left),
            ButtonEvent::Release(Button::Right),
            ButtonEvent::Sync,
        ]
    );
}

#[test]
fn test_one_device_per_sender_regardless_of_packet_count() {
    // Arrange: three senders, interleaved, many packets each.
    let packets = (0..30).map(|i| packet(10 + (i % 3), 100 + i, (i % 4) as u16));
    let (mut dispatcher, factory) =
        dispatcher_with(ScriptedTransport::new().then_packets(packets));

    // Act
    step_through(&mut dispatcher);

    // Assert
    let registry = dispatcher.registry();
    assert_eq!(registry.len(), 3);
    assert_eq!(
        registry.senders().collect::<Vec<_>>(),
        vec![SenderId::new(10), SenderId::new(11), SenderId::new(12)]
    );
    assert_eq!(factory.journal().created().len(), 3);
    assert_eq!(factory.journal().batches().len(), 30);
}

#[test]
fn test_message_id_is_reaccepted_after_eviction() {
    // Arrange: id 1, then 32 other ids push it out of the window.
    let mut transport = ScriptedTransport::new().then_packet(packet(1, 1, 0));
    transport = transport.then_packets((2..=33).map(|id| packet(1, id, 0)));
    transport = transport.then_packet(packet(1, 1, 0x0002));
    let (mut dispatcher, factory) = dispatcher_with(transport);

    // Act
    let outcomes = step_through(&mut dispatcher);

    // Assert
    assert_eq!(outcomes.len(), 34);
    assert_eq!(
        outcomes.last(),
        Some(&StepOutcome::Processed(PacketOutcome::Committed))
    );
    assert_eq!(factory.journal().batches().len(), 34);
}

#[test]
fn test_message_ids_are_shared_across_senders() {
    // The window is keyed by message id only.
    let transport = ScriptedTransport::new()
        .then_packet(packet(1, 9, 0))
        .then_packet(packet(2, 9, 0));
    let (mut dispatcher, factory) = dispatcher_with(transport);

    let outcomes = step_through(&mut dispatcher);

    assert_eq!(outcomes[1], StepOutcome::Processed(PacketOutcome::Duplicate));
    assert_eq!(factory.journal().created(), vec![SenderId::new(1)]);
}

#[test]
fn test_signal_shutdown_releases_every_device_and_exits_zero() {
    // Arrange
    let transport = ScriptedTransport::new().then_packets((1..=4).map(|i| packet(i, i, 0)));
    let (mut dispatcher, factory) = dispatcher_with(transport);
    step_through(&mut dispatcher);

    // Act
    dispatcher.request_shutdown(ShutdownCause::Signal);
    let cause = dispatcher.drain();

    // Assert
    assert_eq!(cause.map(ShutdownCause::exit_status), Some(0));
    assert_eq!(factory.journal().released().len(), 4);
    assert!(dispatcher.registry().is_empty());
}

#[test]
fn test_transport_loss_releases_every_device_and_exits_nonzero() {
    // Arrange
    let transport = ScriptedTransport::new()
        .then_packets((1..=4).map(|i| packet(i, i, 0)))
        .then_lost();
    let (mut dispatcher, factory) = dispatcher_with(transport);

    // Act
    let outcomes = step_through(&mut dispatcher);
    let cause = dispatcher.drain();

    // Assert
    assert_eq!(outcomes.last(), Some(&StepOutcome::TransportLost));
    assert_eq!(cause, Some(ShutdownCause::TransportLost));
    assert_ne!(ShutdownCause::TransportLost.exit_status(), 0);
    assert_eq!(factory.journal().released().len(), 4);
}

#[test]
fn test_releases_follow_creation_order() {
    let transport = ScriptedTransport::new().then_packets([
        packet(7, 1, 0),
        packet(3, 2, 0),
        packet(5, 3, 0),
    ]);
    let (mut dispatcher, factory) = dispatcher_with(transport);
    step_through(&mut dispatcher);

    dispatcher.request_shutdown(ShutdownCause::Signal);
    dispatcher.drain();

    assert_eq!(
        factory.journal().released(),
        vec![SenderId::new(7), SenderId::new(3), SenderId::new(5)]
    );
}

#[test]
fn test_creation_failure_does_not_stop_the_loop() {
    // Arrange
    let transport = ScriptedTransport::new()
        .then_packet(packet(1, 1, 0x0001))
        .then_packet(packet(2, 2, 0x0002))
        .then_packet(packet(1, 3, 0x0004));
    let (mut dispatcher, factory) = dispatcher_with(transport);
    factory.fail_next_creates(1);

    // Act
    let outcomes = step_through(&mut dispatcher);

    // Assert
    assert_eq!(
        outcomes,
        vec![
            StepOutcome::Processed(PacketOutcome::DeviceUnavailable),
            StepOutcome::Processed(PacketOutcome::Committed),
            StepOutcome::Processed(PacketOutcome::Committed),
        ]
    );
    assert_eq!(dispatcher.state(), DaemonState::Running);
    assert_eq!(
        dispatcher
            .registry()
            .get(SenderId::new(1))
            .and_then(|d| d.last_buttons()),
        Some(ButtonMask(0x0004))
    );
}

#[test]
fn test_journal_never_holds_a_partial_batch() {
    let transport =
        ScriptedTransport::new().then_packets((1..=5).map(|i| packet(1, i, i as u16)));
    let (mut dispatcher, factory) = dispatcher_with(transport);

    step_through(&mut dispatcher);

    for call in factory.journal().calls() {
        if let DeviceCall::Batch(_, events) = call {
            assert_eq!(events.len(), 9);
            assert_eq!(events.last(), Some(&ButtonEvent::Sync));
        }
    }
}

#[tokio::test]
async fn test_run_returns_signal_cause_when_stop_flag_set_mid_stream() {
    // Arrange
    let (mut dispatcher, factory) =
        dispatcher_with(ScriptedTransport::new().then_packet(packet(1, 1, 0x0001)));
    let stop = Arc::new(AtomicBool::new(false));
    let setter = Arc::clone(&stop);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        setter.store(true, Ordering::Relaxed);
    });

    // Act
    let cause = dispatcher.run(stop).await;

    // Assert
    assert_eq!(cause, ShutdownCause::Signal);
    assert_eq!(factory.journal().batches().len(), 1);
    assert_eq!(factory.journal().released(), vec![SenderId::new(1)]);
    assert_eq!(dispatcher.state(), DaemonState::Stopped(ShutdownCause::Signal));
}

#[tokio::test]
async fn test_run_over_real_broadcast_socket() {
    use gamepad_core::{encode_broadcast_frame, protocol::BroadcastFrame};
    use gamepad_daemon::infrastructure::{
        storage::config::BroadcastConfig, transport::broadcast::BroadcastTransport,
    };
    use std::net::UdpSocket;

    // Arrange
    let transport = BroadcastTransport::bind(&BroadcastConfig {
        bind_address: "127.0.0.1".into(),
        port: 0,
    })
    .expect("bind loopback");
    let addr = transport.local_addr().expect("local addr");
    let factory = RecordingDeviceFactory::new();
    let mut dispatcher = Dispatcher::new(
        Box::new(transport),
        DeviceRegistry::new(Box::new(factory.clone())),
        DEFAULT_POLL_INTERVAL,
    );

    // Each report is sent three times, as real pads do.
    let sender = UdpSocket::bind("127.0.0.1:0").expect("bind sender");
    let frame = BroadcastFrame::gamepad(
        SenderId::new(0x0C0FFE),
        MessageId::new(1),
        ButtonMask(0x0081),
    );
    for _ in 0..3 {
        sender
            .send_to(&encode_broadcast_frame(&frame), addr)
            .expect("send");
    }

    let stop = Arc::new(AtomicBool::new(false));
    let setter = Arc::clone(&stop);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        setter.store(true, Ordering::Relaxed);
    });

    // Act
    let cause = dispatcher.run(stop).await;

    // Assert
    assert_eq!(cause, ShutdownCause::Signal);
    assert_eq!(factory.journal().created(), vec![SenderId::new(0x0C0FFE)]);
    assert_eq!(factory.journal().batches().len(), 1);
    assert_eq!(dispatcher.stats().duplicates, 2);
}
