//! Scripted transport for tests.
//!
//! Replays a fixed list of poll outcomes in order, then reports `NoData`
//! forever.  Lets dispatch tests drive exact packet sequences, idle polls and
//! transport loss without sockets or device nodes.

use std::collections::VecDeque;
use std::io;

use gamepad_core::Packet;

use crate::application::transport::{PollOutcome, Transport, TransportError};

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: VecDeque<PollOutcome>,
    polls: usize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a packet.
    pub fn then_packet(mut self, packet: Packet) -> Self {
        self.script.push_back(PollOutcome::Packet(packet));
        self
    }

    /// Queues every packet from `packets`, in order.
    pub fn then_packets(mut self, packets: impl IntoIterator<Item = Packet>) -> Self {
        self.script
            .extend(packets.into_iter().map(PollOutcome::Packet));
        self
    }

    /// Queues one idle poll.
    pub fn then_no_data(mut self) -> Self {
        self.script.push_back(PollOutcome::NoData);
        self
    }

    /// Queues a device-loss failure.
    pub fn then_lost(mut self) -> Self {
        self.script.push_back(PollOutcome::Fatal(TransportError::Lost(
            io::Error::new(io::ErrorKind::BrokenPipe, "scripted transport loss"),
        )));
        self
    }

    /// Outcomes not yet replayed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// How many times `poll` has been called.
    pub fn polls(&self) -> usize {
        self.polls
    }
}

impl Transport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn poll(&mut self) -> PollOutcome {
        self.polls += 1;
        self.script.pop_front().unwrap_or(PollOutcome::NoData)
    }
}
