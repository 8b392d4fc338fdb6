//! Channel-backed subscription types.

use crate::types::{SubscriptionHandle, TopicMessage};
use crossbeam_channel::{Receiver, RecvError, RecvTimeoutError, TryRecvError};
use std::time::Duration;

/// A subscription whose messages are queued on a bounded channel.
///
/// The registry drops the subscription when the buffer overflows or the
/// receiver is dropped.
pub struct ChannelSubscription {
    pub handle: SubscriptionHandle,
    /// Channel to receive messages.
    pub receiver: Receiver<TopicMessage>,
}

impl ChannelSubscription {
    /// Receive the next message (blocking).
    pub fn recv(&self) -> Result<TopicMessage, RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message (non-blocking).
    pub fn try_recv(&self) -> Result<TopicMessage, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<TopicMessage, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
