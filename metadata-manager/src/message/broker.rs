// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Message broker
//!
//! Single chokepoint for catalog messages. Every message is logged here at
//! the severity of its identifier and then handed to the subscribed
//! receivers.

use super::catalog::Severity;
use super::message::Message;
use super::status::Status;
use crate::error::{CatalogError, ErrorCode};
use log::{debug, error, info, warn};
use parking_lot::RwLock;
use std::sync::Arc;

/// A component that wants to be told about catalog messages
pub trait MessageReceiver: Send + Sync {
    /// Name used to address this receiver via [`Message::set_receiver`]
    fn name(&self) -> &str;

    /// Handle one message. A non-ok status is reported back to the sender.
    fn receive_message(&self, message: &Message) -> Status;
}

#[derive(Default)]
pub struct MessageBroker {
    receivers: RwLock<Vec<Arc<dyn MessageReceiver>>>,
}

impl MessageBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, receiver: Arc<dyn MessageReceiver>) {
        debug!("Message receiver subscribed: {}", receiver.name());
        self.receivers.write().push(receiver);
    }

    /// Remove every receiver registered under `name`
    pub fn unsubscribe(&self, name: &str) -> usize {
        let mut receivers = self.receivers.write();
        let before = receivers.len();
        receivers.retain(|r| r.name() != name);
        before - receivers.len()
    }

    pub fn receiver_count(&self) -> usize {
        self.receivers.read().len()
    }

    /// Log `message` and dispatch it
    ///
    /// A message with a receiver set only goes to receivers of that name;
    /// otherwise it goes to all of them. Every receiver is called; the
    /// first non-ok receiver status is returned with its code as sub-code.
    pub fn send_message(&self, message: &Message) -> Status {
        Self::log(message);

        // Snapshot so receivers may subscribe from inside receive_message
        let receivers: Vec<Arc<dyn MessageReceiver>> = self.receivers.read().clone();
        let mut result = Status::ok();

        for receiver in receivers
            .iter()
            .filter(|r| message.receiver().map_or(true, |name| r.name() == name))
        {
            let status = receiver.receive_message(message);
            if !status.is_ok() {
                warn!(
                    "Receiver '{}' rejected {}: {}",
                    receiver.name(),
                    message.id(),
                    status
                );
                if result.is_ok() {
                    let sub_code = status.code() as i32;
                    result = match status.message() {
                        Some(m) => Status::new(status.code(), m.clone()),
                        None => Status::new(status.code(), message.clone()),
                    }
                    .with_sub_code(status.sub_code().unwrap_or(sub_code));
                }
            }
        }
        result
    }

    /// Log an error through the broker and turn it into a status
    pub fn report(&self, err: &CatalogError) -> Status {
        if err.code() != ErrorCode::Ok {
            Self::log(err.message());
        }
        Status::from_error(err)
    }

    fn log(message: &Message) {
        match message.severity() {
            Severity::Info => info!("[{}] {}", message.id(), message),
            Severity::Warning => warn!("[{}] {}", message.id(), message),
            Severity::Error => error!("[{}] {}", message.id(), message),
        }
    }
}

impl std::fmt::Debug for MessageBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBroker")
            .field("receivers", &self.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageId;
    use parking_lot::Mutex;

    struct Recorder {
        name: String,
        seen: Mutex<Vec<MessageId>>,
        reply: Status,
    }

    impl Recorder {
        fn new(name: &str, reply: Status) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                seen: Mutex::new(Vec::new()),
                reply,
            })
        }
    }

    impl MessageReceiver for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn receive_message(&self, message: &Message) -> Status {
            self.seen.lock().push(message.id());
            self.reply.clone()
        }
    }

    #[test]
    fn test_broadcast_to_all_receivers() {
        let broker = MessageBroker::new();
        let a = Recorder::new("a", Status::ok());
        let b = Recorder::new("b", Status::ok());
        broker.subscribe(a.clone());
        broker.subscribe(b.clone());

        let status = broker.send_message(&Message::new(MessageId::CREATE_TABLE).arg(1));
        assert!(status.is_ok());
        assert_eq!(*a.seen.lock(), vec![MessageId::CREATE_TABLE]);
        assert_eq!(*b.seen.lock(), vec![MessageId::CREATE_TABLE]);
    }

    #[test]
    fn test_addressed_message_reaches_only_named_receiver() {
        let broker = MessageBroker::new();
        let a = Recorder::new("oltp", Status::ok());
        let b = Recorder::new("other", Status::ok());
        broker.subscribe(a.clone());
        broker.subscribe(b.clone());

        let msg = Message::new(MessageId::DROP_TABLE).arg(5).with_receiver("oltp");
        broker.send_message(&msg);
        assert_eq!(a.seen.lock().len(), 1);
        assert!(b.seen.lock().is_empty());
    }

    #[test]
    fn test_first_failing_receiver_status_is_returned() {
        let broker = MessageBroker::new();
        let failing = Status::new(
            ErrorCode::UnknownBackendError,
            Message::new(MessageId::UNKNOWN_BACKEND_ERROR).arg("X1").arg("busy"),
        );
        broker.subscribe(Recorder::new("ok", Status::ok()));
        broker.subscribe(Recorder::new("bad", failing));

        let status = broker.send_message(&Message::new(MessageId::ALTER_TABLE).arg(2));
        assert!(!status.is_ok());
        assert_eq!(status.sub_code(), Some(ErrorCode::UnknownBackendError as i32));
    }

    #[test]
    fn test_unsubscribe() {
        let broker = MessageBroker::new();
        broker.subscribe(Recorder::new("a", Status::ok()));
        broker.subscribe(Recorder::new("a", Status::ok()));
        broker.subscribe(Recorder::new("b", Status::ok()));
        assert_eq!(broker.unsubscribe("a"), 2);
        assert_eq!(broker.receiver_count(), 1);
    }

    #[test]
    fn test_report_returns_error_status() {
        let broker = MessageBroker::new();
        let err = CatalogError::InvalidState(
            Message::new(MessageId::INVALID_TRANSACTION_STATE).arg("commit"),
        );
        let status = broker.report(&err);
        assert_eq!(status.code(), ErrorCode::InvalidState);
    }
}
