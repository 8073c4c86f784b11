//! # formpipe-signals
//!
//! Signal dispatcher for formpipe. Provides a decoupled event system allowing
//! the submission pipeline to notify independent handlers (persistence, owner
//! notification, confirmation email) without depending on them directly.
//!
//! Receivers run sequentially in connection order. A receiver that fails is
//! logged and recorded in the returned outcomes; the remaining receivers still
//! run and the sender never sees the error.
//!
//! ## Usage
//!
//! ```
//! use formpipe_signals::{receiver_fn, Signal};
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let signal: Signal<String> = Signal::new("greeting");
//!
//! signal.connect("printer", receiver_fn(|msg: &String| {
//!     println!("Received: {msg}");
//!     Ok(())
//! }));
//!
//! let outcomes = signal.send(&"hello".to_string()).await;
//! assert_eq!(outcomes.len(), 1);
//! assert!(outcomes[0].is_ok());
//! # });
//! ```

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use formpipe_core::{FormError, FormResult};

/// A subscriber to a [`Signal`].
///
/// Receivers get a shared reference to the payload; anything they need to
/// change must be cloned first so that other receivers see the original.
#[async_trait]
pub trait Receiver<T: Sync>: Send + Sync {
    /// Handles one dispatched payload.
    async fn receive(&self, payload: &T) -> FormResult<()>;
}

/// A shared, type-erased receiver.
pub type SignalReceiver<T> = Arc<dyn Receiver<T>>;

/// Adapts a synchronous closure into a [`Receiver`].
pub struct FnReceiver<F> {
    callback: F,
}

#[async_trait]
impl<T, F> Receiver<T> for FnReceiver<F>
where
    T: Sync,
    F: Fn(&T) -> FormResult<()> + Send + Sync,
{
    async fn receive(&self, payload: &T) -> FormResult<()> {
        (self.callback)(payload)
    }
}

/// Wraps a synchronous closure as a shareable receiver.
pub fn receiver_fn<T, F>(callback: F) -> SignalReceiver<T>
where
    T: Sync + 'static,
    F: Fn(&T) -> FormResult<()> + Send + Sync + 'static,
{
    Arc::new(FnReceiver { callback })
}

/// The result of delivering a payload to one receiver.
#[derive(Debug)]
pub struct ReceiverOutcome {
    /// The ID the receiver was connected under.
    pub receiver_id: String,
    /// What the receiver returned.
    pub result: FormResult<()>,
}

impl ReceiverOutcome {
    /// Returns `true` if the receiver succeeded.
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns the receiver's error, if any.
    pub const fn error(&self) -> Option<&FormError> {
        match &self.result {
            Ok(()) => None,
            Err(e) => Some(e),
        }
    }
}

/// A named signal that can be connected to and dispatched.
///
/// Each signal carries a payload type `T`. Receivers are called in the order
/// they were connected.
pub struct Signal<T: 'static> {
    name: String,
    receivers: RwLock<Vec<(String, SignalReceiver<T>)>>,
}

impl<T: Sync + 'static> Signal<T> {
    /// Creates a new signal with no connected receivers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            receivers: RwLock::new(Vec::new()),
        }
    }

    /// Returns the signal's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connects a receiver to this signal.
    ///
    /// The `receiver_id` is used to identify the receiver for later disconnection.
    /// If a receiver with the same ID is already connected, it is replaced in place.
    pub fn connect(&self, receiver_id: impl Into<String>, receiver: SignalReceiver<T>) {
        let id = receiver_id.into();
        let mut receivers = self.receivers.write().expect("signal lock poisoned");

        if let Some(entry) = receivers.iter_mut().find(|(rid, _)| *rid == id) {
            entry.1 = receiver;
        } else {
            receivers.push((id, receiver));
        }
    }

    /// Disconnects the receiver with the given ID.
    ///
    /// Returns `true` if a receiver was found and removed.
    pub fn disconnect(&self, receiver_id: &str) -> bool {
        let mut receivers = self.receivers.write().expect("signal lock poisoned");
        let len_before = receivers.len();
        receivers.retain(|(id, _)| id != receiver_id);
        receivers.len() < len_before
    }

    /// Returns the number of connected receivers.
    pub fn receiver_count(&self) -> usize {
        self.receivers.read().expect("signal lock poisoned").len()
    }

    /// Returns the IDs of the connected receivers, in call order.
    pub fn receiver_ids(&self) -> Vec<String> {
        self.receivers
            .read()
            .expect("signal lock poisoned")
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Sends the payload to all connected receivers.
    ///
    /// Receivers run one after another in connection order. A failing
    /// receiver is logged and does not stop the others. Returns one outcome
    /// per receiver.
    pub async fn send(&self, payload: &T) -> Vec<ReceiverOutcome> {
        // Snapshot so the lock is not held across awaits.
        let receivers: Vec<(String, SignalReceiver<T>)> = self
            .receivers
            .read()
            .expect("signal lock poisoned")
            .clone();

        let mut outcomes = Vec::with_capacity(receivers.len());
        for (receiver_id, receiver) in receivers {
            let result = receiver.receive(payload).await;
            if let Err(err) = &result {
                tracing::error!(
                    signal = %self.name,
                    receiver = %receiver_id,
                    error = %err,
                    "signal receiver failed"
                );
            }
            outcomes.push(ReceiverOutcome {
                receiver_id,
                result,
            });
        }
        outcomes
    }
}

impl<T: 'static> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.receivers.read().map_or(0, |r| r.len());
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("receivers", &count)
            .finish()
    }
}
