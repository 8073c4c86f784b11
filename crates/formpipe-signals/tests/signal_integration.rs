//! Integration tests for signal dispatch: ordering, failure isolation,
//! replacement, and async receivers.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use formpipe_core::{FormError, FormResult};
use formpipe_signals::{receiver_fn, Receiver, Signal};

#[derive(Debug)]
struct Event {
    form_id: String,
}

/// Records every call into a shared log, yielding to the runtime first.
struct Recorder {
    label: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Receiver<Event> for Recorder {
    async fn receive(&self, event: &Event) -> FormResult<()> {
        tokio::task::yield_now().await;
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.label, event.form_id));
        Ok(())
    }
}

fn recorder(label: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Recorder> {
    Arc::new(Recorder {
        label,
        log: log.clone(),
    })
}

#[tokio::test]
async fn test_receivers_run_in_connection_order() {
    let signal = Signal::new("submission");
    let log = Arc::new(Mutex::new(Vec::new()));
    signal.connect("save", recorder("save", &log));
    signal.connect("email", recorder("email", &log));
    signal.connect("confirm", recorder("confirm", &log));

    signal
        .send(&Event {
            form_id: "contact".into(),
        })
        .await;

    assert_eq!(
        *log.lock().unwrap(),
        vec!["save:contact", "email:contact", "confirm:contact"]
    );
}

#[tokio::test]
async fn test_failure_is_isolated() {
    let signal = Signal::new("submission");
    let log = Arc::new(Mutex::new(Vec::new()));
    signal.connect(
        "broken",
        receiver_fn(|_: &Event| Err(FormError::Storage("disk full".into()))),
    );
    signal.connect("email", recorder("email", &log));

    let outcomes = signal
        .send(&Event {
            form_id: "contact".into(),
        })
        .await;

    assert_eq!(outcomes.len(), 2);
    assert!(matches!(outcomes[0].error(), Some(FormError::Storage(_))));
    assert!(outcomes[1].is_ok());
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reconnect_replaces_in_place() {
    let signal = Signal::new("submission");
    let log = Arc::new(Mutex::new(Vec::new()));
    signal.connect("save", recorder("first", &log));
    signal.connect("email", recorder("email", &log));
    signal.connect("save", recorder("second", &log));

    assert_eq!(signal.receiver_ids(), vec!["save", "email"]);
    signal.send(&Event { form_id: "f".into() }).await;
    assert_eq!(*log.lock().unwrap(), vec!["second:f", "email:f"]);
}

#[tokio::test]
async fn test_disconnected_receiver_is_not_called() {
    let signal = Signal::new("submission");
    let log = Arc::new(Mutex::new(Vec::new()));
    signal.connect("save", recorder("save", &log));
    assert!(signal.disconnect("save"));
    assert!(!signal.disconnect("save"));

    let outcomes = signal.send(&Event { form_id: "f".into() }).await;
    assert!(outcomes.is_empty());
    assert!(log.lock().unwrap().is_empty());
}
