//! # Connectivity Watching
//!
//! Connectivity is modeled as a `tokio::sync::watch` channel carrying a
//! boolean "is connected" flag. The platform shell publishes transitions
//! into a [`ConnectivityState`]; the request layer reads the current value
//! before every call, and [`ConnectivityWatcher`] drives offline-queue
//! replay on each transition back to online.

use std::future::Future;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Publisher side of the connectivity signal.
///
/// Owned by whatever integrates with the platform reachability API; the
/// rest of the client only ever holds [`watch::Receiver<bool>`] handles
/// obtained from [`ConnectivityState::subscribe`].
#[derive(Debug)]
pub struct ConnectivityState {
    tx: watch::Sender<bool>,
}

impl ConnectivityState {
    /// Create a new state with the given initial flag
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx }
    }

    /// Publish a connectivity transition
    pub fn set_online(&self, online: bool) {
        // send_replace never fails even with no active receivers
        self.tx.send_replace(online);
    }

    /// Current flag value
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Subscribe to transitions
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityState {
    fn default() -> Self {
        // Assume online until the platform reports otherwise
        Self::new(true)
    }
}

/// Runs a callback on every transition to online.
pub struct ConnectivityWatcher;

impl ConnectivityWatcher {
    /// Spawn a task that awaits connectivity transitions and invokes
    /// `on_online` each time the flag becomes true. The task ends when the
    /// [`ConnectivityState`] is dropped.
    pub fn spawn<F, Fut>(mut rx: watch::Receiver<bool>, mut on_online: F) -> JoinHandle<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let online = *rx.borrow_and_update();
                if online {
                    tracing::info!("connectivity restored");
                    on_online().await;
                }
            }
        })
    }
}
