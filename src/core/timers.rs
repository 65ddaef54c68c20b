//! # One-shot supervisor timers (T1 and T2).
//!
//! A [`OneShot`] sleeps for a duration, then injects a single event into the
//! owning supervisor's mailbox. Arming an already-armed timer cancels the
//! prior one, so at most one T1 and one T2 can be outstanding per
//! supervisor.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::transport::Mailbox;
use crate::events::Event;

/// A cancellable one-shot timer firing a mailbox event.
#[derive(Default)]
pub(crate) struct OneShot {
    token: Option<CancellationToken>,
}

impl OneShot {
    /// Arms the timer, cancelling any prior arming.
    ///
    /// After `delay`, `event` is sent to `mailbox` unless the timer was
    /// disarmed or re-armed in the meantime.
    pub(crate) fn arm(&mut self, delay: Duration, mailbox: Mailbox, event: Event) {
        self.disarm();
        let token = CancellationToken::new();
        self.token = Some(token.clone());
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    let _ = mailbox.send(event);
                }
                _ = token.cancelled() => {}
            }
        });
    }

    /// Cancels the pending fire, if any.
    pub(crate) fn disarm(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}

impl Drop for OneShot {
    fn drop(&mut self) {
        self.disarm();
    }
}
