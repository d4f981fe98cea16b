//! Fixed-interval background refresh tied to the lifetime of a handle.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::cache::CacheSubscription;

/// Running poller. Dropping the handle stops it.
#[derive(Debug)]
pub struct PollHandle {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        log::debug!("stopping poller: {}", self.name);
        self.handle.abort();
    }
}

/// Run `tick` immediately and then every `every`.
///
/// When `refetch_on` is given, an invalidation of that key runs `tick` right
/// away as well; the interval itself is not reset.
pub fn spawn_poll<F, Fut>(
    name: &'static str,
    every: Duration,
    mut refetch_on: Option<CacheSubscription>,
    mut tick: F,
) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let closed = match refetch_on.as_mut() {
                Some(subscription) => tokio::select! {
                    _ = interval.tick() => false,
                    received = subscription.recv() => received.is_none(),
                },
                None => {
                    interval.tick().await;
                    false
                }
            };

            if closed {
                refetch_on = None;
                continue;
            }

            tick().await;
        }
    });

    PollHandle { name, handle }
}
