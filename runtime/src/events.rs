use tokio::sync::broadcast;
use tracing::debug;
use triggers::PayoutEvent;

const BUS_CAPACITY: usize = 256;

/// In-process fan-out for payout events. Slow subscribers lag and drop, they
/// never block the publisher.
#[derive(Debug, Clone)]
pub struct PayoutBus {
    tx: broadcast::Sender<PayoutEvent>,
}

impl Default for PayoutBus {
    fn default() -> Self {
        Self::new()
    }
}

impl PayoutBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, event: PayoutEvent) {
        // Err just means nobody is listening right now.
        if self.tx.send(event.clone()).is_err() {
            debug!(region = %event.region_id, "payout event published with no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PayoutEvent> {
        self.tx.subscribe()
    }
}
