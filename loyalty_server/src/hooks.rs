use std::{future::Future, pin::Pin};

use log::*;
use loyalty_engine::events::{EventHandlers, EventHooks};

pub const EVENT_BUFFER_SIZE: usize = 25;

/// The server's subscribers to engine events.
///
/// The server only reports on events. Credits are applied by the engine before the events are published.
pub fn create_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_order_processed(|ev| {
        info!("📬️ Order {} was credited with {} points for {}", ev.order.number, ev.accrual(), ev.order.user_id);
        no_op()
    });
    hooks.on_order_invalidated(|ev| {
        info!("📬️ Order {} for {} was rejected by the accrual service", ev.order.number, ev.order.user_id);
        no_op()
    });
    hooks.on_reconciliation_abandoned(|ev| {
        warn!(
            "📬️ Gave up reconciling order {} for {} after {} attempts. It remains {}, and will be retried on the next \
             restart.",
            ev.number, ev.user_id, ev.attempts, ev.status
        );
        no_op()
    });
    EventHandlers::new(EVENT_BUFFER_SIZE, hooks)
}

fn no_op() -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async {})
}
