use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{
    EventHandler,
    EventProducer,
    Handler,
    OrderInvalidatedEvent,
    OrderProcessedEvent,
    ReconciliationAbandonedEvent,
};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_processed_producer: Vec<EventProducer<OrderProcessedEvent>>,
    pub order_invalidated_producer: Vec<EventProducer<OrderInvalidatedEvent>>,
    pub reconciliation_abandoned_producer: Vec<EventProducer<ReconciliationAbandonedEvent>>,
}

impl EventProducers {
    pub async fn publish_order_processed(&self, event: OrderProcessedEvent) {
        for producer in &self.order_processed_producer {
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_order_invalidated(&self, event: OrderInvalidatedEvent) {
        for producer in &self.order_invalidated_producer {
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_reconciliation_abandoned(&self, event: ReconciliationAbandonedEvent) {
        for producer in &self.reconciliation_abandoned_producer {
            producer.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_order_processed: Option<EventHandler<OrderProcessedEvent>>,
    pub on_order_invalidated: Option<EventHandler<OrderInvalidatedEvent>>,
    pub on_reconciliation_abandoned: Option<EventHandler<ReconciliationAbandonedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_order_processed = hooks.on_order_processed.map(|f| EventHandler::new(buffer_size, f));
        let on_order_invalidated = hooks.on_order_invalidated.map(|f| EventHandler::new(buffer_size, f));
        let on_reconciliation_abandoned = hooks.on_reconciliation_abandoned.map(|f| EventHandler::new(buffer_size, f));
        Self { on_order_processed, on_order_invalidated, on_reconciliation_abandoned }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_processed {
            result.order_processed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_invalidated {
            result.order_invalidated_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_reconciliation_abandoned {
            result.reconciliation_abandoned_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_order_processed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_order_invalidated {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_reconciliation_abandoned {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_processed: Option<Handler<OrderProcessedEvent>>,
    pub on_order_invalidated: Option<Handler<OrderInvalidatedEvent>>,
    pub on_reconciliation_abandoned: Option<Handler<ReconciliationAbandonedEvent>>,
}

impl EventHooks {
    pub fn on_order_processed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderProcessedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_processed = Some(Arc::new(f));
        self
    }

    pub fn on_order_invalidated<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderInvalidatedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_invalidated = Some(Arc::new(f));
        self
    }

    pub fn on_reconciliation_abandoned<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ReconciliationAbandonedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_reconciliation_abandoned = Some(Arc::new(f));
        self
    }
}
