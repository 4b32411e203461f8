use std::{
    collections::HashSet,
    fmt::Debug,
    sync::{Arc, Mutex},
    time::Duration,
};

use log::*;
use tokio::runtime::Handle;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    accrual::AccrualOracle,
    db_types::{Order, OrderNumber, OrderStatusType},
    events::{EventProducers, OrderInvalidatedEvent, OrderProcessedEvent, ReconciliationAbandonedEvent},
    reconciler::{PollOutcome, ReconcileState},
    traits::{FinalizeResult, LoyaltyDatabase, StoreError},
};

/// Owns the background reconciliation tasks.
///
/// `Reconciler` is cheap to clone. All clones share the same task set, in-flight registry and shutdown signal.
/// Tasks always run on the runtime the reconciler was created on, whichever runtime calls [`Self::launch`].
pub struct Reconciler<B, A> {
    inner: Arc<ReconcilerInner<B, A>>,
}

struct ReconcilerInner<B, A> {
    db: B,
    oracle: A,
    producers: EventProducers,
    shutdown: CancellationToken,
    tasks: TaskTracker,
    runtime: Handle,
    in_flight: Mutex<HashSet<OrderNumber>>,
}

impl<B, A> Clone for Reconciler<B, A> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<B, A> Debug for Reconciler<B, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Reconciler ({} tasks)", self.inner.tasks.len())
    }
}

impl<B, A> Reconciler<B, A>
where
    B: LoyaltyDatabase,
    A: AccrualOracle,
{
    pub fn new(db: B, oracle: A, producers: EventProducers) -> Self {
        Self::with_shutdown_token(db, oracle, producers, CancellationToken::new())
    }

    /// Creates a reconciler whose tasks stop when `shutdown` is cancelled.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime.
    pub fn with_shutdown_token(db: B, oracle: A, producers: EventProducers, shutdown: CancellationToken) -> Self {
        let inner = ReconcilerInner {
            db,
            oracle,
            producers,
            shutdown,
            tasks: TaskTracker::new(),
            runtime: Handle::current(),
            in_flight: Mutex::new(HashSet::new()),
        };
        Self { inner: Arc::new(inner) }
    }

    pub fn db(&self) -> &B {
        &self.inner.db
    }

    pub fn oracle(&self) -> &A {
        &self.inner.oracle
    }

    /// The number of orders currently being reconciled in the background.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.lock().map(|set| set.len()).unwrap_or_default()
    }

    pub fn is_in_flight(&self, number: &OrderNumber) -> bool {
        self.inner.in_flight.lock().map(|set| set.contains(number)).unwrap_or_default()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Starts reconciling `order` in the background.
    ///
    /// Returns `false` without doing anything if the order is already final, a task for the same order number is
    /// already running, or the reconciler is shutting down.
    pub fn launch(&self, order: &Order) -> bool {
        if order.status.is_final() {
            trace!("🔄️ Order {} is already {}. Nothing to reconcile", order.number, order.status);
            return false;
        }
        if self.is_shutting_down() {
            warn!("🔄️ Not reconciling order {}. The reconciler is shutting down", order.number);
            return false;
        }
        if !self.claim(&order.number) {
            debug!("🔄️ Order {} is already being reconciled", order.number);
            return false;
        }
        let guard = InFlight { reconciler: self.clone(), number: order.number.clone() };
        let order = order.clone();
        let task = async move {
            let state = guard.reconciler.reconcile(order).await;
            match state.attempts() {
                Some(n) => trace!("🔄️ Reconciliation task for order {} finished after {n} polls: {state}", guard.number),
                None => trace!("🔄️ Reconciliation task for order {} finished: {state}", guard.number),
            }
        };
        self.inner.tasks.spawn_on(task, &self.inner.runtime);
        true
    }

    /// Relaunches reconciliation for every order that is still `NEW` or `PROCESSING`. Returns the number of tasks
    /// started.
    pub async fn resume_pending(&self) -> Result<usize, StoreError> {
        let orders = self.inner.db.fetch_unfinished_orders().await?;
        let launched = orders.iter().filter(|o| self.launch(o)).count();
        info!("🔄️ Resumed reconciliation for {launched} of {} unfinished orders", orders.len());
        Ok(launched)
    }

    /// Waits for every running reconciliation to finish, without cancelling any of them.
    pub async fn drain(&self) {
        self.inner.tasks.close();
        self.inner.tasks.wait().await;
        self.inner.tasks.reopen();
    }

    /// Cancels every running reconciliation and waits for the tasks to stop. Orders that were in flight keep their
    /// current status and can be resumed later with [`Self::resume_pending`].
    pub async fn shutdown(&self) {
        info!("🔄️ Stopping {} reconciliation tasks", self.inner.tasks.len());
        self.inner.shutdown.cancel();
        self.inner.tasks.close();
        self.inner.tasks.wait().await;
        info!("🔄️ All reconciliation tasks have stopped");
    }

    /// Drives `order` to a final status, and returns the state reconciliation ended in.
    ///
    /// This runs in the caller's task. It does not consult the in-flight registry, so prefer [`Self::launch`].
    pub async fn reconcile(&self, order: Order) -> ReconcileState {
        let oracle = &self.inner.oracle;
        let max_attempts = oracle.max_attempts();
        let interval = oracle.poll_interval();
        if order.status.is_final() {
            return match order.status {
                OrderStatusType::Processed => ReconcileState::Processed { accrual: order.accrual },
                _ => ReconcileState::Invalid,
            };
        }
        let mut state = ReconcileState::start(order.status, max_attempts);
        let mut write_failed = false;
        debug!("🔄️ Reconciling order {} for {}: {state}", order.number, order.user_id);
        while let ReconcileState::Polling { attempts, status } = state {
            if attempts > 0 && !self.pause(interval).await {
                state = ReconcileState::Cancelled { attempts, status };
                break;
            }
            let outcome = self.poll_once(&order, status, write_failed).await;
            write_failed |= outcome == PollOutcome::StoreFailed;
            state = state.next(outcome, max_attempts);
            trace!("🔄️ Order {} after attempt {}: {state}", order.number, attempts + 1);
        }
        self.report(&order, state).await;
        state
    }

    fn claim(&self, number: &OrderNumber) -> bool {
        match self.inner.in_flight.lock() {
            Ok(mut set) => set.insert(number.clone()),
            Err(e) => {
                error!("🔄️ In-flight registry is poisoned: {e}");
                false
            },
        }
    }

    /// Sleeps for `interval`. Returns `false` if the reconciler was shut down in the meantime.
    async fn pause(&self, interval: Duration) -> bool {
        tokio::select! {
            _ = self.inner.shutdown.cancelled() => false,
            _ = tokio::time::sleep(interval) => true,
        }
    }

    /// `write_failed` is set when an earlier store write for this order reported an error.
    async fn poll_once(&self, order: &Order, status: OrderStatusType, write_failed: bool) -> PollOutcome {
        let number = &order.number;
        let oracle = &self.inner.oracle;
        let lookup = tokio::time::timeout(oracle.request_timeout(), oracle.lookup(number));
        let verdict = tokio::select! {
            _ = self.inner.shutdown.cancelled() => return PollOutcome::Cancelled,
            result = lookup => result,
        };
        let verdict = match verdict {
            Ok(Ok(v)) => v,
            Ok(Err(e)) => {
                debug!("🔄️ Accrual lookup for order {number} failed: {e}");
                return PollOutcome::OracleUnavailable;
            },
            Err(_) => {
                debug!("🔄️ Accrual lookup for order {number} timed out");
                return PollOutcome::OracleUnavailable;
            },
        };
        let db = &self.inner.db;
        match verdict.status {
            OrderStatusType::New => PollOutcome::Pending(status),
            OrderStatusType::Processing if status == OrderStatusType::New => match db.mark_processing(number).await {
                Ok(_) => PollOutcome::Pending(OrderStatusType::Processing),
                Err(e) => {
                    warn!("🔄️ Could not mark order {number} as PROCESSING: {e}");
                    PollOutcome::StoreFailed
                },
            },
            OrderStatusType::Processing => PollOutcome::Pending(status),
            OrderStatusType::Processed => match db.complete_order(number, verdict.accrual()).await {
                Ok(result) => self.settled(result, write_failed).await,
                Err(e) => {
                    warn!("🔄️ Could not complete order {number}: {e}");
                    PollOutcome::StoreFailed
                },
            },
            OrderStatusType::Invalid => match db.mark_invalid(number).await {
                Ok(result) => self.settled(result, write_failed).await,
                Err(e) => {
                    warn!("🔄️ Could not mark order {number} as INVALID: {e}");
                    PollOutcome::StoreFailed
                },
            },
        }
    }

    /// Events are published when this task changed the order. An order that was already final is only reported if an
    /// earlier write from this task failed, since that write may have committed without an acknowledgement.
    async fn settled(&self, result: FinalizeResult, write_failed: bool) -> PollOutcome {
        let outcome = match result.order().status {
            OrderStatusType::Processed => PollOutcome::Processed(result.order().accrual),
            _ => PollOutcome::Invalid,
        };
        let changed = match result {
            FinalizeResult::Finalized(order) => Some(order),
            FinalizeResult::AlreadyFinal(order) if write_failed => Some(order),
            FinalizeResult::AlreadyFinal(_) => None,
        };
        if let Some(order) = changed {
            let producers = &self.inner.producers;
            match order.status {
                OrderStatusType::Processed => producers.publish_order_processed(OrderProcessedEvent::new(order)).await,
                _ => producers.publish_order_invalidated(OrderInvalidatedEvent::new(order)).await,
            }
        }
        outcome
    }

    async fn report(&self, order: &Order, state: ReconcileState) {
        let number = &order.number;
        match state {
            ReconcileState::Processed { accrual } => {
                info!("🔄️ Order {number} is PROCESSED. {accrual} points for {}", order.user_id)
            },
            ReconcileState::Invalid => info!("🔄️ Order {number} is INVALID"),
            ReconcileState::Abandoned { attempts, status } => {
                warn!(
                    "🔄️ Giving up on order {number} after {attempts} attempts. It stays {status} until it is resumed"
                );
                let event = ReconciliationAbandonedEvent { number: number.clone(), user_id: order.user_id, status, attempts };
                self.inner.producers.publish_reconciliation_abandoned(event).await;
            },
            ReconcileState::Cancelled { attempts, status } => {
                info!("🔄️ Reconciliation of order {number} was cancelled after {attempts} attempts. It stays {status}")
            },
            ReconcileState::Polling { .. } => {},
        }
    }
}

/// Holds an order's slot in the in-flight registry for as long as its task exists. The slot is freed when the task
/// finishes, panics, or is dropped with its runtime.
struct InFlight<B, A> {
    reconciler: Reconciler<B, A>,
    number: OrderNumber,
}

impl<B, A> Drop for InFlight<B, A> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.reconciler.inner.in_flight.lock() {
            set.remove(&self.number);
        }
    }
}
