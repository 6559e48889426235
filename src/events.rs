//! Fire-and-forget domain events.
//!
//! Services publish after a successful write with [`EventPublisher::publish`],
//! which never blocks and never fails the request. A single [`EventWorker`]
//! task drains the channel, writes one structured log line per event and
//! keeps the [`UserCache`] warm. Only reads fill the cache; write events
//! evict.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use crate::account::{User, UserCache};
use crate::core_types::{OrderId, ProductId, ShopId, UserId};
use crate::order::{OrderStatus, PaymentStatus};

#[derive(Debug, Clone)]
pub enum DomainEvent {
    UserRegistered { user_id: UserId },
    /// A user was read from the store on a cache miss. `generation` is the
    /// cache generation taken before the read.
    UserLoaded { user: User, generation: u64 },
    UserUpdated { user_id: UserId },
    UserDeleted { user_id: UserId },
    ShopCreated { shop_id: ShopId, owner_id: UserId },
    ShopUpdated { shop_id: ShopId },
    ProductCreated { product_id: ProductId, shop_id: ShopId },
    ProductUpdated { product_id: ProductId },
    ProductDeleted { product_id: ProductId },
    OrderPlaced {
        order_id: OrderId,
        user_id: UserId,
        shop_id: ShopId,
    },
    OrderStatusChanged {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },
    PaymentStatusChanged {
        order_id: OrderId,
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

impl DomainEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserRegistered { .. } => "user_registered",
            Self::UserLoaded { .. } => "user_loaded",
            Self::UserUpdated { .. } => "user_updated",
            Self::UserDeleted { .. } => "user_deleted",
            Self::ShopCreated { .. } => "shop_created",
            Self::ShopUpdated { .. } => "shop_updated",
            Self::ProductCreated { .. } => "product_created",
            Self::ProductUpdated { .. } => "product_updated",
            Self::ProductDeleted { .. } => "product_deleted",
            Self::OrderPlaced { .. } => "order_placed",
            Self::OrderStatusChanged { .. } => "order_status_changed",
            Self::PaymentStatusChanged { .. } => "payment_status_changed",
        }
    }
}

/// Sender side, cloned into every service.
#[derive(Clone)]
pub struct EventPublisher {
    tx: mpsc::Sender<DomainEvent>,
}

impl EventPublisher {
    pub fn publish(&self, event: DomainEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(kind = event.kind(), "event channel full, dropping event");
            }
            Err(TrySendError::Closed(event)) => {
                warn!(kind = event.kind(), "event channel closed, dropping event");
            }
        }
    }
}

/// Receiver side; run it on its own task.
pub struct EventWorker {
    rx: mpsc::Receiver<DomainEvent>,
    cache: Arc<UserCache>,
}

impl EventWorker {
    /// Drain until every publisher is dropped.
    pub async fn run(mut self) {
        info!("event worker started");
        while let Some(event) = self.rx.recv().await {
            self.handle(event);
        }
        info!("event worker stopped");
    }

    /// Process everything queued right now without waiting.
    pub fn drain_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.handle(event);
            count += 1;
        }
        count
    }

    fn handle(&self, event: DomainEvent) {
        match &event {
            DomainEvent::UserLoaded { user, generation } => {
                if self.cache.fill(user.clone(), *generation) {
                    debug!(kind = event.kind(), user_id = user.id, "caching user");
                } else {
                    debug!(kind = event.kind(), user_id = user.id, "user changed since read, not caching");
                }
            }
            DomainEvent::UserUpdated { user_id } | DomainEvent::UserDeleted { user_id } => {
                self.cache.evict(*user_id);
                info!(kind = event.kind(), user_id, "event");
            }
            DomainEvent::UserRegistered { user_id } => {
                info!(kind = event.kind(), user_id, "event");
            }
            DomainEvent::ShopCreated { shop_id, owner_id } => {
                info!(kind = event.kind(), shop_id, user_id = owner_id, "event");
            }
            DomainEvent::ShopUpdated { shop_id } => {
                info!(kind = event.kind(), shop_id, "event");
            }
            DomainEvent::ProductCreated {
                product_id,
                shop_id,
            } => {
                info!(kind = event.kind(), product_id, shop_id, "event");
            }
            DomainEvent::ProductUpdated { product_id } | DomainEvent::ProductDeleted { product_id } => {
                info!(kind = event.kind(), product_id, "event");
            }
            DomainEvent::OrderPlaced {
                order_id,
                user_id,
                shop_id,
            } => {
                info!(kind = event.kind(), order_id, user_id, shop_id, "event");
            }
            DomainEvent::OrderStatusChanged { order_id, from, to } => {
                info!(kind = event.kind(), order_id, from = %from, to = %to, "event");
            }
            DomainEvent::PaymentStatusChanged { order_id, from, to } => {
                info!(kind = event.kind(), order_id, from = %from, to = %to, "event");
            }
        }
    }
}

/// Create a bounded publisher/worker pair sharing `cache`.
pub fn event_channel(buffer: usize, cache: Arc<UserCache>) -> (EventPublisher, EventWorker) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (EventPublisher { tx }, EventWorker { rx, cache })
}
