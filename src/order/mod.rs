//! Orders: transactional placement, status FSMs and visibility rules.

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod state;


pub use models::{
    CreateOrderRequest, NewOrder, NewOrderItem, Order, OrderItem, OrderItemRequest,
    UpdatePaymentRequest, UpdateStatusRequest,
};
pub use repository::{OrderRepository, PgOrderRepository};
pub use service::OrderService;
pub use state::{OrderStatus, PaymentStatus};
