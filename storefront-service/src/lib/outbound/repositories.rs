pub mod coupon;
pub mod order;
pub mod user;

pub use coupon::PostgresCouponRepository;
pub use order::PostgresOrderRepository;
pub use user::PostgresUserRepository;
