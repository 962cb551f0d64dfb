//! Repository layer: one repository per aggregate.

pub mod cart_repo;
pub mod order_repo;
pub mod session_repo;
pub mod user_repo;

pub use cart_repo::CartRepo;
pub use order_repo::OrderRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
