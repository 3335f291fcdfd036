//! Account transfer service module.

mod service;
mod traits;
mod transactional;

pub use service::TransferService;
pub use traits::{AccountTransfer, TransferLogic};
pub use transactional::TransactionalTransfer;

#[cfg(test)]
mod tests;
