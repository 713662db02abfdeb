mod rpc;
mod service;

pub use rpc::router;
pub use service::MenuService;
