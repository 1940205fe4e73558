pub mod biz_service;
pub mod entitys;
pub mod errors;
pub mod manager;
pub mod protocol;
pub mod rpc_client;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
