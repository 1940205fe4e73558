pub mod group_user_rpc_service_impl;
