pub mod user_client;
