pub mod studio_rpc;
