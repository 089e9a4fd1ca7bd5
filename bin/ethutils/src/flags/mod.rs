//! CLI Flags

mod rpc;
pub(crate) use rpc::RpcArgs;

mod time;
pub(crate) use time::TimeArgs;

mod locator;
pub(crate) use locator::LocatorArgs;
