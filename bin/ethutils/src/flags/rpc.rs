//! RPC CLI Flags

use clap::Args;
use ethutils_fetch::AlloyGateway;
use url::Url;

/// Where to reach the Ethereum node.
#[derive(Debug, Clone, Args)]
pub(crate) struct RpcArgs {
    /// URL of the Ethereum JSON-RPC endpoint.
    #[arg(long = "rpc", alias = "eth-node", env = "ETH_NODE")]
    pub(crate) url: Url,
}

impl RpcArgs {
    /// Returns a gateway talking to the configured endpoint.
    pub(crate) fn gateway(&self) -> AlloyGateway {
        AlloyGateway::new_http(self.url.clone())
    }
}
