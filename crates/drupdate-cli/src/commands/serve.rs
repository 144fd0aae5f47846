//! `drupdate serve`: run the JSON API against the public catalogs

use std::net::SocketAddr;
use std::sync::Arc;

use drupdate_registry::RegistryClient;
use drupdate_server::ApiServer;

use super::CommandContext;

pub async fn execute(addr: SocketAddr, ctx: &CommandContext) -> anyhow::Result<()> {
    let client = RegistryClient::with_config(ctx.config.clone())?;
    let server = Arc::new(ApiServer::new(Arc::new(client)));

    ctx.output.step("🌐", &format!("Serving API on http://{}", addr));
    server.serve(addr).await
}
