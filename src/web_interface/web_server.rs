use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use log::info;
use warp::Filter;

use super::routes;
use crate::configuration::Config;
use crate::cracking::CrackManager;
use crate::credentials::CredsCorrelator;
use crate::dumping::DumpManager;
use crate::error_handling::types::WebError;

/// Web server exposing the orchestration API.
pub struct WebServer {
    config: Arc<Config>,
    crack: Arc<CrackManager>,
    dump: Arc<DumpManager>,
    creds: Arc<CredsCorrelator>,
}

impl WebServer {
    /// Create a new WebServer instance
    pub fn new(
        config: Arc<Config>,
        crack: Arc<CrackManager>,
        dump: Arc<DumpManager>,
        creds: Arc<CredsCorrelator>,
    ) -> Self {
        Self {
            config,
            crack,
            dump,
            creds,
        }
    }

    /// Start the web server on the configured address; runs until the
    /// process is stopped.
    pub async fn start(&self) -> Result<(), WebError> {
        let routes = routes::dashboard_route()
            .or(routes::run_brute_route(
                self.crack.clone(),
                self.config.clone(),
            ))
            .or(routes::re_run_brute_route(self.crack.clone()))
            .or(routes::brute_info_route(self.crack.clone()))
            .or(routes::brute_info_all_route(self.crack.clone()))
            .or(routes::run_dump_route(self.dump.clone()))
            .or(routes::dump_status_route(self.dump.clone()))
            .or(routes::download_hashes_route(self.config.clone()))
            .or(routes::bruted_creds_route(self.creds.clone()))
            .or(routes::run_benchmark_route(self.crack.clone()))
            .or(routes::clean_brute_route(self.crack.clone()))
            .or(routes::clean_dump_route(self.dump.clone()));

        let ip: IpAddr = self
            .config
            .server
            .bind_address
            .parse()
            .map_err(|e| WebError::BindFailed(format!("{}", e)))?;
        let addr: SocketAddr = (ip, self.config.server.port).into();

        info!("Web server listening on {}", addr);
        warp::serve(routes).run(addr).await;

        Ok(())
    }
}
