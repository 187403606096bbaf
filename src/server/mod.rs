pub mod api;

use crate::agent::TutorAgent;
use crate::cli::Args;
use self::api::TlsPaths;
use log::{ error, info };
use std::error::Error;
use std::sync::Arc;

pub struct Server {
    addr: String,
    agent: Arc<TutorAgent>,
    args: Args,
}

impl Server {
    pub fn new(addr: String, agent: Arc<TutorAgent>, args: Args) -> Self {
        Self { addr, agent, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let tls = self.tls_paths()?;
        let app = api::router(self.agent.clone(), self.max_upload_bytes());

        api::start_http_server(&self.addr, app, tls).await
    }

    fn max_upload_bytes(&self) -> usize {
        self.args.max_upload_mb.saturating_mul(1024 * 1024)
    }

    fn tls_paths(&self) -> Result<Option<TlsPaths>, Box<dyn Error + Send + Sync>> {
        if !self.args.enable_tls {
            return Ok(None);
        }
        match (&self.args.tls_cert_path, &self.args.tls_key_path) {
            (Some(cert_path), Some(key_path)) => {
                info!(
                    "TLS enabled. Loading certificate from '{}' and key from '{}'",
                    cert_path,
                    key_path
                );
                Ok(
                    Some(TlsPaths {
                        cert_path: cert_path.clone(),
                        key_path: key_path.clone(),
                    })
                )
            }
            (Some(_), None) | (None, Some(_)) => {
                error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
                Err("Missing TLS certificate or key path".into())
            }
            (None, None) => {
                error!("--enable-tls was set but no certificate/key paths provided.");
                Err("TLS enabled without cert/key".into())
            }
        }
    }
}
