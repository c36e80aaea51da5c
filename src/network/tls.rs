use crate::error::ConnectionError;
use rustls::{Certificate, ClientConfig, OwnedTrustAnchor, RootCertStore};
use std::sync::Arc;
use tokio_tungstenite::Connector;
use tracing::{debug, warn};

/// Root store from the system certificates, falling back to the bundled
/// webpki roots when none can be loaded
fn root_store() -> RootCertStore {
    let mut root_store = RootCertStore::empty();

    match rustls_native_certs::load_native_certs() {
        Ok(certs) => {
            for cert in certs {
                if let Err(e) = root_store.add(&Certificate(cert.0)) {
                    debug!("Skipping native certificate: {}", e);
                }
            }
        }
        Err(e) => warn!("Failed to load native certificates: {}", e),
    }

    if root_store.is_empty() {
        warn!("No usable system certificates, using bundled roots");
        root_store.add_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.iter().map(|ta| {
            OwnedTrustAnchor::from_subject_spki_name_constraints(
                ta.subject,
                ta.spki,
                ta.name_constraints,
            )
        }));
    }
    root_store
}

/// Create a TLS connector for `wss://` servers
pub fn create_tls_connector() -> Result<Connector, ConnectionError> {
    let root_store = root_store();
    if root_store.is_empty() {
        return Err(ConnectionError::Tls("no trusted root certificates".to_string()));
    }

    let config = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(Connector::Rustls(Arc::new(config)))
}
