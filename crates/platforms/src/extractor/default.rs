use super::error::ExtractorError;
use super::factory::ExtractorFactory;
use reqwest::{Client, ClientBuilder};
use rustls::{ClientConfig, crypto::aws_lc_rs};
use rustls_platform_verifier::BuilderVerifierExt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::debug;

pub(crate) const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Install aws-lc-rs as the process-wide rustls provider.
///
/// reqwest is built without a bundled provider, so a plain `Client::new()`
/// panics until this has run. Idempotent.
pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = aws_lc_rs::default_provider().install_default() {
            // Another crate got there first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// A `ClientBuilder` preconfigured with rustls and the platform certificate
/// verifier. Callers add timeouts and proxies on top.
pub fn client_builder() -> Result<ClientBuilder, ExtractorError> {
    install_rustls_provider();

    let provider = Arc::new(aws_lc_rs::default_provider());
    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ExtractorError::Other(format!("failed to configure TLS versions: {e}")))?
        .with_platform_verifier()
        .map_err(|e| ExtractorError::Other(format!("failed to load platform verifier: {e}")))?
        .with_no_client_auth();

    Ok(Client::builder().use_preconfigured_tls(tls_config))
}

pub fn default_client() -> Result<Client, ExtractorError> {
    Ok(client_builder()?.timeout(DEFAULT_TIMEOUT).build()?)
}

/// Returns a new `ExtractorFactory` populated with all the supported platforms.
pub fn default_factory() -> Result<ExtractorFactory, ExtractorError> {
    Ok(ExtractorFactory::new(default_client()?))
}

/// Plain client for tests that talk to local mock servers.
#[cfg(test)]
pub(crate) fn test_client() -> Client {
    install_rustls_provider();
    Client::new()
}
