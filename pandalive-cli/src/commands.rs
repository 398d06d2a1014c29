use crate::{
    cli::OutputFormat,
    config::AppConfig,
    error::Result,
    output::{OutputManager, write_output},
};
use pandalive_parser::extractor::{client_builder, factory::ExtractorFactory};
use reqwest::{Client, Proxy};
use std::{path::Path, time::Duration};
use tracing::{debug, info};

/// Options for a single `extract` run, already merged with the config.
pub struct ExtractOptions<'a> {
    pub url: &'a str,
    pub cookies: Option<&'a str>,
    pub extras: Option<&'a str>,
    pub output: OutputFormat,
    pub output_file: Option<&'a Path>,
    pub timeout: Duration,
}

pub struct CommandExecutor {
    config: AppConfig,
    proxy: Option<String>,
    output_manager: OutputManager,
}

impl CommandExecutor {
    pub fn new(config: AppConfig, proxy: Option<String>) -> Self {
        // Command-line proxy wins over the configured one.
        let proxy = proxy.or_else(|| config.proxy.clone());
        Self {
            config,
            proxy,
            output_manager: OutputManager::new(true),
        }
    }

    fn build_client(&self, timeout: Duration) -> Result<Client> {
        let mut builder = client_builder()?.timeout(timeout);
        if let Some(proxy) = &self.proxy {
            debug!(proxy, "Using proxy");
            builder = builder.proxy(Proxy::all(proxy)?);
        }
        Ok(builder.build()?)
    }

    pub async fn extract_single(&self, options: ExtractOptions<'_>) -> Result<()> {
        let client = self.build_client(options.timeout)?;
        let factory = ExtractorFactory::new(client);

        let extras = self.config.merged_extras(options.extras)?;
        let extractor = factory.create_extractor(
            options.url,
            options.cookies.map(ToOwned::to_owned),
            extras,
        )?;

        info!(
            platform = extractor.platform_name(),
            url = options.url,
            "Extracting"
        );
        let media_info = extractor.extract().await?;
        info!(
            id = %media_info.id,
            formats = media_info.formats.len(),
            "Extraction finished"
        );

        let content = self
            .output_manager
            .format_media_info(&media_info, &options.output)?;
        write_output(&content, options.output_file)
    }

    pub fn list_platforms(&self, format: &OutputFormat) -> Result<()> {
        let platforms = ExtractorFactory::supported_platforms();
        let content = self.output_manager.format_platforms(&platforms, format)?;
        write_output(&content, None)
    }
}
