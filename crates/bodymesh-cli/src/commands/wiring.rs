//! Endpoint resolution and adapter construction shared by `create` and `serve`.

use std::sync::Arc;

use anyhow::{Context, Result};
use bodymesh_adapters::{
    build_client, CsmReconstruction, HttpBackgroundRemover, HttpPoseDetector, HttpRegistration,
    HttpSizeAdvisor, PassthroughBackgroundRemover, PocketBaseStore,
};
use bodymesh_core::ports::{
    BackgroundRemover, PoseDetector, RecordStore, RegistrationHook, SizeAdvisor,
};
use bodymesh_core::{RetryPolicy, SessionClient};
use clap::Args;
use reqwest::Client;
use tracing::debug;

use crate::config::{defaults, AppConfig, ServicesConfig};

/// Service endpoint flags. Each also reads its `BODYMESH_*` variable.
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// Record store base URL
    #[arg(long, env = "BODYMESH_RECORD_STORE_URL", value_name = "URL")]
    pub record_store_url: Option<String>,

    /// Reconstruction service base URL
    #[arg(long, env = "BODYMESH_RECONSTRUCTION_URL", value_name = "URL")]
    pub reconstruction_url: Option<String>,

    /// Reconstruction service API key
    #[arg(
        long,
        env = "BODYMESH_RECONSTRUCTION_API_KEY",
        value_name = "KEY",
        hide_env_values = true
    )]
    pub reconstruction_api_key: Option<String>,

    /// Fitting registration base URL
    #[arg(long, env = "BODYMESH_REGISTER_URL", value_name = "URL")]
    pub register_url: Option<String>,

    /// Size recommendation service base URL
    #[arg(long, env = "BODYMESH_SIZE_URL", value_name = "URL")]
    pub size_url: Option<String>,

    /// Pose detection endpoint
    #[arg(long, env = "BODYMESH_POSE_URL", value_name = "URL")]
    pub pose_url: Option<String>,

    /// Background removal endpoint (images pass through when unset)
    #[arg(long, env = "BODYMESH_MATTING_URL", value_name = "URL")]
    pub matting_url: Option<String>,
}

/// Endpoints after flags, environment, config files and defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub record_store_url: String,
    pub reconstruction_url: String,
    pub reconstruction_api_key: Option<String>,
    pub register_url: String,
    pub size_url: String,
    pub pose_url: Option<String>,
    pub matting_url: Option<String>,
}

impl ServiceArgs {
    /// Flags and environment win over config files, which win over defaults.
    pub fn resolve(&self, config: &ServicesConfig) -> Endpoints {
        let pick = |flag: &Option<String>, file: &Option<String>| {
            flag.clone().or_else(|| file.clone())
        };
        Endpoints {
            record_store_url: pick(&self.record_store_url, &config.record_store_url)
                .unwrap_or_else(|| defaults::RECORD_STORE_URL.to_string()),
            reconstruction_url: pick(&self.reconstruction_url, &config.reconstruction_url)
                .unwrap_or_else(|| defaults::RECONSTRUCTION_URL.to_string()),
            reconstruction_api_key: pick(
                &self.reconstruction_api_key,
                &config.reconstruction_api_key,
            ),
            register_url: pick(&self.register_url, &config.register_url)
                .unwrap_or_else(|| defaults::REGISTER_URL.to_string()),
            size_url: pick(&self.size_url, &config.size_url)
                .unwrap_or_else(|| defaults::SIZE_URL.to_string()),
            pose_url: pick(&self.pose_url, &config.pose_url),
            matting_url: pick(&self.matting_url, &config.matting_url),
        }
    }
}

/// Builds adapters over one shared HTTP client.
pub struct Wiring {
    client: Client,
    endpoints: Endpoints,
    retry: RetryPolicy,
}

impl Wiring {
    pub fn new(args: &ServiceArgs, config: &AppConfig) -> Result<Self> {
        let endpoints = args.resolve(&config.services);
        debug!(
            record_store = %endpoints.record_store_url,
            reconstruction = %endpoints.reconstruction_url,
            "Resolved endpoints"
        );
        let client =
            build_client(config.request_timeout()).context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoints,
            retry: config.retry_policy(),
        })
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::new(PocketBaseStore::new(
            self.client.clone(),
            &self.endpoints.record_store_url,
        ))
    }

    pub fn sessions(&self) -> Result<SessionClient> {
        let api_key = self.endpoints.reconstruction_api_key.as_deref().context(
            "No reconstruction API key (use --reconstruction-api-key or \
             BODYMESH_RECONSTRUCTION_API_KEY)",
        )?;
        let service = CsmReconstruction::new(
            self.client.clone(),
            &self.endpoints.reconstruction_url,
            api_key,
        );
        Ok(SessionClient::new(Arc::new(service), self.retry))
    }

    pub fn registration(&self) -> Arc<dyn RegistrationHook> {
        Arc::new(HttpRegistration::new(
            self.client.clone(),
            &self.endpoints.register_url,
        ))
    }

    pub fn detector(&self) -> Result<Arc<dyn PoseDetector>> {
        let url = self
            .endpoints
            .pose_url
            .as_deref()
            .context("No pose detection endpoint (use --pose-url or BODYMESH_POSE_URL)")?;
        Ok(Arc::new(HttpPoseDetector::new(self.client.clone(), url)))
    }

    pub fn matting(&self) -> Arc<dyn BackgroundRemover> {
        match &self.endpoints.matting_url {
            Some(url) => Arc::new(HttpBackgroundRemover::new(self.client.clone(), url)),
            None => {
                debug!("No matting endpoint configured, images pass through");
                Arc::new(PassthroughBackgroundRemover)
            }
        }
    }

    pub fn sizing(&self) -> Arc<dyn SizeAdvisor> {
        Arc::new(HttpSizeAdvisor::new(self.client.clone(), &self.endpoints.size_url))
    }
}
