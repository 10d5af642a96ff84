//! # AWS Secrets Manager
//!
//! [`SecretSource`] backed by AWS Secrets Manager.
//!
//! The SDK client is built lazily on the first lookup, so operations that
//! never reference a secret do not pay for credential and region discovery.
//! Authentication follows the default AWS credential chain (environment,
//! profile, IRSA web identity, instance metadata).

use std::time::Instant;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use tokio::sync::OnceCell;
use tracing::{debug, debug_span, info, Instrument};

use super::{SecretLookupError, SecretSource};
use crate::config::SecretsSettings;

/// AWS Secrets Manager secret source
pub struct AwsSecretsManager {
    settings: SecretsSettings,
    client: OnceCell<SecretsManagerClient>,
}

impl std::fmt::Debug for AwsSecretsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSecretsManager")
            .field("settings", &self.settings)
            .field("initialized", &self.client.initialized())
            .finish_non_exhaustive()
    }
}

impl AwsSecretsManager {
    #[must_use]
    pub fn new(settings: SecretsSettings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> &SecretsManagerClient {
        self.client
            .get_or_init(|| async {
                let sdk_config = create_sdk_config(&self.settings).await;
                SecretsManagerClient::new(&sdk_config)
            })
            .await
    }
}

/// Create AWS SDK config from the default chain plus configured overrides
async fn create_sdk_config(settings: &SecretsSettings) -> SdkConfig {
    let mut builder = aws_config::defaults(aws_config::BehaviorVersion::latest());

    if let Some(region) = &settings.region {
        builder = builder.region(aws_config::Region::new(region.clone()));
    }
    if let Some(endpoint) = &settings.endpoint {
        info!(endpoint = %endpoint, "Using Secrets Manager endpoint override");
        builder = builder.endpoint_url(endpoint);
    }

    builder.load().await
}

#[async_trait]
impl SecretSource for AwsSecretsManager {
    async fn fetch(&self, secret_name: &str) -> Result<String, SecretLookupError> {
        let span = debug_span!("aws.secret.get", secret.name = secret_name);
        let start = Instant::now();

        async move {
            let response = self
                .client()
                .await
                .get_secret_value()
                .secret_id(secret_name)
                .send()
                .await;

            match response {
                Ok(response) => {
                    let value = response
                        .secret_string()
                        .map(ToString::to_string)
                        .or_else(|| {
                            response
                                .secret_binary()
                                .map(|blob| String::from_utf8_lossy(blob.as_ref()).into_owned())
                        });
                    debug!(
                        secret_name = secret_name,
                        duration_ms = start.elapsed().as_millis(),
                        found = value.is_some(),
                        "AWS secret lookup finished"
                    );
                    value.ok_or_else(|| SecretLookupError::Empty {
                        name: secret_name.to_string(),
                    })
                }
                Err(e) => {
                    let service_error = e.into_service_error();
                    if service_error.is_resource_not_found_exception() {
                        Err(SecretLookupError::NotFound {
                            name: secret_name.to_string(),
                        })
                    } else {
                        Err(SecretLookupError::Backend {
                            name: secret_name.to_string(),
                            message: DisplayErrorContext(&service_error).to_string(),
                        })
                    }
                }
            }
        }
        .instrument(span)
        .await
    }
}
