//! # AWS Parameter Store Client
//!
//! Client for writing seeded values to AWS Systems Manager Parameter Store.
//!
//! Every write is a `PutParameter` call with `Overwrite=false`, so a value that
//! is already present in the store is never replaced. Secure keys are stored
//! as `SecureString`, everything else as `String`.

use crate::error::ParameterStoreError;
use crate::provider::ParameterStore;
use crate::reconciler::{Classification, UpsertRequest};
use async_trait::async_trait;
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::operation::put_parameter::PutParameterError;
use aws_sdk_ssm::types::ParameterType;
use aws_sdk_ssm::Client as SsmClient;
use tracing::{debug, info};

/// AWS Parameter Store provider implementation
pub struct AwsParameterStore {
    client: SsmClient,
    region: Option<String>,
}

impl std::fmt::Debug for AwsParameterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsParameterStore")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsParameterStore {
    /// Create a client from the default credential chain
    ///
    /// `region` overrides whatever the chain resolves (`AWS_REGION`, profile, IMDS).
    pub async fn new(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        let sdk_config = loader.load().await;

        let region = sdk_config.region().map(ToString::to_string);
        match &region {
            Some(r) => info!("Using AWS Parameter Store in region {}", r),
            None => info!("No AWS region configured, relying on SDK defaults"),
        }

        Self {
            client: SsmClient::new(&sdk_config),
            region,
        }
    }

    /// Wrap an already configured SDK client
    #[must_use]
    pub fn from_client(client: SsmClient) -> Self {
        let region = client.config().region().map(ToString::to_string);
        Self { client, region }
    }
}

/// SSM parameter type for a classification
#[must_use]
pub fn parameter_type(classification: Classification) -> ParameterType {
    match classification {
        Classification::Plain => ParameterType::String,
        Classification::Secure => ParameterType::SecureString,
    }
}

#[async_trait]
impl ParameterStore for AwsParameterStore {
    async fn put_parameter(&self, request: &UpsertRequest) -> Result<(), ParameterStoreError> {
        debug!("PutParameter {} ({})", request.path, request.classification);

        self.client
            .put_parameter()
            .name(&request.path)
            .value(&request.value)
            .r#type(parameter_type(request.classification))
            .description(&request.description)
            .overwrite(request.overwrite_existing)
            .send()
            .await
            .map_err(|e| {
                if e
                    .as_service_error()
                    .is_some_and(PutParameterError::is_parameter_already_exists)
                {
                    ParameterStoreError::AlreadyExists {
                        path: request.path.clone(),
                    }
                } else {
                    ParameterStoreError::Request(DisplayErrorContext(&e).to_string())
                }
            })?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "aws_parameter_store"
    }
}
