//! # AWS Secrets Manager によるシークレットストア

use aws_sdk_secretsmanager::error::DisplayErrorContext;

use super::SecretStore;
use crate::error::IssuanceError;

/// AWS Secrets Manager から `SecretString` を取得するストア。
pub struct AwsSecretsManager {
    client: aws_sdk_secretsmanager::Client,
}

impl AwsSecretsManager {
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_secretsmanager::Client::new(sdk_config),
        }
    }
}

#[async_trait::async_trait]
impl SecretStore for AwsSecretsManager {
    async fn get_secret_value(&self, secret_id: &str) -> Result<String, IssuanceError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| {
                IssuanceError::SecretUnavailable(format!("{secret_id}: {}", DisplayErrorContext(&e)))
            })?;

        // SecretBinaryのみのシークレットは空値として扱う
        Ok(output.secret_string().unwrap_or_default().to_string())
    }
}
