use crate::AwsConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_secretsmanager::config::Credentials;

/// Build the shared SDK configuration used by every AWS client.
///
/// Explicit settings override the default provider chain. Static
/// credentials are only used when both halves are present.
pub async fn load_sdk_config(aws: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &aws.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(endpoint) = &aws.endpoint {
        tracing::debug!(endpoint = %endpoint, "Using custom AWS endpoint");
        loader = loader.endpoint_url(endpoint);
    }
    match (&aws.key_id, &aws.key_secret) {
        (Some(key_id), Some(key_secret)) => {
            loader = loader.credentials_provider(Credentials::new(key_id, key_secret, None, None, "sublog-config"));
        },
        (None, None) => {},
        _ => tracing::warn!("Ignoring incomplete AWS credentials; set both key_id and key_secret"),
    }
    loader.load().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_explicit_region_and_endpoint() {
        let aws = AwsConfig {
            region: Some("ap-northeast-1".to_string()),
            endpoint: Some("http://localhost:4566".to_string()),
            key_id: Some("test".to_string()),
            key_secret: Some("test".to_string()),
        };
        let sdk_config = load_sdk_config(&aws).await;
        assert_eq!(sdk_config.region().map(|r| r.as_ref()), Some("ap-northeast-1"));
        assert_eq!(sdk_config.endpoint_url(), Some("http://localhost:4566"));
        assert!(sdk_config.credentials_provider().is_some());
    }
}
