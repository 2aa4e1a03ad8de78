use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;

/// Build the process-wide S3 client from the default credential chain.
///
/// `AWS_ENDPOINT_URL` overrides the endpoint (LocalStack / MinIO); overridden
/// endpoints get path-style addressing since virtual-hosted buckets don't
/// resolve there.
pub async fn build_client() -> Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    let overridden = std::env::var("AWS_ENDPOINT_URL").ok();
    if let Some(endpoint) = &overridden {
        loader = loader.endpoint_url(endpoint);
    }
    let shared = loader.load().await;

    let mut builder = aws_sdk_s3::config::Builder::from(&shared);
    if overridden.is_some() {
        builder = builder.force_path_style(true);
    }
    Client::from_conf(builder.build())
}
