use aws_config::BehaviorVersion;

async fn load_config() -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Ok(endpoint) = std::env::var("AWS_ENDPOINT_URL") {
        loader = loader.endpoint_url(endpoint);
    }
    loader.load().await
}

/// Build the process-wide SNS client from the default credential chain.
pub async fn build_sns_client() -> aws_sdk_sns::Client {
    aws_sdk_sns::Client::new(&load_config().await)
}

/// Build the process-wide SQS client from the default credential chain.
pub async fn build_sqs_client() -> aws_sdk_sqs::Client {
    aws_sdk_sqs::Client::new(&load_config().await)
}
