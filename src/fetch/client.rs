use async_trait::async_trait;
use reqwest::{Request, Response};

/// Abstraction over HTTP request execution.
///
/// The loader issues every request through this trait; test
/// implementations can return canned responses for the dataset
/// endpoints.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
