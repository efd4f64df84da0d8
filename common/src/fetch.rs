//! 异步抓取器
//!
//! 每个请求在独立的 tokio 任务中执行，完成后调用一次回调。
//! 不做重试，多个请求之间的完成顺序没有保证。

use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;

use crate::GENERAL_UA;
use crate::models::FetchRequest;

/// 抓取错误
#[derive(Debug)]
pub enum FetchError {
    /// 网络请求错误
    Network(reqwest::Error),
    /// 请求超时
    Timeout,
    /// HTTP 状态码错误
    Http { status: u16 },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(e) => write!(f, "网络请求失败: {}", e),
            Self::Timeout => write!(f, "请求超时"),
            Self::Http { status } => write!(f, "HTTP 请求失败，状态码: {}", status),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(error)
        }
    }
}

/// 成功时为响应体文本
pub type FetchResult = std::result::Result<String, FetchError>;

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(GENERAL_UA)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// 发送请求并读取响应体，非 2xx 视为失败
    pub async fn fetch(&self, request: &FetchRequest) -> FetchResult {
        log::debug!("Fetching {} {}", request.method(), request.url());

        let mut builder = self.client.get(request.url());
        if let Some(authorization) = request.authorization() {
            builder = builder.header(reqwest::header::AUTHORIZATION, authorization);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        log::trace!("Response from {}: {}", request.url(), text);
        Ok(text)
    }

    /// 非阻塞地发出请求，结果通过 `on_complete` 恰好交付一次
    pub fn dispatch<F>(&self, request: FetchRequest, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(FetchResult) + Send + 'static,
    {
        let fetcher = self.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(&request).await;
            on_complete(result);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        Fetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_sends_authorization() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/item.json"))
            .and(header("authorization", "OAuth token=\"abc\""))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
            .expect(1)
            .mount(&server)
            .await;

        let request = FetchRequest::get(format!("{}/item.json", server.uri()))
            .with_authorization("OAuth token=\"abc\"");
        let body = fetcher().fetch(&request).await.unwrap();

        assert_eq!(body, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let request = FetchRequest::get(format!("{}/missing.json", server.uri()));
        let result = fetcher().fetch(&request).await;

        assert!(matches!(result, Err(FetchError::Http { status: 404 })));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(Duration::from_millis(200)).unwrap();
        let request = FetchRequest::get(format!("{}/slow.json", server.uri()));
        let result = fetcher.fetch(&request).await;

        assert!(matches!(result, Err(FetchError::Timeout)));
    }

    #[tokio::test]
    async fn test_dispatch_invokes_continuation_once() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("done"))
            .mount(&server)
            .await;

        let (tx, rx) = oneshot::channel();
        let request = FetchRequest::get(format!("{}/async.json", server.uri()));
        let handle = fetcher().dispatch(request, move |result| {
            let _ = tx.send(result);
        });

        handle.await.unwrap();
        let result = rx.await.unwrap();
        assert_eq!(result.unwrap(), "done");
    }

    #[tokio::test]
    async fn test_dispatch_reports_network_error() {
        // 没有服务监听的端口
        let (tx, rx) = oneshot::channel();
        let request = FetchRequest::get("http://127.0.0.1:1/unreachable.json");
        fetcher().dispatch(request, move |result| {
            let _ = tx.send(result);
        });

        let result = rx.await.unwrap();
        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
