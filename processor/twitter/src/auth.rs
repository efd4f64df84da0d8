//! OAuth 1.0a 请求签名（HMAC-SHA1）

use anyhow::{Result, anyhow};
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_LENGTH: usize = 32;
const NONCE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// OAuth 凭据
#[derive(Clone)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 不在日志里输出密钥
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"***")
            .field("access_token", &self.access_token)
            .field("access_secret", &"***")
            .finish()
    }
}

/// RFC 3986 百分号编码，只保留字母、数字和 `-._~`
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// 生成随机的字母数字 nonce
pub fn generate_nonce() -> String {
    (0..NONCE_LENGTH)
        .map(|_| NONCE_CHARS[rand::random_range(0..NONCE_CHARS.len())] as char)
        .collect()
}

fn unix_timestamp() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// 构建签名基串：`METHOD&enc(base_url)&enc(params)`
///
/// URL 上的查询参数会与 `oauth_params` 一起参与排序。
pub fn signature_base_string(
    method: &str,
    url: &str,
    oauth_params: &[(&str, &str)],
) -> Result<String> {
    let mut parsed = Url::parse(url)?;

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (percent_encode(&k), percent_encode(&v)))
        .collect();
    params.extend(
        oauth_params
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v))),
    );
    // 先按编码后的键排序，键相同再按值
    params.sort();

    let param_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    parsed.set_query(None);
    parsed.set_fragment(None);

    Ok(format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(parsed.as_str()),
        percent_encode(&param_string)
    ))
}

/// 请求签名器
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
}

impl Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn signing_key(&self) -> String {
        format!(
            "{}&{}",
            percent_encode(&self.credentials.consumer_secret),
            percent_encode(&self.credentials.access_secret)
        )
    }

    /// 计算 `oauth_signature`（base64 编码的 HMAC-SHA1）
    pub fn signature(&self, base_string: &str) -> Result<String> {
        let mut mac = HmacSha1::new_from_slice(self.signing_key().as_bytes())
            .map_err(|e| anyhow!("Invalid OAuth signing key: {}", e))?;
        mac.update(base_string.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// 为请求生成 `Authorization` 头，每次调用使用新的 nonce 和时间戳
    pub fn authorization_header(&self, method: &str, url: &str) -> Result<String> {
        self.authorization_header_with(method, url, &generate_nonce(), unix_timestamp()?)
    }

    /// 使用给定的 nonce 和时间戳生成 `Authorization` 头，结果是确定的
    pub fn authorization_header_with(
        &self,
        method: &str,
        url: &str,
        nonce: &str,
        timestamp: u64,
    ) -> Result<String> {
        let timestamp = timestamp.to_string();
        let mut oauth_params = vec![
            ("oauth_consumer_key", self.credentials.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.credentials.access_token.as_str()),
            ("oauth_version", OAUTH_VERSION),
        ];

        let base_string = signature_base_string(method, url, &oauth_params)?;
        log::trace!("OAuth signature base string: {}", base_string);
        let signature = self.signature(&base_string)?;

        oauth_params.push(("oauth_signature", signature.as_str()));
        oauth_params.sort();

        let header = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {}", header))
    }
}
