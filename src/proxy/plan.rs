//! Pure request planning: decide mode, URL, headers, and cacheability before any I/O.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use url::Url;

use crate::config::UpstreamConfig;
use crate::proxy::error::ProxyError;
use crate::proxy::request::ProxyRequest;

/// Whether the upstream call carries a user's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Public,
    Authenticated,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Public => "public",
            Mode::Authenticated => "authenticated",
        }
    }
}

/// Everything needed to execute one upstream fetch.
#[derive(Debug, Clone)]
pub struct RequestPlan {
    pub mode: Mode,
    pub url: Url,
    pub headers: HeaderMap,
    pub cacheable: bool,
    pub cache_key: String,
}

/// Cache key for a listing request. Empty and absent cursors map to the same key.
pub fn cache_key(request: &ProxyRequest) -> String {
    format!(
        "reddit:top:{}:{}:{}",
        request.subreddit(),
        request.limit(),
        request.after().unwrap_or("")
    )
}

impl RequestPlan {
    /// Public mode when `access_token` is `None`, authenticated otherwise.
    pub fn build(
        upstream: &UpstreamConfig,
        request: &ProxyRequest,
        access_token: Option<&str>,
    ) -> Result<Self, ProxyError> {
        let (mode, base) = match access_token {
            Some(_) => (Mode::Authenticated, &upstream.oauth_base_url),
            None => (Mode::Public, &upstream.public_base_url),
        };

        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&upstream.user_agent)
            .map_err(|e| ProxyError::Transport(format!("invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, user_agent);

        if let Some(token) = access_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ProxyError::Unauthorized("access token is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            mode,
            url: listing_url(base, request)?,
            headers,
            cacheable: mode == Mode::Public,
            cache_key: cache_key(request),
        })
    }
}

/// `{base}/r/{subreddit}/top.json?raw_json=1&t=all&limit={limit}[&after={after}]`
fn listing_url(base: &str, request: &ProxyRequest) -> Result<Url, ProxyError> {
    let mut url = Url::parse(base)
        .map_err(|e| ProxyError::Transport(format!("invalid upstream base URL '{}': {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| ProxyError::Transport(format!("upstream base URL '{}' cannot be a base", base)))?
        .pop_if_empty()
        .extend(["r", request.subreddit(), "top.json"]);

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("raw_json", "1")
            .append_pair("t", "all")
            .append_pair("limit", &request.limit().to_string());
        if let Some(after) = request.after() {
            query.append_pair("after", after);
        }
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(after: Option<&str>) -> ProxyRequest {
        ProxyRequest::new("pics", Some(10), after.map(str::to_string)).unwrap()
    }

    #[test]
    fn test_cache_key_is_deterministic() {
        assert_eq!(cache_key(&request(None)), "reddit:top:pics:10:");
        assert_eq!(cache_key(&request(Some(""))), cache_key(&request(None)));
        assert_eq!(cache_key(&request(Some("t3_abc"))), "reddit:top:pics:10:t3_abc");
        assert_ne!(
            cache_key(&request(None)),
            cache_key(&ProxyRequest::new("pics", Some(11), None).unwrap())
        );
    }

    #[test]
    fn test_public_plan() {
        let plan = RequestPlan::build(&UpstreamConfig::default(), &request(Some("")), None).unwrap();

        assert_eq!(plan.mode, Mode::Public);
        assert!(plan.cacheable);
        assert_eq!(
            plan.url.as_str(),
            "https://www.reddit.com/r/pics/top.json?raw_json=1&t=all&limit=10"
        );
        assert!(plan.headers.contains_key(USER_AGENT));
        assert!(!plan.headers.contains_key(AUTHORIZATION));
    }

    #[test]
    fn test_authenticated_plan() {
        let plan =
            RequestPlan::build(&UpstreamConfig::default(), &request(Some("t3_x")), Some("tok")).unwrap();

        assert_eq!(plan.mode, Mode::Authenticated);
        assert!(!plan.cacheable);
        assert_eq!(
            plan.url.as_str(),
            "https://oauth.reddit.com/r/pics/top.json?raw_json=1&t=all&limit=10&after=t3_x"
        );
        assert_eq!(plan.headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
    }

    #[test]
    fn test_base_with_path_prefix() {
        let upstream = UpstreamConfig {
            public_base_url: "http://127.0.0.1:9000/mock/".into(),
            ..UpstreamConfig::default()
        };
        let plan = RequestPlan::build(&upstream, &request(None), None).unwrap();
        assert_eq!(plan.url.path(), "/mock/r/pics/top.json");
    }

    #[test]
    fn test_token_with_newline_rejected() {
        let err = RequestPlan::build(&UpstreamConfig::default(), &request(None), Some("a\nb")).unwrap_err();
        assert!(matches!(err, ProxyError::Unauthorized(_)));
    }
}
