use hohstartup_core::config::NetworkConfig;
use hohstartup_core::{Error, Result};
use reqwest::redirect::Policy;
use reqwest::{Client, Proxy, Url};
use std::time::Duration;
use tracing::info;

/// 代理解析结果
#[derive(Debug, PartialEq, Eq)]
enum ProxyResolution {
    /// 使用指定代理 URL（no_proxy 中的 host 直连）
    UseProxy(String),
    /// 强制直连（显式设置 proxy = ""）
    ForceDirectConnect,
    /// 未配置，跟随系统/环境变量
    None,
}

/// 判断目标 host 是否命中 no_proxy 规则。
/// 支持：精确匹配、IP 精确匹配、通配前缀 "*.example.com" / ".example.com"
fn is_no_proxy(host: &str, no_proxy_list: &[String]) -> bool {
    let host_lower = host.to_lowercase();
    for rule in no_proxy_list {
        let r = rule.trim().to_lowercase();
        if r.is_empty() {
            continue;
        }
        if let Some(suffix) = r.strip_prefix("*.") {
            // *.example.com — 只匹配子域名 x.example.com，不匹配裸的 example.com
            if host_lower.ends_with(&format!(".{}", suffix)) {
                return true;
            }
        } else if let Some(suffix) = r.strip_prefix('.') {
            // .example.com — 同时匹配 example.com 本身和 x.example.com
            if host_lower == suffix || host_lower.ends_with(&format!(".{}", suffix)) {
                return true;
            }
        } else if host_lower == r {
            return true;
        }
    }
    false
}

fn resolve_proxy(proxy: Option<&str>) -> ProxyResolution {
    match proxy.map(str::trim) {
        Some("") => ProxyResolution::ForceDirectConnect,
        Some(p) => ProxyResolution::UseProxy(p.to_string()),
        None => ProxyResolution::None,
    }
}

/// 构建 reqwest::Client。
///
/// 代理规则：
/// - `network.proxy = None`           → 跟随 HTTPS_PROXY / HTTP_PROXY
/// - `network.proxy = Some("")`       → 强制直连
/// - `network.proxy = Some(url)`      → 使用该代理，`network.no_proxy` 中的 host 直连
///
/// 不设置默认请求头，也不启用 cookie store；重定向由 `ReqwestTransport` 自行跟随。
pub fn build_http_client(network: &NetworkConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(network.timeout_secs))
        .redirect(Policy::none());

    match resolve_proxy(network.proxy.as_deref()) {
        ProxyResolution::UseProxy(proxy_url) => {
            let target = Url::parse(&proxy_url)
                .map_err(|e| Error::Config(format!("invalid proxy URL {}: {}", proxy_url, e)))?;
            let no_proxy = network.no_proxy.clone();
            info!(proxy = %proxy_url, no_proxy = no_proxy.len(), "Using HTTP proxy");
            builder = builder.proxy(Proxy::custom(move |url| match url.host_str() {
                Some(host) if is_no_proxy(host, &no_proxy) => None,
                _ => Some(target.clone()),
            }));
        }
        ProxyResolution::ForceDirectConnect => {
            // no_proxy() 禁用所有代理（包括环境变量），实现强制直连
            info!("Proxy disabled, connecting directly");
            builder = builder.no_proxy();
        }
        ProxyResolution::None => {}
    }

    builder
        .build()
        .map_err(|e| Error::Transport(format!("failed to build HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_no_proxy_exact() {
        let list = vec!["localhost".to_string(), "127.0.0.1".to_string()];
        assert!(is_no_proxy("localhost", &list));
        assert!(is_no_proxy("127.0.0.1", &list));
        assert!(!is_no_proxy("forgeofgames.com", &list));
    }

    #[test]
    fn test_is_no_proxy_wildcard_star() {
        let list = vec!["*.heroesofhistorygame.com".to_string()];
        assert!(is_no_proxy("un0.heroesofhistorygame.com", &list));
        assert!(is_no_proxy("UN1.heroesofhistorygame.com", &list));
        assert!(!is_no_proxy("heroesofhistorygame.com", &list));
    }

    #[test]
    fn test_is_no_proxy_dot_prefix() {
        let list = vec![".heroesgame.com".to_string()];
        assert!(is_no_proxy("www.heroesgame.com", &list));
        assert!(is_no_proxy("heroesgame.com", &list));
        assert!(!is_no_proxy("notheroesgame.com", &list));
    }

    #[test]
    fn test_resolve_proxy() {
        assert_eq!(resolve_proxy(None), ProxyResolution::None);
        assert_eq!(resolve_proxy(Some("")), ProxyResolution::ForceDirectConnect);
        assert_eq!(resolve_proxy(Some("  ")), ProxyResolution::ForceDirectConnect);
        assert_eq!(
            resolve_proxy(Some("http://proxy:8080")),
            ProxyResolution::UseProxy("http://proxy:8080".to_string())
        );
    }

    #[test]
    fn test_build_http_client_variants() {
        let mut network = NetworkConfig::default();
        assert!(build_http_client(&network).is_ok());

        network.proxy = Some(String::new());
        assert!(build_http_client(&network).is_ok());

        network.proxy = Some("http://proxy.local:7890".to_string());
        network.no_proxy = vec!["localhost".to_string()];
        assert!(build_http_client(&network).is_ok());
    }

    #[test]
    fn test_build_http_client_bad_proxy() {
        let network = NetworkConfig {
            proxy: Some("not a url".to_string()),
            ..NetworkConfig::default()
        };
        let err = build_http_client(&network).unwrap_err();
        assert!(err.to_string().contains("invalid proxy URL"));
    }
}
