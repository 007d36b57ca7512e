use crate::api;
use crate::server::Server;
use rank_core::SchemeKind;
use serde_json::Value;

/// Execute the `generate_ranks` tool: return `count` seed keys as a JSON array.
pub fn execute(server: &Server, arguments: &Value) -> Result<String, String> {
    let count = arguments
        .get("count")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| "Missing required parameter: count".to_string())?;

    let scheme = match arguments.get("scheme").and_then(|v| v.as_str()) {
        Some(name) => Some(name.parse::<SchemeKind>().map_err(|e| e.to_string())?),
        None => None,
    };

    let count = usize::try_from(count).map_err(|_| format!("count {} is too large", count))?;
    let keys = api::generate_ranks(&server.config().ordering, count, scheme)
        .map_err(|e| format!("{:#}", e))?;
    serde_json::to_string(&keys).map_err(|e| format!("Failed to encode result: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelayConfig;
    use serde_json::json;

    fn server() -> Server {
        Server::new(RelayConfig::default()).unwrap()
    }

    #[test]
    fn returns_ascending_keys() {
        let text = execute(&server(), &json!({"count": 4})).unwrap();
        let keys: Vec<String> = serde_json::from_str(&text).unwrap();
        assert_eq!(keys.len(), 4);
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn honours_scheme_argument() {
        let text = execute(&server(), &json!({"count": 1, "scheme": "fractional"})).unwrap();
        assert_eq!(text, r#"["h"]"#);
    }

    #[test]
    fn rejects_unknown_scheme() {
        let err = execute(&server(), &json!({"count": 1, "scheme": "base62"})).unwrap_err();
        assert!(err.contains("base62"), "{}", err);
    }

    #[test]
    fn count_is_required() {
        let err = execute(&server(), &json!({})).unwrap_err();
        assert_eq!(err, "Missing required parameter: count");
    }
}
