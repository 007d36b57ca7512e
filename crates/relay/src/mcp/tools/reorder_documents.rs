use crate::api::{self, ReorderRequest};
use crate::server::Server;
use serde_json::Value;

/// Execute the `reorder_documents` tool: move the selected documents to the
/// drop position and return the patches to persist.
pub fn execute(server: &Server, arguments: &Value) -> Result<String, String> {
    // `selectedIds` is accepted too, matching the CLI request shape.
    let required: [&[&str]; 4] = [
        &["entities"],
        &["selected_ids", "selectedIds"],
        &["source"],
        &["destination"],
    ];
    for names in required {
        if names.iter().all(|name| arguments.get(name).is_none()) {
            return Err(format!("Missing required parameter: {}", names[0]));
        }
    }

    let request: ReorderRequest = serde_json::from_value(arguments.clone())
        .map_err(|e| format!("Invalid arguments: {}", e))?;

    let ordering = &server.config().ordering;
    let scheme = request.scheme.unwrap_or(ordering.scheme);
    match api::reorder(ordering, request) {
        Ok(response) => {
            let metrics = server.metrics();
            let scheme = scheme.to_string();
            metrics.reorders.with_label_values(&["ok"]).inc();
            metrics
                .moved_documents
                .with_label_values(&[scheme.as_str()])
                .observe(response.patches.len() as f64);
            serde_json::to_string_pretty(&response)
                .map_err(|e| format!("Failed to encode result: {}", e))
        }
        Err(e) => {
            server.metrics().reorders.with_label_values(&["error"]).inc();
            Err(format!("{:#}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelayConfig;
    use serde_json::json;

    fn server() -> Server {
        Server::new(RelayConfig::default()).unwrap()
    }

    fn args() -> Value {
        json!({
            "entities": [
                {"_id": "A", "orderRank": "a"},
                {"_id": "B", "orderRank": "b"},
                {"_id": "C", "orderRank": "c"},
                {"_id": "D", "orderRank": "d"}
            ],
            "selected_ids": ["B", "D"],
            "source": 1,
            "destination": 0,
            "scheme": "fractional"
        })
    }

    #[test]
    fn moves_block_up_before_anchor() {
        let text = execute(&server(), &args()).unwrap();
        let result: Value = serde_json::from_str(&text).unwrap();

        let ids: Vec<&str> = result["newOrder"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["B", "D", "A", "C"]);
        assert_eq!(result["patches"].as_array().unwrap().len(), 2);
        assert_eq!(result["message"], "Moved 2 Documents up from position 2 to 1");
    }

    #[test]
    fn counts_successful_reorders() {
        let server = server();
        execute(&server, &args()).unwrap();
        let text = server.metrics().render().unwrap();
        assert!(text.contains("rank_relay_reorders_total{outcome=\"ok\"} 1"));
    }

    #[test]
    fn missing_parameter_is_reported() {
        let mut arguments = args();
        arguments.as_object_mut().unwrap().remove("selected_ids");
        let err = execute(&server(), &arguments).unwrap_err();
        assert_eq!(err, "Missing required parameter: selected_ids");
    }

    #[test]
    fn accepts_camel_case_selection() {
        let mut arguments = args();
        let ids = arguments
            .as_object_mut()
            .unwrap()
            .remove("selected_ids")
            .unwrap();
        arguments["selectedIds"] = ids;
        let text = execute(&server(), &arguments).unwrap();
        let result: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(result["patches"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn engine_errors_become_tool_errors() {
        let mut arguments = args();
        arguments["selected_ids"] = json!(["A"]);
        arguments["source"] = json!(0);
        arguments["destination"] = json!(0);
        let err = execute(&server(), &arguments).unwrap_err();
        assert!(err.contains("selected document"), "{}", err);
    }

    #[test]
    fn malformed_entities_are_rejected() {
        let mut arguments = args();
        arguments["entities"] = json!([{"title": "no id"}]);
        let err = execute(&server(), &arguments).unwrap_err();
        assert!(err.starts_with("Invalid arguments"), "{}", err);
    }
}
