pub mod generate_ranks;
pub mod reorder_documents;

use crate::server::Server;
use serde_json::{json, Value};

/// Tool descriptors returned by `tools/list`.
pub fn definitions() -> Value {
    json!([
        {
            "name": "reorder_documents",
            "description": "Move one or more documents to a drop position in a list ordered by order key. Returns the new order, one patch per moved document and a summary message. Only the moved documents get new keys.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "entities": {
                        "type": "array",
                        "description": "Documents in their current order. Each needs `_id` and `orderRank`; other fields are passed through.",
                        "items": {"type": "object"}
                    },
                    "selected_ids": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Ids of the documents being dragged"
                    },
                    "source": {"type": "integer", "minimum": 0, "description": "Index the drag started from"},
                    "destination": {"type": "integer", "minimum": 0, "description": "Index of the document dropped onto"},
                    "scheme": {"type": "string", "enum": ["lexorank", "fractional"], "description": "Key format (defaults to the server's configured scheme)"}
                },
                "required": ["entities", "selected_ids", "source", "destination"]
            }
        },
        {
            "name": "generate_ranks",
            "description": "Generate evenly spread order keys for seeding a list that has none yet.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "count": {"type": "integer", "minimum": 0, "description": "Number of keys to generate"},
                    "scheme": {"type": "string", "enum": ["lexorank", "fractional"]}
                },
                "required": ["count"]
            }
        }
    ])
}

/// Run a tool and wrap its output as MCP content. `None` for unknown tools.
pub fn call(server: &Server, name: &str, arguments: &Value) -> Option<Value> {
    let result = match name {
        "reorder_documents" => reorder_documents::execute(server, arguments),
        "generate_ranks" => generate_ranks::execute(server, arguments),
        _ => return None,
    };
    server.metrics().tool_calls.with_label_values(&[name]).inc();

    Some(match result {
        Ok(text) => json!({
            "content": [{"type": "text", "text": text}]
        }),
        Err(message) => {
            tracing::warn!(tool = name, "Tool call failed: {}", message);
            json!({
                "content": [{"type": "text", "text": message}],
                "isError": true
            })
        }
    })
}
