//! Declarative tool registry.
//!
//! Each tool declares its arguments once; the same declaration produces the
//! `inputSchema` advertised by `tools/list` and validates incoming calls
//! before any handler runs.

use flowlens_types::{Event, EventKind, Flow, FlowList};
use schemars::{JsonSchema, schema_for};
use serde_json::{Map, Value, json};

use super::dto::{FlowEventsResponse, NetworkEventDetail};
use super::error::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    String,
    /// Non-negative integer
    Integer,
    Boolean,
}

impl ArgType {
    pub fn json_type(&self) -> &'static str {
        match self {
            ArgType::String => "string",
            ArgType::Integer => "integer",
            ArgType::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub name: &'static str,
    pub ty: ArgType,
    pub required: bool,
    pub description: &'static str,
    /// Accepted values for string arguments; empty means any
    pub allowed: Vec<&'static str>,
}

impl ArgSpec {
    pub fn required(name: &'static str, ty: ArgType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            required: true,
            description,
            allowed: Vec::new(),
        }
    }

    pub fn optional(name: &'static str, ty: ArgType, description: &'static str) -> Self {
        Self {
            required: false,
            ..Self::required(name, ty, description)
        }
    }

    pub fn one_of(mut self, values: impl IntoIterator<Item = &'static str>) -> Self {
        self.allowed = values.into_iter().collect();
        self
    }

    fn schema(&self) -> Value {
        let mut schema = json!({
            "type": self.ty.json_type(),
            "description": self.description,
        });
        if self.ty == ArgType::Integer {
            schema["minimum"] = json!(0);
        }
        if !self.allowed.is_empty() {
            schema["enum"] = json!(self.allowed);
        }
        schema
    }

    fn check(&self, value: &Value) -> Result<(), ToolError> {
        match self.ty {
            ArgType::String => {
                let Some(s) = value.as_str() else {
                    return Err(ToolError::invalid_argument(self.name, "expected a string"));
                };
                if !self.allowed.is_empty() && !self.allowed.iter().any(|v| *v == s) {
                    return Err(ToolError::invalid_argument(
                        self.name,
                        &format!(
                            "'{}' is not one of: {}",
                            s,
                            self.allowed.join(", ")
                        ),
                    ));
                }
            }
            ArgType::Integer => {
                if value.as_u64().is_none() {
                    let reason = if value.as_i64().is_some() {
                        "must be a non-negative integer"
                    } else {
                        "expected an integer"
                    };
                    return Err(ToolError::invalid_argument(self.name, reason));
                }
            }
            ArgType::Boolean => {
                if !value.is_boolean() {
                    return Err(ToolError::invalid_argument(self.name, "expected a boolean"));
                }
            }
        }
        Ok(())
    }
}

pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub args: Vec<ArgSpec>,
    output_schema: Value,
}

impl ToolSpec {
    fn new<T: JsonSchema>(
        name: &'static str,
        description: &'static str,
        args: Vec<ArgSpec>,
    ) -> Self {
        Self {
            name,
            description,
            args,
            output_schema: serde_json::to_value(schema_for!(T)).unwrap_or_default(),
        }
    }

    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .args
            .iter()
            .map(|arg| (arg.name.to_string(), arg.schema()))
            .collect();
        let required: Vec<&str> = self
            .args
            .iter()
            .filter(|arg| arg.required)
            .map(|arg| arg.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    pub fn output_schema(&self) -> &Value {
        &self.output_schema
    }

    /// Check `arguments` against the declared arguments.
    ///
    /// Absent arguments are treated as `{}` and explicit `null` values as
    /// omitted. Returns the cleaned argument object.
    pub fn validate(&self, arguments: &Value) -> Result<Value, ToolError> {
        let provided = match arguments {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            _ => {
                return Err(ToolError::invalid_argument(
                    "arguments",
                    "expected an object",
                ));
            }
        };

        for key in provided.keys() {
            if !self.args.iter().any(|arg| arg.name == key.as_str()) {
                return Err(ToolError::invalid_argument(key, "unknown argument"));
            }
        }

        let mut cleaned = Map::new();
        for arg in &self.args {
            match provided.get(arg.name) {
                None | Some(Value::Null) if arg.required => {
                    return Err(ToolError::invalid_argument(
                        arg.name,
                        "missing required argument",
                    ));
                }
                None | Some(Value::Null) => {}
                Some(value) => {
                    arg.check(value)?;
                    cleaned.insert(arg.name.to_string(), value.clone());
                }
            }
        }

        Ok(Value::Object(cleaned))
    }

    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema(),
            "outputSchema": self.output_schema,
        })
    }
}

pub struct ToolRegistry {
    tools: Vec<ToolSpec>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        let kinds = EventKind::ALL.map(|k| k.as_str());

        let tools = vec![
            ToolSpec::new::<FlowList>(
                "list_flows",
                "List the flows recorded with FlowLens that this token can access. Returns id, title, creation time and status for each flow. WORKFLOW: Call this first to discover flow ids, then inspect one with get_flow or get_flow_events.",
                vec![],
            ),
            ToolSpec::new::<Flow>(
                "get_flow",
                "Get one recorded flow: metadata, video reference, a summary (request counts by status and domain, console error count, duration) and the full time-ordered event timeline. Set include_events=false to fetch only the summary for large flows.",
                vec![
                    ArgSpec::required("flow_id", ArgType::String, "Flow id from list_flows"),
                    ArgSpec::optional(
                        "include_events",
                        ArgType::Boolean,
                        "Include the event timeline (default: true)",
                    ),
                ],
            ),
            ToolSpec::new::<FlowEventsResponse>(
                "get_flow_events",
                "Get the events of a flow, optionally filtered by kind and by an inclusive window on relative time (milliseconds since recording start). Events are ordered by time and keep their timeline index. Bodies longer than 8 KiB end in '...[TRUNCATED]'.",
                vec![
                    ArgSpec::required("flow_id", ArgType::String, "Flow id from list_flows"),
                    ArgSpec::optional("kind", ArgType::String, "Only events of this kind")
                        .one_of(kinds),
                    ArgSpec::optional(
                        "start_ms",
                        ArgType::Integer,
                        "Earliest relative time to include, in ms",
                    ),
                    ArgSpec::optional(
                        "end_ms",
                        ArgType::Integer,
                        "Latest relative time to include, in ms",
                    ),
                    ArgSpec::optional(
                        "limit",
                        ArgType::Integer,
                        "Maximum number of events to return (default: all)",
                    ),
                ],
            ),
            ToolSpec::new::<Event>(
                "get_flow_event",
                "Get a single event of a flow by its timeline index, as reported by get_flow or get_flow_events.",
                vec![
                    ArgSpec::required("flow_id", ArgType::String, "Flow id from list_flows"),
                    ArgSpec::required("index", ArgType::Integer, "Event index within the flow"),
                ],
            ),
            ToolSpec::new::<NetworkEventDetail>(
                "get_network_event_detail",
                "Get the full capture of one network event by its timeline index: request and response headers, plus request and response bodies up to 1 MiB. Use this when a body in the timeline ends in '...[TRUNCATED]'.",
                vec![
                    ArgSpec::required("flow_id", ArgType::String, "Flow id from list_flows"),
                    ArgSpec::required("index", ArgType::Integer, "Index of a network event"),
                ],
            ),
        ];

        Self { tools }
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    /// `tools/list` result payload
    pub fn to_json(&self) -> Value {
        json!({
            "tools": self.tools.iter().map(ToolSpec::to_json).collect::<Vec<_>>(),
        })
    }
}
