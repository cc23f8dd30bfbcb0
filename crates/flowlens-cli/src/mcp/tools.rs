//! MCP tool handlers.

use flowlens_normalizer::{EventFilter, Normalizer};
use flowlens_store::FlowStore;
use flowlens_types::{Event, EventKind, EventPayload, Flow, FlowList};
use serde_json::Value;
use tracing::debug;

use super::dto::{
    FlowEventsResponse, GetFlowArgs, GetFlowEventArgs, GetFlowEventsArgs, NetworkEventDetail,
};
use super::error::ToolError;

/// Tool implementations over a flow store and normalizer.
pub struct FlowTools {
    store: FlowStore,
    normalizer: Normalizer,
}

impl FlowTools {
    pub fn new(store: FlowStore, normalizer: Normalizer) -> Self {
        Self { store, normalizer }
    }

    /// Run tool `name` with arguments already validated by the registry.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let payload = match name {
            "list_flows" => to_value(&self.list_flows().await?)?,
            "get_flow" => to_value(&self.get_flow(parse_args(arguments)?).await?)?,
            "get_flow_events" => {
                to_value(&self.get_flow_events(parse_args(arguments)?).await?)?
            }
            "get_flow_event" => to_value(&self.get_flow_event(parse_args(arguments)?).await?)?,
            "get_network_event_detail" => {
                to_value(&self.get_network_event_detail(parse_args(arguments)?).await?)?
            }
            _ => return Err(ToolError::unknown_tool(name)),
        };
        Ok(payload)
    }

    pub async fn list_flows(&self) -> Result<FlowList, ToolError> {
        let flows = self.store.list_flows().await?;
        Ok(FlowList { flows })
    }

    pub async fn get_flow(&self, args: GetFlowArgs) -> Result<Flow, ToolError> {
        let flow_id = require_flow_id(&args.flow_id)?;
        let mut flow = self.load(flow_id).await?;
        if !args.include_events.unwrap_or(true) {
            flow.events.clear();
        }
        Ok(flow)
    }

    pub async fn get_flow_events(
        &self,
        args: GetFlowEventsArgs,
    ) -> Result<FlowEventsResponse, ToolError> {
        let flow_id = require_flow_id(&args.flow_id)?;
        let mut filter = EventFilter::all();
        if let Some(kind) = &args.kind {
            let kind: EventKind = kind
                .parse()
                .map_err(|e: String| ToolError::invalid_argument("kind", &e))?;
            filter = filter.kind(kind);
        }
        if let (Some(start), Some(end)) = (args.start_ms, args.end_ms)
            && start > end
        {
            return Err(ToolError::invalid_argument(
                "end_ms",
                &format!("must be greater than or equal to start_ms ({})", start),
            ));
        }
        if let Some(start) = args.start_ms {
            filter = filter.start_ms(start);
        }
        if let Some(end) = args.end_ms {
            filter = filter.end_ms(end);
        }
        let limit = args
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        let flow = self.load(flow_id).await?;
        let matching: Vec<&Event> = filter.apply(&flow.events).collect();
        let events: Vec<Event> = matching.iter().take(limit).map(|e| (*e).clone()).collect();
        debug!(
            flow_id,
            matching = matching.len(),
            returned = events.len(),
            "filtered flow events"
        );

        Ok(FlowEventsResponse {
            flow_id: flow.id.clone(),
            total_matching: matching.len(),
            returned: events.len(),
            events,
        })
    }

    pub async fn get_flow_event(&self, args: GetFlowEventArgs) -> Result<Event, ToolError> {
        let flow_id = require_flow_id(&args.flow_id)?;
        let flow = self.load(flow_id).await?;
        event_at(flow, args.index)
    }

    pub async fn get_network_event_detail(
        &self,
        args: GetFlowEventArgs,
    ) -> Result<NetworkEventDetail, ToolError> {
        let flow_id = require_flow_id(&args.flow_id)?;
        let raw = self.store.resolve(flow_id).await?;
        let flow = self.normalizer.normalize_detailed(&raw)?;
        let event = event_at(flow, args.index)?;

        match event.payload {
            EventPayload::Network(network) => Ok(NetworkEventDetail {
                flow_id: flow_id.to_string(),
                index: event.index,
                relative_time_ms: event.relative_time_ms,
                network,
            }),
            other => Err(ToolError::invalid_argument(
                "index",
                &format!(
                    "event {} of flow {} is a {} event, not network",
                    args.index,
                    flow_id,
                    other.kind()
                ),
            )),
        }
    }

    async fn load(&self, flow_id: &str) -> Result<Flow, ToolError> {
        let raw = self.store.resolve(flow_id).await?;
        Ok(self.normalizer.normalize(&raw)?)
    }
}

fn event_at(flow: Flow, index: u64) -> Result<Event, ToolError> {
    let count = flow.events.len();
    usize::try_from(index)
        .ok()
        .and_then(|i| flow.events.into_iter().nth(i))
        .ok_or_else(|| {
            ToolError::invalid_argument(
                "index",
                &format!(
                    "{} is out of range; flow {} has {} events",
                    index, flow.id, count
                ),
            )
        })
}

fn require_flow_id(flow_id: &str) -> Result<&str, ToolError> {
    if flow_id.trim().is_empty() {
        return Err(ToolError::invalid_argument("flow_id", "must not be empty"));
    }
    Ok(flow_id)
}

fn parse_args<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| {
        // Registry validation runs first, so this only trips on a
        // declaration that disagrees with the argument struct
        ToolError::internal(format!("argument decoding failed: {}", e))
    })
}

fn to_value<T: serde::Serialize>(payload: &T) -> Result<Value, ToolError> {
    serde_json::to_value(payload)
        .map_err(|e| ToolError::internal(format!("failed to encode result: {}", e)))
}
