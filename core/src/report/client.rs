//! GraphQL client for the hosted report source.

use serde::Deserialize;
use serde_json::{Value, json};

use super::{EventPage, EventSource, Fight, Report, ReportError};

/// Events per page requested from the API
const PAGE_LIMIT: u32 = 10_000;

const REPORT_QUERY: &str = r#"
query($code: String!) {
    reportData {
        report(code: $code) {
            title
            startTime
            masterData(translate: false) {
                actors { id name type subType petOwner }
                abilities { gameID name type }
            }
            fights(translate: false) {
                id name startTime endTime fightPercentage kill
            }
        }
    }
}"#;

const EVENTS_QUERY: &str = r#"
query($code: String!, $fightId: Int!, $start: Float!, $end: Float!, $limit: Int!) {
    reportData {
        report(code: $code) {
            events(
                fightIDs: [$fightId],
                startTime: $start,
                endTime: $end,
                dataType: DamageTaken,
                limit: $limit,
                translate: false
            ) {
                data
                nextPageTimestamp
            }
        }
    }
}"#;

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

/// Authenticated client for one report code.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
    code: String,
}

impl GraphQlClient {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token: token.into(),
            code: code.into(),
        }
    }

    /// Build a client with the bearer token read from `env_var`.
    pub fn from_env(
        endpoint: impl Into<String>,
        env_var: &str,
        code: impl Into<String>,
    ) -> Result<Self, ReportError> {
        let token = std::env::var(env_var)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ReportError::MissingToken {
                env_var: env_var.to_string(),
            })?;
        Ok(Self::new(endpoint, token.trim(), code))
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    async fn query(&self, query: &str, variables: Value) -> Result<Value, ReportError> {
        let response: GraphQlResponse = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.errors.and_then(|errs| errs.into_iter().next()) {
            return Err(ReportError::Api {
                message: err.message,
            });
        }
        response.data.ok_or_else(|| ReportError::Api {
            message: "response carried no data".to_string(),
        })
    }

    /// Report metadata: title, reference tables and fights.
    pub async fn report(&self) -> Result<Report, ReportError> {
        let mut data = self
            .query(REPORT_QUERY, json!({ "code": self.code }))
            .await?;
        let mut report: Report = serde_json::from_value(take_path(&mut data, "/reportData/report"))?;
        report.code = Some(self.code.clone());

        tracing::info!(
            code = %self.code,
            title = %report.title,
            fights = report.fights.len(),
            "Loaded report"
        );
        Ok(report)
    }
}

fn take_path(data: &mut Value, pointer: &str) -> Value {
    data.pointer_mut(pointer).map(Value::take).unwrap_or(Value::Null)
}

impl EventSource for GraphQlClient {
    async fn fetch_page(&self, fight: &Fight, start_timestamp: i64) -> Result<EventPage, ReportError> {
        let variables = json!({
            "code": self.code,
            "fightId": fight.id,
            "start": start_timestamp,
            "end": fight.end_time,
            "limit": PAGE_LIMIT,
        });
        let mut data = self.query(EVENTS_QUERY, variables).await?;
        let page: EventPage =
            serde_json::from_value(take_path(&mut data, "/reportData/report/events"))?;
        Ok(page)
    }
}
