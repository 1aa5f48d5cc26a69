//! HTTP transport to the canister gateway.
//!
//! ```text
//! POST {gateway}/canister/{canister_id}/{query|call}/{method}
//! Authorization: Delegation {token}
//! {"args": [...]}
//! ```
//!
//! A reply body is the method's return value as JSON. Methods declared as returning a
//! result reply `{"ok": value}` or `{"err": {"Tag": null}}`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{CallError, TransportError};

/// Read-only calls go through `query`, state changes through `call`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Query,
    Update,
}

impl CallKind {
    fn path(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Update => "call",
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum Reply<T, E> {
    Ok(T),
    Err(E),
}

#[derive(Clone, Debug)]
pub struct CanisterAgent {
    client: reqwest::Client,
    gateway: String,
    delegation: Option<String>,
}

impl CanisterAgent {
    pub fn new(gateway: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway: gateway.into().trim_end_matches('/').to_string(),
            delegation: None,
        }
    }

    /// Sign every request with the delegation obtained at login.
    pub fn with_delegation(mut self, token: impl Into<String>) -> Self {
        self.delegation = Some(token.into());
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.delegation.is_none()
    }

    pub fn endpoint(&self, canister_id: &str, kind: CallKind, method: &str) -> String {
        format!(
            "{}/canister/{}/{}/{}",
            self.gateway,
            canister_id,
            kind.path(),
            method
        )
    }

    /// Call a method whose reply is a plain value.
    pub async fn invoke<T: DeserializeOwned>(
        &self,
        canister_id: &str,
        kind: CallKind,
        method: &str,
        args: Value,
    ) -> Result<T, TransportError> {
        let body = self.send(canister_id, kind, method, args).await?;
        serde_json::from_str(&body)
            .map_err(|e| TransportError::Decode(format!("{method}: {e}")))
    }

    /// Call a method whose reply is `{"ok": T}` or `{"err": E}`.
    pub async fn invoke_result<T: DeserializeOwned, E: DeserializeOwned>(
        &self,
        canister_id: &str,
        kind: CallKind,
        method: &str,
        args: Value,
    ) -> Result<T, CallError<E>> {
        let body = self.send(canister_id, kind, method, args).await?;
        decode_reply(method, &body)
    }

    async fn send(
        &self,
        canister_id: &str,
        kind: CallKind,
        method: &str,
        args: Value,
    ) -> Result<String, TransportError> {
        let url = self.endpoint(canister_id, kind, method);
        tracing::debug!("{} {}", kind.path(), url);

        let mut request = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "args": args }));
        if let Some(token) = &self.delegation {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Delegation {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if (200..300).contains(&status) {
            Ok(body)
        } else {
            Err(classify_status(status, body))
        }
    }
}

/// Map a non-success gateway status to a transport error.
pub(crate) fn classify_status(status: u16, body: String) -> TransportError {
    let lower = body.to_lowercase();
    let about_credentials = lower.contains("certificate")
        || lower.contains("delegation")
        || lower.contains("signature");
    match status {
        401 => TransportError::Certificate(body),
        403 if about_credentials => TransportError::Certificate(body),
        _ => TransportError::Rejected {
            status,
            message: body,
        },
    }
}

pub(crate) fn decode_reply<T: DeserializeOwned, E: DeserializeOwned>(
    method: &str,
    body: &str,
) -> Result<T, CallError<E>> {
    match serde_json::from_str::<Reply<T, E>>(body) {
        Ok(Reply::Ok(value)) => Ok(value),
        Ok(Reply::Err(tag)) => Err(CallError::Backend(tag)),
        Err(e) => Err(CallError::Transport(TransportError::Decode(format!(
            "{method}: {e}"
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChamaError;
    use crate::models::Principal;

    #[test]
    fn test_endpoint_layout() {
        let agent = CanisterAgent::new("http://localhost:4943/");
        assert_eq!(
            agent.endpoint("ryjl3-tyaaa-aaaaa-aaaba-cai", CallKind::Query, "getMyChamas"),
            "http://localhost:4943/canister/ryjl3-tyaaa-aaaaa-aaaba-cai/query/getMyChamas"
        );
        assert_eq!(
            agent.endpoint("abc", CallKind::Update, "joinChama"),
            "http://localhost:4943/canister/abc/call/joinChama"
        );
        assert!(agent.is_anonymous());
        assert!(!agent.with_delegation("tok").is_anonymous());
    }

    #[test]
    fn test_decode_ok_reply() {
        let p: Result<Principal, CallError<ChamaError>> =
            decode_reply("whoami", r#"{"ok":"aaaaa-aa"}"#);
        assert_eq!(p.unwrap().as_str(), "aaaaa-aa");
    }

    #[test]
    fn test_decode_err_reply() {
        let r: Result<Principal, CallError<ChamaError>> =
            decode_reply("joinChama", r#"{"err":{"MaxMembersReached":null}}"#);
        assert_eq!(r, Err(CallError::Backend(ChamaError::MaxMembersReached)));
    }

    #[test]
    fn test_decode_garbage_reply() {
        let r: Result<Principal, CallError<ChamaError>> = decode_reply("joinChama", "<html>");
        assert!(matches!(
            r,
            Err(CallError::Transport(TransportError::Decode(_)))
        ));
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(401, String::new()),
            TransportError::Certificate(_)
        ));
        assert!(matches!(
            classify_status(403, "Invalid delegation expiry".into()),
            TransportError::Certificate(_)
        ));
        assert!(matches!(
            classify_status(403, "canister stopped".into()),
            TransportError::Rejected { status: 403, .. }
        ));
        assert!(matches!(
            classify_status(503, String::new()),
            TransportError::Rejected { status: 503, .. }
        ));
    }
}
