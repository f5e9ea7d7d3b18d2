//! # Script Execution
//!
//! JSON-lines operation scripts. One operation per line; blank lines and
//! lines starting with `#` are skipped. Each operation yields one result
//! line, and a failing operation never stops the script.
//!
//! ```text
//! {"op":"register","caller":"0x…ad","name":"Widget","manufacturer":"0x…a0"}
//! {"op":"transfer","caller":"0x…a0","id":1,"new_owner":"0x…b0","status":"InTransit"}
//! {"op":"details","id":1}
//! ```

use custody_registry::prelude::{CustodyRegistryApi, ErrorKind, RegistryError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_types::{Identity, ProductId};
use thiserror::Error;
use tracing::{debug, warn};

/// One scripted operation.
///
/// Mutations carry the identity of their caller. Queries need none; an
/// extra `caller` field on a query line is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Create a record.
    Register {
        /// Calling principal.
        caller: Identity,
        /// Record name.
        name: String,
        /// Initial owner.
        manufacturer: Identity,
    },
    /// Hand custody to another principal.
    Transfer {
        /// Calling principal.
        caller: Identity,
        /// Record id.
        id: ProductId,
        /// Receiving principal.
        new_owner: Identity,
        /// Status after the hand-off.
        status: String,
    },
    /// Change status without moving custody.
    UpdateStatus {
        /// Calling principal.
        caller: Identity,
        /// Record id.
        id: ProductId,
        /// New status.
        status: String,
    },
    /// Grant or revoke registration rights.
    SetAuthorized {
        /// Calling principal.
        caller: Identity,
        /// Principal whose rights change.
        identity: Identity,
        /// New flag.
        authorized: bool,
    },
    /// Record plus history.
    Details {
        /// Record id.
        id: ProductId,
    },
    /// Existence check.
    Verify {
        /// Record id.
        id: ProductId,
    },
    /// Number of records ever created.
    Total,
    /// Authorization check.
    IsAuthorized {
        /// Principal to check.
        identity: Identity,
    },
}

impl Command {
    /// Operation name as written in scripts.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Transfer { .. } => "transfer",
            Self::UpdateStatus { .. } => "update_status",
            Self::SetAuthorized { .. } => "set_authorized",
            Self::Details { .. } => "details",
            Self::Verify { .. } => "verify",
            Self::Total => "total",
            Self::IsAuthorized { .. } => "is_authorized",
        }
    }
}

/// Result of one script line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The operation succeeded.
    Ok {
        /// 1-based script line.
        line: usize,
        /// Operation name.
        op: &'static str,
        /// Operation result.
        value: Value,
    },
    /// The registry rejected the operation.
    Error {
        /// 1-based script line.
        line: usize,
        /// Operation name.
        op: &'static str,
        /// Failure category.
        kind: ErrorKind,
        /// Human-readable reason.
        message: String,
    },
    /// The line could not be parsed, or its result could not be encoded.
    Invalid {
        /// 1-based script line.
        line: usize,
        /// Parser or encoder message.
        message: String,
    },
}

impl Outcome {
    /// True for a successful operation.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    fn from_result(line: usize, op: &'static str, result: Result<Value, ExecuteError>) -> Self {
        match result {
            Ok(value) => Self::Ok { line, op, value },
            Err(ExecuteError::Registry(err)) => Self::Error {
                line,
                op,
                kind: err.kind(),
                message: err.to_string(),
            },
            Err(err @ ExecuteError::Encode(_)) => {
                warn!(line, op, error = %err, "Operation result not encodable");
                Self::Invalid {
                    line,
                    message: err.to_string(),
                }
            }
        }
    }
}

/// Why a command produced no result value.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The registry rejected the operation.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The result could not be turned into JSON.
    #[error("encoding result: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Run one command against the registry.
///
/// # Errors
///
/// `Registry` with whatever the registry returns for the operation, or
/// `Encode` if the result cannot be represented as JSON.
pub async fn execute<A>(api: &A, command: &Command) -> Result<Value, ExecuteError>
where
    A: CustodyRegistryApi + ?Sized,
{
    let value = match command {
        Command::Register {
            caller,
            name,
            manufacturer,
        } => json!({ "id": api.register(*caller, name, *manufacturer).await? }),
        Command::Transfer {
            caller,
            id,
            new_owner,
            status,
        } => {
            api.transfer(*caller, *id, *new_owner, status).await?;
            Value::Null
        }
        Command::UpdateStatus { caller, id, status } => {
            api.update_status(*caller, *id, status).await?;
            Value::Null
        }
        Command::SetAuthorized {
            caller,
            identity,
            authorized,
        } => {
            api.set_authorized(*caller, *identity, *authorized).await?;
            Value::Null
        }
        Command::Details { id } => {
            let details = api.get_details(*id).await?;
            serde_json::to_value(details)?
        }
        Command::Verify { id } => json!({ "exists": api.verify(*id).await }),
        Command::Total => json!({ "total": api.total_count().await }),
        Command::IsAuthorized { identity } => {
            json!({ "authorized": api.is_authorized(*identity).await })
        }
    };
    Ok(value)
}

/// Run every operation in `script`, in order.
pub async fn run_script<A>(api: &A, script: &str) -> Vec<Outcome>
where
    A: CustodyRegistryApi + ?Sized,
{
    let mut outcomes = Vec::new();
    for (index, raw) in script.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let command: Command = match serde_json::from_str(text) {
            Ok(command) => command,
            Err(err) => {
                warn!(line, error = %err, "Unparseable script line");
                outcomes.push(Outcome::Invalid {
                    line,
                    message: err.to_string(),
                });
                continue;
            }
        };

        let op = command.name();
        debug!(line, op, "Executing script operation");
        let result = execute(api, &command).await;
        outcomes.push(Outcome::from_result(line, op, result));
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_registry::prelude::create_in_memory_service;
    use std::collections::BTreeMap;

    const ADMIN: Identity = Identity::from_low_byte(0xAD);

    fn hex(tag: u8) -> String {
        Identity::from_low_byte(tag).to_string()
    }

    #[test]
    fn test_parse_commands() {
        let line = format!(
            r#"{{"op":"register","caller":"{}","name":"Widget","manufacturer":"{}"}}"#,
            hex(0xAD),
            hex(0xA0)
        );
        let command: Command = serde_json::from_str(&line).unwrap();
        assert_eq!(
            command,
            Command::Register {
                caller: ADMIN,
                name: "Widget".into(),
                manufacturer: Identity::from_low_byte(0xA0),
            }
        );

        let command: Command = serde_json::from_str(r#"{"op":"total"}"#).unwrap();
        assert_eq!(command, Command::Total);

        let command: Command =
            serde_json::from_str(r#"{"op":"verify","id":3,"caller":"ignored"}"#).unwrap();
        assert_eq!(command, Command::Verify { id: ProductId(3) });
    }

    #[tokio::test]
    async fn test_script_runs_past_failures() {
        let (service, log) = create_in_memory_service(ADMIN).unwrap();
        let script = format!(
            "# custody walk-through\n\
             {{\"op\":\"register\",\"caller\":\"{a}\",\"name\":\"Widget\",\"manufacturer\":\"{m}\"}}\n\
             {{\"op\":\"transfer\",\"caller\":\"{b}\",\"id\":1,\"new_owner\":\"{b}\",\"status\":\"Stolen\"}}\n\
             not json\n\
             \n\
             {{\"op\":\"transfer\",\"caller\":\"{m}\",\"id\":1,\"new_owner\":\"{b}\",\"status\":\"InTransit\"}}\n\
             {{\"op\":\"verify\",\"id\":2}}\n\
             {{\"op\":\"total\"}}\n",
            a = hex(0xAD),
            m = hex(0xA0),
            b = hex(0xB0),
        );

        let outcomes = run_script(&service, &script).await;
        assert_eq!(outcomes.len(), 6);

        assert_eq!(
            outcomes[0],
            Outcome::Ok {
                line: 2,
                op: "register",
                value: json!({ "id": 1 }),
            }
        );
        assert!(matches!(
            outcomes[1],
            Outcome::Error { line: 3, op: "transfer", kind: ErrorKind::PermissionDenied, .. }
        ));
        assert!(matches!(outcomes[2], Outcome::Invalid { line: 4, .. }));
        assert!(outcomes[3].is_ok());
        assert_eq!(
            outcomes[4],
            Outcome::Ok {
                line: 7,
                op: "verify",
                value: json!({ "exists": false }),
            }
        );
        assert_eq!(
            outcomes[5],
            Outcome::Ok {
                line: 8,
                op: "total",
                value: json!({ "total": 1 }),
            }
        );

        // register (2) + transfer (2)
        assert_eq!(log.len(), 4);
    }

    #[tokio::test]
    async fn test_details_value_shape() {
        let (service, _log) = create_in_memory_service(ADMIN).unwrap();
        service
            .register(ADMIN, "Widget", Identity::from_low_byte(0xA0))
            .await
            .unwrap();

        let value = execute(&service, &Command::Details { id: ProductId(1) })
            .await
            .unwrap();
        assert_eq!(value["record"]["name"], "Widget");
        assert_eq!(value["record"]["current_status"], "Manufactured");
        assert_eq!(value["history"].as_array().unwrap().len(), 1);
        assert_eq!(value["history"][0]["from"], Value::Null);

        let err = execute(&service, &Command::Details { id: ProductId(2) })
            .await
            .unwrap_err();
        assert!(matches!(err, ExecuteError::Registry(e) if e.kind() == ErrorKind::NotFound));
    }

    #[test]
    fn test_unencodable_result_is_reported_not_nulled() {
        // JSON object keys must be strings, so a tuple-keyed map cannot encode.
        let err = serde_json::to_value(BTreeMap::from([((1u8, 2u8), 3u8)])).unwrap_err();

        match Outcome::from_result(5, "details", Err(err.into())) {
            Outcome::Invalid { line, message } => {
                assert_eq!(line, 5);
                assert!(message.starts_with("encoding result:"));
            }
            other => panic!("Expected an invalid line, got {other:?}"),
        }
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = Outcome::Error {
            line: 1,
            op: "register",
            kind: ErrorKind::PermissionDenied,
            message: "denied".into(),
        };
        let text = serde_json::to_string(&outcome).unwrap();
        assert!(text.contains(r#""status":"error""#));
        assert!(text.contains(r#""kind":"permission_denied""#));
    }
}
