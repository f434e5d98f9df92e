//! Scripted call sequences.
//!
//! A script is a JSON array of calls, each tagged by `"op"`:
//!
//! ```json
//! [
//!   {"op": "registerHandle", "handle": "agent007", "caller": "agent"},
//!   {"op": "issueCredential", "handle": "agent007", "scope": ["read"], "duration": 3600, "caller": "agent"},
//!   {"op": "advanceTime", "seconds": 600},
//!   {"op": "verifyCredential"}
//! ]
//! ```
//!
//! Credential ids may be omitted from `verifyCredential` and
//! `revokeCredential`, in which case the most recently issued id is used.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use spark_core::{CredentialRequest, IssueResult, SparkService};
use spark_time::ManualClock;
use spark_types::Principal;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ScriptOp {
    GetRegistrationFee,
    IsHandleAvailable {
        handle: String,
    },
    RegisterHandle {
        handle: String,
        caller: Option<String>,
    },
    RenewHandle {
        handle: String,
        caller: Option<String>,
    },
    LookupHandle {
        handle: String,
    },
    GetHandlesByOwner {
        owner: String,
    },
    IssueCredential {
        handle: String,
        #[serde(default)]
        scope: Vec<String>,
        duration: i64,
        caller: Option<String>,
    },
    VerifyCredential {
        id: Option<String>,
    },
    RevokeCredential {
        id: Option<String>,
        caller: Option<String>,
    },
    GetCredentialsByOwner {
        owner: String,
    },
    GetCredentialsByHandle {
        handle: String,
    },
    AdvanceTime {
        seconds: u64,
    },
}

impl ScriptOp {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptOp::GetRegistrationFee => "getRegistrationFee",
            ScriptOp::IsHandleAvailable { .. } => "isHandleAvailable",
            ScriptOp::RegisterHandle { .. } => "registerHandle",
            ScriptOp::RenewHandle { .. } => "renewHandle",
            ScriptOp::LookupHandle { .. } => "lookupHandle",
            ScriptOp::GetHandlesByOwner { .. } => "getHandlesByOwner",
            ScriptOp::IssueCredential { .. } => "issueCredential",
            ScriptOp::VerifyCredential { .. } => "verifyCredential",
            ScriptOp::RevokeCredential { .. } => "revokeCredential",
            ScriptOp::GetCredentialsByOwner { .. } => "getCredentialsByOwner",
            ScriptOp::GetCredentialsByHandle { .. } => "getCredentialsByHandle",
            ScriptOp::AdvanceTime { .. } => "advanceTime",
        }
    }
}

pub fn parse_script(source: &str) -> Result<Vec<ScriptOp>> {
    serde_json::from_str(source).context("script must be a JSON array of calls")
}

/// Executes calls against one service, remembering the last issued
/// credential id.
pub struct ScriptRunner<'a> {
    service: &'a SparkService,
    clock: Option<Arc<ManualClock>>,
    last_credential: Option<String>,
}

impl<'a> ScriptRunner<'a> {
    /// `clock` must be the manual clock backing `service`, if any;
    /// `advanceTime` fails without one.
    pub fn new(service: &'a SparkService, clock: Option<Arc<ManualClock>>) -> Self {
        Self {
            service,
            clock,
            last_credential: None,
        }
    }

    /// Run every call, writing one JSON line per call to `out`.
    pub fn run_all<W: Write>(&mut self, ops: &[ScriptOp], out: &mut W) -> Result<()> {
        for (index, op) in ops.iter().enumerate() {
            let result = self
                .execute(op)
                .with_context(|| format!("call #{} ({}) failed", index + 1, op.name()))?;
            let line = json!({ "op": op.name(), "result": result });
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    pub fn execute(&mut self, op: &ScriptOp) -> Result<Value> {
        debug!(op = op.name(), "executing call");
        let service = self.service;
        let value = match op {
            ScriptOp::GetRegistrationFee => serde_json::to_value(service.get_registration_fee())?,
            ScriptOp::IsHandleAvailable { handle } => json!(service.is_handle_available(handle)),
            ScriptOp::RegisterHandle { handle, caller } => {
                let caller = parse_caller(caller.as_deref())?;
                serde_json::to_value(service.register_handle(handle, caller.as_ref()))?
            }
            ScriptOp::RenewHandle { handle, caller } => {
                let caller = parse_caller(caller.as_deref())?;
                serde_json::to_value(service.renew_handle(handle, caller.as_ref()))?
            }
            ScriptOp::LookupHandle { handle } => serde_json::to_value(service.lookup_handle(handle))?,
            ScriptOp::GetHandlesByOwner { owner } => {
                let owner = parse_principal(owner)?;
                serde_json::to_value(service.get_handles_by_owner(&owner))?
            }
            ScriptOp::IssueCredential {
                handle,
                scope,
                duration,
                caller,
            } => {
                let caller = parse_caller(caller.as_deref())?;
                let request = CredentialRequest {
                    handle: handle.clone(),
                    scope: scope.clone(),
                    duration: *duration,
                };
                let result = service.issue_credential(&request, caller.as_ref());
                if let IssueResult::Success(credential) = &result {
                    self.last_credential = Some(credential.id.as_str().to_string());
                }
                serde_json::to_value(result)?
            }
            ScriptOp::VerifyCredential { id } => {
                let id = self.credential_id(id.as_deref())?;
                serde_json::to_value(service.verify_credential(&id))?
            }
            ScriptOp::RevokeCredential { id, caller } => {
                let id = self.credential_id(id.as_deref())?;
                let caller = parse_caller(caller.as_deref())?;
                json!(service.revoke_credential(&id, caller.as_ref()))
            }
            ScriptOp::GetCredentialsByOwner { owner } => {
                let owner = parse_principal(owner)?;
                serde_json::to_value(service.get_credentials_by_owner(&owner))?
            }
            ScriptOp::GetCredentialsByHandle { handle } => {
                serde_json::to_value(service.get_credentials_by_handle(handle))?
            }
            ScriptOp::AdvanceTime { seconds } => {
                let clock = self
                    .clock
                    .as_ref()
                    .ok_or_else(|| anyhow!("advanceTime requires clock = \"manual\""))?;
                json!({ "now": clock.advance_secs(*seconds) })
            }
        };
        Ok(value)
    }

    fn credential_id(&self, id: Option<&str>) -> Result<String> {
        match id {
            Some(id) => Ok(id.to_string()),
            None => self
                .last_credential
                .clone()
                .ok_or_else(|| anyhow!("no credential id given and none issued yet")),
        }
    }
}

fn parse_principal(text: &str) -> Result<Principal> {
    Principal::from_text(text).with_context(|| format!("invalid principal '{text}'"))
}

fn parse_caller(caller: Option<&str>) -> Result<Option<Principal>> {
    caller.map(parse_principal).transpose()
}
