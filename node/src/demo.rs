//! Walkthrough of the register / issue / verify / revoke lifecycle.

use crate::script::{ScriptOp, ScriptRunner};
use anyhow::Result;
use spark_core::SparkService;
use spark_time::ManualClock;
use spark_types::DEMO_PRINCIPAL;
use std::io::Write;
use std::sync::Arc;

const AGENT_HANDLE: &str = "agent007";
const RIVAL: &str = "rival-principal";

/// The lifecycle as a call sequence. The handle owner is the demo principal.
pub fn scenario() -> Vec<ScriptOp> {
    let agent = || Some(DEMO_PRINCIPAL.to_string());
    let handle = || AGENT_HANDLE.to_string();
    vec![
        ScriptOp::GetRegistrationFee,
        ScriptOp::RegisterHandle {
            handle: handle(),
            caller: agent(),
        },
        ScriptOp::RegisterHandle {
            handle: handle(),
            caller: Some(RIVAL.to_string()),
        },
        ScriptOp::IssueCredential {
            handle: handle(),
            scope: vec!["read".to_string(), "write".to_string()],
            duration: 86_400,
            caller: agent(),
        },
        ScriptOp::VerifyCredential { id: None },
        ScriptOp::RevokeCredential {
            id: None,
            caller: agent(),
        },
        ScriptOp::VerifyCredential { id: None },
        ScriptOp::GetHandlesByOwner {
            owner: DEMO_PRINCIPAL.to_string(),
        },
    ]
}

/// Run [`scenario`] against `service`, which must be driven by `clock`.
pub fn run<W: Write>(service: &SparkService, clock: Arc<ManualClock>, out: &mut W) -> Result<()> {
    ScriptRunner::new(service, Some(clock)).run_all(&scenario(), out)
}
