//! Full register / issue / verify / revoke flow through the service facade.

use serde_json::json;
use spark_core::{
    CredentialRequest, IssueResult, LookupResult, Principal, RegistrationResult, SparkService,
    TimeNs, VerifyResult,
};
use spark_time::ManualClock;
use spark_types::{NANOS_PER_SECOND, ONE_YEAR_NS};

fn principal(name: &str) -> Principal {
    Principal::from_text(name).unwrap()
}

#[test]
fn agent007_lifecycle() {
    let clock = ManualClock::shared(TimeNs::ZERO);
    let service = SparkService::new(clock.clone());
    let agent = principal("agent");
    let rival = principal("rival");

    assert_eq!(service.get_registration_fee().units(), 999);

    let registration = service
        .register_handle("agent007", Some(&agent))
        .success()
        .unwrap();
    assert_eq!(registration.registered_at, TimeNs::ZERO);
    assert_eq!(registration.expires_at, TimeNs(ONE_YEAR_NS));
    assert!(!service.is_handle_available("agent007"));

    clock.advance_secs(60);
    assert_eq!(
        service.register_handle("agent007", Some(&rival)),
        RegistrationResult::Error("Handle is already registered and not expired".into())
    );

    let request = CredentialRequest {
        handle: "agent007".into(),
        scope: vec!["read".into(), "write".into()],
        duration: 86_400,
    };
    let credential = match service.issue_credential(&request, Some(&agent)) {
        IssueResult::Success(credential) => credential,
        IssueResult::Error(message) => panic!("issuance failed: {message}"),
    };
    assert!(credential.id.as_str().starts_with("cred-"));
    assert_eq!(
        credential.expires_at.as_nanos(),
        credential.issued_at.as_nanos() + 86_400 * NANOS_PER_SECOND
    );

    match service.verify_credential(credential.id.as_str()) {
        VerifyResult::Valid(verified) => assert_eq!(verified.remaining_time, 86_400),
        VerifyResult::Invalid(reason) => panic!("credential invalid: {reason}"),
    }

    assert!(service.revoke_credential(credential.id.as_str(), Some(&agent)));
    assert_eq!(
        service.verify_credential(credential.id.as_str()),
        VerifyResult::Invalid("Credential has been revoked".into())
    );
    assert!(service.revoke_credential(credential.id.as_str(), Some(&agent)));

    assert_eq!(service.get_credentials_by_owner(&agent).len(), 1);
    assert!(service.get_credentials_by_handle("agent007").is_empty());
}

#[test]
fn rival_takes_over_after_expiry() {
    let clock = ManualClock::shared(TimeNs::ZERO);
    let service = SparkService::new(clock.clone());
    let agent = principal("agent");
    let rival = principal("rival");

    service.register_handle("agent007", Some(&agent));
    clock.advance_nanos(ONE_YEAR_NS);

    assert!(service.is_handle_available("agent007"));
    let takeover = service
        .register_handle("agent007", Some(&rival))
        .success()
        .unwrap();
    assert_eq!(takeover.owner, rival);
    assert_eq!(takeover.renewed, 0);

    assert!(service.get_handles_by_owner(&agent).is_empty());
    assert_eq!(service.get_handles_by_owner(&rival).len(), 1);

    let request = CredentialRequest {
        handle: "@agent007".into(),
        scope: vec![],
        duration: 0,
    };
    assert_eq!(
        service.issue_credential(&request, Some(&agent)),
        IssueResult::Error("Only the handle owner can request credentials".into())
    );
}

#[test]
fn results_serialize_for_presentation_layer() {
    let clock = ManualClock::shared(TimeNs::from_secs(5));
    let service = SparkService::new(clock);

    let value = serde_json::to_value(service.lookup_handle("missing")).unwrap();
    assert_eq!(value, json!({"notFound": null}));

    let value = serde_json::to_value(service.register_handle("Bad_Name", Some(&principal("x"))))
        .unwrap();
    assert!(value["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid handle format"));

    let value = serde_json::to_value(service.verify_credential("cred-missing")).unwrap();
    assert_eq!(value, json!({"invalid": "Credential not found"}));

    service.register_handle("owner", Some(&principal("owner")));
    let lookup = service.lookup_handle("owner");
    assert!(matches!(lookup, LookupResult::Success(_)));
    let value = serde_json::to_value(lookup).unwrap();
    assert_eq!(value["success"]["registeredAt"], json!(5 * NANOS_PER_SECOND));
}
