//! Request context and claims

use cabinet_common::{Claims, LoggingTransformer, RequestContext};

#[test]
fn anonymous_context_has_no_subject() {
    LoggingTransformer::init_test();
    let ctx = RequestContext::anonymous();
    assert_eq!(ctx.subject(), None);
    assert!(ctx.claims().roles.is_empty());
}

#[test]
fn each_context_gets_its_own_request_id() {
    LoggingTransformer::init_test();
    let claims = Claims::for_subject("svc-deployer").with_role("ca-admin");
    let a = RequestContext::new(claims.clone());
    let b = RequestContext::new(claims);

    assert_ne!(a.request_id(), b.request_id());
    assert_eq!(a.subject(), Some("svc-deployer"));
    assert!(a.claims().has_role("ca-admin"));
    assert!(!a.claims().has_role("reader"));
}

#[test]
fn claims_keep_unknown_fields() {
    let json = r#"{
        "sub": "1234",
        "iss": "https://idp.example.com/realms/cabinet",
        "exp": 1900000000,
        "iat": 1800000000,
        "preferred_username": "jdoe",
        "roles": ["ca-admin"],
        "azp": "cabinet-cli"
    }"#;
    let claims: Claims = serde_json::from_str(json).unwrap();

    assert_eq!(claims.sub, "1234");
    assert_eq!(claims.preferred_username.as_deref(), Some("jdoe"));
    assert_eq!(claims.roles, vec!["ca-admin".to_string()]);
    assert_eq!(claims.extra["azp"], "cabinet-cli");

    let back = serde_json::to_value(&claims).unwrap();
    assert_eq!(back["azp"], "cabinet-cli");
}
