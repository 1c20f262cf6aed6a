//! Behavioral tests for the gateway facade contract.

use serde_json::json;
use std::error::Error as _;

use bookie_gateway::chain::types::GatewayError;
use bookie_gateway::gateway::MutationOutcome;
use bookie_gateway::LocalizedText;

mod common;
use common::MockChain;

fn name(text: &str) -> LocalizedText {
    LocalizedText::new([("en", text)])
}

fn proposal_of(outcome: MutationOutcome) -> bookie_gateway::Proposal {
    match outcome {
        MutationOutcome::Proposed(p) => p,
        MutationOutcome::Stubbed(_) => panic!("expected a proposed operation"),
    }
}

#[tokio::test]
async fn test_unscoped_listings_are_refused_without_remote_calls() {
    let chain = MockChain::new();
    let gateway = chain.gateway();

    for result in [
        gateway.event_groups("").await.err(),
        gateway.events("").await.err(),
        gateway.betting_market_groups("  ").await.err(),
        gateway.betting_markets("").await.err(),
        gateway.sport("").await.err(),
        gateway.event_group("").await.err(),
        gateway.event("").await.err(),
        gateway.betting_market_group("").await.err(),
        gateway.betting_market("").await.err(),
        gateway.account("").await.err(),
    ] {
        assert!(matches!(
            result,
            Some(GatewayError::TooExpensiveQuery { .. })
        ));
    }

    assert_eq!(chain.rpc.call_count(), 0, "no remote call may be issued");
    assert_eq!(chain.connect_count(), 0, "no connection may be established");
}

#[tokio::test]
async fn test_connection_is_constructed_exactly_once() {
    let chain = MockChain::new();
    chain.rpc.respond("list_sports", json!([]));
    let gateway = chain.gateway();

    let (a, b) = tokio::join!(gateway.sports(), gateway.sports());
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(chain.connect_count(), 1);

    // Later calls reuse the shared connection.
    gateway.sports().await.unwrap();
    assert_eq!(chain.connect_count(), 1);
}

#[tokio::test]
async fn test_connect_failure_maps_to_service_unavailable() {
    let chain = MockChain::unreachable();
    let gateway = chain.gateway();

    let err = gateway.sports().await.unwrap_err();
    assert!(matches!(err, GatewayError::ServiceUnavailable { .. }));
    assert!(err.source().is_some());
}

#[tokio::test]
async fn test_mutations_share_one_proposal_epoch() {
    let chain = MockChain::new();
    chain.rpc.respond("get_objects", json!([{"id": "1.20.0"}]));
    let gateway = chain.gateway();

    let first = proposal_of(gateway.create_sport(&name("Soccer")).await.unwrap());
    assert_eq!(first.len(), 1);
    assert_eq!(first.proposer(), "init0");

    let second = proposal_of(
        gateway
            .update_sport("1.20.0", &name("Football"))
            .await
            .unwrap(),
    );
    assert_eq!(second.id(), first.id(), "mutators must reuse the open epoch");
    assert_eq!(second.len(), 2);

    let third = proposal_of(
        gateway
            .create_event_group(&name("Premier League"), "1.20.0")
            .await
            .unwrap(),
    );
    assert_eq!(third.id(), first.id());
    assert_eq!(third.len(), 3);
}

#[tokio::test]
async fn test_failed_update_still_opens_the_epoch() {
    let chain = MockChain::new();
    chain.rpc.fail("get_objects", -32000, "database error");
    let gateway = chain.gateway();

    let err = gateway
        .update_sport("1.20.0", &name("Football"))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Remote { .. }));

    // The proposal is ensured before the operation is built, so the epoch
    // is open even though nothing was queued.
    let proposal = gateway.active_proposal().await.unwrap();
    assert!(proposal.is_empty());

    // Later mutators join that same epoch.
    let joined = proposal_of(gateway.create_sport(&name("Soccer")).await.unwrap());
    assert_eq!(joined.id(), proposal.id());
    assert_eq!(joined.len(), 1);
}

#[tokio::test]
async fn test_discard_ends_the_epoch() {
    let chain = MockChain::new();
    let gateway = chain.gateway();

    let first = proposal_of(gateway.create_sport(&name("Soccer")).await.unwrap());
    let dropped = gateway.discard_proposal().await.unwrap();
    assert_eq!(dropped.id(), first.id());
    assert!(gateway.active_proposal().await.is_none());

    let fresh = proposal_of(gateway.create_sport(&name("Rugby")).await.unwrap());
    assert_ne!(fresh.id(), first.id(), "a new epoch needs a new proposal");
    assert_eq!(fresh.len(), 1);
}

#[tokio::test]
async fn test_broadcast_submits_and_ends_the_epoch() {
    let chain = MockChain::new();
    chain.rpc.respond("broadcast_transaction", json!({"id": "tx-1"}));
    let gateway = chain.gateway();

    assert!(gateway.broadcast_proposal().await.unwrap().is_none());

    let sent = proposal_of(gateway.create_sport(&name("Soccer")).await.unwrap());
    let tx = gateway.broadcast_proposal().await.unwrap().unwrap();
    assert_eq!(tx["id"], "tx-1");
    assert_eq!(chain.rpc.calls_for("broadcast_transaction"), 1);
    assert!(gateway.active_proposal().await.is_none());

    let fresh = proposal_of(gateway.create_sport(&name("Rugby")).await.unwrap());
    assert_ne!(fresh.id(), sent.id(), "a new epoch needs a new proposal");
    assert_eq!(fresh.len(), 1);
}

#[tokio::test]
async fn test_failed_broadcast_keeps_the_proposal_open() {
    let chain = MockChain::new();
    chain.rpc.fail("broadcast_transaction", -5, "missing authority");
    let gateway = chain.gateway();

    let open = proposal_of(gateway.create_sport(&name("Soccer")).await.unwrap());
    let err = gateway.broadcast_proposal().await.unwrap_err();
    assert!(matches!(err, GatewayError::Remote { .. }));

    let still_open = gateway.active_proposal().await.unwrap();
    assert_eq!(still_open.id(), open.id());
}

#[tokio::test]
async fn test_stubbed_creates_return_placeholder_without_mutation_traffic() {
    let chain = MockChain::new();
    let gateway = chain.gateway();

    let group = gateway
        .create_betting_market_group(&name("Moneyline"))
        .await
        .unwrap();
    assert!(matches!(group, MutationOutcome::Stubbed("dummy")));

    let market = gateway.create_betting_market(&name("Home wins")).await.unwrap();
    assert!(matches!(market, MutationOutcome::Stubbed("dummy")));

    // Stubs still open the proposal like every mutator, but nothing is
    // queued and nothing goes over the wire.
    let proposal = gateway.active_proposal().await.unwrap();
    assert!(proposal.is_empty());
    assert_eq!(chain.rpc.call_count(), 0);
}

#[tokio::test]
async fn test_remote_failure_is_wrapped_with_entity_context() {
    let chain = MockChain::new();
    chain.rpc.fail("get_objects", -32000, "database error");
    let gateway = chain.gateway();

    let err = gateway.sport("42").await.unwrap_err();
    assert!(err.to_string().contains("Sport (id=42) could not be loaded"));

    let cause = err.source().expect("cause must be preserved");
    assert!(cause.to_string().contains("database error"));
}

#[tokio::test]
async fn test_scoped_listings_reach_the_right_methods() {
    let chain = MockChain::new();
    chain.rpc.respond(
        "list_event_groups",
        json!([{"id": "1.21.1", "name": [["en", "NFL"]], "sport_id": "1.20.0"}]),
    );
    chain.rpc.respond(
        "list_events_in_group",
        json!([{"id": "1.22.7", "name": [["en", "Final"]], "event_group_id": "1.21.1"}]),
    );
    chain.rpc.respond(
        "list_betting_market_groups",
        json!([{"id": "1.24.3", "description": [["en", "Moneyline"]], "event_id": "1.22.7"}]),
    );
    chain.rpc.respond(
        "list_betting_markets",
        json!([{"id": "1.25.9", "description": [["en", "Home"]], "group_id": "1.24.3"}]),
    );
    let gateway = chain.gateway();

    let groups = gateway.event_groups("1.20.0").await.unwrap();
    assert_eq!(groups[0].name.first(), Some("NFL"));

    let events = gateway.events("1.21.1").await.unwrap();
    assert_eq!(events[0].id, "1.22.7");

    let bmgs = gateway.betting_market_groups("1.22.7").await.unwrap();
    assert_eq!(bmgs[0].id, "1.24.3");

    let markets = gateway.betting_markets("1.24.3").await.unwrap();
    assert_eq!(markets[0].group_id, "1.24.3");

    assert_eq!(chain.rpc.calls_for("list_event_groups"), 1);
    assert_eq!(chain.rpc.calls_for("list_events_in_group"), 1);
}

#[tokio::test]
async fn test_sport_choices_flatten_localized_names() {
    let chain = MockChain::new();
    chain.rpc.respond(
        "list_sports",
        json!([
            {"id": "1.20.0", "name": [["en", "Soccer"], ["de", "Fussball"]]},
            {"id": "1.20.1", "name": [["en", "Basketball"]]},
        ]),
    );
    let gateway = chain.gateway();

    let choices = gateway.sport_choices().await.unwrap();
    assert_eq!(
        choices,
        vec![
            ("1.20.0".to_string(), "Soccer".to_string()),
            ("1.20.1".to_string(), "Basketball".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_wallet_calls_pass_through_unmodified() {
    let chain = MockChain::new();
    chain.rpc.respond("is_new", json!(false));
    chain.rpc.respond("is_locked", json!(true));
    chain.rpc.respond("unlock", json!(null));
    let gateway = chain.gateway();

    assert!(gateway.wallet_exists().await.unwrap());
    assert!(gateway.locked().await.unwrap());
    assert!(gateway.unlock("hunter2").await.unwrap().is_null());

    assert_eq!(chain.rpc.calls_for("is_new"), 1);
    assert_eq!(chain.rpc.calls_for("is_locked"), 1);
    assert_eq!(chain.rpc.calls_for("unlock"), 1);
}

#[tokio::test]
async fn test_active_account_uses_configured_default() {
    let mut chain = MockChain::new();
    chain.config.account.default_account = "witness-account".to_string();
    chain
        .rpc
        .respond("get_account_by_name", json!({"id": "1.2.7", "name": "witness-account"}));
    let gateway = chain.gateway();

    assert_eq!(gateway.active_account_name(), "witness-account");
    let account = gateway.active_account().await.unwrap();
    assert_eq!(account.id, "1.2.7");

    let proposal = proposal_of(gateway.create_sport(&name("Soccer")).await.unwrap());
    assert_eq!(proposal.proposer(), "witness-account");
}
