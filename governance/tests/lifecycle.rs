//! Lifecycle tests: engine wired to nullable store, clock and authorization.

mod common;

use common::*;
use guardian_governance::{
    Action, GovernanceError, GovernanceEvent, ProposalKind, ProposalStatus, VoteValue,
};
use guardian_nullables::NullExecutor;
use guardian_types::{Amount, Capability, ProposalId, Timestamp, VoterClass};

#[test]
fn ids_start_at_one_and_increase() {
    let h = Harness::new();
    let engine = h.engine();
    let a = engine
        .create(h.guardian(1), ProposalKind::ParameterChange, "a", transfer(0))
        .unwrap();
    let b = engine
        .create(h.guardian(2), ProposalKind::GuardianUpdate, "b", transfer(0))
        .unwrap();
    assert_eq!(a, ProposalId::new(1));
    assert_eq!(b, ProposalId::new(2));
    assert_eq!(engine.proposal_count().unwrap(), 2);
    let all = engine.proposals().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].narrative, "b");
}

#[test]
fn created_proposal_has_reference_timing() {
    let h = Harness::new();
    let engine = h.engine();
    let now = h.clock.now();
    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "x", transfer(10))
        .unwrap();
    let proposal = engine.proposal(id).unwrap();
    assert_eq!(proposal.status, ProposalStatus::Active);
    assert_eq!(proposal.created_at, now);
    assert_eq!(proposal.voting_ends_at.as_secs(), now.as_secs() + VOTING);
    assert_eq!(proposal.expires_at.as_secs(), now.as_secs() + EXPIRY);
    assert_eq!(proposal.executable_after, None);
    assert!(!proposal.emergency);
}

#[test]
fn unknown_and_zero_ids_are_not_found() {
    let h = Harness::new();
    let engine = h.engine();
    assert!(matches!(
        engine.proposal(ProposalId::NONE),
        Err(GovernanceError::NotFound(_))
    ));
    assert!(matches!(
        engine.finalize(ProposalId::new(99)),
        Err(GovernanceError::NotFound(_))
    ));
    assert!(matches!(
        engine.cast_guardian_vote(h.guardian(1), ProposalId::new(5), VoteValue::For),
        Err(GovernanceError::NotFound(_))
    ));
}

#[test]
fn creation_requires_guardian_or_delegate() {
    let h = Harness::new();
    let engine = h.engine();
    let err = engine
        .create(&p("stranger"), ProposalKind::TreasurySpend, "x", transfer(0))
        .unwrap_err();
    assert!(matches!(err, GovernanceError::Unauthorized { .. }));

    engine.set_weight(&h.admin, &p("d1"), 10).unwrap();
    assert!(engine
        .create(&p("d1"), ProposalKind::TreasurySpend, "x", transfer(0))
        .is_ok());
}

#[test]
fn one_outstanding_proposal_per_proposer() {
    let h = Harness::new();
    let engine = h.engine();
    let proposer = h.guardian(3);
    let a = engine
        .create(proposer, ProposalKind::TreasurySpend, "a", transfer(0))
        .unwrap();
    let err = engine
        .create(proposer, ProposalKind::TreasurySpend, "b", transfer(0))
        .unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::ProposerHasActiveProposal { existing, .. } if existing == a
    ));

    h.advance(VOTING + 1);
    assert_eq!(engine.finalize(a).unwrap(), ProposalStatus::Rejected);
    assert_eq!(engine.active_proposal_of(proposer).unwrap(), None);
    assert!(engine
        .create(proposer, ProposalKind::TreasurySpend, "c", transfer(0))
        .is_ok());
}

#[test]
fn queued_proposal_still_blocks_its_proposer() {
    let h = Harness::new();
    let engine = h.engine();
    let id = queued_proposal(&h, &engine, transfer(0));
    assert!(matches!(
        engine.create(h.guardian(1), ProposalKind::TreasurySpend, "again", transfer(0)),
        Err(GovernanceError::ProposerHasActiveProposal { .. })
    ));
    h.advance(TIMELOCK);
    engine.execute(id, &NullExecutor::new()).unwrap();
    assert!(engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "again", transfer(0))
        .is_ok());
}

#[test]
fn guardian_votes_count_once_per_guardian() {
    let h = Harness::new();
    let engine = h.engine();
    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "x", transfer(0))
        .unwrap();
    engine.cast_guardian_vote(h.guardian(2), id, VoteValue::For).unwrap();
    let err = engine
        .cast_guardian_vote(h.guardian(2), id, VoteValue::Against)
        .unwrap_err();
    assert!(matches!(err, GovernanceError::DuplicateVote { .. }));
    engine
        .cast_guardian_vote(h.guardian(3), id, VoteValue::Against)
        .unwrap();

    let tally = engine.tally(id).unwrap();
    assert_eq!(tally.guardian_for, 1);
    assert_eq!(tally.guardian_against, 1);
    assert!(tally.guardian_votes() <= 2);
}

#[test]
fn guardian_abstain_uses_the_vote_slot() {
    let h = Harness::new();
    let engine = h.engine();
    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "x", transfer(0))
        .unwrap();
    engine
        .cast_guardian_vote(h.guardian(4), id, VoteValue::Abstain)
        .unwrap();
    assert_eq!(engine.tally(id).unwrap().guardian_votes(), 0);
    assert!(engine
        .has_voted(id, VoterClass::Guardian, h.guardian(4))
        .unwrap());
    assert!(matches!(
        engine.cast_guardian_vote(h.guardian(4), id, VoteValue::For),
        Err(GovernanceError::DuplicateVote { .. })
    ));
}

#[test]
fn vote_checks_run_in_order() {
    let h = Harness::new();
    let engine = h.engine();
    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "x", transfer(0))
        .unwrap();

    // Capability is checked before the proposal is even looked up.
    assert!(matches!(
        engine.cast_guardian_vote(&p("stranger"), ProposalId::new(42), VoteValue::For),
        Err(GovernanceError::Unauthorized { .. })
    ));

    // The last instant of the window still accepts votes.
    h.advance(VOTING);
    engine.cast_guardian_vote(h.guardian(2), id, VoteValue::For).unwrap();

    h.advance(1);
    assert!(matches!(
        engine.cast_guardian_vote(h.guardian(3), id, VoteValue::For),
        Err(GovernanceError::WindowClosed { .. })
    ));

    engine.finalize(id).unwrap();
    assert!(matches!(
        engine.cast_guardian_vote(h.guardian(3), id, VoteValue::For),
        Err(GovernanceError::InvalidState { status: ProposalStatus::Rejected, .. })
    ));
}

#[test]
fn guardian_and_delegate_markers_are_independent() {
    let h = Harness::new();
    let engine = h.engine();
    let dual = h.guardian(5);
    engine.set_weight(&h.admin, dual, 40).unwrap();
    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "x", transfer(0))
        .unwrap();
    engine.cast_guardian_vote(dual, id, VoteValue::For).unwrap();
    engine.cast_delegate_vote(dual, id, VoteValue::For).unwrap();
    let tally = engine.tally(id).unwrap();
    assert_eq!(tally.guardian_for, 1);
    assert_eq!(tally.delegate_for, 40);
    assert!(matches!(
        engine.cast_delegate_vote(dual, id, VoteValue::Against),
        Err(GovernanceError::DuplicateVote { .. })
    ));
}

#[test]
fn delegate_vote_requires_weight() {
    let h = Harness::new();
    let engine = h.engine();
    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "x", transfer(0))
        .unwrap();
    assert!(matches!(
        engine.cast_delegate_vote(&p("d1"), id, VoteValue::For),
        Err(GovernanceError::Unauthorized { needed: Capability::Delegate, .. })
    ));

    // Capability granted out of band but no weight assigned.
    h.auth.grant(&p("d2"), Capability::Delegate);
    assert!(matches!(
        engine.cast_delegate_vote(&p("d2"), id, VoteValue::For),
        Err(GovernanceError::Unauthorized { .. })
    ));
}

#[test]
fn delegate_weight_is_read_at_cast_time() {
    let h = Harness::new();
    let engine = h.engine();
    engine.set_weight(&h.admin, &p("d1"), 100).unwrap();
    engine.set_weight(&h.admin, &p("d2"), 100).unwrap();
    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "x", transfer(0))
        .unwrap();

    engine.cast_delegate_vote(&p("d1"), id, VoteValue::For).unwrap();
    engine.set_weight(&h.admin, &p("d2"), 300).unwrap();
    engine.cast_delegate_vote(&p("d2"), id, VoteValue::Against).unwrap();
    // A later change does not touch the recorded tally.
    engine.set_weight(&h.admin, &p("d1"), 1).unwrap();

    let tally = engine.tally(id).unwrap();
    assert_eq!(tally.delegate_for, 100);
    assert_eq!(tally.delegate_against, 300);
}

#[test]
fn set_weight_is_admin_only_and_syncs_capability() {
    let h = Harness::new();
    let engine = h.engine();
    let d = p("d1");
    assert!(matches!(
        engine.set_weight(h.guardian(1), &d, 10),
        Err(GovernanceError::Unauthorized { needed: Capability::Admin, .. })
    ));

    engine.set_weight(&h.admin, &d, 10).unwrap();
    assert_eq!(h.auth.holders(Capability::Delegate), 1);
    engine.set_weight(&h.admin, &p("d2"), 30).unwrap();
    assert_eq!(engine.total_delegate_weight(), 40);

    engine.set_weight(&h.admin, &d, 0).unwrap();
    assert_eq!(engine.delegate_weight(&d), 0);
    assert_eq!(engine.total_delegate_weight(), 30);
    assert_eq!(h.auth.holders(Capability::Delegate), 1);
}

#[test]
fn delegate_quorum_boundary() {
    for (for_weight, expected) in [(510, ProposalStatus::Queued), (509, ProposalStatus::Rejected)] {
        let h = Harness::new();
        let engine = h.engine();
        engine.set_weight(&h.admin, &p("yes"), for_weight).unwrap();
        engine
            .set_weight(&h.admin, &p("no"), 1000 - for_weight)
            .unwrap();
        assert_eq!(engine.total_delegate_weight(), 1000);

        let id = engine
            .create(h.guardian(1), ProposalKind::TreasurySpend, "x", transfer(0))
            .unwrap();
        guardians_vote(&h, &engine, id, 7, VoteValue::For);
        engine.cast_delegate_vote(&p("yes"), id, VoteValue::For).unwrap();
        engine.cast_delegate_vote(&p("no"), id, VoteValue::Against).unwrap();

        let preview = engine.quorum_preview(id).unwrap();
        assert_eq!(preview.delegate_required, 510);
        assert_eq!(preview.delegate_met, expected == ProposalStatus::Queued);

        h.advance(VOTING + 1);
        assert_eq!(engine.finalize(id).unwrap(), expected);
    }
}

#[test]
fn guardian_quorum_boundary_ignores_delegate_support() {
    for (guardian_for, expected) in [(7, ProposalStatus::Queued), (6, ProposalStatus::Rejected)] {
        let h = Harness::new();
        let engine = h.engine();
        engine.set_weight(&h.admin, &p("d1"), 1000).unwrap();
        let id = engine
            .create(h.guardian(1), ProposalKind::TreasurySpend, "x", transfer(0))
            .unwrap();
        guardians_vote(&h, &engine, id, guardian_for, VoteValue::For);
        engine.cast_delegate_vote(&p("d1"), id, VoteValue::For).unwrap();
        h.advance(VOTING + 1);
        assert_eq!(engine.finalize(id).unwrap(), expected);
    }
}

#[test]
fn guardian_quorum_without_delegate_quorum_is_rejected() {
    let h = Harness::new();
    let engine = h.engine();
    engine.set_weight(&h.admin, &p("d1"), 1000).unwrap();
    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "x", transfer(0))
        .unwrap();
    guardians_vote(&h, &engine, id, 10, VoteValue::For);
    engine.cast_delegate_vote(&p("d1"), id, VoteValue::Against).unwrap();
    h.advance(VOTING + 1);
    assert_eq!(engine.finalize(id).unwrap(), ProposalStatus::Rejected);
    assert_eq!(engine.proposal(id).unwrap().executable_after, None);
}

#[test]
fn full_delegate_support_without_guardians_is_rejected() {
    let h = Harness::new();
    let engine = h.engine();
    engine.set_weight(&h.admin, &p("d1"), 600).unwrap();
    engine.set_weight(&h.admin, &p("d2"), 400).unwrap();
    let id = engine
        .create(&p("d1"), ProposalKind::TreasurySpend, "x", transfer(0))
        .unwrap();
    engine.cast_delegate_vote(&p("d1"), id, VoteValue::For).unwrap();
    engine.cast_delegate_vote(&p("d2"), id, VoteValue::For).unwrap();
    assert_eq!(engine.tally(id).unwrap().delegate_for, 1000);
    h.advance(VOTING + 1);
    assert_eq!(engine.finalize(id).unwrap(), ProposalStatus::Rejected);
}

#[test]
fn finalize_waits_for_window_to_close() {
    let h = Harness::new();
    let engine = h.engine();
    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "x", transfer(0))
        .unwrap();
    h.advance(VOTING);
    assert!(matches!(
        engine.finalize(id),
        Err(GovernanceError::WindowNotClosed { .. })
    ));
    h.advance(1);
    engine.finalize(id).unwrap();
    assert!(matches!(
        engine.finalize(id),
        Err(GovernanceError::InvalidState { .. })
    ));
}

#[test]
fn guardians_only_scenario_executes_once() {
    let h = Harness::new();
    let engine = h.engine();
    engine.deposit(&p("funder"), Amount::new(5_000)).unwrap();
    let action = Action::new(p("target"), Amount::new(1_200), vec![0xde, 0xad]);
    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "grant", action.clone())
        .unwrap();
    guardians_vote(&h, &engine, id, 7, VoteValue::For);

    h.advance(VOTING + 1);
    let finalized_at = h.clock.now();
    assert_eq!(engine.finalize(id).unwrap(), ProposalStatus::Queued);
    let queued = engine.proposal(id).unwrap();
    assert_eq!(
        queued.executable_after,
        Some(Timestamp::new(finalized_at.as_secs() + TIMELOCK))
    );

    let executor = NullExecutor::new();
    h.advance(TIMELOCK - 1);
    assert!(matches!(
        engine.execute(id, &executor),
        Err(GovernanceError::TimelockActive { .. })
    ));
    assert_eq!(executor.invocation_count(), 0);

    h.advance(1);
    engine.execute(id, &executor).unwrap();
    assert_eq!(executor.invocations(), vec![action]);
    assert_eq!(engine.proposal(id).unwrap().status, ProposalStatus::Executed);

    let treasury = engine.treasury().unwrap();
    assert_eq!(treasury.balance, Amount::new(3_800));
    assert_eq!(treasury.total_withdrawn, Amount::new(1_200));
    assert_eq!(treasury.total_deposited, Amount::new(5_000));
}

#[test]
fn execute_twice_is_rejected() {
    let h = Harness::new();
    let engine = h.engine();
    let id = queued_proposal(&h, &engine, transfer(0));
    h.advance(TIMELOCK);
    let executor = NullExecutor::new();
    engine.execute(id, &executor).unwrap();
    assert!(matches!(
        engine.execute(id, &executor),
        Err(GovernanceError::InvalidState { status: ProposalStatus::Executed, .. })
    ));
    assert_eq!(executor.invocation_count(), 1);
}

#[test]
fn expiry_overrides_elapsed_timelock() {
    let h = Harness::new();
    let engine = h.engine();
    let id = queued_proposal(&h, &engine, transfer(0));
    let proposal = engine.proposal(id).unwrap();
    h.clock.set(proposal.expires_at.as_secs() + 1);
    assert!(engine.is_expired(id).unwrap());
    assert!(matches!(
        engine.execute(id, &NullExecutor::new()),
        Err(GovernanceError::Expired { .. })
    ));
    // Lazy expiry: nothing moved the proposal out of Queued.
    assert_eq!(engine.proposal(id).unwrap().status, ProposalStatus::Queued);
}

#[test]
fn expiry_reported_even_while_timelocked() {
    let h = Harness::new();
    let engine = h.engine();
    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "late", transfer(0))
        .unwrap();
    guardians_vote(&h, &engine, id, 7, VoteValue::For);
    // Finalize late enough that the timelock ends after expiry.
    h.advance(EXPIRY - 3600);
    engine.finalize(id).unwrap();
    h.advance(3601);
    assert!(matches!(
        engine.execute(id, &NullExecutor::new()),
        Err(GovernanceError::Expired { .. })
    ));
}

#[test]
fn execution_at_expiry_instant_is_allowed() {
    let h = Harness::new();
    let engine = h.engine();
    let id = queued_proposal(&h, &engine, transfer(0));
    let proposal = engine.proposal(id).unwrap();
    h.clock.set_to(proposal.expires_at);
    assert!(!engine.is_expired(id).unwrap());
    engine.execute(id, &NullExecutor::new()).unwrap();
}

#[test]
fn emergency_proposals_use_short_timelock() {
    let h = Harness::new();
    let engine = h.engine();
    let id = engine
        .create_emergency(&h.issuer, "patch", transfer(0))
        .unwrap();
    let proposal = engine.proposal(id).unwrap();
    assert!(proposal.emergency);
    assert_eq!(proposal.kind, ProposalKind::Emergency);

    guardians_vote(&h, &engine, id, 7, VoteValue::For);
    h.advance(VOTING + 1);
    let finalized_at = h.clock.now().as_secs();
    engine.finalize(id).unwrap();
    assert_eq!(
        engine.proposal(id).unwrap().executable_after,
        Some(Timestamp::new(finalized_at + EMERGENCY_TIMELOCK))
    );
    h.advance(EMERGENCY_TIMELOCK);
    engine.execute(id, &NullExecutor::new()).unwrap();
}

#[test]
fn emergency_creation_rules() {
    let h = Harness::new();
    let engine = h.engine();
    assert!(matches!(
        engine.create_emergency(h.guardian(2), "x", transfer(0)),
        Err(GovernanceError::Unauthorized { needed: Capability::EmergencyIssuer, .. })
    ));

    engine
        .create(&h.issuer, ProposalKind::ParameterChange, "standard", transfer(0))
        .unwrap();
    assert!(matches!(
        engine.create_emergency(&h.issuer, "x", transfer(0)),
        Err(GovernanceError::ProposerHasActiveProposal { .. })
    ));
}

#[test]
fn emergency_kind_on_standard_create_is_informational() {
    let h = Harness::new();
    let engine = h.engine();
    let id = engine
        .create(h.guardian(2), ProposalKind::Emergency, "x", transfer(0))
        .unwrap();
    let proposal = engine.proposal(id).unwrap();
    assert_eq!(proposal.kind, ProposalKind::Emergency);
    assert!(!proposal.emergency);
}

#[test]
fn insufficient_funds_leaves_proposal_queued() {
    let h = Harness::new();
    let engine = h.engine();
    engine.deposit(&p("funder"), Amount::new(500)).unwrap();
    let id = queued_proposal(&h, &engine, transfer(1_000));
    h.advance(TIMELOCK);

    let executor = NullExecutor::new();
    assert!(matches!(
        engine.execute(id, &executor),
        Err(GovernanceError::InsufficientFunds { .. })
    ));
    assert_eq!(engine.proposal(id).unwrap().status, ProposalStatus::Queued);
    assert_eq!(executor.invocation_count(), 0);

    engine.deposit(&p("funder"), Amount::new(500)).unwrap();
    engine.execute(id, &executor).unwrap();
    assert_eq!(engine.treasury_balance().unwrap(), Amount::ZERO);
}

#[test]
fn failed_action_is_terminal_and_refunded() {
    let h = Harness::new();
    let engine = h.engine();
    engine.deposit(&p("funder"), Amount::new(2_000)).unwrap();
    let id = queued_proposal(&h, &engine, transfer(700));
    h.advance(TIMELOCK);
    engine.drain_events();

    let executor = NullExecutor::failing("target reverted");
    assert!(matches!(
        engine.execute(id, &executor),
        Err(GovernanceError::ExecutionFailed { .. })
    ));
    assert_eq!(engine.proposal(id).unwrap().status, ProposalStatus::Executed);
    let treasury = engine.treasury().unwrap();
    assert_eq!(treasury.balance, Amount::new(2_000));
    assert_eq!(treasury.total_withdrawn, Amount::ZERO);
    assert_eq!(
        engine.drain_events(),
        vec![GovernanceEvent::ProposalExecuted { id, success: false }]
    );

    executor.succeed();
    assert!(matches!(
        engine.execute(id, &executor),
        Err(GovernanceError::InvalidState { .. })
    ));
    assert_eq!(executor.invocation_count(), 1);
    assert_eq!(engine.active_proposal_of(h.guardian(1)).unwrap(), None);
}

#[test]
fn cancel_permissions() {
    let h = Harness::new();
    let engine = h.engine();
    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "x", transfer(0))
        .unwrap();
    assert!(matches!(
        engine.cancel(h.guardian(2), id),
        Err(GovernanceError::Unauthorized { .. })
    ));
    engine.cancel(h.guardian(1), id).unwrap();

    let other = engine
        .create(h.guardian(2), ProposalKind::TreasurySpend, "y", transfer(0))
        .unwrap();
    engine.cancel(&h.admin, other).unwrap();
    assert_eq!(engine.proposal(other).unwrap().status, ProposalStatus::Cancelled);
}

#[test]
fn cancel_queued_clears_timelock_and_frees_proposer() {
    let h = Harness::new();
    let engine = h.engine();
    let id = queued_proposal(&h, &engine, transfer(0));
    engine.cancel(h.guardian(1), id).unwrap();
    let proposal = engine.proposal(id).unwrap();
    assert_eq!(proposal.status, ProposalStatus::Cancelled);
    assert_eq!(proposal.executable_after, None);
    assert_eq!(engine.active_proposal_of(h.guardian(1)).unwrap(), None);

    h.advance(TIMELOCK);
    assert!(matches!(
        engine.execute(id, &NullExecutor::new()),
        Err(GovernanceError::InvalidState { .. })
    ));
}

#[test]
fn cancel_rejects_terminal_proposals() {
    let h = Harness::new();
    let engine = h.engine();

    let executed = queued_proposal(&h, &engine, transfer(0));
    h.advance(TIMELOCK);
    engine.execute(executed, &NullExecutor::new()).unwrap();

    let rejected = engine
        .create(h.guardian(2), ProposalKind::TreasurySpend, "r", transfer(0))
        .unwrap();
    h.advance(VOTING + 1);
    engine.finalize(rejected).unwrap();

    let cancelled = engine
        .create(h.guardian(3), ProposalKind::TreasurySpend, "c", transfer(0))
        .unwrap();
    engine.cancel(&h.admin, cancelled).unwrap();

    for id in [executed, rejected, cancelled] {
        assert!(matches!(
            engine.cancel(&h.admin, id),
            Err(GovernanceError::InvalidState { .. })
        ));
    }
}

#[test]
fn zero_deposit_is_rejected() {
    let h = Harness::new();
    let engine = h.engine();
    assert!(matches!(
        engine.deposit(&p("funder"), Amount::ZERO),
        Err(GovernanceError::ZeroAmount)
    ));
    assert_eq!(engine.deposit(&p("funder"), Amount::new(9)).unwrap(), Amount::new(9));
    assert_eq!(engine.treasury().unwrap().total_deposited, Amount::new(9));
}

#[test]
fn events_follow_committed_operations() {
    let h = Harness::new();
    let engine = h.engine();
    engine.set_weight(&h.admin, &p("d1"), 10).unwrap();
    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "spend", transfer(0))
        .unwrap();
    guardians_vote(&h, &engine, id, 7, VoteValue::For);
    engine.cast_delegate_vote(&p("d1"), id, VoteValue::For).unwrap();
    h.advance(VOTING + 1);
    assert_eq!(engine.finalize(id).unwrap(), ProposalStatus::Queued);
    h.advance(TIMELOCK);
    engine.execute(id, &NullExecutor::new()).unwrap();

    let events = engine.drain_events();
    assert!(matches!(events[0], GovernanceEvent::WeightSet { new_weight: 10, .. }));
    assert!(matches!(events[1], GovernanceEvent::ProposalCreated { .. }));
    let votes = events
        .iter()
        .filter(|e| matches!(e, GovernanceEvent::VoteCast { .. }))
        .count();
    assert_eq!(votes, 8);
    assert!(matches!(
        events[9],
        GovernanceEvent::VoteCast { class: VoterClass::Delegate, .. }
    ));
    assert!(matches!(events[10], GovernanceEvent::ProposalQueued { .. }));
    assert_eq!(
        events.last(),
        Some(&GovernanceEvent::ProposalExecuted { id, success: true })
    );
    assert!(events.iter().skip(1).all(|e| e.proposal_id() == Some(id)));
    assert!(engine.drain_events().is_empty());
}

#[test]
fn failed_commit_changes_nothing() {
    let h = Harness::new();
    let engine = h.engine();
    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "x", transfer(0))
        .unwrap();
    engine.drain_events();

    h.store.fail_next_commits(1);
    assert!(matches!(
        engine.cast_guardian_vote(h.guardian(2), id, VoteValue::For),
        Err(GovernanceError::Store(_))
    ));
    assert_eq!(engine.tally(id).unwrap().guardian_for, 0);
    assert!(!engine.has_voted(id, VoterClass::Guardian, h.guardian(2)).unwrap());
    assert!(engine.drain_events().is_empty());

    h.store.fail_next_commits(1);
    assert!(engine.set_weight(&h.admin, &p("d1"), 50).is_err());
    assert_eq!(engine.total_delegate_weight(), 0);
    assert_eq!(h.auth.holders(Capability::Delegate), 0);

    engine.cast_guardian_vote(h.guardian(2), id, VoteValue::For).unwrap();
    assert_eq!(engine.tally(id).unwrap().guardian_for, 1);
}

#[test]
fn restart_rebuilds_weights_from_store() {
    let h = Harness::new();
    {
        let engine = h.engine();
        engine.set_weight(&h.admin, &p("d1"), 70).unwrap();
        engine.set_weight(&h.admin, &p("d2"), 30).unwrap();
    }
    h.auth.revoke(&p("d1"), Capability::Delegate);

    let engine = h.engine();
    assert_eq!(engine.total_delegate_weight(), 100);
    assert_eq!(engine.delegate_weight(&p("d1")), 70);
    assert_eq!(h.auth.holders(Capability::Delegate), 2);
}

#[test]
fn inconsistent_weight_total_fails_start_up() {
    use guardian_governance::GovernanceEngine;
    use guardian_store::StoreError;
    use guardian_types::GovernanceParams;

    let h = Harness::new();
    h.store.seed_weights(&[(p("d1"), 100)], 150);
    let result = GovernanceEngine::new(&h.store, &h.auth, &h.clock, GovernanceParams::default());
    assert!(matches!(
        result,
        Err(GovernanceError::Store(StoreError::Corruption(_)))
    ));
}

#[test]
fn invalid_params_are_refused() {
    use guardian_governance::GovernanceEngine;
    use guardian_types::GovernanceParams;

    let h = Harness::new();
    let params = GovernanceParams {
        guardian_quorum: 11,
        ..GovernanceParams::default()
    };
    assert!(matches!(
        GovernanceEngine::new(&h.store, &h.auth, &h.clock, params),
        Err(GovernanceError::InvalidParams(_))
    ));
}

#[test]
fn malformed_principals_are_rejected_before_storage() {
    let h = Harness::new();
    let engine = h.engine();
    let empty = guardian_types::Principal::new("");
    let spaced = guardian_types::Principal::new("d 1");
    h.auth.grant(&empty, Capability::Guardian);

    assert!(matches!(
        engine.set_weight(&h.admin, &empty, 5),
        Err(GovernanceError::InvalidPrincipal(_))
    ));
    assert!(matches!(
        engine.set_weight(&h.admin, &spaced, 5),
        Err(GovernanceError::InvalidPrincipal(_))
    ));
    assert!(matches!(
        engine.create(&empty, ProposalKind::TreasurySpend, "x", transfer(0)),
        Err(GovernanceError::InvalidPrincipal(_))
    ));
    assert!(matches!(
        engine.deposit(&empty, Amount::new(1)),
        Err(GovernanceError::InvalidPrincipal(_))
    ));

    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "x", transfer(0))
        .unwrap();
    assert!(matches!(
        engine.cast_guardian_vote(&empty, id, VoteValue::For),
        Err(GovernanceError::InvalidPrincipal(_))
    ));
    assert_eq!(engine.total_delegate_weight(), 0);
    assert_eq!(engine.proposal_count().unwrap(), 1);
    assert_eq!(engine.tally(id).unwrap().guardian_votes(), 0);
}
