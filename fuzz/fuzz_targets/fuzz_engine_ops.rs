#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use guardian_governance::{
    Action, GovernanceEngine, GovernanceError, ProposalKind, ProposalStatus, VoteValue,
};
use guardian_nullables::{NullAuthorization, NullClock, NullExecutor, NullGovernanceStore};
use guardian_types::{Amount, Capability, GovernanceParams, Principal, ProposalId};

#[derive(Arbitrary, Debug)]
enum Op {
    Create { who: u8, value: u16 },
    GuardianVote { who: u8, id: u8, value: u8 },
    DelegateVote { who: u8, id: u8, value: u8 },
    SetWeight { who: u8, weight: u16 },
    Finalize { id: u8 },
    Execute { id: u8, fail: bool },
    Cancel { who: u8, id: u8 },
    Deposit { amount: u16 },
    Advance { hours: u16 },
}

fn vote(v: u8) -> VoteValue {
    match v % 3 {
        0 => VoteValue::For,
        1 => VoteValue::Against,
        _ => VoteValue::Abstain,
    }
}

fn principal(prefix: &str, who: u8) -> Principal {
    Principal::new(format!("{prefix}{}", who % 12))
}

// Random operation sequences must never panic and must keep the engine's
// observable invariants.
fuzz_target!(|ops: Vec<Op>| {
    let store = NullGovernanceStore::new();
    let clock = NullClock::new(0);
    let auth = NullAuthorization::new();
    for i in 0..10u8 {
        auth.grant(&principal("g", i), Capability::Guardian);
    }
    let admin = Principal::new("admin");
    auth.grant(&admin, Capability::Admin);
    let engine = GovernanceEngine::new(&store, &auth, &clock, GovernanceParams::default())
        .expect("default params are valid");

    for op in ops {
        let result: Result<(), GovernanceError> = match op {
            Op::Create { who, value } => engine
                .create(
                    &principal("g", who),
                    ProposalKind::TreasurySpend,
                    "",
                    Action::transfer(Principal::new("t"), Amount::new(u128::from(value))),
                )
                .map(|_| ()),
            Op::GuardianVote { who, id, value } => engine.cast_guardian_vote(
                &principal("g", who),
                ProposalId::new(u64::from(id)),
                vote(value),
            ),
            Op::DelegateVote { who, id, value } => engine.cast_delegate_vote(
                &principal("d", who),
                ProposalId::new(u64::from(id)),
                vote(value),
            ),
            Op::SetWeight { who, weight } => {
                engine.set_weight(&admin, &principal("d", who), u128::from(weight))
            }
            Op::Finalize { id } => engine.finalize(ProposalId::new(u64::from(id))).map(|_| ()),
            Op::Execute { id, fail } => {
                let executor = if fail {
                    NullExecutor::failing("fuzz")
                } else {
                    NullExecutor::new()
                };
                engine.execute(ProposalId::new(u64::from(id)), &executor)
            }
            Op::Cancel { who, id } => {
                engine.cancel(&principal("g", who), ProposalId::new(u64::from(id)))
            }
            Op::Deposit { amount } => engine
                .deposit(&Principal::new("funder"), Amount::new(u128::from(amount)))
                .map(|_| ()),
            Op::Advance { hours } => {
                clock.advance(u64::from(hours) * 3600);
                Ok(())
            }
        };
        assert!(!matches!(result, Err(GovernanceError::Reentrant)));
    }

    let proposals = engine.proposals().expect("store readable");
    for p in &proposals {
        assert!(p.tally.guardian_votes() <= 10);
        assert_eq!(
            p.executable_after.is_some(),
            matches!(p.status, ProposalStatus::Queued | ProposalStatus::Executed)
        );
        let indexed = engine.active_proposal_of(&p.proposer).expect("store readable");
        if p.status.is_outstanding() {
            assert_eq!(indexed, Some(p.id));
        }
    }
    let sum: u128 = (0..12u8)
        .map(|i| engine.delegate_weight(&principal("d", i)))
        .sum();
    assert_eq!(sum, engine.total_delegate_weight());
});
