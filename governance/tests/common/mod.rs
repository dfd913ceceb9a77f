//! Shared fixtures: an engine wired to nullable collaborators.

#![allow(dead_code)]

use guardian_governance::{Action, GovernanceEngine, ProposalKind, VoteValue};
use guardian_nullables::{NullAuthorization, NullClock, NullGovernanceStore};
use guardian_types::{Amount, Capability, GovernanceParams, Principal, ProposalId};

pub const VOTING: u64 = 7 * 24 * 3600;
pub const TIMELOCK: u64 = 48 * 3600;
pub const EMERGENCY_TIMELOCK: u64 = 24 * 3600;
pub const EXPIRY: u64 = 14 * 24 * 3600;

pub type Engine<'a> = GovernanceEngine<&'a NullGovernanceStore, &'a NullAuthorization, &'a NullClock>;

pub struct Harness {
    pub store: NullGovernanceStore,
    pub auth: NullAuthorization,
    pub clock: NullClock,
    pub guardians: Vec<Principal>,
    pub admin: Principal,
    pub issuer: Principal,
}

impl Harness {
    /// Ten Guardians `g1..g10`, an Admin, and `g1` as emergency issuer.
    pub fn new() -> Self {
        let guardians: Vec<Principal> = (1..=10).map(|i| Principal::new(format!("g{i}"))).collect();
        let auth = NullAuthorization::with_guardians(&guardians);
        let admin = Principal::new("admin");
        auth.grant(&admin, Capability::Admin);
        let issuer = guardians[0].clone();
        auth.grant(&issuer, Capability::EmergencyIssuer);
        Self {
            store: NullGovernanceStore::new(),
            auth,
            clock: NullClock::default(),
            guardians,
            admin,
            issuer,
        }
    }

    pub fn engine(&self) -> Engine<'_> {
        GovernanceEngine::new(&self.store, &self.auth, &self.clock, GovernanceParams::default())
            .unwrap()
    }

    pub fn guardian(&self, n: usize) -> &Principal {
        &self.guardians[n - 1]
    }

    pub fn advance(&self, secs: u64) {
        self.clock.advance(secs);
    }
}

pub fn p(name: &str) -> Principal {
    Principal::new(name)
}

pub fn transfer(value: u128) -> Action {
    Action::transfer(p("grantee"), Amount::new(value))
}

/// The first `n` Guardians vote `value`.
pub fn guardians_vote(h: &Harness, engine: &Engine<'_>, id: ProposalId, n: usize, value: VoteValue) {
    for g in h.guardians.iter().take(n) {
        engine.cast_guardian_vote(g, id, value).unwrap();
    }
}

/// Create a proposal from `g1`, pass it with seven Guardians, and finalize
/// it just after the voting window.
pub fn queued_proposal(h: &Harness, engine: &Engine<'_>, action: Action) -> ProposalId {
    let id = engine
        .create(h.guardian(1), ProposalKind::TreasurySpend, "spend", action)
        .unwrap();
    guardians_vote(h, engine, id, 7, VoteValue::For);
    h.advance(VOTING + 1);
    engine.finalize(id).unwrap();
    id
}
