//! Subcommand execution against an opened engine.

use anyhow::{bail, Context};
use serde::Serialize;
use serde_json::{json, Value};

use guardian_governance::{
    Action, ActionExecutor, Authorization, Clock, GovernanceEngine, Proposal, ProposalStatus,
    QuorumStatus,
};
use guardian_store::GovernanceStore;
use guardian_types::{Amount, Principal, ProposalId, VoterClass};
use guardian_utils::format_relative;

use crate::cli::Command;

/// A proposal as shown to operators.
#[derive(Serialize)]
pub struct ProposalView {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub quorum: QuorumStatus,
    pub expired: bool,
    /// Human summary of the next deadline relevant to the status.
    pub next_deadline: Option<String>,
}

fn parse_payload(hex_payload: &str) -> anyhow::Result<Vec<u8>> {
    hex::decode(hex_payload.trim_start_matches("0x")).context("payload must be hex-encoded")
}

fn action(target: &str, value: u128, payload: &str) -> anyhow::Result<Action> {
    let target = Principal::parse(target)?;
    Ok(Action::new(target, Amount::new(value), parse_payload(payload)?))
}

fn require_caller(caller: Option<&Principal>) -> anyhow::Result<&Principal> {
    match caller {
        Some(c) => Ok(c),
        None => bail!("this command needs --caller (or GUARDIAN_CALLER)"),
    }
}

fn view<S, A, C>(engine: &GovernanceEngine<S, A, C>, proposal: Proposal, now: u64) -> anyhow::Result<ProposalView>
where
    S: GovernanceStore,
    A: Authorization,
    C: Clock,
{
    let quorum = engine.quorum_preview(proposal.id)?;
    let expired = engine.is_expired(proposal.id)?;
    let next_deadline = match proposal.status {
        ProposalStatus::Active => Some(format!(
            "voting closes {}",
            format_relative(proposal.voting_ends_at.as_secs(), now)
        )),
        ProposalStatus::Queued => proposal.executable_after.map(|at| {
            format!(
                "executable {}, expires {}",
                format_relative(at.as_secs(), now),
                format_relative(proposal.expires_at.as_secs(), now)
            )
        }),
        _ => None,
    };
    Ok(ProposalView {
        proposal,
        quorum,
        expired,
        next_deadline,
    })
}

/// Run one subcommand and return its JSON result.
pub fn run<S, A, C>(
    engine: &GovernanceEngine<S, A, C>,
    clock: &dyn Clock,
    executor: &dyn ActionExecutor,
    caller: Option<&Principal>,
    command: Command,
) -> anyhow::Result<Value>
where
    S: GovernanceStore,
    A: Authorization,
    C: Clock,
{
    let result = match command {
        Command::Propose {
            kind,
            narrative,
            target,
            value,
            payload,
        } => {
            let caller = require_caller(caller)?;
            let id = engine.create(caller, kind.into(), narrative, action(&target, value, &payload)?)?;
            json!({ "proposal": id.get() })
        }
        Command::Emergency {
            narrative,
            target,
            value,
            payload,
        } => {
            let caller = require_caller(caller)?;
            let id = engine.create_emergency(caller, narrative, action(&target, value, &payload)?)?;
            json!({ "proposal": id.get(), "emergency": true })
        }
        Command::Vote { id, value, class } => {
            let caller = require_caller(caller)?;
            let id = ProposalId::new(id);
            match VoterClass::from(class) {
                VoterClass::Guardian => engine.cast_guardian_vote(caller, id, value.into())?,
                VoterClass::Delegate => engine.cast_delegate_vote(caller, id, value.into())?,
            }
            json!({ "proposal": id.get(), "tally": serde_json::to_value(engine.tally(id)?)? })
        }
        Command::Finalize { id } => {
            let status = engine.finalize(ProposalId::new(id))?;
            json!({ "proposal": id, "status": status.as_str() })
        }
        Command::Execute { id } => {
            engine.execute(ProposalId::new(id), executor)?;
            json!({ "proposal": id, "status": ProposalStatus::Executed.as_str() })
        }
        Command::Cancel { id } => {
            let caller = require_caller(caller)?;
            engine.cancel(caller, ProposalId::new(id))?;
            json!({ "proposal": id, "status": ProposalStatus::Cancelled.as_str() })
        }
        Command::SetWeight { delegate, weight } => {
            let caller = require_caller(caller)?;
            let delegate = Principal::parse(&delegate)?;
            engine.set_weight(caller, &delegate, weight)?;
            json!({
                "delegate": delegate,
                "weight": weight.to_string(),
                "total_weight": engine.total_delegate_weight().to_string(),
            })
        }
        Command::Deposit { amount } => {
            let depositor = caller.cloned().unwrap_or_else(|| Principal::new("external"));
            let balance = engine.deposit(&depositor, Amount::new(amount))?;
            json!({ "balance": balance.to_string() })
        }
        Command::Show { id } => {
            let proposal = engine.proposal(ProposalId::new(id))?;
            serde_json::to_value(view(engine, proposal, clock.now().as_secs())?)?
        }
        Command::List => {
            let now = clock.now().as_secs();
            let views = engine
                .proposals()?
                .into_iter()
                .map(|p| view(engine, p, now))
                .collect::<anyhow::Result<Vec<_>>>()?;
            serde_json::to_value(views)?
        }
        Command::Treasury => serde_json::to_value(engine.treasury()?)?,
        Command::Check => bail!("integrity check runs before the engine is opened"),
    };
    Ok(result)
}
