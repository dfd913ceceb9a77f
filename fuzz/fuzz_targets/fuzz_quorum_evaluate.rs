#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use guardian_governance::quorum::{evaluate, required_delegate_weight};
use guardian_governance::Tally;
use guardian_types::GovernanceParams;

#[derive(Arbitrary, Debug)]
struct Input {
    guardian_for: u32,
    guardian_against: u32,
    delegate_for: u128,
    delegate_against: u128,
    total: u128,
    bps: u16,
    guardian_quorum: u32,
}

fuzz_target!(|input: Input| {
    let bps = u32::from(input.bps) % 10_001;
    let params = GovernanceParams {
        delegate_quorum_bps: bps,
        guardian_quorum: input.guardian_quorum,
        ..GovernanceParams::default()
    };
    let tally = Tally {
        guardian_for: input.guardian_for,
        guardian_against: input.guardian_against,
        delegate_for: input.delegate_for,
        delegate_against: input.delegate_against,
        delegate_abstain: 0,
    };

    let required = required_delegate_weight(input.total, bps);
    assert!(required <= input.total);

    let status = evaluate(&tally, input.total, &params);
    assert_eq!(status.guardian_met, input.guardian_for >= input.guardian_quorum);
    if input.total == 0 {
        assert!(status.delegate_met);
    } else {
        assert_eq!(status.delegate_met, input.delegate_for >= required);
    }
    assert_eq!(status.passed(), status.guardian_met && status.delegate_met);
});
