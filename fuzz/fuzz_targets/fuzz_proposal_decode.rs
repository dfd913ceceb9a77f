#![no_main]

use libfuzzer_sys::fuzz_target;

use guardian_governance::Proposal;

fuzz_target!(|data: &[u8]| {
    // Stored proposal records must never panic the decoder, and anything that
    // decodes must re-encode to a record that decodes to the same value.
    if let Ok(proposal) = Proposal::decode(data) {
        let bytes = proposal.encode().expect("decoded proposal re-encodes");
        let again = Proposal::decode(&bytes).expect("re-encoded proposal decodes");
        assert_eq!(again, proposal);
    }

    let _ = bincode::deserialize::<guardian_store::TreasuryRecord>(data);
    let _ = bincode::deserialize::<guardian_types::GovernanceParams>(data);
});
