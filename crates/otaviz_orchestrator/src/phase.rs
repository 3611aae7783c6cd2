//! Phase state machine vocabulary
//!
//! Phases form a mostly linear progression through the update story. Some
//! transitions are driven purely by elapsed time (the phase carries a
//! fixed duration and names a successor), the rest are entered from
//! external triggers. Progress within a phase is always derived from the
//! wall-clock time since entry, never from frame counts.

use serde::{Deserialize, Serialize};

/// Current stage of the update visualization
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Resting scene, camera at home
    #[default]
    Idle,
    /// Camera flies to the ledger helix
    ApproachLedger,
    /// A new block grows in at the top of the helix
    BlockFormation,
    /// A light orb walks the chain from the new block down to the genesis block
    LightTraversal,
    /// The new block detaches and flies to the vehicle
    VehicleTransfer,
    /// Close-up of the vehicle dashboard
    CarInterior,
    /// Transaction details arrived from the ledger
    LedgerInfoReceived,
    /// A storage node hands its shard to the vehicle
    ContentDownload,
    /// Ledger hash and content hash converge and merge
    HashVerification,
    /// Attribute key unlocks the ciphertext, yielding the symmetric key
    KeyExchangeDecryption,
    /// Key and ciphertext spiral together and detonate
    FinalDecryption,
    /// Update package decrypted and applied
    Complete,
}

impl Phase {
    /// Seconds this phase runs before completing on its own, if timed
    pub fn fixed_duration(self) -> Option<f32> {
        match self {
            Phase::ApproachLedger => Some(2.0),
            Phase::BlockFormation => Some(1.0),
            Phase::LightTraversal => Some(2.4),
            Phase::VehicleTransfer => Some(1.5),
            // merge ramp + grow ramp + hold on the burst
            Phase::FinalDecryption => Some(3.0 + 1.1 + 2.5),
            _ => None,
        }
    }

    /// Phase entered automatically when the fixed duration elapses
    pub fn successor(self) -> Option<Phase> {
        match self {
            Phase::ApproachLedger => Some(Phase::BlockFormation),
            Phase::BlockFormation => Some(Phase::LightTraversal),
            Phase::LightTraversal => Some(Phase::VehicleTransfer),
            Phase::FinalDecryption => Some(Phase::Complete),
            _ => None,
        }
    }

    /// True for phases belonging to the backend-driven verification flow
    pub fn in_verification_flow(self) -> bool {
        matches!(
            self,
            Phase::HashVerification
                | Phase::KeyExchangeDecryption
                | Phase::FinalDecryption
                | Phase::Complete
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_chain_reaches_vehicle_transfer() {
        let mut phase = Phase::ApproachLedger;
        let mut hops = 0;
        while let Some(next) = phase.successor() {
            assert!(phase.fixed_duration().is_some());
            phase = next;
            hops += 1;
            if phase == Phase::VehicleTransfer {
                break;
            }
        }
        assert_eq!(hops, 3);
        assert_eq!(phase, Phase::VehicleTransfer);
    }

    #[test]
    fn test_externally_driven_phases_have_no_successor() {
        for phase in [
            Phase::Idle,
            Phase::CarInterior,
            Phase::LedgerInfoReceived,
            Phase::ContentDownload,
            Phase::HashVerification,
            Phase::KeyExchangeDecryption,
            Phase::Complete,
        ] {
            assert_eq!(phase.successor(), None);
        }
    }

    #[test]
    fn test_serde_names_are_kebab_case() {
        let json = serde_json::to_string(&Phase::KeyExchangeDecryption).unwrap();
        assert_eq!(json, "\"key-exchange-decryption\"");
        let back: Phase = serde_json::from_str("\"approach-ledger\"").unwrap();
        assert_eq!(back, Phase::ApproachLedger);
    }
}
