use crate::hash::Hash32;
use crate::slot::Epoch;
use merkleization::Canonical;
use std::collections::BTreeSet;

/// A validator's judgment on whether a disputed report was valid
/// (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Judgement {
    pub validator_index: u32,
    pub valid: bool,
    pub signature: [u8; 64],
}

/// A verdict: the disputed report hash, the epoch its judges were drawn
/// from, and their judgements (spec.md §4.6).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Verdict {
    pub report_hash: Hash32,
    pub epoch: Epoch,
    pub judgements: Vec<Judgement>,
}

impl Verdict {
    pub fn positive_votes(&self) -> usize {
        self.judgements.iter().filter(|j| j.valid).count()
    }
}

impl Canonical for Judgement {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.validator_index.encode_canonical(buf);
        buf.push(self.valid as u8);
        buf.extend_from_slice(&self.signature);
    }
}

impl Canonical for Verdict {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.report_hash.encode_canonical(buf);
        self.epoch.encode_canonical(buf);
        self.judgements.encode_canonical(buf);
    }
}

impl Canonical for Culprit {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.report_hash.encode_canonical(buf);
        self.validator_key.encode_canonical(buf);
        buf.extend_from_slice(&self.signature);
    }
}

impl Canonical for Fault {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.report_hash.encode_canonical(buf);
        buf.push(self.vote as u8);
        self.validator_key.encode_canonical(buf);
        buf.extend_from_slice(&self.signature);
    }
}

impl Canonical for DisputesExtrinsic {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.verdicts.encode_canonical(buf);
        self.culprits.encode_canonical(buf);
        self.faults.encode_canonical(buf);
    }
}

/// A culprit accusation: a validator who guaranteed a report the verdict
/// found invalid (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Culprit {
    pub report_hash: Hash32,
    pub validator_key: [u8; 32],
    pub signature: [u8; 64],
}

/// A fault accusation: a validator who attested to a report the verdict
/// found valid despite knowing otherwise (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fault {
    pub report_hash: Hash32,
    pub vote: bool,
    pub validator_key: [u8; 32],
    pub signature: [u8; 64],
}

/// The disputes extrinsic bundle submitted in a block (spec.md §4.6).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DisputesExtrinsic {
    pub verdicts: Vec<Verdict>,
    pub culprits: Vec<Culprit>,
    pub faults: Vec<Fault>,
}

/// ψ: the three offender sets plus accumulated judgement history
/// (spec.md §4.6). A report hash appears in exactly one of `good`/`bad`/
/// `wonky` once judged; `offenders` accumulates monotonically and is never
/// pruned.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DisputesState {
    pub good: BTreeSet<Hash32>,
    pub bad: BTreeSet<Hash32>,
    pub wonky: BTreeSet<Hash32>,
    pub offenders: BTreeSet<[u8; 32]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_votes_counts_only_valid_judgements() {
        let verdict = Verdict {
            report_hash: Hash32::zero(),
            epoch: Epoch::new(0),
            judgements: vec![
                Judgement { validator_index: 0, valid: true, signature: [0u8; 64] },
                Judgement { validator_index: 1, valid: false, signature: [0u8; 64] },
                Judgement { validator_index: 2, valid: true, signature: [0u8; 64] },
            ],
        };
        assert_eq!(verdict.positive_votes(), 2);
    }
}
