use crate::slot::Slot;
use crate::work_report::WorkReport;
use merkleization::Canonical;

/// One guarantor's Ed25519 signature over a work report's hash
/// (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReportSignature {
    pub validator_index: u32,
    pub signature: [u8; 64],
}

impl Canonical for ReportSignature {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.validator_index.encode_canonical(buf);
        buf.extend_from_slice(&self.signature);
    }
}

/// A guarantee extrinsic entry: a work report plus the credentials of the
/// (at least two-of-three) guarantors attesting to it (spec.md §4.5).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Guarantee {
    pub report: WorkReport,
    pub slot: Slot,
    pub signatures: Vec<ReportSignature>,
}

impl Canonical for Guarantee {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.report.encode_canonical(buf);
        self.slot.encode_canonical(buf);
        (self.signatures.len() as u32).encode_canonical(buf);
        for sig in &self.signatures {
            sig.encode_canonical(buf);
        }
    }
}
