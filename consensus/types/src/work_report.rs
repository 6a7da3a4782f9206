use crate::hash::Hash32;
use crate::slot::Slot;
use merkleization::Canonical;

/// Identifies the work package a report refines (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WorkPackageSpec {
    pub package_hash: Hash32,
    pub length: u32,
    pub erasure_root: Hash32,
    pub exports_root: Hash32,
    pub exports_count: u32,
}

impl Canonical for WorkPackageSpec {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.package_hash.encode_canonical(buf);
        self.length.encode_canonical(buf);
        self.erasure_root.encode_canonical(buf);
        self.exports_root.encode_canonical(buf);
        self.exports_count.encode_canonical(buf);
    }
}

/// The anchor a report is validated against (spec.md §4.5): the recent-history
/// entry the guarantors built their refinement context from, plus the
/// lookup-anchor used to bound preimage freshness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RefinementContext {
    pub anchor_header_hash: Hash32,
    pub anchor_state_root: Hash32,
    pub anchor_beefy_root: Hash32,
    pub lookup_anchor_hash: Hash32,
    pub lookup_anchor_slot: Slot,
}

impl Canonical for RefinementContext {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.anchor_header_hash.encode_canonical(buf);
        self.anchor_state_root.encode_canonical(buf);
        self.anchor_beefy_root.encode_canonical(buf);
        self.lookup_anchor_hash.encode_canonical(buf);
        self.lookup_anchor_slot.encode_canonical(buf);
    }
}

/// One service's result within a work report (spec.md §4.5, §4.7).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WorkResult {
    pub service_id: u32,
    pub code_hash: Hash32,
    pub payload_hash: Hash32,
    pub accumulate_gas: u64,
    pub output: WorkOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WorkOutput {
    Ok(Vec<u8>),
    OutOfGas,
    Panic,
    BadCode,
    CodeTooLarge,
    BadExports,
}

impl Canonical for WorkResult {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.service_id.encode_canonical(buf);
        self.code_hash.encode_canonical(buf);
        self.payload_hash.encode_canonical(buf);
        self.accumulate_gas.encode_canonical(buf);
        match &self.output {
            WorkOutput::Ok(bytes) => {
                buf.push(0);
                bytes.encode_canonical(buf);
            }
            WorkOutput::OutOfGas => buf.push(1),
            WorkOutput::Panic => buf.push(2),
            WorkOutput::BadCode => buf.push(3),
            WorkOutput::CodeTooLarge => buf.push(4),
            WorkOutput::BadExports => buf.push(5),
        }
    }
}

/// A dependency named by a work report (spec.md §4.5): either a report hash
/// this one must be accumulated after, or a cross-core prerequisite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReportDependency {
    pub report_hash: Hash32,
}

/// A work report, the unit that flows through assurance, accumulation and
/// recent-history (spec.md §4.5).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WorkReport {
    pub package_spec: WorkPackageSpec,
    pub context: RefinementContext,
    pub core_index: u32,
    pub authorizer_hash: Hash32,
    pub auth_output: Vec<u8>,
    pub results: Vec<WorkResult>,
    pub dependencies: Vec<ReportDependency>,
}

impl WorkReport {
    pub fn hash(&self) -> Hash32 {
        Hash32::from(merkleization::blake2b_256(&self.canonical_bytes()))
    }

    pub fn total_accumulate_gas(&self) -> Option<u64> {
        self.results
            .iter()
            .try_fold(0u64, |acc, r| acc.checked_add(r.accumulate_gas))
    }
}

impl Canonical for WorkReport {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.package_spec.encode_canonical(buf);
        self.context.encode_canonical(buf);
        self.core_index.encode_canonical(buf);
        self.authorizer_hash.encode_canonical(buf);
        self.auth_output.encode_canonical(buf);
        self.results.encode_canonical(buf);
        (self.dependencies.len() as u32).encode_canonical(buf);
        for d in &self.dependencies {
            d.report_hash.encode_canonical(buf);
        }
    }
}
