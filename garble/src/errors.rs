use circuit::{CircuitLoadError, WireId};

#[derive(Debug, thiserror::Error)]
pub enum GarbleError {
    #[error("malformed circuit")]
    MalformedCircuit(#[from] CircuitLoadError),

    #[error("cannot allocate buffers for {wires} wires and {rows} table rows")]
    AllocationFailure { wires: usize, rows: usize },

    /// A recomputed table row differs from the audited one.
    #[error("verification failed at gate {gate}, row {row}")]
    VerificationMismatch { gate: usize, row: usize },

    /// The audited key pairs do not share one valid offset.
    #[error("input key pair {input} is inconsistent with the garbling")]
    InconsistentInputKeys { input: usize },

    /// A derived output key pair differs from the claimed one.
    #[error("output key pair {output} does not match the garbling")]
    OutputMismatch { output: usize },

    #[error("translation table entry {output} does not decode its keys")]
    TranslationMismatch { output: usize },

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("gate {gate} with truth table {truth_table:04b} cannot be garbled by this scheme")]
    UnsupportedGate { gate: usize, truth_table: u8 },

    #[error("expected {expected} keys, got {actual}")]
    InputLength { expected: usize, actual: usize },

    #[error("expected a garbled table of {expected} bytes, got {actual}")]
    TableLength { expected: usize, actual: usize },

    #[error("no key on wire {0}")]
    MissingKey(WireId),
}
