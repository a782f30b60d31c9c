use crate::gate::WireId;

#[derive(Debug, thiserror::Error)]
pub enum CircuitEvalError {
    #[error("uninitialized value, wire {0}")]
    UninitializedValue(WireId),
    #[error("expected {expected} input bits, got {actual}")]
    InputLength { expected: usize, actual: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum CircuitLoadError {
    /// The circuit description violates the file format or the netlist rules.
    #[error("malformed circuit: {0:#}")]
    Malformed(#[from] anyhow::Error),
    /// An I/O error occurred.
    #[error("encountered io error while loading circuit")]
    IoError(#[from] std::io::Error),
}
