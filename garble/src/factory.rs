//! Choosing a scheme by name and binding it to a circuit file.

use crate::{
    hash::KeyMode,
    scheme::{
        FourToTwoScheme, FreeXorScheme, GarbleOps, HalfGatesScheme, RowReductionScheme, StandardScheme,
    },
    GarbleError,
};
use circuit::Circuit;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

/// The garbling algorithm, independent of the key mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeKind {
    Standard,
    FreeXor,
    RowReduction,
    HalfGates,
    FourToTwo,
}

/// Every supported combination of scheme and key mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitType {
    FixedKeyStandard,
    FixedKeyFreeXor,
    FixedKeyRowReduction,
    FixedKeyHalfGates,
    NoFixedKeyFreeXor,
    NoFixedKeyHalfGates,
    NoFixedKeyFourToTwo,
}

impl CircuitType {
    pub const ALL: [CircuitType; 7] = [
        CircuitType::FixedKeyStandard,
        CircuitType::FixedKeyFreeXor,
        CircuitType::FixedKeyRowReduction,
        CircuitType::FixedKeyHalfGates,
        CircuitType::NoFixedKeyFreeXor,
        CircuitType::NoFixedKeyHalfGates,
        CircuitType::NoFixedKeyFourToTwo,
    ];

    /// The circuit type for a key mode and scheme, if that combination exists.
    pub fn new(mode: KeyMode, scheme: SchemeKind) -> Result<Self, GarbleError> {
        use CircuitType::*;
        match (mode, scheme) {
            (KeyMode::FixedKey, SchemeKind::Standard) => Ok(FixedKeyStandard),
            (KeyMode::FixedKey, SchemeKind::FreeXor) => Ok(FixedKeyFreeXor),
            (KeyMode::FixedKey, SchemeKind::RowReduction) => Ok(FixedKeyRowReduction),
            (KeyMode::FixedKey, SchemeKind::HalfGates) => Ok(FixedKeyHalfGates),
            (KeyMode::NoFixedKey, SchemeKind::FreeXor) => Ok(NoFixedKeyFreeXor),
            (KeyMode::NoFixedKey, SchemeKind::HalfGates) => Ok(NoFixedKeyHalfGates),
            (KeyMode::NoFixedKey, SchemeKind::FourToTwo) => Ok(NoFixedKeyFourToTwo),
            (mode, scheme) => Err(GarbleError::UnsupportedScheme(format!("{:?} with {:?}", scheme, mode))),
        }
    }

    pub fn key_mode(&self) -> KeyMode {
        use CircuitType::*;
        match self {
            FixedKeyStandard | FixedKeyFreeXor | FixedKeyRowReduction | FixedKeyHalfGates => KeyMode::FixedKey,
            NoFixedKeyFreeXor | NoFixedKeyHalfGates | NoFixedKeyFourToTwo => KeyMode::NoFixedKey,
        }
    }

    pub fn scheme(&self) -> SchemeKind {
        use CircuitType::*;
        match self {
            FixedKeyStandard => SchemeKind::Standard,
            FixedKeyFreeXor | NoFixedKeyFreeXor => SchemeKind::FreeXor,
            FixedKeyRowReduction => SchemeKind::RowReduction,
            FixedKeyHalfGates | NoFixedKeyHalfGates => SchemeKind::HalfGates,
            NoFixedKeyFourToTwo => SchemeKind::FourToTwo,
        }
    }

    pub fn tag(&self) -> &'static str {
        use CircuitType::*;
        match self {
            FixedKeyStandard => "FIXED_KEY_STANDARD",
            FixedKeyFreeXor => "FIXED_KEY_FREE_XOR",
            FixedKeyRowReduction => "FIXED_KEY_ROW_REDUCTION",
            FixedKeyHalfGates => "FIXED_KEY_HALF_GATES",
            NoFixedKeyFreeXor => "NO_FIXED_KEY_FREE_XOR",
            NoFixedKeyHalfGates => "NO_FIXED_KEY_HALF_GATES",
            NoFixedKeyFourToTwo => "NO_FIXED_KEY_FOUR_TO_TWO",
        }
    }
}

impl fmt::Display for CircuitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for CircuitType {
    type Err = GarbleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CircuitType::ALL
            .iter()
            .find(|t| t.tag() == s)
            .copied()
            .ok_or_else(|| GarbleError::UnsupportedScheme(s.to_string()))
    }
}

/// How to build a scheme. Embeddable in a caller's own config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarbleConfig {
    pub circuit_type: CircuitType,
    pub circuit_path: PathBuf,
    /// Rekey every output to an independent pair. Only the Free-XOR family
    /// uses it; the other schemes already have independent output keys.
    #[serde(default)]
    pub non_xor_outputs: bool,
}

/// Bind an already parsed circuit to a scheme.
pub fn build_scheme(
    circuit_type: CircuitType,
    circ: Circuit,
    non_xor_outputs: bool,
) -> Result<Box<dyn GarbleOps>, GarbleError> {
    let mode = circuit_type.key_mode();
    Ok(match circuit_type.scheme() {
        SchemeKind::Standard => Box::new(StandardScheme::new(circ)?),
        SchemeKind::FreeXor => Box::new(FreeXorScheme::new(circ, mode, non_xor_outputs)?),
        SchemeKind::RowReduction => Box::new(RowReductionScheme::new(circ, mode, non_xor_outputs)?),
        SchemeKind::HalfGates => Box::new(HalfGatesScheme::new(circ, mode, non_xor_outputs)?),
        SchemeKind::FourToTwo => Box::new(FourToTwoScheme::new(circ)?),
    })
}

/// Load the circuit at `path` and bind it to `circuit_type`.
pub fn create_circuit<P: AsRef<Path>>(
    circuit_type: CircuitType,
    path: P,
) -> Result<Box<dyn GarbleOps>, GarbleError> {
    create_circuit_with(&GarbleConfig {
        circuit_type,
        circuit_path: path.as_ref().to_path_buf(),
        non_xor_outputs: false,
    })
}

/// Like [`create_circuit`], with the scheme given by its tag, e.g.
/// `"FIXED_KEY_HALF_GATES"`.
pub fn create_circuit_from_tag<P: AsRef<Path>>(tag: &str, path: P) -> Result<Box<dyn GarbleOps>, GarbleError> {
    create_circuit(tag.parse()?, path)
}

pub fn create_circuit_with(config: &GarbleConfig) -> Result<Box<dyn GarbleOps>, GarbleError> {
    let circ = Circuit::load(&config.circuit_path)?;
    debug!(
        circuit_type = %config.circuit_type,
        path = %config.circuit_path.display(),
        non_xor_outputs = config.non_xor_outputs,
        "creating garbled circuit"
    );
    build_scheme(config.circuit_type, circ, config.non_xor_outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto_core::Block;

    const HALF_ADDER: &str = "../circuit/circuit_files/scapi/half_adder.txt";

    #[test]
    fn tags_round_trip() {
        for t in CircuitType::ALL {
            assert_eq!(t.tag().parse::<CircuitType>().unwrap(), t);
            assert_eq!(CircuitType::new(t.key_mode(), t.scheme()).unwrap(), t);
            assert_eq!(t.to_string(), t.tag());
        }
        assert!(matches!(
            "FIXED_KEY_GARBLED".parse::<CircuitType>(),
            Err(GarbleError::UnsupportedScheme(_))
        ));
        assert!(CircuitType::new(KeyMode::NoFixedKey, SchemeKind::Standard).is_err());
        assert!(CircuitType::new(KeyMode::NoFixedKey, SchemeKind::RowReduction).is_err());
        assert!(CircuitType::new(KeyMode::FixedKey, SchemeKind::FourToTwo).is_err());
    }

    #[test]
    fn factory_builds_every_type() {
        for t in CircuitType::ALL {
            let scheme = create_circuit(t, HALF_ADDER).unwrap();
            assert_eq!(scheme.circuit_type(), t);
            assert_eq!(scheme.circuit().number_of_gates(), 2);
            let gc = scheme.garble(Block::from(1u128)).unwrap();
            assert_eq!(gc.tables.size_bytes(), scheme.table_size_bytes());
        }
        let scheme = create_circuit_from_tag("NO_FIXED_KEY_FOUR_TO_TWO", HALF_ADDER).unwrap();
        assert_eq!(scheme.table_rows(), 3);
        assert_eq!(scheme.mask_bytes(), 1);
    }

    #[test]
    fn factory_errors() {
        assert!(matches!(
            create_circuit(CircuitType::FixedKeyFreeXor, "no/such/file.txt"),
            Err(GarbleError::MalformedCircuit(_))
        ));
        assert!(matches!(
            create_circuit_from_tag("STANDARD", HALF_ADDER),
            Err(GarbleError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn config_serde() {
        let config = GarbleConfig {
            circuit_type: CircuitType::NoFixedKeyHalfGates,
            circuit_path: PathBuf::from(HALF_ADDER),
            non_xor_outputs: true,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"NO_FIXED_KEY_HALF_GATES\""));
        assert_eq!(serde_json::from_str::<GarbleConfig>(&json).unwrap(), config);

        let json = format!(
            "{{\"circuit_type\":\"FIXED_KEY_ROW_REDUCTION\",\"circuit_path\":\"{}\"}}",
            HALF_ADDER
        );
        let config: GarbleConfig = serde_json::from_str(&json).unwrap();
        assert!(!config.non_xor_outputs);
        let scheme = create_circuit_with(&config).unwrap();
        assert_eq!(scheme.table_rows(), 3);
    }
}
