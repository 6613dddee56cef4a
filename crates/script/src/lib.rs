//! Host-side helpers shared by the script binaries: loading proof requests,
//! circuit configurations and guest ELFs from disk.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use lib_volatility::{
    AccountAgeCircuit, AppCircuit, Capacities, DataInput, InputError, Receipt, StorageSlot,
    Transaction, VolatilityConfig,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default location of the volatility guest ELF, as produced by `cargo prove build`.
pub const VOLATILITY_ELF_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../elf/riscv32im-succinct-zkvm-volatility-elf");

/// Default location of the account age guest ELF.
pub const ACCOUNT_AGE_ELF_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../elf/riscv32im-succinct-zkvm-account-age-elf");

/// Sample request with three USDC/WETH swaps.
pub const SAMPLE_REQUEST_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/usdc-weth-swaps.json");

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("failed to parse {path}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("{path}: the guest uses its compiled-in configuration, --config needs --local")]
    CompiledConfig { path: PathBuf },
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Which circuit to run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CircuitKind {
    Volatility,
    AccountAge,
}

impl CircuitKind {
    pub fn default_elf(&self) -> &'static str {
        match self {
            CircuitKind::Volatility => VOLATILITY_ELF_PATH,
            CircuitKind::AccountAge => ACCOUNT_AGE_ELF_PATH,
        }
    }
}

/// A record together with the slot it is assigned to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Indexed<T> {
    pub index: usize,
    pub record: T,
}

/// Records collected by the retrieval layer, as stored on disk.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProofRequest {
    pub receipts: Vec<Indexed<Receipt>>,
    pub storage: Vec<Indexed<StorageSlot>>,
    pub transactions: Vec<Indexed<Transaction>>,
}

impl ProofRequest {
    /// Lays the request out for a circuit with the given capacities.
    pub fn to_input(&self, capacities: Capacities) -> Result<DataInput, InputError> {
        let mut builder = DataInput::builder(capacities);
        for r in &self.receipts {
            builder = builder.add_receipt(r.record.clone(), r.index);
        }
        for s in &self.storage {
            builder = builder.add_storage(s.record.clone(), s.index);
        }
        for t in &self.transactions {
            builder = builder.add_transaction(t.record.clone(), t.index);
        }
        builder.build()
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ScriptError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ScriptError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_str(&text)
        .map_err(|source| ScriptError::Json { path: path.to_path_buf(), source })
}

pub fn load_request(path: &Path) -> Result<ProofRequest, ScriptError> {
    read_json(path)
}

/// Loads a configuration file, or the default pool configuration.
pub fn load_config(path: Option<&Path>) -> Result<VolatilityConfig, ScriptError> {
    match path {
        Some(path) => read_json(path),
        None => Ok(VolatilityConfig::default()),
    }
}

/// The configuration compiled into the volatility guest.
pub fn compiled_config() -> VolatilityConfig {
    VolatilityConfig::default()
}

/// Configuration for a run inside the zkVM, which cannot take a file.
pub fn zkvm_config(path: Option<&Path>) -> Result<VolatilityConfig, ScriptError> {
    match path {
        Some(path) => Err(ScriptError::CompiledConfig { path: path.to_path_buf() }),
        None => Ok(compiled_config()),
    }
}

pub fn read_elf(path: &Path) -> Result<Vec<u8>, ScriptError> {
    std::fs::read(path).map_err(|source| ScriptError::Io { path: path.to_path_buf(), source })
}

/// Input for `kind`, laid out for the circuit's allocation.
pub fn circuit_input(
    kind: CircuitKind,
    request: &ProofRequest,
    config: &VolatilityConfig,
) -> Result<DataInput, ScriptError> {
    let capacities = match kind {
        CircuitKind::Volatility => config.capacities,
        CircuitKind::AccountAge => AccountAgeCircuit.allocate(),
    };
    Ok(request.to_input(capacities)?)
}

#[cfg(test)]
mod tests {
    use lib_volatility::VolatilityCircuit;

    use super::*;

    #[test]
    fn test_sample_request_evaluates() {
        let request = load_request(Path::new(SAMPLE_REQUEST_PATH)).unwrap();
        let config = VolatilityConfig::default();
        let input = circuit_input(CircuitKind::Volatility, &request, &config).unwrap();
        let evaluation = VolatilityCircuit::new(config).evaluate(&input).unwrap();
        assert_eq!(evaluation.stats.samples, 2);
        assert_eq!(evaluation.stats.mean, lib_volatility::Uint248::from(540_050));
    }

    #[test]
    fn test_zkvm_runs_reject_config_files() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/volatility-config.json");
        assert!(load_config(Some(&path)).is_ok());
        assert!(matches!(zkvm_config(Some(&path)), Err(ScriptError::CompiledConfig { .. })));
        assert_eq!(zkvm_config(None).unwrap(), VolatilityConfig::default());
    }

    #[test]
    fn test_missing_config_uses_default() {
        assert_eq!(load_config(None).unwrap(), VolatilityConfig::default());
        let missing = Path::new("/nonexistent.json");
        assert!(matches!(load_config(Some(missing)), Err(ScriptError::Io { .. })));
    }
}
