//! Generates an EVM-compatible proof of the volatility program and writes a
//! fixture that the Solidity verifier tests can consume.
//!
//! You can run this script using the following command:
//! ```shell
//! RUST_LOG=info cargo run --release --bin evm -- --system groth16
//! ```
//! or
//! ```shell
//! RUST_LOG=info cargo run --release --bin evm -- --system plonk
//! ```

use std::path::PathBuf;

use alloy_sol_types::SolType;
use clap::{Parser, ValueEnum};
use lib_volatility::PublicValuesStruct;
use serde::{Deserialize, Serialize};
use sp1_sdk::{HashableKey, ProverClient, SP1ProofWithPublicValues, SP1Stdin, SP1VerifyingKey};
use zk_volatility_script::{
    circuit_input, compiled_config, load_request, read_elf, CircuitKind, SAMPLE_REQUEST_PATH,
    VOLATILITY_ELF_PATH,
};

/// The arguments for the EVM command.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct EVMArgs {
    #[clap(long, value_enum, default_value = "groth16")]
    system: ProofSystem,

    #[clap(long, default_value = SAMPLE_REQUEST_PATH)]
    request: PathBuf,

    #[clap(long, env = "VOLATILITY_ELF", default_value = VOLATILITY_ELF_PATH)]
    elf: PathBuf,
}

/// Enum representing the available proof systems
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum ProofSystem {
    Plonk,
    Groth16,
}

/// A fixture that can be used to test the verification of SP1 zkVM proofs inside Solidity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SP1VolatilityProofFixture {
    sample_count: u32,
    mean: String,
    variance: String,
    volatility: String,
    circuit_output: String,
    vkey: String,
    public_values: String,
    proof: String,
}

fn main() {
    // Setup the logger.
    sp1_sdk::utils::setup_logger();

    // Parse the command line arguments.
    let args = EVMArgs::parse();

    let config = compiled_config();
    let request = load_request(&args.request).expect("failed to load request");
    let input = circuit_input(CircuitKind::Volatility, &request, &config).expect("invalid request");
    let elf = read_elf(&args.elf).expect("failed to read ELF");

    // Setup the prover client.
    let client = ProverClient::new();

    // Setup the program.
    let (pk, vk) = client.setup(&elf);

    // Setup the inputs.
    let mut stdin = SP1Stdin::new();
    stdin.write(&input);

    println!("Receipts: {}", request.receipts.len());
    println!("Storage slots: {}", request.storage.len());
    println!("Proof System: {:?}", args.system);

    // Generate the proof based on the selected proof system.
    let proof = match args.system {
        ProofSystem::Plonk => client.prove(&pk, stdin).plonk().run(),
        ProofSystem::Groth16 => client.prove(&pk, stdin).groth16().run(),
    }
    .expect("failed to generate proof");

    create_proof_fixture(&proof, &vk, args.system);
}

/// Create a fixture for the given proof.
fn create_proof_fixture(
    proof: &SP1ProofWithPublicValues,
    vk: &SP1VerifyingKey,
    system: ProofSystem,
) {
    // Deserialize the public values.
    let bytes = proof.public_values.as_slice();
    let PublicValuesStruct { sampleCount, mean, variance, volatility, circuitOutput } =
        PublicValuesStruct::abi_decode(bytes, false).expect("failed to decode public values");

    // Create the testing fixture so we can test things end-to-end.
    let fixture = SP1VolatilityProofFixture {
        sample_count: sampleCount,
        mean: mean.to_string(),
        variance: variance.to_string(),
        volatility: volatility.to_string(),
        circuit_output: circuitOutput.to_string(),
        vkey: vk.bytes32().to_string(),
        public_values: format!("0x{}", hex::encode(bytes)),
        proof: format!("0x{}", hex::encode(proof.bytes())),
    };

    // The verification key is used to verify that the proof corresponds to the execution of the
    // program on the given input.
    //
    // Note that the verification key stays the same regardless of the input.
    println!("Verification Key: {}", fixture.vkey);

    // The public values hold the statistics and the packed circuit output.
    println!("Public Values: {}", fixture.public_values);

    // The proof proves to the verifier that the program was executed with some inputs that led to
    // the give public values.
    println!("Proof Bytes: {}", fixture.proof);

    // Save the fixture to a file.
    let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../contracts/src/fixtures");
    std::fs::create_dir_all(&fixture_path).expect("failed to create fixture path");
    std::fs::write(
        fixture_path.join(format!("{:?}-fixture.json", system).to_lowercase()),
        serde_json::to_string_pretty(&fixture).expect("failed to serialize fixture"),
    )
    .expect("failed to write fixture");
}
