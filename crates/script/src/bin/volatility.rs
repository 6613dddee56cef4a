//! Runs the volatility or account age circuit over a proof request, natively or
//! inside the SP1 zkVM.
//!
//! You can run this script using the following command:
//! ```shell
//! RUST_LOG=info cargo run --release -- --local
//! ```
//! or
//! ```shell
//! RUST_LOG=info cargo run --release -- --local --config fixtures/volatility-config.json
//! ```
//! or
//! ```shell
//! RUST_LOG=info cargo run --release -- --execute
//! ```
//! or
//! ```shell
//! RUST_LOG=info cargo run --release -- --prove --circuit account-age \
//!     --request fixtures/first-transaction.json
//! ```

use std::path::PathBuf;

use alloy_sol_types::SolType;
use clap::Parser;
use lib_volatility::{
    evaluate, AccountAgeCircuit, DataInput, PublicValuesStruct, VolatilityCircuit, VolatilityConfig,
};
use sp1_sdk::{ProverClient, SP1Stdin};
use tracing::{error, info};
use zk_volatility_script::{
    circuit_input, load_config, load_request, read_elf, zkvm_config, CircuitKind,
    SAMPLE_REQUEST_PATH,
};

/// The arguments for the command.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Evaluate the circuit natively, without the zkVM.
    #[clap(long)]
    local: bool,

    #[clap(long)]
    execute: bool,

    #[clap(long)]
    prove: bool,

    #[clap(long, value_enum, default_value = "volatility")]
    circuit: CircuitKind,

    /// Proof request with the records to attest.
    #[clap(long, default_value = SAMPLE_REQUEST_PATH)]
    request: PathBuf,

    /// Volatility circuit configuration for `--local`. The guest program
    /// always runs with its compiled-in USDC/WETH pool configuration.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Guest program ELF. Defaults to the `cargo prove build` output.
    #[clap(long, env = "VOLATILITY_ELF")]
    elf: Option<PathBuf>,
}

fn main() {
    // Setup the logger.
    sp1_sdk::utils::setup_logger();

    // Parse the command line arguments.
    let args = Args::parse();

    if [args.local, args.execute, args.prove].iter().filter(|mode| **mode).count() != 1 {
        eprintln!("Error: You must specify exactly one of --local, --execute or --prove");
        std::process::exit(1);
    }

    let config = if args.local {
        load_config(args.config.as_deref())
    } else {
        zkvm_config(args.config.as_deref())
    }
    .unwrap_or_else(|e| fail(e));
    let request = load_request(&args.request).unwrap_or_else(|e| fail(e));
    let input = circuit_input(args.circuit, &request, &config).unwrap_or_else(|e| fail(e));

    info!(
        circuit = ?args.circuit,
        receipts = request.receipts.len(),
        storage = request.storage.len(),
        transactions = request.transactions.len(),
        "loaded proof request"
    );

    if args.local {
        run_local(args.circuit, config, &input);
        return;
    }

    let elf_path = args.elf.unwrap_or_else(|| PathBuf::from(args.circuit.default_elf()));
    let elf = read_elf(&elf_path).unwrap_or_else(|e| fail(e));

    // Setup the inputs. The guest reads only the records.
    let mut stdin = SP1Stdin::new();
    stdin.write(&input);

    // Setup the prover client.
    let client = ProverClient::new();

    if args.execute {
        info!("Executing the program...");
        match client.execute(&elf, stdin).run() {
            Ok((output, report)) => {
                info!("Program executed successfully.");
                log_public_values(args.circuit, output.as_slice());

                // Record the number of cycles executed.
                info!("Number of cycles: {}", report.total_instruction_count());
            }
            Err(e) => error!("Execution failed: {:?}", e),
        }
    } else {
        // Setup the program for proving.
        let (pk, vk) = client.setup(&elf);

        // Generate the proof
        let proof = client.prove(&pk, stdin).run().expect("failed to generate proof");

        println!("Successfully generated proof!");
        log_public_values(args.circuit, proof.public_values.as_slice());

        // Verify the proof.
        client.verify(&proof, &vk).expect("failed to verify proof");
        println!("Successfully verified proof!");
    }
}

fn run_local(kind: CircuitKind, config: VolatilityConfig, input: &DataInput) {
    match kind {
        CircuitKind::Volatility => match VolatilityCircuit::new(config).evaluate(input) {
            Ok(evaluation) => {
                info!("Samples: {}", evaluation.stats.samples);
                info!("Mean: {}", evaluation.stats.mean);
                info!("Variance: {}", evaluation.stats.variance);
                info!("Volatility: {}", evaluation.stats.volatility);
                info!("Circuit output: 0x{}", hex::encode(evaluation.output.encode_packed()));
            }
            Err(e) => fail(e),
        },
        CircuitKind::AccountAge => match evaluate(&AccountAgeCircuit, input) {
            Ok(output) => info!("Circuit output: 0x{}", hex::encode(output.encode_packed())),
            Err(e) => fail(e),
        },
    }
}

fn log_public_values(kind: CircuitKind, bytes: &[u8]) {
    match kind {
        CircuitKind::Volatility => match PublicValuesStruct::abi_decode(bytes, true) {
            Ok(PublicValuesStruct { sampleCount, mean, variance, volatility, circuitOutput }) => {
                info!("Samples: {}", sampleCount);
                info!("Mean: {}", mean);
                info!("Variance: {}", variance);
                info!("Volatility: {}", volatility);
                info!("Circuit output: {}", circuitOutput);
            }
            Err(e) => error!("Failed to decode output: {:?}", e),
        },
        CircuitKind::AccountAge => info!("Circuit output: 0x{}", hex::encode(bytes)),
    }
}

fn fail(e: impl std::fmt::Display) -> ! {
    error!("{e}");
    std::process::exit(1);
}
