//! CrossGov daemon: vote service, cross-chain publisher and relayer.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use crossgov_chain::{
    http_provider, signed_client, ChainBVerifier, EthChainA, EthChainB, SignedClient,
};
use crossgov_crypto::VoteDomain;
use crossgov_governance::{assemble_batch, MerkleFreezer, PowerOracle, VoteLedger};
use crossgov_relayer::{
    action_data_hash, encode_action_data, encode_call, ActionRegistry, CrossChainPublisher,
    EventListener, Relayer, ShutdownController,
};
use crossgov_rpc::{AppState, RpcMetrics, RpcServer};
use crossgov_store::ArtifactStore;
use crossgov_store_lmdb::LmdbEnvironment;
use crossgov_types::serde_helpers::{parse_address, parse_hex_bytes, parse_u256, to_hex};
use crossgov_types::{Address, Bytes, ProposalId, U256};
use crossgov_utils::{init_logging, KeyedLocks, SystemClock};

use crate::config::CrossGovConfig;

const PRIVATE_KEY_ENV: &str = "CROSSGOV_PRIVATE_KEY";

#[derive(Parser)]
#[command(name = "crossgov", about = "Cross-chain governance vote aggregation and relay")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "crossgov.toml", env = "CROSSGOV_CONFIG")]
    config: PathBuf,

    /// Overrides `log_level` from the config file.
    #[arg(long, env = "CROSSGOV_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the HTTP vote service.
    Serve {
        /// Overrides `server.port`.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Publish a frozen power root to Chain A and mirror it to Chain B.
    Publish {
        #[arg(long, value_parser = u256_arg)]
        proposal: ProposalId,
        #[arg(long, value_parser = u256_arg, required_unless_present = "resume")]
        quorum: Option<U256>,
        #[arg(long, value_parser = u256_arg, required_unless_present = "resume")]
        threshold: Option<U256>,
        /// Finish an interrupted publication instead of starting one.
        #[arg(long)]
        resume: bool,
    },

    /// Watch Chain B for passed proposals and execute them on Chain A.
    Relay {
        /// Replay events from this block, ignoring the stored checkpoint.
        #[arg(long)]
        from_block: Option<u64>,
    },

    /// Submit frozen votes with their multiproof to `batchVerifyAndTally`.
    BatchVerify {
        #[arg(long, value_parser = u256_arg)]
        proposal: ProposalId,
        /// Voters to include; all frozen voters when omitted.
        #[arg(long, value_delimiter = ',', value_parser = address_arg)]
        voters: Vec<Address>,
    },

    /// Print `actionData` and its hash for a proposal action.
    ActionData {
        #[arg(long, value_parser = address_arg)]
        target: Address,
        #[arg(long, default_value = "0", value_parser = u256_arg)]
        value: U256,
        /// Raw calldata as `0x` hex.
        #[arg(long, conflicts_with = "signature")]
        data: Option<String>,
        /// Function signature such as `updateUnbondingPeriod(uint256)`.
        #[arg(long)]
        signature: Option<String>,
        /// Arguments for `--signature`.
        #[arg(long, value_delimiter = ',', requires = "signature")]
        args: Vec<String>,
    },
}

fn u256_arg(s: &str) -> Result<U256, String> {
    parse_u256(s).map_err(|e| e.to_string())
}

fn address_arg(s: &str) -> Result<Address, String> {
    parse_address(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Encoding an action payload needs neither configuration nor chains.
    if let Command::ActionData {
        target,
        value,
        data,
        signature,
        args,
    } = &cli.command
    {
        return action_data(*target, *value, data.as_deref(), signature.as_deref(), args);
    }

    let config = CrossGovConfig::from_toml_file(&cli.config)?;
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(config.log_format, level);

    match cli.command {
        Command::Serve { port } => serve(&config, port).await,
        Command::Publish {
            proposal,
            quorum,
            threshold,
            resume,
        } => {
            let key = private_key()?;
            publish(&config, &key, proposal, quorum, threshold, resume).await
        }
        Command::Relay { from_block } => {
            let key = private_key()?;
            relay(&config, &key, from_block).await
        }
        Command::BatchVerify { proposal, voters } => {
            let key = private_key()?;
            batch_verify(&config, &key, proposal, &voters).await
        }
        Command::ActionData { .. } => Ok(()),
    }
}

/// Signing key for Chain A and Chain B transactions. Read from the
/// environment only, never from the config file or the command line.
fn private_key() -> anyhow::Result<String> {
    std::env::var(PRIVATE_KEY_ENV)
        .with_context(|| format!("a signing key is required (set {PRIVATE_KEY_ENV})"))
}

fn open_store(config: &CrossGovConfig) -> anyhow::Result<LmdbEnvironment> {
    LmdbEnvironment::open(&config.data_dir, config.lmdb_map_size)
        .with_context(|| format!("opening store at {}", config.data_dir.display()))
}

async fn serve(config: &CrossGovConfig, port: Option<u16>) -> anyhow::Result<()> {
    let env = open_store(config)?;
    let votes = Arc::new(env.vote_store());
    let artifacts = Arc::new(env.artifact_store());

    let chain = &config.chain;
    let provider_a = http_provider(&chain.rpc_url_a)?;
    let chain_a = Arc::new(EthChainA::new(
        provider_a,
        chain.publisher,
        chain.asset,
        chain.derivative,
        None,
    ));
    let chain_b = Arc::new(EthChainB::new(
        http_provider(&chain.rpc_url_b)?,
        chain.vote_verifier,
    ));

    let locks = KeyedLocks::new();
    let oracle = PowerOracle::new(chain_a.clone(), chain_a.clone());
    let ledger = VoteLedger::new(
        votes.clone(),
        chain_a.clone(),
        oracle.clone(),
        Arc::new(SystemClock),
        locks.clone(),
        VoteDomain::new(chain.chain_b_id, chain.vote_verifier),
        config.server.abstain_policy,
    );
    let freezer = MerkleFreezer::new(votes, artifacts, locks);
    let state = AppState {
        ledger: Arc::new(ledger),
        freezer: Arc::new(freezer),
        oracle,
        chain_a,
        chain_b,
        metrics: Arc::new(RpcMetrics::new()?),
    };

    let shutdown = ShutdownController::new();
    let signals = shutdown.clone();
    tokio::spawn(async move { signals.wait_for_signal().await });

    let port = port.unwrap_or(config.server.port);
    tracing::info!(
        port,
        chain_b_id = chain.chain_b_id,
        abstain_policy = ?config.server.abstain_policy,
        "starting vote service"
    );
    let notified = shutdown.clone();
    RpcServer::new(port)
        .start(state, async move { notified.notified().await })
        .await?;
    tracing::info!("vote service stopped");
    Ok(())
}

async fn publish(
    config: &CrossGovConfig,
    key: &str,
    proposal: ProposalId,
    quorum: Option<U256>,
    threshold: Option<U256>,
    resume: bool,
) -> anyhow::Result<()> {
    let env = open_store(config)?;
    let chain = &config.chain;
    let client_a = signed_client(&chain.rpc_url_a, key).await?;
    let client_b = signed_client(&chain.rpc_url_b, key).await?;

    let publisher = CrossChainPublisher::new(
        Arc::new(EthChainA::new(
            client_a,
            chain.publisher,
            chain.asset,
            chain.derivative,
            None,
        )),
        Arc::new(EthChainB::new(client_b, chain.vote_verifier)),
        Arc::new(env.artifact_store()),
        Arc::new(SystemClock),
    );

    let record = if resume {
        publisher.resume_mirror(proposal).await?
    } else {
        let quorum = quorum.context("--quorum is required unless resuming")?;
        let threshold = threshold.context("--threshold is required unless resuming")?;
        publisher.publish(proposal, quorum, threshold).await?
    };
    tracing::info!(
        proposal_id = %record.proposal_id,
        root = ?record.root,
        chain_a_tx = ?record.chain_a_tx,
        chain_b_tx = ?record.chain_b_tx,
        "publication complete"
    );
    Ok(())
}

async fn relay(config: &CrossGovConfig, key: &str, from_block: Option<u64>) -> anyhow::Result<()> {
    let chain = &config.chain;
    if chain.executor.is_none() {
        bail!("chain.executor must be configured to relay");
    }
    let actions = ActionRegistry::from_specs(&config.actions)?;
    if actions.is_empty() {
        tracing::warn!("no [[actions]] configured; passed proposals will not execute");
    }

    let env = open_store(config)?;
    let client_a = signed_client(&chain.rpc_url_a, key).await?;
    let chain_a = Arc::new(EthChainA::new(
        client_a,
        chain.publisher,
        chain.asset,
        chain.derivative,
        chain.executor,
    ));
    let chain_b: Arc<dyn ChainBVerifier> = Arc::new(EthChainB::new(
        http_provider(&chain.rpc_url_b)?,
        chain.vote_verifier,
    ));

    let relayer = Relayer::new(
        chain_a.clone(),
        chain_a,
        Arc::new(env.execution_store()),
        actions,
        Arc::new(SystemClock),
        config.relayer.commit_before_execute,
    );
    let listener = EventListener::new(
        chain_b,
        Arc::new(relayer),
        Arc::new(env.checkpoint_store()),
        config.relayer.listener(from_block),
    );

    let shutdown = ShutdownController::new();
    let signals = shutdown.clone();
    tokio::spawn(async move { signals.wait_for_signal().await });

    listener.run(shutdown.subscribe()).await?;
    tracing::info!("relayer stopped");
    Ok(())
}

async fn batch_verify(
    config: &CrossGovConfig,
    key: &str,
    proposal: ProposalId,
    voters: &[Address],
) -> anyhow::Result<()> {
    let env = open_store(config)?;
    let artifact = env
        .artifact_store()
        .get_artifact(&proposal)?
        .with_context(|| format!("proposal {proposal} has not been frozen"))?;
    let batch = assemble_batch(&artifact, &env.vote_store(), voters)?;

    let client_b: Arc<SignedClient> = signed_client(&config.chain.rpc_url_b, key).await?;
    let chain_b = EthChainB::new(client_b, config.chain.vote_verifier);
    let count = batch.votes.len();
    let outcome = chain_b
        .batch_verify_and_tally(batch.votes, batch.leaves, batch.proof, batch.flags)
        .await?;
    if !outcome.success {
        bail!("batchVerifyAndTally reverted in {:?}", outcome.tx_hash);
    }
    tracing::info!(
        proposal_id = %proposal,
        votes = count,
        tx = ?outcome.tx_hash,
        "batch verified"
    );
    Ok(())
}

fn action_data(
    target: Address,
    value: U256,
    data: Option<&str>,
    signature: Option<&str>,
    args: &[String],
) -> anyhow::Result<()> {
    let calldata = match (data, signature) {
        (Some(raw), _) => parse_hex_bytes(raw)?,
        (None, Some(sig)) => encode_call(sig, args)?,
        (None, None) => Bytes::default(),
    };
    let encoded = encode_action_data(target, value, calldata.as_ref());
    println!("actionData     {}", to_hex(encoded.as_ref()));
    println!("actionDataHash {:?}", action_data_hash(encoded.as_ref()));
    Ok(())
}
