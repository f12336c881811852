//! JSON-RPC clients and transaction confirmation.

use std::str::FromStr;
use std::sync::Arc;

use ethers::contract::ContractCall;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::abi::Detokenize;
use crossgov_types::H256;
use tracing::{debug, warn};

use crate::{ChainError, TxOutcome};

/// A provider that signs with the relayer key.
pub type SignedClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Read-only HTTP provider.
pub fn http_provider(url: &str) -> Result<Arc<Provider<Http>>, ChainError> {
    let provider = Provider::<Http>::try_from(url)
        .map_err(|e| ChainError::Config(format!("invalid rpc url {url}: {e}")))?;
    Ok(Arc::new(provider))
}

/// Signing provider. The chain id is read from the node so replay
/// protection matches the chain the URL points at.
pub async fn signed_client(url: &str, private_key: &str) -> Result<Arc<SignedClient>, ChainError> {
    let provider = Provider::<Http>::try_from(url)
        .map_err(|e| ChainError::Config(format!("invalid rpc url {url}: {e}")))?;
    let chain_id = provider
        .get_chainid()
        .await
        .map_err(|e| ChainError::Upstream(format!("eth_chainId: {e}")))?;
    let wallet = LocalWallet::from_str(private_key.trim_start_matches("0x"))
        .map_err(|e| ChainError::Config(format!("invalid private key: {e}")))?
        .with_chain_id(chain_id.as_u64());
    debug!(address = ?wallet.address(), chain_id = %chain_id, "signer ready");
    Ok(Arc::new(SignerMiddleware::new(provider, wallet)))
}

/// Send a state-changing call and wait for its receipt.
///
/// A reverted transaction is reported through `TxOutcome::success`; callers
/// decide whether that is fatal.
pub(crate) async fn send_and_confirm<M, D>(
    call: ContractCall<M, D>,
    label: &str,
) -> Result<TxOutcome, ChainError>
where
    M: Middleware + 'static,
    D: Detokenize,
{
    let pending = call
        .send()
        .await
        .map_err(|e| ChainError::Upstream(format!("{label}: {e}")))?;
    let tx_hash: H256 = pending.tx_hash();
    debug!(%label, ?tx_hash, "transaction sent");

    let receipt = pending
        .await
        .map_err(|e| ChainError::Upstream(format!("{label} receipt: {e}")))?
        .ok_or(ChainError::Dropped(tx_hash))?;

    let success = receipt.status == Some(1u64.into());
    if !success {
        warn!(%label, ?tx_hash, "transaction reverted");
    }
    Ok(TxOutcome {
        tx_hash,
        block_number: receipt.block_number.map(|b| b.as_u64()),
        success,
    })
}
