//! Single-party, single-pass signing of a transfer intent.

use bitcoin::address::AddressType;
use bitcoin::blockdata::script::{PushBytesBuf, ScriptBuf};
use bitcoin::blockdata::transaction::Transaction;
use bitcoin::blockdata::witness::Witness;
use bitcoin::consensus::encode;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{Message, Secp256k1};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::{Amount, Network, NetworkKind, PrivateKey, PublicKey, Txid};

use super::fees::{FeeEstimator, FeePriority};
use super::transaction::{TransactionBuilder, UnsignedTransactionIntent};
use crate::error::TransferError;
use crate::esplora::FeeSource;

/// Outputs per transfer: payment and change
const TRANSFER_OUTPUTS: usize = 2;

/// Fully signed transaction ready for broadcast
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    tx: Transaction,
    raw: Vec<u8>,
    hex: String,
    txid: Txid,
    fee: Amount,
}

impl SignedTransaction {
    fn new(tx: Transaction, fee: Amount) -> Self {
        let raw = encode::serialize(&tx);
        let hex = hex::encode(&raw);
        let txid = tx.compute_txid();
        Self {
            tx,
            raw,
            hex,
            txid,
            fee,
        }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }

    pub fn txid(&self) -> Txid {
        self.txid
    }

    pub fn fee(&self) -> Amount {
        self.fee
    }
}

enum Unlock {
    ScriptSig(ScriptBuf),
    Witness(Witness),
}

pub struct TransactionSigner<'a, F: FeeSource + ?Sized> {
    builder: TransactionBuilder,
    fees: FeeEstimator<'a, F>,
}

impl<'a, F: FeeSource + ?Sized> TransactionSigner<'a, F> {
    pub fn new(network: Network, fee_source: &'a F, default_fee_rate: u64) -> Self {
        Self {
            builder: TransactionBuilder::new(network),
            fees: FeeEstimator::new(fee_source, default_fee_rate),
        }
    }

    /// Sign every input of the intent with the WIF-encoded sender key.
    ///
    /// All inputs spend from the sender's own script. Segwit inputs commit to
    /// their own UTXO value. Inputs are signed in UTXO order, each exactly once.
    pub fn sign(
        &self,
        intent: UnsignedTransactionIntent,
        secret_wif: &str,
        priority: FeePriority,
    ) -> Result<SignedTransaction, TransferError> {
        let network = self.builder.network();
        let private_key = PrivateKey::from_wif(secret_wif)
            .map_err(|e| TransferError::Signing(format!("Invalid WIF key: {}", e)))?;

        if private_key.network != NetworkKind::from(network) {
            return Err(TransferError::Signing(format!(
                "Key is not valid for network {}",
                network
            )));
        }

        let secp = Secp256k1::new();
        let public_key = PublicKey::from_private_key(&secp, &private_key);
        if !intent.from().is_related_to_pubkey(&public_key) {
            return Err(TransferError::Signing(format!(
                "Key does not control sender address {}",
                intent.from()
            )));
        }

        let address_type = intent.from().address_type();
        if !matches!(address_type, Some(AddressType::P2pkh) | Some(AddressType::P2wpkh)) {
            return Err(TransferError::Signing(format!(
                "Unsupported script type {:?} for {}",
                address_type,
                intent.from()
            )));
        }

        let fee = self
            .fees
            .estimate(intent.utxos().len(), TRANSFER_OUTPUTS, priority);
        let mut tx = self.builder.assemble(&intent, fee)?;

        let sender_script = intent.from().script_pubkey();

        let mut unlocks = Vec::with_capacity(intent.utxos().len());
        {
            let mut sighash_cache = SighashCache::new(&tx);

            for (input_index, utxo) in intent.utxos().iter().enumerate() {
                let message = match address_type {
                    Some(AddressType::P2wpkh) => {
                        // BIP143 commits to the spent value, so each input uses its own.
                        let sighash = sighash_cache
                            .p2wpkh_signature_hash(
                                input_index,
                                &sender_script,
                                utxo.value,
                                EcdsaSighashType::All,
                            )
                            .map_err(|e| TransferError::Signing(e.to_string()))?;
                        Message::from_digest(sighash.to_byte_array())
                    }
                    _ => {
                        let sighash = sighash_cache
                            .legacy_signature_hash(
                                input_index,
                                &sender_script,
                                EcdsaSighashType::All.to_u32(),
                            )
                            .map_err(|e| TransferError::Signing(e.to_string()))?;
                        Message::from_digest(sighash.to_byte_array())
                    }
                };

                let signature = bitcoin::ecdsa::Signature {
                    signature: secp.sign_ecdsa(&message, &private_key.inner),
                    sighash_type: EcdsaSighashType::All,
                };
                let sig_with_hashtype = signature.to_vec();

                let unlock = if matches!(address_type, Some(AddressType::P2wpkh)) {
                    let mut witness = Witness::new();
                    witness.push(sig_with_hashtype);
                    witness.push(public_key.to_bytes());
                    Unlock::Witness(witness)
                } else {
                    let push = PushBytesBuf::try_from(sig_with_hashtype)
                        .map_err(|e| TransferError::Signing(e.to_string()))?;
                    let script_sig = ScriptBuf::builder()
                        .push_slice(&push)
                        .push_key(&public_key)
                        .into_script();
                    Unlock::ScriptSig(script_sig)
                };
                unlocks.push(unlock);
            }
        }

        for (input, unlock) in tx.input.iter_mut().zip(unlocks) {
            match unlock {
                Unlock::ScriptSig(script_sig) => input.script_sig = script_sig,
                Unlock::Witness(witness) => input.witness = witness,
            }
        }

        let signed = SignedTransaction::new(tx, fee);
        log::info!(
            "Signed transaction {} ({} inputs, fee {} sats)",
            signed.txid(),
            signed.transaction().input.len(),
            fee.to_sat()
        );
        Ok(signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitcoin::transaction::Utxo;
    use crate::error::EsploraError;
    use crate::esplora::FeeRecommendation;
    use bitcoin::secp256k1::SecretKey;
    use bitcoin::{Address, CompressedPublicKey};
    use std::str::FromStr;

    struct Offline;

    impl FeeSource for Offline {
        fn recommended_fees(&self) -> Result<FeeRecommendation, EsploraError> {
            Err(EsploraError::Transport("offline".to_string()))
        }
    }

    const RECEIVER: &str = "mipcBbFg9gMiCh81Kj8tqqdgoZub1ZJRfn";

    fn key(network: Network) -> PrivateKey {
        PrivateKey::new(SecretKey::from_slice(&[0x11; 32]).unwrap(), network)
    }

    fn utxo(address: &Address, byte: u8, sats: u64) -> Utxo {
        Utxo {
            txid: Txid::from_str(&format!("{:02x}", byte).repeat(32)).unwrap(),
            vout: 0,
            value: Amount::from_sat(sats),
            address: address.to_string(),
        }
    }

    fn intent_for(address: &Address, utxos: Vec<Utxo>) -> UnsignedTransactionIntent {
        let balance = utxos.iter().map(|u| u.value).sum();
        TransactionBuilder::new(Network::Testnet)
            .build(
                &address.to_string(),
                RECEIVER,
                Amount::from_sat(50_000),
                balance,
                utxos,
            )
            .unwrap()
    }

    #[test]
    fn test_signs_p2wpkh_inputs() {
        let secp = Secp256k1::new();
        let private_key = key(Network::Testnet);
        let compressed = CompressedPublicKey::from_private_key(&secp, &private_key).unwrap();
        let sender = Address::p2wpkh(&compressed, Network::Testnet);
        let intent = intent_for(&sender, vec![utxo(&sender, 1, 60_000), utxo(&sender, 2, 40_000)]);

        let signer = TransactionSigner::new(Network::Testnet, &Offline, 60);
        let signed = signer
            .sign(intent, &private_key.to_wif(), FeePriority::HalfHour)
            .unwrap();

        // 60 sat/vB fallback * 374 vB
        assert_eq!(signed.fee(), Amount::from_sat(22_440));
        let tx = signed.transaction();
        assert_eq!(tx.output[1].value, Amount::from_sat(100_000 - 50_000 - 22_440));

        let mut cache = SighashCache::new(tx);
        for (index, value) in [60_000u64, 40_000].into_iter().enumerate() {
            let input = &tx.input[index];
            assert!(input.script_sig.is_empty());
            assert_eq!(input.witness.len(), 2);
            assert_eq!(input.witness.nth(1).unwrap(), compressed.to_bytes().as_slice());

            let sig = bitcoin::ecdsa::Signature::from_slice(input.witness.nth(0).unwrap()).unwrap();
            assert_eq!(sig.sighash_type, EcdsaSighashType::All);
            let sighash = cache
                .p2wpkh_signature_hash(
                    index,
                    &sender.script_pubkey(),
                    Amount::from_sat(value),
                    EcdsaSighashType::All,
                )
                .unwrap();
            let message = Message::from_digest(sighash.to_byte_array());
            secp.verify_ecdsa(&message, &sig.signature, &compressed.0).unwrap();
        }

        assert_eq!(signed.hex(), hex::encode(signed.raw_bytes()));
        assert_eq!(signed.txid(), tx.compute_txid());
    }

    #[test]
    fn test_signs_p2pkh_inputs() {
        let secp = Secp256k1::new();
        let private_key = key(Network::Testnet);
        let public_key = PublicKey::from_private_key(&secp, &private_key);
        let sender = Address::p2pkh(public_key.pubkey_hash(), Network::Testnet);
        let intent = intent_for(&sender, vec![utxo(&sender, 7, 100_000)]);

        let signer = TransactionSigner::new(Network::Testnet, &Offline, 10);
        let signed = signer
            .sign(intent, &private_key.to_wif(), FeePriority::Fastest)
            .unwrap();

        let tx = signed.transaction();
        assert!(tx.input[0].witness.is_empty());
        let pushes: Vec<_> = tx.input[0]
            .script_sig
            .instructions()
            .map(|i| i.unwrap().push_bytes().unwrap().as_bytes().to_vec())
            .collect();
        assert_eq!(pushes.len(), 2);
        assert_eq!(pushes[1], public_key.to_bytes());

        let sig = bitcoin::ecdsa::Signature::from_slice(&pushes[0]).unwrap();
        let sighash = SighashCache::new(tx)
            .legacy_signature_hash(0, &sender.script_pubkey(), EcdsaSighashType::All.to_u32())
            .unwrap();
        let message = Message::from_digest(sighash.to_byte_array());
        secp.verify_ecdsa(&message, &sig.signature, &public_key.inner).unwrap();
    }

    #[test]
    fn test_rejects_foreign_key() {
        let secp = Secp256k1::new();
        let owner = key(Network::Testnet);
        let sender = Address::p2wpkh(
            &CompressedPublicKey::from_private_key(&secp, &owner).unwrap(),
            Network::Testnet,
        );
        let intent = intent_for(&sender, vec![utxo(&sender, 1, 100_000)]);

        let stranger = PrivateKey::new(SecretKey::from_slice(&[0x22; 32]).unwrap(), Network::Testnet);
        let err = TransactionSigner::new(Network::Testnet, &Offline, 60)
            .sign(intent, &stranger.to_wif(), FeePriority::HalfHour)
            .unwrap_err();
        assert!(matches!(err, TransferError::Signing(_)));
    }

    #[test]
    fn test_rejects_mainnet_key_and_garbage() {
        let secp = Secp256k1::new();
        let owner = key(Network::Testnet);
        let sender = Address::p2wpkh(
            &CompressedPublicKey::from_private_key(&secp, &owner).unwrap(),
            Network::Testnet,
        );
        let signer = TransactionSigner::new(Network::Testnet, &Offline, 60);

        let intent = intent_for(&sender, vec![utxo(&sender, 1, 100_000)]);
        let mainnet_wif = key(Network::Bitcoin).to_wif();
        assert!(matches!(
            signer.sign(intent, &mainnet_wif, FeePriority::HalfHour),
            Err(TransferError::Signing(_))
        ));

        let intent = intent_for(&sender, vec![utxo(&sender, 1, 100_000)]);
        assert!(matches!(
            signer.sign(intent, "not-a-wif", FeePriority::HalfHour),
            Err(TransferError::Signing(_))
        ));
    }

    #[test]
    fn test_fee_overrun_is_insufficient_balance() {
        let secp = Secp256k1::new();
        let private_key = key(Network::Testnet);
        let sender = Address::p2wpkh(
            &CompressedPublicKey::from_private_key(&secp, &private_key).unwrap(),
            Network::Testnet,
        );
        // 50_000 sent out of 60_000 leaves less than the 13_560 sat fallback fee
        let intent = intent_for(&sender, vec![utxo(&sender, 1, 60_000)]);
        let err = TransactionSigner::new(Network::Testnet, &Offline, 60)
            .sign(intent, &private_key.to_wif(), FeePriority::HalfHour)
            .unwrap_err();
        assert!(matches!(err, TransferError::InsufficientBalance(_)));
    }
}
