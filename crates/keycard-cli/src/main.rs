//! Command-line demo for interacting with a Status Keycard over PC/SC.
//!
//! This binary is a thin operator console over [`nexum_keycard::Keycard`]; it
//! does not persist anything beyond an optional pairing-info file and exists
//! to exercise the full command surface end to end against real hardware.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use coins_bip32::path::DerivationPath;
use nexum_apdu_core::prelude::*;
use nexum_apdu_transport_pcsc::{PcscDeviceManager, PcscTransport};
use nexum_keycard::{
    CredentialType, ExportOption, ExportedKey, Keycard, KeyPath, PairingInfo, PersistentRecord,
    Secrets,
};
use tracing::info;

#[derive(Parser)]
#[command(version, about = "Demo CLI for the Status Keycard host-side client")]
struct Cli {
    /// Reader name to use (auto-detects the first reader with a card if omitted)
    #[arg(short, long)]
    reader: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PairingArgs {
    /// Path to a file holding a previously saved pairing (see `pair --output`)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Pairing key in hex, used together with `--index`
    #[arg(long, requires = "index")]
    key: Option<String>,

    /// Pairing slot index, used together with `--key`
    #[arg(long, requires = "key")]
    index: Option<u8>,
}

impl PairingArgs {
    fn load(&self) -> anyhow::Result<Option<PairingInfo>> {
        if let Some(path) = &self.file {
            return Ok(Some(load_pairing_file(path)?));
        }

        if let (Some(key), Some(index)) = (&self.key, self.index) {
            let key_bytes = hex::decode(key)?;
            return Ok(Some(pairing_info_from_bytes(&key_bytes, index)?));
        }

        Ok(None)
    }
}

#[derive(Args)]
struct KeyPathArgs {
    /// Key path, e.g. `m/44'/60'/0'/0/0`, `../0`, or empty for the current key
    #[arg(long, default_value = "")]
    path: String,
}

impl KeyPathArgs {
    fn parse(&self) -> anyhow::Result<KeyPath> {
        Ok(KeyPath::from_str(&self.path)?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List available PC/SC readers and whether a card is present
    ListReaders,
    /// Select the Keycard applet and print its application info
    Select,
    /// Initialize an uninitialized card with a fresh PIN/PUK/pairing password
    Init {
        #[arg(long)]
        pin: Option<String>,
        #[arg(long)]
        puk: Option<String>,
        #[arg(long)]
        pairing_password: Option<String>,
        /// Save the generated secrets in a pairing-ready format to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Pair with the card, creating a new pairing slot
    Pair {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove a pairing slot
    Unpair {
        #[command(flatten)]
        pairing: PairingArgs,
    },
    /// Open the secure channel and verify the PIN
    Unlock {
        #[command(flatten)]
        pairing: PairingArgs,
    },
    /// Print the card's application status (PIN/PUK retry counters)
    GetStatus {
        #[command(flatten)]
        pairing: PairingArgs,
    },
    /// Print the current key's BIP32 path, if any
    GetKeyPath {
        #[command(flatten)]
        pairing: PairingArgs,
    },
    /// Generate a new keypair on the card
    GenerateKey {
        #[command(flatten)]
        pairing: PairingArgs,
    },
    /// Derive a key without exporting it, optionally making it the current key
    DeriveKey {
        #[command(flatten)]
        pairing: PairingArgs,
        #[command(flatten)]
        key_path: KeyPathArgs,
        #[arg(long)]
        make_current: bool,
    },
    /// Export a key from the card
    ExportKey {
        #[command(flatten)]
        pairing: PairingArgs,
        #[command(flatten)]
        key_path: KeyPathArgs,
        #[arg(long, value_enum, default_value_t = ExportOption::PublicKeyOnly)]
        export_option: ExportOption,
        #[arg(long)]
        make_current: bool,
    },
    /// Sign a 32-byte hash with a key on the card
    Sign {
        /// Hash to sign, hex-encoded (exactly 32 bytes)
        data: String,
        #[command(flatten)]
        pairing: PairingArgs,
        #[command(flatten)]
        key_path: KeyPathArgs,
    },
    /// Change the PIN, PUK, or pairing secret
    ChangeCredential {
        #[arg(value_enum)]
        credential_type: CredentialType,
        new_value: String,
        #[command(flatten)]
        pairing: PairingArgs,
    },
    /// Unblock the PIN using the PUK
    UnblockPin {
        puk: String,
        new_pin: String,
        #[command(flatten)]
        pairing: PairingArgs,
    },
    /// Set (or clear, with an empty path) the PIN-less signing path
    SetPinlessPath {
        #[arg(long, default_value = "")]
        path: String,
        #[command(flatten)]
        pairing: PairingArgs,
    },
    /// Load an existing keypair onto the card
    LoadKey {
        /// Private key, hex-encoded (32 bytes)
        private_key: String,
        #[command(flatten)]
        pairing: PairingArgs,
    },
    /// Remove the current key from the card
    RemoveKey {
        #[command(flatten)]
        pairing: PairingArgs,
    },
    /// Generate a BIP39 mnemonic on the card
    GenerateMnemonic {
        #[arg(long, default_value_t = 24)]
        words: u8,
        #[command(flatten)]
        pairing: PairingArgs,
    },
    /// Store data in a persistent record
    StoreData {
        data: String,
        #[arg(long, value_enum, default_value_t = PersistentRecord::Public)]
        record: PersistentRecord,
        #[command(flatten)]
        pairing: PairingArgs,
    },
    /// Read data from a persistent record
    GetData {
        #[arg(long, value_enum, default_value_t = PersistentRecord::Public)]
        record: PersistentRecord,
        #[command(flatten)]
        pairing: PairingArgs,
    },
    /// Sign a challenge with the card's IDENT key (no secure channel required)
    Ident {
        /// Challenge to sign, hex-encoded (32 bytes); random if omitted
        challenge: Option<String>,
    },
    /// Wipe the card back to an uninitialized state (no PIN or secure channel required)
    FactoryReset,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let manager = PcscDeviceManager::new()?;

    if matches!(cli.command, Commands::ListReaders) {
        for reader in manager.list_readers()? {
            println!(
                "{}{}",
                reader.name(),
                if reader.has_card() { " (card present)" } else { "" }
            );
        }
        return Ok(());
    }

    let reader_name = match &cli.reader {
        Some(name) => name.clone(),
        None => manager
            .list_readers()?
            .into_iter()
            .find(|r| r.has_card())
            .map(|r| r.name().to_string())
            .ok_or_else(|| anyhow::anyhow!("no reader with a card present was found"))?,
    };
    info!("using reader: {}", reader_name);

    let transport = manager.open_reader(&reader_name)?;

    match cli.command {
        Commands::ListReaders => unreachable!("handled above"),
        Commands::Select => select(transport)?,
        Commands::Init {
            pin,
            puk,
            pairing_password,
            output,
        } => init(transport, pin, puk, pairing_password, output.as_deref())?,
        Commands::Pair { output } => pair(transport, output.as_deref())?,
        Commands::Unpair { pairing } => unpair(transport, &pairing)?,
        Commands::Unlock { pairing } => unlock(transport, &pairing)?,
        Commands::GetStatus { pairing } => get_status(transport, &pairing)?,
        Commands::GetKeyPath { pairing } => get_key_path(transport, &pairing)?,
        Commands::GenerateKey { pairing } => generate_key(transport, &pairing)?,
        Commands::DeriveKey {
            pairing,
            key_path,
            make_current,
        } => derive_key(transport, &pairing, &key_path, make_current)?,
        Commands::ExportKey {
            pairing,
            key_path,
            export_option,
            make_current,
        } => export_key(transport, &pairing, &key_path, export_option, make_current)?,
        Commands::Sign {
            data,
            pairing,
            key_path,
        } => sign(transport, &pairing, &data, &key_path)?,
        Commands::ChangeCredential {
            credential_type,
            new_value,
            pairing,
        } => change_credential(transport, &pairing, credential_type, &new_value)?,
        Commands::UnblockPin {
            puk,
            new_pin,
            pairing,
        } => unblock_pin(transport, &pairing, &puk, &new_pin)?,
        Commands::SetPinlessPath { path, pairing } => {
            set_pinless_path(transport, &pairing, &path)?
        }
        Commands::LoadKey {
            private_key,
            pairing,
        } => load_key(transport, &pairing, &private_key)?,
        Commands::RemoveKey { pairing } => remove_key(transport, &pairing)?,
        Commands::GenerateMnemonic { words, pairing } => {
            generate_mnemonic(transport, &pairing, words)?
        }
        Commands::StoreData {
            data,
            record,
            pairing,
        } => store_data(transport, &pairing, record, data.as_bytes())?,
        Commands::GetData { record, pairing } => get_data(transport, &pairing, record)?,
        Commands::Ident { challenge } => ident(transport, challenge.as_deref())?,
        Commands::FactoryReset => factory_reset(transport)?,
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Connects to the card and loads any pairing info the caller supplied.
///
/// Most operations need the card paired and the secure channel open; callers
/// that do (all but SELECT, IDENT, and FACTORY RESET) should follow up with
/// [`Keycard::establish_session`].
fn connect(
    transport: PcscTransport,
    pairing: &PairingArgs,
) -> anyhow::Result<Keycard<CardExecutor>> {
    let executor = CardExecutor::new(transport);
    let mut keycard = Keycard::new(
        executor,
        Box::new(|prompt| rpassword_fallback(prompt)),
        Box::new(|prompt| confirm(prompt)),
    )?;

    if let Some(pairing_info) = pairing.load()? {
        keycard.set_pairing_info(pairing_info);
    }

    Ok(keycard)
}

fn rpassword_fallback(prompt: &str) -> String {
    use std::io::Write;
    print!("{prompt}: ");
    std::io::stdout().flush().ok();
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).ok();
    line.trim().to_string()
}

fn confirm(prompt: &str) -> bool {
    use std::io::Write;
    print!("{prompt} [y/N]: ");
    std::io::stdout().flush().ok();
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).ok();
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

fn pairing_info_from_bytes(key_bytes: &[u8], index: u8) -> anyhow::Result<PairingInfo> {
    if key_bytes.len() != 32 {
        anyhow::bail!("pairing key must be exactly 32 bytes, got {}", key_bytes.len());
    }
    Ok(PairingInfo {
        key: cipher::Key::clone_from_slice(key_bytes),
        index,
    })
}

fn load_pairing_file(path: &Path) -> anyhow::Result<PairingInfo> {
    let contents = fs::read_to_string(path)?;
    let mut lines = contents.lines();
    let index: u8 = lines
        .next()
        .ok_or_else(|| anyhow::anyhow!("pairing file is empty"))?
        .trim()
        .parse()?;
    let key_hex = lines
        .next()
        .ok_or_else(|| anyhow::anyhow!("pairing file is missing the key line"))?
        .trim();
    pairing_info_from_bytes(&hex::decode(key_hex)?, index)
}

fn save_pairing_file(path: &Path, pairing_info: &PairingInfo) -> anyhow::Result<()> {
    let contents = format!(
        "{}\n{}\n",
        pairing_info.index,
        hex::encode(pairing_info.key.as_slice())
    );
    fs::write(path, contents)?;
    Ok(())
}

fn print_kv(label: &str, value: impl fmt::Display) {
    println!("{label:<20} {value}");
}

fn select(transport: PcscTransport) -> anyhow::Result<()> {
    let mut keycard = connect(transport, &PairingArgs { file: None, key: None, index: None })?;
    let info = keycard.select_keycard()?;
    println!("{info}");
    Ok(())
}

fn init(
    transport: PcscTransport,
    pin: Option<String>,
    puk: Option<String>,
    pairing_password: Option<String>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let mut keycard = connect(transport, &PairingArgs { file: None, key: None, index: None })?;

    let secrets = if pin.is_some() || puk.is_some() || pairing_password.is_some() {
        Secrets::new(
            &pin.unwrap_or_else(|| "000000".to_string()),
            &puk.unwrap_or_else(|| "000000000000".to_string()),
            &pairing_password.unwrap_or_else(|| "KeycardDefaultPairing".to_string()),
        )
    } else {
        Secrets::generate()
    };

    keycard.initialize(&secrets, true)?;

    println!("Card initialized.");
    print_kv("PIN", secrets.pin());
    print_kv("PUK", secrets.puk());
    print_kv("Pairing password", secrets.pairing_pass());

    if let Some(path) = output {
        fs::write(path, format!("{}\n{}\n{}\n", secrets.pin(), secrets.puk(), secrets.pairing_pass()))?;
        println!("Secrets saved to {}", path.display());
    }

    Ok(())
}

fn pair(transport: PcscTransport, output: Option<&Path>) -> anyhow::Result<()> {
    let mut keycard = connect(transport, &PairingArgs { file: None, key: None, index: None })?;
    let pairing_info = keycard.pair()?;

    print_kv("Pairing index", pairing_info.index);
    print_kv("Pairing key", hex::encode(pairing_info.key.as_slice()));

    if let Some(path) = output {
        save_pairing_file(path, &pairing_info)?;
        println!("Pairing info saved to {}", path.display());
    }

    Ok(())
}

fn unpair(transport: PcscTransport, pairing: &PairingArgs) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(true)?;
    let index = keycard
        .pairing_info()
        .ok_or_else(|| anyhow::anyhow!("pairing information is required to unpair"))?
        .index;
    keycard.unpair(index, true)?;
    println!("Unpaired slot {index}.");
    Ok(())
}

fn unlock(transport: PcscTransport, pairing: &PairingArgs) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(true)?;
    println!("Secure channel open, PIN verified.");
    Ok(())
}

fn get_status(transport: PcscTransport, pairing: &PairingArgs) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(false)?;
    println!("{}", keycard.get_status()?);
    Ok(())
}

fn get_key_path(transport: PcscTransport, pairing: &PairingArgs) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(false)?;
    let path: DerivationPath = keycard.get_key_path()?;
    println!("{path}");
    Ok(())
}

fn generate_key(transport: PcscTransport, pairing: &PairingArgs) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(true)?;
    let key_uid = keycard.generate_key(true)?;
    print_kv("Key UID", hex::encode(key_uid));
    Ok(())
}

fn derive_key(
    transport: PcscTransport,
    pairing: &PairingArgs,
    key_path: &KeyPathArgs,
    make_current: bool,
) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(true)?;
    keycard.derive_key(&key_path.parse()?, make_current)?;
    println!("Key derived.");
    Ok(())
}

fn export_key(
    transport: PcscTransport,
    pairing: &PairingArgs,
    key_path: &KeyPathArgs,
    export_option: ExportOption,
    make_current: bool,
) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(true)?;

    let derive_mode = make_current.then_some(nexum_keycard::DeriveMode::Persistent);
    let exported = keycard.export_key_with_options(export_option, &key_path.parse()?, derive_mode)?;

    match exported {
        ExportedKey::Complete {
            public_key,
            private_key,
        } => {
            if let Some(public_key) = public_key {
                print_kv("Public key", hex::encode(public_key.to_sec1_bytes()));
            }
            print_kv("Private key", hex::encode(private_key.to_bytes()));
        }
        ExportedKey::PublicOnly(public_key) => {
            print_kv("Public key", hex::encode(public_key.to_sec1_bytes()));
        }
        ExportedKey::Extended {
            public_key,
            chain_code,
        } => {
            print_kv("Public key", hex::encode(public_key.to_sec1_bytes()));
            print_kv("Chain code", hex::encode(chain_code));
        }
    }

    Ok(())
}

fn sign(
    transport: PcscTransport,
    pairing: &PairingArgs,
    data: &str,
    key_path: &KeyPathArgs,
) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(true)?;

    let data = hex::decode(data)?;
    let signature = keycard.sign(&data, key_path.parse()?, true)?;
    print_kv("Signature", format!("0x{}", hex::encode(signature.as_bytes())));
    Ok(())
}

fn change_credential(
    transport: PcscTransport,
    pairing: &PairingArgs,
    credential_type: CredentialType,
    new_value: &str,
) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(true)?;
    keycard.change_credential(credential_type, new_value, true)?;
    println!("Credential changed.");
    Ok(())
}

fn unblock_pin(
    transport: PcscTransport,
    pairing: &PairingArgs,
    puk: &str,
    new_pin: &str,
) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(false)?;
    keycard.unblock_pin(puk, new_pin, true)?;
    println!("PIN unblocked.");
    Ok(())
}

fn set_pinless_path(transport: PcscTransport, pairing: &PairingArgs, path: &str) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(true)?;

    if path.is_empty() {
        keycard.set_pinless_path(None, true)?;
        println!("Pinless path cleared.");
    } else {
        let path = DerivationPath::from_str(path)?;
        keycard.set_pinless_path(Some(&path), true)?;
        println!("Pinless path set to {path}.");
    }

    Ok(())
}

fn load_key(transport: PcscTransport, pairing: &PairingArgs, private_key: &str) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(true)?;

    let bytes = hex::decode(private_key)?;
    let secret_key = k256::SecretKey::from_slice(&bytes)?;
    let key_uid = keycard.load_key(None, secret_key, true)?;
    print_kv("Key UID", hex::encode(key_uid));
    Ok(())
}

fn remove_key(transport: PcscTransport, pairing: &PairingArgs) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(true)?;
    keycard.remove_key(true)?;
    println!("Key removed.");
    Ok(())
}

fn generate_mnemonic(transport: PcscTransport, pairing: &PairingArgs, words: u8) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(true)?;
    let mnemonic = keycard.generate_mnemonic(words)?;
    println!("{}", mnemonic.to_phrase());
    Ok(())
}

fn store_data(
    transport: PcscTransport,
    pairing: &PairingArgs,
    record: PersistentRecord,
    data: &[u8],
) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(true)?;
    keycard.store_data(record, data)?;
    println!("Data stored.");
    Ok(())
}

fn get_data(transport: PcscTransport, pairing: &PairingArgs, record: PersistentRecord) -> anyhow::Result<()> {
    let mut keycard = connect(transport, pairing)?;
    keycard.establish_session(true)?;
    let data = keycard.get_data(record)?;
    print_kv("Data", hex::encode(data));
    Ok(())
}

fn ident(transport: PcscTransport, challenge: Option<&str>) -> anyhow::Result<()> {
    let mut keycard = connect(transport, &PairingArgs { file: None, key: None, index: None })?;

    let challenge_bytes = challenge.map(hex::decode).transpose()?;
    let challenge_array: Option<[u8; 32]> = match &challenge_bytes {
        Some(bytes) => Some(
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| anyhow::anyhow!("challenge must be exactly 32 bytes"))?,
        ),
        None => None,
    };

    let signature = keycard.ident(challenge_array.as_ref())?;
    print_kv("Public key", hex::encode(signature.public_key.to_sec1_bytes()));
    Ok(())
}

fn factory_reset(transport: PcscTransport) -> anyhow::Result<()> {
    let mut keycard = connect(transport, &PairingArgs { file: None, key: None, index: None })?;
    keycard.factory_reset(true)?;
    println!("Card factory reset.");
    Ok(())
}
