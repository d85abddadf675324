//! Subcommand implementations for the `srtp-sdes` binary.

use anyhow::{bail, Context, Result};
use clap::Args;

use srtp_sdes::codec;
use srtp_sdes::config::Config;
use srtp_sdes::srtp::{
    self, suite, CryptoAttribute, CryptoSuite, KeyFamily, MacAlgorithm, MasterKeyMaterial,
};

/// Authentication key, given as text or as hex.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct KeyArg {
    /// Authentication key as UTF-8 text
    #[arg(short, long)]
    key: Option<String>,

    /// Authentication key as hex
    #[arg(long)]
    key_hex: Option<String>,
}

impl KeyArg {
    fn bytes(&self) -> Result<Vec<u8>> {
        match (&self.key, &self.key_hex) {
            (Some(text), _) => Ok(text.as_bytes().to_vec()),
            (None, Some(hex)) => Ok(codec::hex_decode(hex).context("Invalid --key-hex")?),
            (None, None) => bail!("an authentication key is required"),
        }
    }
}

/// Tag length for `--suite`, or the untruncated digest.
fn tag_len(suite: Option<&str>) -> Result<usize> {
    match suite {
        Some(name) => Ok(srtp::lookup(name)?.tag_len),
        None => Ok(MacAlgorithm::HmacSha1.digest_len()),
    }
}

fn print_material(material: &MasterKeyMaterial) {
    let suite = material.suite();
    println!("suite:        {}", suite);
    println!(
        "key material: {} bytes ({} key + {} salt)",
        material.master_key().len() + material.master_salt().len(),
        material.master_key().len(),
        material.master_salt().len()
    );
    println!("auth tag:     {} bytes (SRTCP {})", suite.tag_len, suite.srtcp_tag_len);
}

pub fn list_suites() {
    println!(
        "{:<26} {:>4} {:>5} {:>9} {:>4}",
        "SUITE", "KEY", "SALT", "AUTH KEY", "TAG"
    );
    for suite in suite::all() {
        println!(
            "{:<26} {:>4} {:>5} {:>9} {:>4}",
            suite.name, suite.cipher_key_len, suite.cipher_salt_len, suite.auth_key_len, suite.tag_len
        );
    }
}

pub fn inspect(input: &str, suite_name: Option<&str>) -> Result<()> {
    let input = input.trim();

    if input.starts_with("a=") || input.starts_with("crypto") {
        let attribute = CryptoAttribute::parse(input)?;
        println!("tag:          {}", attribute.tag);
        print_material(attribute.master_key());
        if let Some(lifetime) = attribute.lifetime {
            println!("lifetime:     {} packets", lifetime);
        }
        if let Some(mki) = attribute.mki {
            println!("mki:          {} ({} bytes)", mki.value, mki.length);
        }
        for param in &attribute.session_params {
            println!("session:      {}", param);
        }
        return Ok(());
    }

    let name = suite_name.context("--suite is required for a bare inline key")?;
    let material = MasterKeyMaterial::decode_inline(srtp::lookup(name)?, input)?;
    print_material(&material);
    Ok(())
}

pub fn generate(suite_name: Option<&str>, tag: u32) -> Result<()> {
    let config = Config::load()?;

    let suite: &'static CryptoSuite = match suite_name {
        Some(name) => srtp::lookup(name)?,
        None => config
            .preferred()?
            .first()
            .copied()
            .context("No preferred suites configured")?,
    };

    let attribute = CryptoAttribute::generate(tag, suite, config.attribute_lifetime())?;
    println!("{}", attribute);
    Ok(())
}

pub fn derive(attribute: &str, rtcp: bool, index: u64) -> Result<()> {
    let config = Config::load()?;
    let attribute = CryptoAttribute::parse(attribute)?;

    let family = if rtcp {
        KeyFamily::Srtcp
    } else {
        KeyFamily::Srtp
    };
    let r = srtp::derivation_context(index, config.key_derivation_rate);
    let keys = srtp::derive_session_keys(attribute.master_key(), family, r);

    println!("suite:       {}", keys.suite());
    println!("r:           {}", r);
    println!("cipher key:  {}", codec::hex_encode(keys.cipher_key()));
    println!("cipher salt: {}", codec::hex_encode(keys.cipher_salt()));
    println!("auth key:    {}", codec::hex_encode(keys.auth_key()));
    Ok(())
}

pub fn tag(key: &KeyArg, message: &str, suite: Option<&str>) -> Result<()> {
    let tag = srtp::compute_tag(&key.bytes()?, message.as_bytes(), tag_len(suite)?);
    println!("{}", tag.to_hex());
    Ok(())
}

pub fn verify(key: &KeyArg, message: &str, presented: &str, suite: Option<&str>) -> Result<()> {
    let presented = codec::hex_decode(presented).context("Invalid --tag")?;
    if !srtp::verify_tag(&key.bytes()?, message.as_bytes(), &presented, tag_len(suite)?) {
        bail!("authentication tag mismatch");
    }
    println!("valid");
    Ok(())
}

pub fn config(prefer: Vec<String>, kdr: Option<u64>, lifetime: Option<u64>) -> Result<()> {
    let mut config = Config::load()?;
    let changed = !prefer.is_empty() || kdr.is_some() || lifetime.is_some();

    if !prefer.is_empty() {
        config.preferred_suites = prefer;
        config.preferred()?;
    }
    if let Some(kdr) = kdr {
        config.key_derivation_rate = kdr;
    }
    if let Some(lifetime) = lifetime {
        config.lifetime = lifetime;
    }

    if changed {
        config.save()?;
        tracing::info!("Saved configuration to {}", Config::config_path()?.display());
    }

    print!(
        "{}",
        toml::to_string_pretty(&config).context("Failed to serialize config")?
    );
    Ok(())
}
