//! sse: searchable symmetric encryption over a directory of text files
//!
//! Commands:
//!   keygen <prf_key> <cipher_key>                      - generate both keys
//!   enc <prf_key> <cipher_key> <index> <plain> <ciph>  - encrypt a corpus and build its index
//!   token <keyword> <prf_key> <token_file>             - derive a search token
//!   search <index> <token_file> <ciph> <cipher_key>    - find and decrypt matching documents
//!   config show                                        - display current configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sse_core::{IndexFormat, SseConfig, Token};
use sse_crypto::{AesCbcCipher, AesEcbPrf, CipherKey, KeyMaterial, Prf, PrfKey};
use sse_index::{codec, BuildOptions, LocalStore, ProgressFn};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "sse",
    version,
    about = "Searchable symmetric encryption index",
    long_about = "sse: encrypt a directory of documents under a keyword index and search it with PRF tokens"
)]
struct Cli {
    /// Path to sse.toml configuration file
    #[arg(long, short = 'c', env = "SSE_CONFIG", default_value = "sse.toml")]
    config: PathBuf,

    /// Log level or filter directive (overrides config)
    #[arg(long, env = "SSE_LOG")]
    log: Option<String>,

    /// Log format (overrides config)
    #[arg(long, env = "SSE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a PRF key and a document key (32 random bytes each)
    Keygen {
        prf_key: PathBuf,
        cipher_key: PathBuf,
    },

    /// Encrypt every file in a directory and write the keyword index
    Enc {
        prf_key: PathBuf,
        cipher_key: PathBuf,
        /// Index file to write
        index: PathBuf,
        /// Directory of plaintext documents (non-recursive)
        plaintext_dir: PathBuf,
        /// Existing directory that receives the ciphertext records
        ciphertext_dir: PathBuf,
        /// Index wire format (overrides config)
        #[arg(long)]
        format: Option<FormatArg>,
        /// Worker threads, 0 = cpu_count (overrides config)
        #[arg(long, short = 'j')]
        workers: Option<usize>,
    },

    /// Derive the search token for a keyword
    Token {
        keyword: String,
        prf_key: PathBuf,
        /// File receiving the raw 16-byte token
        token_file: PathBuf,
        /// Append to the token file instead of replacing it (batched query)
        #[arg(long)]
        append: bool,
    },

    /// Look up tokens in the index and decrypt the matching documents
    Search {
        index: PathBuf,
        token_file: PathBuf,
        ciphertext_dir: PathBuf,
        cipher_key: PathBuf,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq)]
enum FormatArg {
    Records,
    Lines,
}

impl From<FormatArg> for IndexFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Records => IndexFormat::Records,
            FormatArg::Lines => IndexFormat::Lines,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, found) = load_config(&cli.config)?;

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = cli
        .log_format
        .unwrap_or_else(|| parse_log_format(&config.log.format));
    init_logging(&level, format);

    if !found {
        tracing::warn!(
            "config file not found: {}  (using defaults)",
            cli.config.display()
        );
    }

    match cli.command {
        Commands::Keygen { prf_key, cipher_key } => cmd_keygen(&prf_key, &cipher_key),
        Commands::Enc {
            prf_key,
            cipher_key,
            index,
            plaintext_dir,
            ciphertext_dir,
            format,
            workers,
        } => {
            let format = format.map(IndexFormat::from).unwrap_or(config.index.format);
            let workers = workers.unwrap_or(config.build.workers);
            cmd_enc(
                &prf_key,
                &cipher_key,
                &index,
                &plaintext_dir,
                &ciphertext_dir,
                format,
                workers,
            )
        }
        Commands::Token {
            keyword,
            prf_key,
            token_file,
            append,
        } => cmd_token(&keyword, &prf_key, &token_file, append),
        Commands::Search {
            index,
            token_file,
            ciphertext_dir,
            cipher_key,
            json,
        } => cmd_search(&index, &token_file, &ciphertext_dir, &cipher_key, json),
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &cli.config),
    }
}

/// Load the config file, returning defaults when it does not exist.
///
/// The flag is false when defaults were used; the warning is logged by the
/// caller once logging is up.
fn load_config(path: &Path) -> Result<(SseConfig, bool)> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("parsing config: {}", path.display()))?;
        Ok((config, true))
    } else {
        Ok((SseConfig::default(), false))
    }
}

fn parse_log_format(s: &str) -> LogFormat {
    if s.eq_ignore_ascii_case("json") {
        LogFormat::Json
    } else {
        LogFormat::Text
    }
}

fn init_logging(level: &str, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries command output; logs go to stderr
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── Progress helpers ──────────────────────────────────────────────────────────

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
}

fn make_progress_bar(prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(bar_style());
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

// ── `sse keygen` ──────────────────────────────────────────────────────────────

fn cmd_keygen(prf_key: &Path, cipher_key: &Path) -> Result<()> {
    let keys = KeyMaterial::generate().context("generating keys")?;
    keys.save(prf_key, cipher_key).context("writing key files")?;

    println!("PRF key:    {}", prf_key.display());
    println!("cipher key: {}", cipher_key.display());
    Ok(())
}

// ── `sse enc` ─────────────────────────────────────────────────────────────────

fn cmd_enc(
    prf_key: &Path,
    cipher_key: &Path,
    index_path: &Path,
    plaintext_dir: &Path,
    ciphertext_dir: &Path,
    format: IndexFormat,
    workers: usize,
) -> Result<()> {
    let keys = KeyMaterial::load(prf_key, cipher_key).context("loading keys")?;

    let pb = make_progress_bar("enc");
    let pb_clone = pb.clone();
    let progress: ProgressFn = Box::new(move |done, total, name| {
        pb_clone.set_length(total);
        pb_clone.set_position(done);
        pb_clone.set_message(name.to_string());
    });

    let (index, report) = sse_index::build(
        &LocalStore,
        &keys,
        plaintext_dir,
        ciphertext_dir,
        &BuildOptions { workers },
        Some(&progress),
    )
    .with_context(|| format!("encrypting {}", plaintext_dir.display()))?;
    pb.finish_with_message("done".to_string());

    let bytes = codec::encode(&index, format).context("encoding index")?;
    std::fs::write(index_path, &bytes)
        .with_context(|| format!("writing index: {}", index_path.display()))?;

    println!();
    println!("Encryption complete:");
    println!("  documents: {}", report.documents);
    println!("  words:     {}", report.words);
    println!("  tokens:    {}", report.tokens);
    println!("  plaintext: {}", fmt_bytes(report.bytes));
    println!(
        "  index:     {} ({}, {:?})",
        index_path.display(),
        fmt_bytes(bytes.len() as u64),
        format
    );
    Ok(())
}

// ── `sse token` ───────────────────────────────────────────────────────────────

fn cmd_token(keyword: &str, prf_key: &Path, token_file: &Path, append: bool) -> Result<()> {
    let token = derive_token(keyword, prf_key)?;
    write_token(token_file, &token, append)?;
    println!("{token}");
    Ok(())
}

fn derive_token(keyword: &str, prf_key: &Path) -> Result<Token> {
    let key = PrfKey::load(prf_key).context("loading PRF key")?;
    AesEcbPrf::new(key)
        .token(keyword.as_bytes())
        .context("deriving token")
}

fn write_token(token_file: &Path, token: &Token, append: bool) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(token_file)
        .with_context(|| format!("opening token file: {}", token_file.display()))?;
    file.write_all(token.as_bytes())
        .with_context(|| format!("writing token file: {}", token_file.display()))?;
    Ok(())
}

// ── `sse search` ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SearchOutput {
    matched: Vec<String>,
    results: Vec<SearchResult>,
}

#[derive(Debug, Serialize)]
struct SearchResult {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    plaintext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn run_search(
    index_path: &Path,
    token_file: &Path,
    ciphertext_dir: &Path,
    cipher_key: &Path,
) -> Result<SearchOutput> {
    let index_bytes = std::fs::read(index_path)
        .with_context(|| format!("reading index: {}", index_path.display()))?;
    let index = codec::deserialize(&index_bytes);

    let token_bytes = std::fs::read(token_file)
        .with_context(|| format!("reading token file: {}", token_file.display()))?;
    let (tokens, rest) = Token::parse_batch(&token_bytes);
    if !rest.is_empty() {
        tracing::warn!(
            file = %token_file.display(),
            trailing = rest.len(),
            "ignoring partial token at end of token file"
        );
    }

    let key = CipherKey::load(cipher_key).context("loading cipher key")?;
    let cipher = AesCbcCipher::new(key);
    let hits = sse_index::search(&LocalStore, &index, &tokens, ciphertext_dir, &cipher);

    let matched = hits.iter().map(|hit| hit.path.to_string()).collect();
    let results = hits
        .into_iter()
        .map(|hit| match hit.result {
            Ok(plaintext) => SearchResult {
                path: hit.path.to_string(),
                plaintext: Some(String::from_utf8_lossy(&plaintext).into_owned()),
                error: None,
            },
            Err(e) => SearchResult {
                path: hit.path.to_string(),
                plaintext: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    Ok(SearchOutput { matched, results })
}

fn cmd_search(
    index_path: &Path,
    token_file: &Path,
    ciphertext_dir: &Path,
    cipher_key: &Path,
    json: bool,
) -> Result<()> {
    let output = run_search(index_path, token_file, ciphertext_dir, cipher_key)?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&output).context("serializing search results")?;
        println!("{rendered}");
        return Ok(());
    }

    println!("Matched {} document(s):", output.matched.len());
    for path in &output.matched {
        println!("  {path}");
    }
    for result in &output.results {
        println!();
        println!("── {} ──", result.path);
        match (&result.plaintext, &result.error) {
            (Some(text), _) => println!("{text}"),
            (None, Some(error)) => println!("error: {error}"),
            (None, None) => {}
        }
    }
    Ok(())
}

// ── `sse config show` ─────────────────────────────────────────────────────────

fn cmd_config_show(config: &SseConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!(
            "# Configuration: defaults (no file at {})",
            config_path.display()
        );
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn fmt_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_enc_args() {
        let cli = Cli::try_parse_from([
            "sse", "enc", "prf.key", "aes.key", "index.bin", "plain", "cipher", "--format",
            "lines", "-j", "4",
        ])
        .unwrap();
        match cli.command {
            Commands::Enc {
                index,
                format,
                workers,
                ..
            } => {
                assert_eq!(index, PathBuf::from("index.bin"));
                assert_eq!(format, Some(FormatArg::Lines));
                assert_eq!(workers, Some(4));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_missing_args() {
        assert!(Cli::try_parse_from(["sse", "token", "quick"]).is_err());
        assert!(Cli::try_parse_from(["sse", "enc", "--format", "csv"]).is_err());
    }

    #[test]
    fn test_load_config_missing_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let (config, found) = load_config(&tmp.path().join("absent.toml")).unwrap();
        assert!(!found);
        assert_eq!(config.index.format, IndexFormat::Records);
        assert_eq!(config.build.workers, 1);
    }

    #[test]
    fn test_load_config_rejects_bad_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sse.toml");
        std::fs::write(&path, "[index]\nformat = \"csv\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_token_file_overwrite_and_append() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tokens");
        let a = Token::from_bytes([1u8; 16]);
        let b = Token::from_bytes([2u8; 16]);

        write_token(&path, &a, false).unwrap();
        write_token(&path, &b, false).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b.as_bytes());

        write_token(&path, &a, true).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let (tokens, rest) = Token::parse_batch(&bytes);
        assert_eq!(tokens, vec![b, a]);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_keygen_enc_token_search() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        let plain = dir.join("plain");
        let cipher = dir.join("cipher");
        std::fs::create_dir(&plain).unwrap();
        std::fs::create_dir(&cipher).unwrap();
        std::fs::write(plain.join("a.txt"), b"the quick fox").unwrap();
        std::fs::write(plain.join("b.txt"), b"a slow turtle").unwrap();

        let prf_key = dir.join("prf.key");
        let aes_key = dir.join("aes.key");
        let index = dir.join("index.bin");
        let tokens = dir.join("tokens");

        cmd_keygen(&prf_key, &aes_key).unwrap();
        cmd_enc(&prf_key, &aes_key, &index, &plain, &cipher, IndexFormat::Lines, 1).unwrap();

        cmd_token("quick", &prf_key, &tokens, false).unwrap();
        let output = run_search(&index, &tokens, &cipher, &aes_key).unwrap();
        assert_eq!(output.matched.len(), 1);
        assert!(output.matched[0].ends_with("a.txt"));
        assert_eq!(output.results[0].plaintext.as_deref(), Some("the quick fox"));

        cmd_token("slow", &prf_key, &tokens, true).unwrap();
        let output = run_search(&index, &tokens, &cipher, &aes_key).unwrap();
        assert_eq!(output.matched.len(), 2);

        cmd_token("absent", &prf_key, &tokens, false).unwrap();
        let output = run_search(&index, &tokens, &cipher, &aes_key).unwrap();
        assert!(output.matched.is_empty());
    }

    #[test]
    fn test_empty_keyword_rejected() {
        let tmp = TempDir::new().unwrap();
        let prf_key = tmp.path().join("prf.key");
        PrfKey::from_bytes([3u8; 32]).save(&prf_key).unwrap();
        let err = cmd_token("", &prf_key, &tmp.path().join("t"), false).unwrap_err();
        assert!(format!("{err:#}").contains("keyword must not be empty"));
    }

    #[test]
    fn test_fmt_bytes() {
        assert_eq!(fmt_bytes(512), "512 B");
        assert_eq!(fmt_bytes(2048), "2.0 KB");
        assert_eq!(fmt_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
