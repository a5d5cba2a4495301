//! `edgeauth` — generate signed edge-authorization tokens.
//!
//! Validates and normalizes the command-line inputs (secret key, scope,
//! time window, optional claims) and hands them to `edgeauth-token` for
//! assembly and signing. The token is printed to stdout as a single line;
//! errors go to stderr. Usage errors exit 2 (clap's convention), semantic
//! validation failures exit 1.

use chrono::Utc;
use clap::Parser;
use edgeauth_token::{
    Algorithm, DEFAULT_ACL_DELIMITER, DEFAULT_FIELD_DELIMITER, Scope, SignedToken, TokenClaims,
    TokenError, TokenSigner, decode_key, parse_duration,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "edgeauth", version, about = "Generate signed edge-authorization tokens")]
struct Cli {
    /// Shared secret in hex
    #[arg(short, long, env = "EDGEAUTH_KEY")]
    key: String,

    /// Token TTL (e.g. 300s, 15m, 1h)
    #[arg(short, long)]
    duration: Option<String>,

    /// ACL pattern (e.g. /*). Repeat to join multiple patterns
    #[arg(long)]
    acl: Vec<String>,

    /// Single URL path to authorize (e.g. /path/file)
    #[arg(long)]
    url: Option<String>,

    /// Bind the token to a client IP
    #[arg(long)]
    ip: Option<String>,

    /// Session ID
    #[arg(long)]
    id: Option<String>,

    /// Arbitrary payload
    #[arg(long)]
    data: Option<String>,

    /// Additional salt (covered by the signature, never emitted)
    #[arg(long)]
    salt: Option<String>,

    /// Explicit start time (unix epoch); 0 means unset
    #[arg(long, default_value_t = 0)]
    start: i64,

    /// Explicit expiration time (unix epoch). Overrides --duration
    #[arg(long)]
    exp: Option<i64>,

    /// HMAC algorithm (sha256, sha1 or md5)
    #[arg(long, default_value = "sha256")]
    algo: Algorithm,

    /// Field delimiter
    #[arg(long, default_value = DEFAULT_FIELD_DELIMITER)]
    field_delim: String,

    /// Delimiter joining multiple --acl patterns
    #[arg(long, default_value = DEFAULT_ACL_DELIMITER)]
    acl_delim: String,

    /// URL-encode ip, id and data (and url in URL mode) before signing
    #[arg(long)]
    escape_early: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(token) => println!("{token}"),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<SignedToken> {
    let scope = resolve_scope(&cli)?;
    let key = decode_key(&cli.key)?;

    let start_time = (cli.start > 0).then_some(cli.start);
    let expire_time = resolve_expiry(&cli, start_time, Utc::now().timestamp())?;
    tracing::debug!(expire_time, start = ?start_time, "resolved token window");

    let mut claims = TokenClaims::new(scope, expire_time).escape_early(cli.escape_early);
    if let Some(start) = start_time {
        claims = claims.start_time(start);
    }
    if let Some(ip) = non_empty(cli.ip.as_deref()) {
        claims = claims.client_ip(ip);
    }
    if let Some(id) = non_empty(cli.id.as_deref()) {
        claims = claims.session_id(id);
    }
    if let Some(data) = non_empty(cli.data.as_deref()) {
        claims = claims.payload(data);
    }
    if let Some(salt) = non_empty(cli.salt.as_deref()) {
        claims = claims.salt(salt);
    }

    let signer = TokenSigner::new(key, cli.algo)?.field_delimiter(cli.field_delim.as_str());
    Ok(signer.sign(&claims)?)
}

/// Exactly one of `--acl` and `--url` must be given. Repeated `--acl`
/// patterns are joined with the ACL delimiter before reaching the signer.
fn resolve_scope(cli: &Cli) -> Result<Scope, TokenError> {
    let patterns: Vec<&str> = cli
        .acl
        .iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    let url = non_empty(cli.url.as_deref());

    match (patterns.is_empty(), url) {
        (false, None) => Ok(Scope::Acl(patterns.join(&cli.acl_delim))),
        (true, Some(url)) => Ok(Scope::Url(url)),
        _ => Err(TokenError::ModeConflict),
    }
}

/// An explicit positive `--exp` wins; otherwise `--duration` is added to the
/// start time when set, else to the current wall clock.
fn resolve_expiry(cli: &Cli, start_time: Option<i64>, now: i64) -> Result<i64, TokenError> {
    if let Some(exp) = cli.exp.filter(|e| *e > 0) {
        return Ok(exp);
    }
    let Some(spec) = cli.duration.as_deref() else {
        return Err(TokenError::MissingExpiry);
    };
    let seconds = parse_duration(spec)?;
    Ok(start_time.unwrap_or(now) + seconds)
}

/// Empty-string flag values count as absent, matching common shell usage
/// like `--ip ""`.
fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}
