use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use tracing::info;
use url::Url;

use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use mailglean_config::OauthConfig;
use mailglean_mail::auth::exchange_code;

#[derive(Debug, Args)]
pub struct AuthArgs {
    /// Authorization code copied from the consent redirect
    #[arg(long, conflicts_with = "listen")]
    pub code: Option<String>,
    /// Listen on the configured redirect URI and capture the code from the
    /// browser redirect
    #[arg(long)]
    pub listen: bool,
}

#[derive(Debug, Serialize)]
struct AuthReport {
    credentials_path: String,
}

pub fn auth(ctx: &Context<'_>, args: AuthArgs) -> Result<()> {
    let oauth = ctx
        .config
        .oauth
        .as_ref()
        .ok_or_else(|| invalid_input("auth requires an [oauth] section in the config"))?;

    let code = match (args.code, args.listen) {
        (Some(code), _) => code,
        (None, true) => capture_code(oauth)?,
        (None, false) => {
            return Err(invalid_input("pass --code or --listen"));
        }
    };

    let credentials = exchange_code(
        &oauth.client_id,
        &oauth.client_secret,
        &oauth.redirect_uri,
        &code,
    )
    .context("exchange authorization code")?;

    let path = &ctx.config.mailbox.credentials_path;
    credentials
        .save(path)
        .with_context(|| format!("save credentials {}", path.display()))?;

    if ctx.json {
        return print_json(&AuthReport {
            credentials_path: path.display().to_string(),
        });
    }
    println!("Credentials saved to {}", path.display());
    Ok(())
}

/// One-shot local listener: accept a single browser redirect on the
/// configured redirect URI and pull `code` out of its query string.
fn capture_code(oauth: &OauthConfig) -> Result<String> {
    let redirect = Url::parse(&oauth.redirect_uri)
        .with_context(|| format!("parse redirect uri {}", oauth.redirect_uri))?;
    let host = redirect
        .host_str()
        .ok_or_else(|| invalid_input("redirect uri has no host"))?;
    let port = redirect
        .port_or_known_default()
        .ok_or_else(|| invalid_input("redirect uri has no port"))?;

    let listener =
        TcpListener::bind((host, port)).with_context(|| format!("bind {host}:{port}"))?;
    info!(%host, port, "waiting for the consent redirect");

    let (stream, _) = listener.accept().context("accept redirect connection")?;
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .context("read redirect request")?;

    let code = parse_code(&request_line);
    let mut stream = reader.into_inner();
    let page = if code.is_some() {
        "Authorization code received. You can close this window."
    } else {
        "No code provided."
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        page.len(),
        page
    );
    stream.write_all(response.as_bytes()).ok();

    code.ok_or_else(|| invalid_input("redirect did not include an authorization code"))
}

fn parse_code(request_line: &str) -> Option<String> {
    // "GET /?code=... HTTP/1.1"
    let path = request_line.split_whitespace().nth(1)?;
    let url = Url::parse(&format!("http://localhost{path}")).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::parse_code;

    #[test]
    fn parses_code_from_request_line() {
        let code = parse_code("GET /?code=4%2FabcDEF&scope=email HTTP/1.1");
        assert_eq!(code.as_deref(), Some("4/abcDEF"));
    }

    #[test]
    fn missing_or_empty_code_is_none() {
        assert!(parse_code("GET / HTTP/1.1").is_none());
        assert!(parse_code("GET /?code= HTTP/1.1").is_none());
        assert!(parse_code("").is_none());
    }
}
