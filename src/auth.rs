//! Interactive browser sign-in against the Microsoft identity platform.
//!
//! Every run re-authenticates: no refresh tokens, no keyring, no cached
//! access tokens. The tool is a one-shot batch job and the token only has
//! to outlive the scan.

use oauth2::TokenResponse;
use oauth2::basic::BasicClient;
use oauth2::reqwest::http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, CsrfToken, PkceCodeChallenge, RedirectUrl, Scope,
    TokenUrl,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tiny_http::{Response, Server};
use url::Url;

use crate::config::Config;
use crate::error::{Result, SweepError};

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/Mail.Read";

/// How long we wait for the user to finish signing in before giving up.
const SIGN_IN_TIMEOUT: Duration = Duration::from_secs(180);

fn auth_err(msg: impl Into<String>) -> SweepError {
    SweepError::Auth(msg.into())
}

/// Perform the Authorization Code + PKCE flow. Opens the system browser and
/// captures the code via a tiny local server on the loopback redirect address.
/// Returns the access token for the Graph API.
pub fn sign_in(cfg: &Config) -> Result<String> {
    let client_id = ClientId::new(cfg.client_id.clone());

    let authority = format!("https://login.microsoftonline.com/{}", cfg.tenant_id);
    let auth_url = AuthUrl::new(format!("{authority}/oauth2/v2.0/authorize"))
        .map_err(|e| auth_err(format!("invalid authorize endpoint: {e}")))?;
    let token_url = TokenUrl::new(format!("{authority}/oauth2/v2.0/token"))
        .map_err(|e| auth_err(format!("invalid token endpoint: {e}")))?;

    let redirect_uri = cfg.redirect_uri();

    // Parse redirect_uri so bind address matches exactly
    let redirect = Url::parse(redirect_uri)
        .map_err(|e| auth_err(format!("Invalid redirect_uri '{redirect_uri}': {e}")))?;

    let host = redirect
        .host_str()
        .ok_or_else(|| auth_err(format!("redirect_uri missing host: {redirect_uri}")))?
        .to_string();

    let port = redirect
        .port_or_known_default()
        .ok_or_else(|| auth_err(format!("redirect_uri missing/unknown port: {redirect_uri}")))?;

    // For local loopback flows, prefer binding explicitly to loopback.
    // If redirect host is "localhost" or "127.0.0.1", bind to 127.0.0.1.
    let bind_ip: IpAddr = match host.as_str() {
        "localhost" | "127.0.0.1" => IpAddr::V4(Ipv4Addr::LOCALHOST),
        // If user put a specific IP, try it.
        other => other.parse::<IpAddr>().map_err(|_| {
            auth_err(format!(
                "redirect_uri host must be localhost/127.0.0.1 or an IP: {other}"
            ))
        })?,
    };

    let bind_addr = SocketAddr::new(bind_ip, port);

    // 1) Start listening FIRST (fixes the race)
    let server = Server::http(bind_addr).map_err(|e| {
        auth_err(format!(
            "Failed to bind sign-in callback server on {bind_addr}: {e:?}"
        ))
    })?;

    // 2) Configure client (public client: PKCE, no secret)
    let oauth_client = BasicClient::new(client_id, None, auth_url, Some(token_url))
        .set_redirect_uri(
            RedirectUrl::new(redirect_uri.to_string())
                .map_err(|e| auth_err(format!("invalid redirect_uri: {e}")))?,
        );

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

    let (authorize_url, _csrf_token) = oauth_client
        .authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new(GRAPH_SCOPE.to_string()))
        .set_pkce_challenge(pkce_challenge)
        .url();

    println!("Open this URL in your browser to sign in:\n{authorize_url}");
    // best-effort: don't fail if browser can't be opened
    if let Err(e) = open::that(authorize_url.as_str()) {
        eprintln!("Warning: could not open browser automatically: {e}");
    }

    // 3) Wait for callback
    let mut code_opt: Option<String> = None;
    let wait_until = Instant::now() + SIGN_IN_TIMEOUT;

    while Instant::now() < wait_until {
        let Ok(maybe_request) = server.recv_timeout(Duration::from_millis(500)) else {
            continue;
        };

        let Some(request) = maybe_request else {
            continue;
        };

        // request.url() is a path+query like "/callback?code=...&state=..."
        // Build a full URL using the SAME host/port as redirect_uri.
        let full = format!("http://{}:{}{}", host, port, request.url());

        match Url::parse(&full) {
            Ok(parsed) => {
                for (k, v) in parsed.query_pairs() {
                    if k == "code" {
                        code_opt = Some(v.into_owned());
                    }
                }

                if code_opt.is_some() {
                    let _ = request.respond(Response::from_string(
                        "Sign-in complete. You can close this tab.",
                    ));
                    break;
                } else {
                    let _ = request.respond(Response::from_string(
                        "No code found in redirect. You can close this tab.",
                    ));
                }
            }
            Err(_) => {
                let _ = request.respond(Response::from_string("Bad redirect"));
            }
        }
    }

    let code =
        code_opt.ok_or_else(|| auth_err("no authorization code received within timeout"))?;

    // 4) Exchange code for tokens
    let token = oauth_client
        .exchange_code(AuthorizationCode::new(code))
        .set_pkce_verifier(pkce_verifier)
        .request(http_client)
        .map_err(|e| auth_err(format!("token exchange failed: {e}")))?;

    Ok(token.access_token().secret().to_string())
}
