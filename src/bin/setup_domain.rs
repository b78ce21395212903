//! setup-domain - provision a single custom domain from the command line
//!
//! Usage: setup-domain <subdomain>
//!
//! Reads the same environment variables as the HTTP service, prints the
//! outcome as JSON and exits 0 only when both steps succeeded.

use domain_provisioner::{build_provisioner, Config};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let Some(subdomain) = std::env::args().nth(1) else {
        eprintln!("Usage: setup-domain <subdomain>");
        eprintln!("Example: setup-domain salt");
        return ExitCode::from(2);
    };

    let cfg = match Config::from_lookup(|key| std::env::var(key).ok()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Set CF_API_TOKEN and CF_ZONE_ID (e.g. in your shell or a .env loader).");
            return ExitCode::from(2);
        }
    };

    let provisioner = build_provisioner(&cfg);
    let outcome = match provisioner.provision(Some(&subdomain)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };

    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("error: failed to render outcome: {}", e),
    }

    if outcome.overall_success() {
        eprintln!(
            "Domain {}.{} configured; allow a few minutes for DNS propagation",
            subdomain.trim().to_ascii_lowercase(),
            cfg.base_domain
        );
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
