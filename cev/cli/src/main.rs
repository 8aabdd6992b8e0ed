#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

//! cev reports cert-manager certificates which are about to expire or have expired.
//!
//! Certificates expiring in 10 days, with the current context of `~/.kube/config`,
//!
//! ```
//! $ cev
//! ```
//!
//! Every day at midnight, from inside the cluster, as JSON,
//!
//! ```
//! $ cev --in-cluster --expire-in 30 --output json daemon --cron "0 0 0 * * *"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use cron::Schedule;
use log::{debug, error, info};

use cev::{CertificateSource, ExpirationReport, ExpirationReportJSON, Verifier};

use crate::cluster::ClusterSource;

mod cluster;
mod crd;

#[doc(hidden)]
#[derive(Debug, Parser)]
#[command(author, about, version)]
struct Opts {
    /// Path to kubeconfig, $KUBECONFIG or ~/.kube/config if omitted
    #[arg(long)]
    kubeconfig: Option<PathBuf>,
    /// Context in kubeconfig, current context if omitted
    #[arg(long)]
    context: Option<String>,
    /// Use service account of the pod instead of kubeconfig
    #[arg(long, conflicts_with_all = ["kubeconfig", "context"])]
    in_cluster: bool,
    /// How many days until the certificate expiration that should be alerted
    #[arg(short, long, default_value = "10", allow_negative_numbers = true)]
    expire_in: i64,
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: Output,
    /// ASCII
    #[arg(long)]
    ascii: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[doc(hidden)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Output {
    Text,
    Json,
}

#[doc(hidden)]
#[derive(Debug, Subcommand)]
enum Commands {
    /// Verify certificates once (default)
    Check,
    /// Verify certificates on schedule
    Daemon {
        /// Cron
        #[arg(short, long, env = "CRON", default_value = "0 0 0 * * *")]
        cron: String,
    },
}

#[doc(hidden)]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let opts: Opts = Opts::parse();

    let config = cluster::build_config(
        opts.in_cluster,
        opts.kubeconfig.as_deref(),
        opts.context.as_deref(),
    )
    .await
    .context("unable to generate Kubernetes configuration")?;
    let source =
        ClusterSource::try_from(config).context("unable to connect to Kubernetes cluster")?;

    match &opts.command {
        Some(Commands::Daemon { cron }) => daemon_command(&opts, &source, cron).await?,
        Some(Commands::Check) | None => check_command(&opts, &source).await?,
    }
    Ok(())
}

async fn check_command<S>(opts: &Opts, source: &S) -> anyhow::Result<()>
where
    S: CertificateSource,
{
    let verifier = Verifier::new(opts.expire_in);
    let reports = verifier
        .verify(source)
        .await
        .context("unable to verify certificates expiration")?;
    info!(
        "{} certificate(s) expire in {} days or have expired",
        reports.len(),
        opts.expire_in
    );

    let rendered = render(opts.output, use_ascii(opts), &reports)?;
    if !rendered.is_empty() {
        println!("{rendered}");
    }
    Ok(())
}

async fn daemon_command<S, T>(opts: &Opts, source: &S, cron: T) -> anyhow::Result<()>
where
    S: CertificateSource,
    T: AsRef<str>,
{
    use std::str::FromStr as _;

    let cron = cron.as_ref();
    let schedule = Schedule::from_str(cron)?;
    info!("verify certificates with cron {cron}");

    for next in schedule.upcoming(Utc) {
        debug!("verify certificates at {next:?}");
        loop {
            if Utc::now() >= next {
                break;
            }
            tokio::time::sleep(Duration::from_millis(999)).await;
        }

        if let Err(e) = check_command(opts, source).await {
            error!("{e:#}");
        }
    }
    Ok(())
}

fn use_ascii(opts: &Opts) -> bool {
    opts.ascii || !supports_unicode::on(supports_unicode::Stream::Stdout)
}

fn render(output: Output, ascii: bool, reports: &[ExpirationReport]) -> anyhow::Result<String> {
    match output {
        Output::Text => {
            let lines: Vec<String> = reports
                .iter()
                .map(|r| if ascii { format!("{r:#}") } else { format!("{r}") })
                .collect();
            Ok(lines.join("\n"))
        }
        Output::Json => {
            let reports: Vec<ExpirationReportJSON> =
                reports.iter().map(ExpirationReportJSON::new).collect();
            Ok(serde_json::to_string_pretty(&reports)?)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use cev::{CertificateRecord, Reason};
    use chrono::Duration as ChronoDuration;

    fn build_opts(args: &[&str]) -> Opts {
        let mut argv = vec!["cev"];
        argv.extend_from_slice(args);
        Opts::try_parse_from(argv).unwrap()
    }

    fn build_records() -> Vec<CertificateRecord> {
        let now = Utc::now();
        vec![
            CertificateRecord {
                namespace: "web".into(),
                name: "expired".into(),
                dns_names: vec!["expired.example.com".into()],
                not_after: Some(now - ChronoDuration::days(3)),
            },
            CertificateRecord {
                namespace: "web".into(),
                name: "pending".into(),
                ..Default::default()
            },
            CertificateRecord {
                namespace: "api".into(),
                name: "soon".into(),
                dns_names: vec!["soon.example.com".into()],
                not_after: Some(now + ChronoDuration::days(5)),
            },
        ]
    }

    #[test]
    fn t_default_opts() {
        let opts = build_opts(&[]);
        assert_eq!(10, opts.expire_in);
        assert_eq!(Output::Text, opts.output);
        assert!(!opts.in_cluster);
        assert!(opts.kubeconfig.is_none());
        assert!(opts.command.is_none());
    }

    #[test]
    fn t_opts() {
        let opts = build_opts(&[
            "--kubeconfig",
            "/tmp/kubeconfig",
            "--context",
            "prod",
            "-e",
            "-5",
            "-o",
            "json",
            "--ascii",
            "check",
        ]);
        assert_eq!(Some(PathBuf::from("/tmp/kubeconfig")), opts.kubeconfig);
        assert_eq!(Some("prod"), opts.context.as_deref());
        assert_eq!(-5, opts.expire_in);
        assert_eq!(Output::Json, opts.output);
        assert!(opts.ascii);
        assert!(matches!(opts.command, Some(Commands::Check)));
    }

    #[test]
    fn t_daemon_opts() {
        let opts = build_opts(&["--in-cluster", "daemon", "--cron", "0 */5 * * * *"]);
        assert!(opts.in_cluster);
        match opts.command {
            Some(Commands::Daemon { cron }) => assert_eq!("0 */5 * * * *", cron),
            _ => panic!("expect daemon command"),
        }
    }

    #[test]
    fn t_in_cluster_conflicts_with_kubeconfig() {
        let argv = ["cev", "--in-cluster", "--kubeconfig", "/tmp/kubeconfig"];
        assert!(Opts::try_parse_from(argv).is_err());
    }

    #[test]
    fn t_render_text() -> anyhow::Result<()> {
        let reports = Verifier::new(10).evaluate(build_records());
        let rendered = render(Output::Text, true, &reports)?;
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(2, lines.len());
        assert!(lines[0]
            .starts_with("[x] web/expired (expired.example.com): Certificate is expired"));
        assert!(lines[1].starts_with(
            "[-] api/soon (soon.example.com): Certificate is about to expire in less than 10 days"
        ));

        let rendered = render(Output::Text, false, &reports)?;
        assert!(rendered.starts_with('\u{274c}'));

        assert_eq!("", render(Output::Text, true, &[])?);
        Ok(())
    }

    #[test]
    fn t_render_json() -> anyhow::Result<()> {
        let reports = Verifier::new(10).evaluate(build_records());
        let rendered = render(Output::Json, false, &reports)?;
        let json: Vec<ExpirationReportJSON> = serde_json::from_str(&rendered)?;
        assert_eq!(2, json.len());
        assert_eq!("EXPIRED", json[0].state);
        assert_eq!("expired", json[0].name);
        assert_eq!("WARNING", json[1].state);
        assert_eq!(Reason::Expiring { days: 10 }.to_string(), json[1].reason);

        assert_eq!("[]", render(Output::Json, false, &[])?);
        Ok(())
    }

    #[tokio::test]
    async fn t_check_command() -> anyhow::Result<()> {
        let opts = build_opts(&["--ascii"]);
        check_command(&opts, &build_records()).await
    }

    #[tokio::test]
    async fn t_daemon_command_invalid_cron() {
        let opts = build_opts(&[]);
        let r = daemon_command(&opts, &build_records(), "every day").await;
        assert!(r.is_err());
    }
}
