use std::fmt;

use chrono::{DateTime, Utc};
use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};

/// Why a certificate got reported
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reason {
    /// Certificate expires within the threshold
    Expiring {
        /// Threshold in days
        days: i64,
    },
    /// Certificate expired
    Expired,
}

impl Reason {
    /// Short upper-case name of the state
    ///
    /// ```
    /// # use cev::Reason;
    /// assert_eq!("WARNING", Reason::Expiring { days: 10 }.state());
    /// assert_eq!("EXPIRED", Reason::Expired.state());
    /// ```
    pub fn state(&self) -> &'static str {
        match self {
            Reason::Expiring { .. } => "WARNING",
            Reason::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Expiring { days } => {
                write!(f, "Certificate is about to expire in less than {days} days")
            }
            Reason::Expired => write!(f, "Certificate is expired and should be renewed or revoked"),
        }
    }
}

/// Certificate which is about to expire or has expired
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpirationReport {
    /// DNS names of the certificate
    pub dns_names: Vec<String>,
    /// Namespace of the certificate
    pub namespace: String,
    /// Name of the certificate
    pub name: String,
    /// Expiration time
    pub not_after: DateTime<Utc>,
    /// Why the certificate got reported
    pub reason: Reason,
    /// When the certificate got checked
    pub checked_at: DateTime<Utc>,
}

impl ExpirationReport {
    /// Whole days from the check to the expiration, negative once expired
    pub fn days(&self) -> i64 {
        (self.not_after - self.checked_at).num_days()
    }

    /// Human-readable sentence of the report
    ///
    /// ```
    /// # use cev::{ExpirationReport, Reason};
    /// use chrono::{Duration, Utc};
    /// let checked_at = Utc::now();
    /// let report = ExpirationReport {
    ///     dns_names: vec!["example.com".into()],
    ///     namespace: "default".into(),
    ///     name: "example".into(),
    ///     not_after: checked_at - Duration::days(1),
    ///     reason: Reason::Expired,
    ///     checked_at,
    /// };
    /// assert!(report.sentence().starts_with("default/example (example.com): "));
    /// ```
    pub fn sentence(&self) -> String {
        let namespace = &self.namespace;
        let name = &self.name;
        let reason = &self.reason;
        let days = self.days().abs().to_formatted_string(&Locale::en);
        let r = self.not_after.to_rfc3339();
        let when = match self.reason {
            Reason::Expiring { .. } => format!("{days} days left, {r}"),
            Reason::Expired => format!("{days} days ago, {r}"),
        };
        if self.dns_names.is_empty() {
            format!("{namespace}/{name}: {reason} ({when})")
        } else {
            let dns_names = self.dns_names.join(", ");
            format!("{namespace}/{name} ({dns_names}): {reason} ({when})")
        }
    }

    /// Icon of the report in ASCII or Unicode
    ///
    /// ```
    /// # use cev::{ExpirationReport, Reason};
    /// use chrono::Utc;
    /// let report = ExpirationReport {
    ///     dns_names: vec![],
    ///     namespace: "default".into(),
    ///     name: "example".into(),
    ///     not_after: Utc::now(),
    ///     reason: Reason::Expired,
    ///     checked_at: Utc::now(),
    /// };
    /// assert_eq!("[x]", report.state_icon(true));
    /// ```
    pub fn state_icon(&self, ascii: bool) -> &'static str {
        match self.reason {
            Reason::Expiring { .. } => {
                if ascii {
                    "[-]"
                } else {
                    "\u{26a0}\u{fe0f}"
                }
            }
            Reason::Expired => {
                if ascii {
                    "[x]"
                } else {
                    "\u{274c}"
                }
            }
        }
    }
}

/// Alternate form `{:#}` uses the ASCII icon
impl fmt::Display for ExpirationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ascii = f.alternate();
        write!(f, "{} {}", self.state_icon(ascii), self.sentence())
    }
}

/// Report in JSON format
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ExpirationReportJSON {
    /// WARNING or EXPIRED
    pub state: String,
    /// Namespace of the certificate
    pub namespace: String,
    /// Name of the certificate
    pub name: String,
    /// DNS names of the certificate
    pub dns_names: Vec<String>,
    /// Expiration time in RFC3339 format
    pub expired_at: String,
    /// When the certificate got checked in RFC3339 format
    pub checked_at: String,
    /// Remaining days to the expiration date
    pub days: i64,
    /// Why the certificate got reported
    pub reason: String,
}

impl ExpirationReportJSON {
    /// Convert report to JSON
    pub fn new(report: &ExpirationReport) -> ExpirationReportJSON {
        ExpirationReportJSON {
            state: report.reason.state().to_string(),
            namespace: report.namespace.clone(),
            name: report.name.clone(),
            dns_names: report.dns_names.clone(),
            expired_at: report.not_after.to_rfc3339(),
            checked_at: report.checked_at.to_rfc3339(),
            days: report.days(),
            reason: report.reason.to_string(),
        }
    }
}
