use chrono::{DateTime, Duration, Utc};

use crate::record::CertificateRecord;
use crate::report::{ExpirationReport, Reason};
use crate::source::CertificateSource;
use crate::VerifyError;

/// Verifier of certificate expiration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verifier {
    checked_at: Option<DateTime<Utc>>,
    /// Certificates expiring within this many days are reported
    pub expire_in_days: i64,
}

impl Default for Verifier {
    fn default() -> Self {
        Verifier {
            checked_at: None,
            expire_in_days: 10,
        }
    }
}

impl Verifier {
    /// Verifier reading the clock when certificates are evaluated
    ///
    /// ```
    /// # use cev::Verifier;
    /// let verifier = Verifier::new(10);
    /// assert_eq!(10, verifier.expire_in_days);
    /// assert_eq!(None, verifier.checked_at());
    /// ```
    pub fn new(expire_in_days: i64) -> Self {
        Verifier {
            expire_in_days,
            ..Default::default()
        }
    }

    /// Verifier checking against the given time
    pub fn at(checked_at: DateTime<Utc>, expire_in_days: i64) -> Self {
        Verifier {
            checked_at: Some(checked_at),
            expire_in_days,
        }
    }

    /// Pinned time to check against, if any
    pub fn checked_at(&self) -> Option<DateTime<Utc>> {
        self.checked_at
    }

    fn now(&self) -> DateTime<Utc> {
        self.checked_at.unwrap_or_else(Utc::now)
    }

    /// Certificates expiring before this time are reported
    ///
    /// Saturates at the bounds of [`DateTime`] when the threshold is out of range.
    pub fn horizon(&self) -> DateTime<Utc> {
        self.horizon_at(self.now())
    }

    fn horizon_at(&self, checked_at: DateTime<Utc>) -> DateTime<Utc> {
        let horizon =
            Duration::try_days(self.expire_in_days).and_then(|d| checked_at.checked_add_signed(d));
        match horizon {
            Some(h) => h,
            None if self.expire_in_days < 0 => DateTime::<Utc>::MIN_UTC,
            None => DateTime::<Utc>::MAX_UTC,
        }
    }

    /// Reason to report a certificate expiring at the given time, if any
    ///
    /// ```
    /// # use cev::{Reason, Verifier};
    /// use chrono::{Duration, Utc};
    /// let now = Utc::now();
    /// let verifier = Verifier::at(now, 10);
    /// assert_eq!(None, verifier.classify(now + Duration::days(30)));
    /// assert_eq!(
    ///     Some(Reason::Expiring { days: 10 }),
    ///     verifier.classify(now + Duration::days(7))
    /// );
    /// assert_eq!(Some(Reason::Expired), verifier.classify(now - Duration::days(1)));
    /// ```
    pub fn classify(&self, not_after: DateTime<Utc>) -> Option<Reason> {
        self.classify_at(self.now(), not_after)
    }

    fn classify_at(&self, checked_at: DateTime<Utc>, not_after: DateTime<Utc>) -> Option<Reason> {
        let mut reason = None;
        if self.horizon_at(checked_at) > not_after {
            reason = Some(Reason::Expiring {
                days: self.expire_in_days,
            });
        }
        if checked_at > not_after {
            reason = Some(Reason::Expired);
        }
        reason
    }

    /// Report certificates from records at hand, in their order
    pub fn evaluate<I>(&self, records: I) -> Vec<ExpirationReport>
    where
        I: IntoIterator<Item = CertificateRecord>,
    {
        let checked_at = self.now();
        let mut reports = vec![];
        for record in records {
            let not_after = match record.not_after {
                Some(t) => t,
                None => continue,
            };
            if let Some(reason) = self.classify_at(checked_at, not_after) {
                reports.push(ExpirationReport {
                    dns_names: record.dns_names,
                    namespace: record.namespace,
                    name: record.name,
                    not_after,
                    reason,
                    checked_at,
                });
            }
        }
        reports
    }

    /// List certificates from the source once and report them
    ///
    /// Unless pinned with [`Verifier::at`], the clock is read after listing.
    ///
    /// ```
    /// # use cev::{CertificateRecord, Verifier};
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), cev::VerifyError> {
    /// let records: Vec<CertificateRecord> = vec![];
    /// let reports = Verifier::new(10).verify(&records).await?;
    /// assert!(reports.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn verify<S>(&self, source: &S) -> Result<Vec<ExpirationReport>, VerifyError>
    where
        S: CertificateSource,
    {
        let records = source.list_certificates().await?;
        Ok(self.evaluate(records))
    }
}

/// Report certificates of the source expiring within given days from now
pub async fn verify_expiration<S>(
    source: &S,
    expire_in_days: i64,
) -> Result<Vec<ExpirationReport>, VerifyError>
where
    S: CertificateSource,
{
    Verifier::new(expire_in_days).verify(source).await
}
