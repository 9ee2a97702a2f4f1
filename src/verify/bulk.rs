use super::error::BulkError;
use super::{OpenSession, VerificationResult, Verifier};
use crate::mx::LookupMx;

impl<R, C> Verifier<R, C>
where
    R: LookupMx,
    C: OpenSession,
{
    /// Verifies `emails` one after the other.
    ///
    /// The list must be non-empty and no longer than the configured
    /// `max_bulk`. A failing address yields an invalid result and never
    /// aborts the batch.
    pub fn verify_bulk<S>(
        &self,
        emails: &[S],
        repeats: Option<u32>,
    ) -> Result<Vec<VerificationResult>, BulkError>
    where
        S: AsRef<str>,
    {
        check_batch_size(emails.len(), self.config().max_bulk)?;
        tracing::debug!(count = emails.len(), "starting bulk verification");
        Ok(emails
            .iter()
            .map(|email| self.verify(email.as_ref(), repeats))
            .collect())
    }
}

pub(crate) fn check_batch_size(count: usize, max: usize) -> Result<(), BulkError> {
    if count == 0 {
        return Err(BulkError::Empty);
    }
    if count > max {
        return Err(BulkError::TooMany { count, max });
    }
    Ok(())
}
