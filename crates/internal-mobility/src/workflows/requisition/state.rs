use super::domain::RequisitionStatus;

/// Raised when a scan outcome is applied to a requisition that already left `PENDING_SCAN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("requisition in status {from} cannot be scanned")]
pub struct TransitionError {
    pub from: RequisitionStatus,
}

impl RequisitionStatus {
    /// Two-outcome gateway applied after matching.
    pub fn after_scan(self, match_count: usize) -> Result<RequisitionStatus, TransitionError> {
        match self {
            RequisitionStatus::PendingScan if match_count > 0 => {
                Ok(RequisitionStatus::PendingInternalReview)
            }
            RequisitionStatus::PendingScan => Ok(RequisitionStatus::PendingFinance),
            from => Err(TransitionError { from }),
        }
    }

    pub const fn is_scannable(self) -> bool {
        matches!(self, RequisitionStatus::PendingScan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_route_to_internal_review() {
        assert_eq!(
            RequisitionStatus::PendingScan.after_scan(1),
            Ok(RequisitionStatus::PendingInternalReview)
        );
        assert_eq!(
            RequisitionStatus::PendingScan.after_scan(12),
            Ok(RequisitionStatus::PendingInternalReview)
        );
    }

    #[test]
    fn no_candidates_route_to_finance() {
        assert_eq!(
            RequisitionStatus::PendingScan.after_scan(0),
            Ok(RequisitionStatus::PendingFinance)
        );
    }

    #[test]
    fn advanced_requisitions_cannot_be_rescanned() {
        for from in [
            RequisitionStatus::PendingInternalReview,
            RequisitionStatus::PendingFinance,
            RequisitionStatus::Approved,
            RequisitionStatus::Rejected,
            RequisitionStatus::Closed,
        ] {
            assert_eq!(from.after_scan(0), Err(TransitionError { from }));
            assert_eq!(from.after_scan(3), Err(TransitionError { from }));
            assert!(!from.is_scannable());
        }
    }
}
