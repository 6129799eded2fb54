//! Maps run outcomes and errors onto process exit categories.

use datamirror_core::{DownloadReport, ManifestError, PlanError, VerifyError, VerifyReport};

use crate::ProcessExit;
use crate::app::settings::DataRootMissing;

/// Exit category for an error that aborted a command.
pub(crate) fn exit_for_error(error: &anyhow::Error) -> ProcessExit {
    if let Some(manifest) = error.downcast_ref::<ManifestError>() {
        return match manifest {
            ManifestError::NotFound { .. } => ProcessExit::InputNotFound,
            _ => ProcessExit::Failure,
        };
    }
    if let Some(plan) = error.downcast_ref::<PlanError>() {
        return match plan {
            PlanError::DiscoveryEmpty => ProcessExit::DiscoveryEmpty,
            PlanError::DiscoveryEmptyAfterFilter { .. } => ProcessExit::DiscoveryEmptyAfterFilter,
        };
    }
    if let Some(verify) = error.downcast_ref::<VerifyError>() {
        return match verify {
            VerifyError::InputNotFound { .. } => ProcessExit::InputNotFound,
            VerifyError::DataRootUnresolved { .. } => ProcessExit::DataRootUnresolved,
            VerifyError::DiscoveryEmpty { .. } => ProcessExit::DiscoveryEmpty,
            VerifyError::DiscoveryEmptyAfterFilter { .. } => {
                ProcessExit::DiscoveryEmptyAfterFilter
            }
            VerifyError::Io { .. } => ProcessExit::Failure,
        };
    }
    if error.downcast_ref::<DataRootMissing>().is_some() {
        return ProcessExit::DataRootUnresolved;
    }
    ProcessExit::Failure
}

pub(crate) fn outcome_for_fetch(report: &DownloadReport) -> ProcessExit {
    if report.is_complete() {
        ProcessExit::Success
    } else {
        ProcessExit::Incomplete
    }
}

pub(crate) fn outcome_for_check(report: &VerifyReport) -> ProcessExit {
    if report.is_complete() {
        ProcessExit::Success
    } else {
        ProcessExit::Incomplete
    }
}
