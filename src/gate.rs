use log::debug;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

/// An operation that only runs after the admin confirms it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GuardedAction {
    #[serde(rename_all = "camelCase")]
    DeleteStudent { student_id: String },
    #[serde(rename_all = "camelCase")]
    UncheckFee { student_id: String, month: String },
    #[serde(rename_all = "camelCase")]
    RestoreBackup { bundle_path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    pub request_id: String,
    pub action: GuardedAction,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    NothingPending,
    Mismatch { open_request_id: String },
}

/// Holds at most one open confirmation request.
#[derive(Debug, Default)]
pub struct ConfirmationGate {
    open: Option<ConfirmationRequest>,
}

impl ConfirmationGate {
    /// Opens a request, replacing any request that was still open.
    pub fn request(&mut self, action: GuardedAction, summary: impl Into<String>) -> ConfirmationRequest {
        let req = ConfirmationRequest {
            request_id: Uuid::new_v4().to_string(),
            action,
            summary: summary.into(),
        };
        if let Some(prev) = self.open.replace(req.clone()) {
            debug!("confirmation {} superseded by {}", prev.request_id, req.request_id);
        }
        req
    }

    pub fn pending(&self) -> Option<&ConfirmationRequest> {
        self.open.as_ref()
    }

    /// Closes the gate and hands back the bound action. Only the open request id is accepted.
    pub fn confirm(&mut self, request_id: &str) -> Result<GuardedAction, GateError> {
        let req = self.take_matching(request_id)?;
        debug!("confirmation {} granted", req.request_id);
        Ok(req.action)
    }

    pub fn cancel(&mut self, request_id: &str) -> Result<ConfirmationRequest, GateError> {
        let req = self.take_matching(request_id)?;
        debug!("confirmation {} cancelled", req.request_id);
        Ok(req)
    }

    pub fn clear(&mut self) -> Option<ConfirmationRequest> {
        let req = self.open.take()?;
        debug!("confirmation {} discarded", req.request_id);
        Some(req)
    }

    fn take_matching(&mut self, request_id: &str) -> Result<ConfirmationRequest, GateError> {
        match &self.open {
            None => Err(GateError::NothingPending),
            Some(open) if open.request_id != request_id => Err(GateError::Mismatch {
                open_request_id: open.request_id.clone(),
            }),
            Some(_) => self.open.take().ok_or(GateError::NothingPending),
        }
    }
}
