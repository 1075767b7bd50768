use crate::{error::ServiceError, state::SharedState};

/// Header carrying the host credential.
pub const HOST_TOKEN_HEADER: &str = "X-Host-Token";

/// Check the credential presented for a host-only action.
pub fn verify_host_token(state: &SharedState, provided: Option<&str>) -> Result<(), ServiceError> {
    let provided = provided.ok_or_else(|| {
        ServiceError::Unauthorized(format!("missing host token header `{HOST_TOKEN_HEADER}`"))
    })?;

    if provided == state.config().host_token() {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized("invalid host token".into()))
    }
}
