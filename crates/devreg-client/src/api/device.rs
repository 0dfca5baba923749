//! Device registration API endpoints.

use crate::ApiClient;
use devreg_core::{
    ApiError, ApiResult, AuthenticateBody, DeviceId, RegisterBody, RegistrationRequest,
    RenameRequest, ReregisterBody,
};
use tracing::info;

/// Device registration API endpoints
pub struct DeviceApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DeviceApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Register a device, re-presenting `existing_id` when one is known
    pub async fn register(&self, request: &RegistrationRequest) -> ApiResult<DeviceId> {
        let body = RegisterBody {
            devicename: &request.name,
            password: &request.password,
            group: &request.group,
            device_id: request.is_reattempt().then(|| request.existing_id.get()),
        };

        let response = self.client.post("/api/v1/devices", &body, None).await?;
        let id = response
            .id
            .filter(|id| !id.is_unset())
            .ok_or_else(|| ApiError::Rejected {
                message: "registration response carried no device id".to_string(),
            })?;

        info!(device_id = %id, name = %request.name, "device registered with backend");
        Ok(id)
    }

    /// Authenticate as an existing device, returning a session token
    pub async fn authenticate(&self, device_id: DeviceId, password: &str) -> ApiResult<String> {
        let body = AuthenticateBody {
            device_id: device_id.get(),
            password,
        };

        let response = self
            .client
            .post("/authenticate_device", &body, None)
            .await?;
        response.token.ok_or(ApiError::Unauthorized)
    }

    /// Change name, group and password within an authenticated session
    pub async fn reregister(&self, token: &str, update: &RenameRequest) -> ApiResult<()> {
        let body = ReregisterBody {
            new_name: &update.name,
            new_group: &update.group,
            new_password: &update.password,
        };

        self.client
            .post("/api/v1/devices/reregister", &body, Some(token))
            .await?;
        Ok(())
    }
}
