use crate::client::error::ClientError;
use crate::models::health::DbStatusResponse;
use crate::models::init::InitStatus;
use crate::models::user::{LoginRequest, LoginResponse, SaveUserRequest};
use crate::models::vessel::{GetVesselResponse, SaveVesselRequest, VesselName};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// The HTTP surface the console talks to.
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    async fn check_init(&self, token: Option<&str>) -> Result<InitStatus, ClientError>;
    async fn get_vessel(&self) -> Result<GetVesselResponse, ClientError>;
    async fn list_active_vessels(&self) -> Result<Vec<VesselName>, ClientError>;
    async fn test_db(&self) -> Result<DbStatusResponse, ClientError>;
    async fn login(&self, handle: &str, password: &str) -> Result<String, ClientError>;
    async fn save_user(&self, token: Option<&str>, request: &SaveUserRequest) -> Result<(), ClientError>;
    async fn save_vessel(&self, token: Option<&str>, request: &SaveVesselRequest) -> Result<(), ClientError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct HttpConsoleApi {
    client: Client,
    base_url: String,
}

impl HttpConsoleApi {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:5000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::builder()
                .user_agent(concat!("muirgen-console/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("Unknown error").to_string(),
        };
        debug!(status = status.as_u16(), message = %message, "api call rejected");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ConsoleApi for HttpConsoleApi {
    async fn check_init(&self, token: Option<&str>) -> Result<InitStatus, ClientError> {
        let request = Self::authorized(self.client.get(self.url("/check-init")), token);
        Self::read(request.send().await?).await
    }

    async fn get_vessel(&self) -> Result<GetVesselResponse, ClientError> {
        Self::read(self.client.get(self.url("/get-vessel")).send().await?).await
    }

    async fn list_active_vessels(&self) -> Result<Vec<VesselName>, ClientError> {
        Self::read(self.client.get(self.url("/vessels/get-active")).send().await?).await
    }

    async fn test_db(&self) -> Result<DbStatusResponse, ClientError> {
        Self::read(self.client.get(self.url("/test-db")).send().await?).await
    }

    async fn login(&self, handle: &str, password: &str) -> Result<String, ClientError> {
        let body = LoginRequest {
            user_handle: handle.to_string(),
            user_password: password.to_string(),
        };
        let response: LoginResponse = Self::read(self.client.post(self.url("/login")).json(&body).send().await?).await?;
        Ok(response.token)
    }

    async fn save_user(&self, token: Option<&str>, request: &SaveUserRequest) -> Result<(), ClientError> {
        let builder = Self::authorized(self.client.post(self.url("/save-user")), token);
        let _: serde_json::Value = Self::read(builder.json(request).send().await?).await?;
        Ok(())
    }

    async fn save_vessel(&self, token: Option<&str>, request: &SaveVesselRequest) -> Result<(), ClientError> {
        let builder = Self::authorized(self.client.post(self.url("/save-vessel")), token);
        let _: serde_json::Value = Self::read(builder.json(request).send().await?).await?;
        Ok(())
    }
}
