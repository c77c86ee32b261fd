// Hand-crafted async HTTP client for the twinforge workbench backend.
//
// One client instance covers every backend surface: device status,
// digital-twin snapshots, firmware compiles, OTA assignment, and the
// polled OTA event feed. Auth is an optional bearer token captured from
// `POST /auth/login`.

use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{
    AssignResponse, CompileResponse, DeviceStatusResponse, LoginResponse, OtaEventRecord,
    StatusReply, TwinSnapshotResponse,
};

// ── Error response shape from the backend ────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<String>,
}

// ── Request / result payloads ────────────────────────────────────────

#[derive(Serialize)]
struct CompileRequest<'a> {
    code: &'a str,
}

#[derive(Serialize)]
struct AssignRequest<'a> {
    device_id: &'a str,
    build_id: &'a str,
}

/// A finished, accepted compile: the server-issued build id plus logs.
#[derive(Debug, Clone)]
pub struct CompileSuccess {
    pub build_id: String,
    pub logs: String,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the workbench backend's JSON REST endpoints.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    /// Bearer token captured from `login()`. Backends in lab mode accept
    /// anonymous calls, so this stays optional.
    token: RwLock<Option<SecretString>>,
}

impl BackendClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &crate::TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            token: RwLock::new(None),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages transport).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            token: RwLock::new(None),
        })
    }

    /// Parse the base URL and guarantee a trailing slash so `Url::join`
    /// appends instead of replacing the final path segment.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/`, so joining relative paths works.
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    // ── Auth ─────────────────────────────────────────────────────────

    /// Authenticate and store the session token for subsequent requests.
    pub async fn login(&self) -> Result<String, Error> {
        let resp: LoginResponse = self.post("auth/login", &serde_json::json!({})).await?;
        debug!(user = %resp.user, "logged in");
        *self.token.write().expect("token lock poisoned") = Some(SecretString::from(resp.token));
        Ok(resp.user)
    }

    /// Seed the bearer token directly (e.g. from configuration).
    pub fn set_token(&self, token: SecretString) {
        *self.token.write().expect("token lock poisoned") = Some(token);
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self.token.read().expect("token lock poisoned");
        match guard.as_ref() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url}");

        let resp = self.apply_auth(self.http.get(url)).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("POST {url}");

        let resp = self.apply_auth(self.http.post(url).json(body)).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Authentication {
                message: "session token missing or rejected".into(),
            };
        }

        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.detail)
            .unwrap_or_else(|| {
                let preview = &raw[..raw.len().min(200)];
                if preview.is_empty() {
                    status.to_string()
                } else {
                    preview.to_owned()
                }
            });

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /` -- backend liveness probe.
    pub async fn health(&self) -> Result<String, Error> {
        let reply: StatusReply = self.get("").await?;
        Ok(reply.status)
    }

    /// `GET /devices/{device_id}/status`
    pub async fn device_status(&self, device_id: &str) -> Result<DeviceStatusResponse, Error> {
        self.get(&format!("devices/{device_id}/status")).await
    }

    /// `POST /devices/{device_id}/confirm-network`
    pub async fn confirm_network(&self, device_id: &str) -> Result<(), Error> {
        let _: StatusReply = self
            .post(
                &format!("devices/{device_id}/confirm-network"),
                &serde_json::json!({}),
            )
            .await?;
        Ok(())
    }

    /// `GET /digital-twin/{device_id}` -- the pin telemetry snapshot.
    pub async fn digital_twin(&self, device_id: &str) -> Result<TwinSnapshotResponse, Error> {
        self.get(&format!("digital-twin/{device_id}")).await
    }

    /// `POST /firmware/compile` -- synchronous remote compile.
    ///
    /// Blank-after-trim source fails locally with [`Error::EmptyInput`]
    /// without touching the network. A server-side `success: false` (or a
    /// success with no build id, which the OTA flow could never use) maps
    /// to [`Error::CompileRejected`] carrying the compiler logs.
    pub async fn compile(&self, source: &str) -> Result<CompileSuccess, Error> {
        if source.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        let resp: CompileResponse = self
            .post("firmware/compile", &CompileRequest { code: source })
            .await?;

        if !resp.success {
            return Err(Error::CompileRejected { logs: resp.logs });
        }

        match resp.build_id {
            Some(build_id) => Ok(CompileSuccess {
                build_id,
                logs: resp.logs,
            }),
            None => Err(Error::CompileRejected {
                logs: "compiler reported success but returned no build id".into(),
            }),
        }
    }

    /// `POST /ota/assign` -- bind a build to a device.
    ///
    /// Returns as soon as the backend accepts the request; the device-side
    /// outcome arrives later through the OTA event feed.
    pub async fn assign_build(&self, device_id: &str, build_id: &str) -> Result<(), Error> {
        let resp: AssignResponse = self
            .post(
                "ota/assign",
                &AssignRequest {
                    device_id,
                    build_id,
                },
            )
            .await?;

        if resp.accepted() {
            Ok(())
        } else {
            Err(Error::AssignRejected {
                message: resp.error.unwrap_or_else(|| "assignment rejected".into()),
            })
        }
    }

    /// `GET /ota/events` -- the polled fallback/delivery event feed.
    pub async fn list_ota_events(&self) -> Result<Vec<OtaEventRecord>, Error> {
        self.get("ota/events").await
    }
}
