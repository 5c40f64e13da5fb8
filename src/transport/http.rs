//! HTTP transport for the StorageOS v2 management API
//!
//! Requests are JSON over HTTP(S) to the first configured endpoint. After
//! login every request carries the session token as a bearer credential.
//! There is no retry; the command deadline bounds every call.

use crate::client::params::{DeleteVolumeParams, RequestParams};
use crate::domain::ids::{NamespaceId, NodeId, PolicyGroupId, UserId, VolumeId};
use crate::domain::ports::{
    ClusterUpdate, Completion, CreateNamespace, CreatePolicyGroup, CreateUser, CreateVolume,
    Transport,
};
use crate::domain::resources::{
    AuthSession, Cluster, Labels, Licence, Namespace, Node, PolicyGroup, User,
};
use crate::domain::volume::{NfsExport, Volume};
use crate::error::{Error, ResourceKind, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("kubectl-storageos/", env!("CARGO_PKG_VERSION"));

/// Path prefix of the management API
const API_PREFIX: &str = "/v2";

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

// =============================================================================
// Status Mapping
// =============================================================================

/// What a request addressed, used to build errors from status codes
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub kind: ResourceKind,
    /// ID of the addressed resource, or the name of the one being created.
    /// Empty for collections and singletons.
    pub key: &'a str,
    pub create: bool,
}

impl<'a> Target<'a> {
    pub fn resource(kind: ResourceKind, key: &'a str) -> Self {
        Self {
            kind,
            key,
            create: false,
        }
    }

    /// A collection or singleton endpoint, which has no key to report
    pub fn collection(kind: ResourceKind) -> Self {
        Self::resource(kind, "")
    }

    pub fn create(kind: ResourceKind, name: &'a str) -> Self {
        Self {
            kind,
            key: name,
            create: true,
        }
    }
}

/// Map an unsuccessful response status to an error
pub fn map_status(status: u16, message: String, target: Target<'_>) -> Error {
    match status {
        400 | 422 => Error::InvalidRequest {
            details: Some(message).filter(|m| !m.is_empty()),
        },
        401 => Error::Unauthorized,
        403 => Error::Forbidden,
        404 if target.key.is_empty() => Error::Api { status, message },
        404 => Error::id_not_found(target.kind, target.key),
        409 if target.create => Error::AlreadyExists {
            kind: target.kind,
            name: target.key.to_string(),
        },
        409 | 412 => Error::Conflict(message),
        _ => Error::Api { status, message },
    }
}

/// Serialize `value`, adding the CAS version when one was requested
fn versioned<T: Serialize>(value: &T, params: &RequestParams) -> Result<Value> {
    let mut body = serde_json::to_value(value)?;
    if let (Some(version), Value::Object(map)) = (&params.cas_version, &mut body) {
        map.insert("version".into(), Value::String(version.to_string()));
    }
    Ok(body)
}

fn segment(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

// =============================================================================
// HTTP Transport
// =============================================================================

/// [`Transport`] speaking to the management API over HTTP
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a transport for the first of `endpoints`
    pub fn new(endpoints: &[String]) -> Result<Self> {
        let endpoint = endpoints
            .iter()
            .find(|e| !e.trim().is_empty())
            .ok_or_else(|| Error::Configuration("no API endpoints configured".into()))?;

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: endpoint.trim().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        trace!(%method, %url, "api request");
        let builder = self.client.request(method, url);
        match self.token.read().as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(&self, resp: Response, target: Target<'_>) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or(text);
        debug!(status = status.as_u16(), %message, "api request failed");
        Err(map_status(status.as_u16(), message, target))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        target: Target<'_>,
    ) -> Result<T> {
        let resp = self.check(builder.send().await?, target).await?;
        Ok(resp.json().await?)
    }

    async fn execute(&self, builder: RequestBuilder, target: Target<'_>) -> Result<StatusCode> {
        let resp = self.check(builder.send().await?, target).await?;
        Ok(resp.status())
    }

    async fn fetch_or_accept<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        target: Target<'_>,
    ) -> Result<Completion<T>> {
        let resp = self.check(builder.send().await?, target).await?;
        if resp.status() == StatusCode::ACCEPTED {
            return Ok(Completion::Accepted);
        }
        Ok(Completion::Done(resp.json().await?))
    }

    fn volume_path(ns: &NamespaceId, id: &VolumeId) -> String {
        format!(
            "/namespaces/{}/volumes/{}",
            segment(ns.as_str()),
            segment(id.as_str())
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn authenticate(&self, username: &str, password: &str) -> Result<AuthSession> {
        let builder = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { username, password });
        let session: AuthSession = self
            .fetch(builder, Target::resource(ResourceKind::User, username))
            .await
            .map_err(|e| match e {
                Error::NotFound { .. } => Error::Unauthorized,
                other => other,
            })?;

        *self.token.write() = Some(session.token.clone());
        Ok(session)
    }

    fn resume_session(&self, session: &AuthSession) {
        *self.token.write() = Some(session.token.clone());
    }

    // --- Cluster ---

    async fn get_cluster(&self) -> Result<Cluster> {
        let req = self.request(Method::GET, "/cluster");
        self.fetch(req, Target::collection(ResourceKind::Cluster)).await
    }

    async fn update_cluster(
        &self,
        update: &ClusterUpdate,
        params: &RequestParams,
    ) -> Result<Cluster> {
        let req = self
            .request(Method::PUT, "/cluster")
            .query(&params.query_pairs())
            .json(&versioned(update, params)?);
        self.fetch(req, Target::collection(ResourceKind::Cluster)).await
    }

    async fn get_licence(&self) -> Result<Licence> {
        let req = self.request(Method::GET, "/cluster/licence");
        self.fetch(req, Target::collection(ResourceKind::Licence)).await
    }

    async fn update_licence(&self, key: &str, params: &RequestParams) -> Result<Licence> {
        let req = self
            .request(Method::PUT, "/cluster/licence")
            .query(&params.query_pairs())
            .json(&versioned(&json!({ "key": key }), params)?);
        self.fetch(req, Target::collection(ResourceKind::Licence)).await
    }

    // --- Nodes ---

    async fn get_node(&self, id: &NodeId) -> Result<Node> {
        let req = self.request(Method::GET, &format!("/nodes/{}", segment(id.as_str())));
        self.fetch(req, Target::resource(ResourceKind::Node, id.as_str()))
            .await
    }

    async fn list_nodes(&self) -> Result<Vec<Node>> {
        let req = self.request(Method::GET, "/nodes");
        self.fetch(req, Target::collection(ResourceKind::Node)).await
    }

    async fn delete_node(&self, id: &NodeId, params: &RequestParams) -> Result<()> {
        let req = self
            .request(Method::DELETE, &format!("/nodes/{}", segment(id.as_str())))
            .query(&params.delete_query_pairs());
        self.execute(req, Target::resource(ResourceKind::Node, id.as_str()))
            .await?;
        Ok(())
    }

    // --- Namespaces ---

    async fn get_namespace(&self, id: &NamespaceId) -> Result<Namespace> {
        let req = self.request(Method::GET, &format!("/namespaces/{}", segment(id.as_str())));
        self.fetch(req, Target::resource(ResourceKind::Namespace, id.as_str()))
            .await
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>> {
        let req = self.request(Method::GET, "/namespaces");
        self.fetch(req, Target::collection(ResourceKind::Namespace)).await
    }

    async fn create_namespace(&self, create: &CreateNamespace) -> Result<Namespace> {
        let req = self.request(Method::POST, "/namespaces").json(create);
        self.fetch(req, Target::create(ResourceKind::Namespace, &create.name))
            .await
    }

    async fn delete_namespace(&self, id: &NamespaceId, params: &RequestParams) -> Result<()> {
        let req = self
            .request(
                Method::DELETE,
                &format!("/namespaces/{}", segment(id.as_str())),
            )
            .query(&params.delete_query_pairs());
        self.execute(req, Target::resource(ResourceKind::Namespace, id.as_str()))
            .await?;
        Ok(())
    }

    // --- Volumes ---

    async fn get_volume(&self, ns: &NamespaceId, id: &VolumeId) -> Result<Volume> {
        let req = self.request(Method::GET, &Self::volume_path(ns, id));
        self.fetch(req, Target::resource(ResourceKind::Volume, id.as_str()))
            .await
    }

    async fn list_volumes(&self, ns: &NamespaceId) -> Result<Vec<Volume>> {
        let req = self.request(
            Method::GET,
            &format!("/namespaces/{}/volumes", segment(ns.as_str())),
        );
        self.fetch(req, Target::resource(ResourceKind::Namespace, ns.as_str()))
            .await
    }

    async fn create_volume(
        &self,
        ns: &NamespaceId,
        create: &CreateVolume,
        params: &RequestParams,
    ) -> Result<Completion<Volume>> {
        let req = self
            .request(
                Method::POST,
                &format!("/namespaces/{}/volumes", segment(ns.as_str())),
            )
            .query(&params.query_pairs())
            .json(create);
        self.fetch_or_accept(req, Target::create(ResourceKind::Volume, &create.name))
            .await
    }

    async fn update_volume_description(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        description: &str,
        params: &RequestParams,
    ) -> Result<Volume> {
        let req = self
            .request(
                Method::PUT,
                &format!("{}/description", Self::volume_path(ns, id)),
            )
            .query(&params.query_pairs())
            .json(&versioned(&json!({ "description": description }), params)?);
        self.fetch(req, Target::resource(ResourceKind::Volume, id.as_str()))
            .await
    }

    async fn update_volume_labels(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        labels: &Labels,
        params: &RequestParams,
    ) -> Result<Volume> {
        let req = self
            .request(Method::PUT, &format!("{}/labels", Self::volume_path(ns, id)))
            .query(&params.query_pairs())
            .json(&versioned(&json!({ "labels": labels }), params)?);
        self.fetch(req, Target::resource(ResourceKind::Volume, id.as_str()))
            .await
    }

    async fn resize_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        size_bytes: u64,
        params: &RequestParams,
    ) -> Result<Completion<Volume>> {
        let req = self
            .request(Method::PUT, &format!("{}/size", Self::volume_path(ns, id)))
            .query(&params.query_pairs())
            .json(&versioned(&json!({ "sizeBytes": size_bytes }), params)?);
        self.fetch_or_accept(req, Target::resource(ResourceKind::Volume, id.as_str()))
            .await
    }

    async fn set_replicas(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        replicas: u64,
        params: &RequestParams,
    ) -> Result<()> {
        let req = self
            .request(
                Method::PUT,
                &format!("{}/replicas", Self::volume_path(ns, id)),
            )
            .query(&params.query_pairs())
            .json(&versioned(&json!({ "replicas": replicas }), params)?);
        self.execute(req, Target::resource(ResourceKind::Volume, id.as_str()))
            .await?;
        Ok(())
    }

    async fn attach_volume(&self, ns: &NamespaceId, id: &VolumeId, node: &NodeId) -> Result<()> {
        let req = self
            .request(Method::POST, &format!("{}/attach", Self::volume_path(ns, id)))
            .json(&json!({ "nodeID": node }));
        self.execute(req, Target::resource(ResourceKind::Volume, id.as_str()))
            .await?;
        Ok(())
    }

    async fn detach_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        params: &RequestParams,
    ) -> Result<()> {
        let req = self
            .request(
                Method::DELETE,
                &format!("{}/attach", Self::volume_path(ns, id)),
            )
            .query(&params.delete_query_pairs());
        self.execute(req, Target::resource(ResourceKind::Volume, id.as_str()))
            .await?;
        Ok(())
    }

    async fn delete_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        params: &DeleteVolumeParams,
    ) -> Result<()> {
        let req = self
            .request(Method::DELETE, &Self::volume_path(ns, id))
            .query(&params.query_pairs());
        self.execute(req, Target::resource(ResourceKind::Volume, id.as_str()))
            .await?;
        Ok(())
    }

    // --- NFS ---

    async fn attach_nfs_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        params: &RequestParams,
    ) -> Result<()> {
        let req = self
            .request(
                Method::POST,
                &format!("{}/nfs/attach", Self::volume_path(ns, id)),
            )
            .query(&params.query_pairs())
            .json(&versioned(&json!({}), params)?);
        self.execute(req, Target::resource(ResourceKind::Volume, id.as_str()))
            .await?;
        Ok(())
    }

    async fn update_nfs_volume_exports(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        exports: &[NfsExport],
        params: &RequestParams,
    ) -> Result<()> {
        let req = self
            .request(
                Method::PUT,
                &format!("{}/nfs/export-config", Self::volume_path(ns, id)),
            )
            .query(&params.query_pairs())
            .json(&versioned(&json!({ "exportConfigs": exports }), params)?);
        self.execute(req, Target::resource(ResourceKind::Volume, id.as_str()))
            .await?;
        Ok(())
    }

    async fn update_nfs_volume_mount_endpoint(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        endpoint: &str,
        params: &RequestParams,
    ) -> Result<()> {
        let req = self
            .request(
                Method::PUT,
                &format!("{}/nfs/mount-endpoint", Self::volume_path(ns, id)),
            )
            .query(&params.query_pairs())
            .json(&versioned(&json!({ "mountEndpoint": endpoint }), params)?);
        self.execute(req, Target::resource(ResourceKind::Volume, id.as_str()))
            .await?;
        Ok(())
    }

    // --- Users ---

    async fn get_user(&self, id: &UserId) -> Result<User> {
        let req = self.request(Method::GET, &format!("/users/{}", segment(id.as_str())));
        self.fetch(req, Target::resource(ResourceKind::User, id.as_str()))
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let req = self.request(Method::GET, "/users");
        self.fetch(req, Target::collection(ResourceKind::User)).await
    }

    async fn create_user(&self, create: &CreateUser) -> Result<User> {
        let req = self.request(Method::POST, "/users").json(create);
        self.fetch(req, Target::create(ResourceKind::User, &create.username))
            .await
    }

    async fn delete_user(&self, id: &UserId, params: &RequestParams) -> Result<()> {
        let req = self
            .request(Method::DELETE, &format!("/users/{}", segment(id.as_str())))
            .query(&params.delete_query_pairs());
        self.execute(req, Target::resource(ResourceKind::User, id.as_str()))
            .await?;
        Ok(())
    }

    // --- Policy Groups ---

    async fn get_policy_group(&self, id: &PolicyGroupId) -> Result<PolicyGroup> {
        let req = self.request(Method::GET, &format!("/policies/{}", segment(id.as_str())));
        self.fetch(req, Target::resource(ResourceKind::PolicyGroup, id.as_str()))
            .await
    }

    async fn list_policy_groups(&self) -> Result<Vec<PolicyGroup>> {
        let req = self.request(Method::GET, "/policies");
        self.fetch(req, Target::collection(ResourceKind::PolicyGroup)).await
    }

    async fn create_policy_group(&self, create: &CreatePolicyGroup) -> Result<PolicyGroup> {
        let req = self.request(Method::POST, "/policies").json(create);
        self.fetch(req, Target::create(ResourceKind::PolicyGroup, &create.name))
            .await
    }

    async fn delete_policy_group(
        &self,
        id: &PolicyGroupId,
        params: &RequestParams,
    ) -> Result<()> {
        let req = self
            .request(
                Method::DELETE,
                &format!("/policies/{}", segment(id.as_str())),
            )
            .query(&params.delete_query_pairs());
        self.execute(req, Target::resource(ResourceKind::PolicyGroup, id.as_str()))
            .await?;
        Ok(())
    }
}
