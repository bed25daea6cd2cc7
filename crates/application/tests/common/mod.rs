//! Scripted in-process API used by the integration tests.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use popspot_application::{
    AuthenticatedClient, ClientContext, HttpTransport, InMemorySessionStore, Navigator,
    SessionStore, TransportError,
};
use popspot_domain::{
    ClientConfig, HttpMethod, RequestSpec, ResponseSpec, Session, TokenPair, UserProfile,
};
use tokio::sync::Semaphore;

/// What the refresh endpoint does when called.
#[derive(Debug, Clone)]
pub enum RefreshBehavior {
    /// Issue this pair and accept its access token from now on.
    Issue(TokenPair),
    /// Answer with this status.
    Fail(u16),
    /// Fail at the transport level.
    Unreachable,
    /// Answer 200 with a body that is not a token pair.
    Malformed,
}

/// Fake backend: accepts exactly one access token at a time.
pub struct MockApi {
    valid_token: Mutex<String>,
    refresh: Mutex<RefreshBehavior>,
    refresh_gate: Mutex<Option<Arc<Semaphore>>>,
    refresh_calls: AtomicUsize,
    always_unauthorized: Mutex<HashSet<String>>,
    public_paths: Mutex<HashSet<String>>,
    canned: Mutex<HashMap<(HttpMethod, String), ResponseSpec>>,
    log: Mutex<Vec<RequestSpec>>,
}

impl MockApi {
    pub fn new(valid_token: &str, refresh: RefreshBehavior) -> Arc<Self> {
        Arc::new(Self {
            valid_token: Mutex::new(valid_token.to_string()),
            refresh: Mutex::new(refresh),
            refresh_gate: Mutex::new(None),
            refresh_calls: AtomicUsize::new(0),
            always_unauthorized: Mutex::new(HashSet::new()),
            public_paths: Mutex::new(HashSet::new()),
            canned: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
        })
    }

    /// Holds refresh calls until permits are added to the returned semaphore.
    pub fn gate_refresh(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.refresh_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn ungate_refresh(&self) {
        *self.refresh_gate.lock().unwrap() = None;
    }

    pub fn set_refresh(&self, behavior: RefreshBehavior) {
        *self.refresh.lock().unwrap() = behavior;
    }

    pub fn reject_always(&self, path: &str) {
        self.always_unauthorized
            .lock()
            .unwrap()
            .insert(path.to_string());
    }

    pub fn make_public(&self, path: &str) {
        self.public_paths.lock().unwrap().insert(path.to_string());
    }

    pub fn respond(&self, method: HttpMethod, path: &str, response: ResponseSpec) {
        self.canned
            .lock()
            .unwrap()
            .insert((method, path.to_string()), response);
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RequestSpec> {
        self.log.lock().unwrap().clone()
    }

    /// Requests sent to `path`, in send order.
    pub fn requests_to(&self, path: &str) -> Vec<RequestSpec> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    async fn handle_refresh(&self) -> Result<ResponseSpec, TransportError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.refresh_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
        let behavior = self.refresh.lock().unwrap().clone();
        match behavior {
            RefreshBehavior::Issue(tokens) => {
                (*self.valid_token.lock().unwrap()).clone_from(&tokens.access_token);
                Ok(ResponseSpec::json_body(
                    200,
                    &serde_json::to_value(&tokens).unwrap(),
                ))
            }
            RefreshBehavior::Fail(status) => Ok(ResponseSpec::json_body(
                status,
                &serde_json::json!({ "error": "refresh failed" }),
            )),
            RefreshBehavior::Unreachable => Err(TransportError::ConnectionRefused {
                host: "localhost".to_string(),
                port: 8080,
            }),
            RefreshBehavior::Malformed => Ok(ResponseSpec::json_body(
                200,
                &serde_json::json!({ "status": "ok" }),
            )),
        }
    }
}

#[async_trait]
impl HttpTransport for MockApi {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, TransportError> {
        self.log.lock().unwrap().push(request.clone());
        tokio::task::yield_now().await;

        if request.path == "/auth/refresh" {
            return self.handle_refresh().await;
        }
        if request.path == "/offline" {
            return Err(TransportError::ConnectionFailed("connection reset".to_string()));
        }

        let public = self.public_paths.lock().unwrap().contains(&request.path);
        if !public {
            let rejected = self
                .always_unauthorized
                .lock()
                .unwrap()
                .contains(&request.path);
            let valid = self.valid_token.lock().unwrap().clone();
            if rejected || request.headers.bearer_token() != Some(valid.as_str()) {
                return Ok(ResponseSpec::json_body(
                    401,
                    &serde_json::json!({ "error": "token expired" }),
                ));
            }
        }

        let canned = self
            .canned
            .lock()
            .unwrap()
            .get(&(request.method, request.path.clone()))
            .cloned();
        Ok(canned.unwrap_or_else(|| {
            ResponseSpec::json_body(
                200,
                &serde_json::json!({
                    "path": request.path,
                    "token": request.headers.bearer_token(),
                }),
            )
        }))
    }
}

/// Navigator recording every redirect.
#[derive(Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        self.redirects.lock().unwrap().push(path.to_string());
    }
}

pub fn user() -> UserProfile {
    UserProfile {
        id: 7,
        nickname: "gallery-goer".to_string(),
        email: None,
        profile_image_url: None,
    }
}

pub fn logged_in(access: &str, refresh: &str) -> Session {
    Session::authenticated(user(), TokenPair::new(access, refresh))
}

pub struct Harness {
    pub api: Arc<MockApi>,
    pub session: InMemorySessionStore,
    pub navigator: Arc<RecordingNavigator>,
    pub client: Arc<AuthenticatedClient>,
}

impl Harness {
    pub fn new(api: Arc<MockApi>, session: Session) -> Self {
        let store = InMemorySessionStore::with_session(session);
        let navigator = Arc::new(RecordingNavigator::default());
        let context = ClientContext::new(
            Arc::new(store.clone()) as Arc<dyn SessionStore>,
            Arc::clone(&navigator) as Arc<dyn Navigator>,
        );
        let client = Arc::new(AuthenticatedClient::new(
            Arc::clone(&api) as Arc<dyn HttpTransport>,
            context,
            ClientConfig::default(),
        ));
        Self {
            api,
            session: store,
            navigator,
            client,
        }
    }

    /// Session with expired `T1`/`R1`; the backend only accepts `T2` after refresh.
    pub fn expired() -> Self {
        let api = MockApi::new(
            "T-current",
            RefreshBehavior::Issue(TokenPair::new("T2", "R2")),
        );
        Self::new(api, logged_in("T1", "R1"))
    }

    pub fn spawn_get(
        &self,
        path: &'static str,
    ) -> tokio::task::JoinHandle<popspot_application::ClientResult<ResponseSpec>> {
        let client = Arc::clone(&self.client);
        tokio::spawn(async move { client.send(RequestSpec::get(path)).await })
    }
}

/// Yields until `condition` holds; panics after five seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}

pub fn token_in_body(response: &ResponseSpec) -> Option<String> {
    let body: serde_json::Value = response.json().ok()?;
    body["token"].as_str().map(String::from)
}
