//! Coordinating session.
//!
//! A [`Session`] owns everything one host connection needs: transport, token
//! provider, file store, telemetry sink, host collaborators, the active schema
//! version and the save-back map. Components receive what they need from it
//! per call; there is no process-wide state.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::ConfigFile;
use crate::fetch::{EntityFetcher, FetchError};
use crate::geo::{GeoResolution, GeoResolver, ResolverConfig, TenantId};
use crate::host::{messages, LogNotifier, NoopSaveProvider, Notifier, SaveProvider, TokenProvider};
use crate::http::AsyncHttpClient;
use crate::policy::{
    CrossGeoEvaluator, EndpointTemplate, GeoPolicy, IntelligenceEndpoint, PolicyClient,
    DEFAULT_POLICY_API_VERSION,
};
use crate::project::{LanguageMap, ProjectionReport, Projector, COMPONENT_ENTITY};
use crate::save::{SaveError, SaveMap, SaveRequest, SaveTracker, SiteContext};
use crate::schema::{HttpMethod, SchemaRegistry, SchemaVersion};
use crate::telemetry::{EventSink, SharedSink, TelemetryEvent, TracingSink};
use crate::vfs::{VirtualFs, VirtualPath};

/// Parameters of one "open entity" request from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRequest {
    /// Schema entity type, e.g. `webpages`.
    pub entity: String,
    pub entity_id: String,
    pub site: SiteContext,
}

/// Builder for [`Session`].
pub struct SessionBuilder<C: AsyncHttpClient, T: TokenProvider, F: VirtualFs> {
    http: Arc<C>,
    tokens: Arc<T>,
    fs: Arc<F>,
    sink: SharedSink,
    notifier: Arc<dyn Notifier>,
    save_provider: Arc<dyn SaveProvider>,
    schema_version: SchemaVersion,
    languages: LanguageMap,
    resolver_config: ResolverConfig,
    geo_policy: GeoPolicy,
    template: EndpointTemplate,
    policy_api_version: String,
}

impl<C: AsyncHttpClient, T: TokenProvider, F: VirtualFs> SessionBuilder<C, T, F> {
    pub fn new(http: Arc<C>, tokens: Arc<T>, fs: Arc<F>) -> Self {
        Self {
            http,
            tokens,
            fs,
            sink: Arc::new(TracingSink),
            notifier: Arc::new(LogNotifier),
            save_provider: Arc::new(NoopSaveProvider),
            schema_version: SchemaVersion::V1,
            languages: LanguageMap::default(),
            resolver_config: ResolverConfig::default(),
            geo_policy: GeoPolicy::default(),
            template: EndpointTemplate::default(),
            policy_api_version: DEFAULT_POLICY_API_VERSION.to_string(),
        }
    }

    /// Apply every setting from a configuration file.
    pub fn with_config(self, config: &ConfigFile) -> Self {
        self.with_resolver_config(config.resolver_config())
            .with_geo_policy(config.geo_policy())
            .with_template(config.endpoint_template())
            .with_languages(config.language_map())
            .with_policy_api_version(config.portal.policy_api_version.clone())
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_save_provider(mut self, save_provider: Arc<dyn SaveProvider>) -> Self {
        self.save_provider = save_provider;
        self
    }

    pub fn with_schema_version(mut self, version: SchemaVersion) -> Self {
        self.schema_version = version;
        self
    }

    pub fn with_languages(mut self, languages: LanguageMap) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_resolver_config(mut self, config: ResolverConfig) -> Self {
        self.resolver_config = config;
        self
    }

    pub fn with_geo_policy(mut self, geo_policy: GeoPolicy) -> Self {
        self.geo_policy = geo_policy;
        self
    }

    pub fn with_template(mut self, template: EndpointTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_policy_api_version(mut self, version: impl Into<String>) -> Self {
        self.policy_api_version = version.into();
        self
    }

    pub fn build(self) -> Session<C, T, F> {
        Session {
            http: self.http,
            tokens: self.tokens,
            fs: self.fs,
            sink: self.sink,
            notifier: self.notifier,
            save_provider: self.save_provider,
            registry: SchemaRegistry::new(self.schema_version),
            languages: self.languages,
            resolver_config: self.resolver_config,
            geo_policy: self.geo_policy,
            template: self.template,
            policy_api_version: self.policy_api_version,
            tracker: Mutex::new(SaveTracker::new()),
        }
    }
}

/// One host connection.
pub struct Session<C: AsyncHttpClient, T: TokenProvider, F: VirtualFs> {
    http: Arc<C>,
    tokens: Arc<T>,
    fs: Arc<F>,
    sink: SharedSink,
    notifier: Arc<dyn Notifier>,
    save_provider: Arc<dyn SaveProvider>,
    registry: SchemaRegistry,
    languages: LanguageMap,
    resolver_config: ResolverConfig,
    geo_policy: GeoPolicy,
    template: EndpointTemplate,
    policy_api_version: String,
    tracker: Mutex<SaveTracker>,
}

impl<C: AsyncHttpClient, T: TokenProvider, F: VirtualFs> Session<C, T, F> {
    pub fn builder(http: Arc<C>, tokens: Arc<T>, fs: Arc<F>) -> SessionBuilder<C, T, F> {
        SessionBuilder::new(http, tokens, fs)
    }

    pub fn schema_version(&self) -> SchemaVersion {
        self.registry.version()
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn file_system(&self) -> &F {
        &self.fs
    }

    /// Discover the tenant's cluster.
    pub async fn resolve(&self, tenant: &TenantId) -> Option<GeoResolution> {
        GeoResolver::with_config(
            Arc::clone(&self.http),
            Arc::clone(&self.sink),
            self.resolver_config.clone(),
        )
        .resolve(tenant)
        .await
    }

    /// Resolve the tenant and apply the cross-geo policy.
    ///
    /// Without a resolution the endpoint is [`Endpoint::NotResolved`](crate::policy::Endpoint::NotResolved)
    /// and no policy lookup happens.
    pub async fn intelligence_endpoint(&self, tenant: &TenantId, environment_id: &str) -> IntelligenceEndpoint {
        let Some(resolution) = self.resolve(tenant).await else {
            return IntelligenceEndpoint::not_resolved();
        };

        let flags = PolicyClient::new(
            Arc::clone(&self.http),
            Arc::clone(&self.tokens),
            Arc::clone(&self.sink),
        )
        .with_api_version(self.policy_api_version.clone());

        CrossGeoEvaluator::new(flags)
            .with_geo_policy(self.geo_policy.clone())
            .with_template(self.template.clone())
            .evaluate(&resolution, tenant, environment_id)
            .await
    }

    /// Fetch one entity and materialize it as files.
    ///
    /// Failures are shown to the user through the notifier and returned.
    /// Records without a file name are reported individually; the rest of
    /// the response is still written. The last written file is opened and
    /// the save map is handed to the save provider. When nothing could be
    /// written for any other reason the invalid-parameters dialog is shown.
    pub async fn open_entity(&self, request: &EntityRequest) -> Result<ProjectionReport, FetchError> {
        self.notifier.show_info(messages::FETCHING_FILE);

        let url_entity = match self.registry.version() {
            SchemaVersion::V2 => COMPONENT_ENTITY,
            SchemaVersion::V1 => request.entity.as_str(),
        };
        let url = match self.registry.request_url(
            &request.site.org_url,
            url_entity,
            &request.entity_id,
            HttpMethod::Get,
        ) {
            Ok(url) => url,
            Err(e) => {
                self.notifier
                    .show_error(messages::INVALID_PARAMETERS, messages::INVALID_PARAMETERS_DETAIL);
                return Err(FetchError::Projection(e.into()));
            }
        };

        let fetcher = EntityFetcher::new(
            Arc::clone(&self.http),
            Arc::clone(&self.tokens),
            Arc::clone(&self.sink),
        );
        let response = match fetcher.fetch(&url, &request.site.org_url).await {
            Ok(response) => response,
            Err(e) => {
                self.report_fetch_error(&e);
                return Err(e);
            }
        };

        let report = {
            let mut tracker = self.tracker.lock();
            Projector::new(self.fs.as_ref(), &self.registry, &self.languages, &request.site)
                .project_response(&request.entity, &response, &request.entity_id, &mut tracker)
        };

        if report.is_empty() {
            self.notifier.show_info(messages::EMPTY_RESPONSE);
            return Err(FetchError::EmptyResponse { url });
        }

        for failure in &report.failures {
            if failure.error.is_missing_file_name() {
                self.notifier
                    .show_error(messages::FILE_NOT_AVAILABLE, messages::FILE_NOT_AVAILABLE_DETAIL);
                self.sink.emit(TelemetryEvent::EmptyFileName {
                    entity_type: request.entity.clone(),
                });
            } else {
                warn!(index = failure.index, error = %failure.error, "Record was not written");
            }
        }

        match report.last_written() {
            Some(last) => {
                self.notifier.open_document(last);
                self.save_provider.register(self.save_map(), &request.site);
            }
            None if report
                .failures
                .iter()
                .any(|failure| !failure.error.is_missing_file_name()) =>
            {
                self.notifier
                    .show_error(messages::INVALID_PARAMETERS, messages::INVALID_PARAMETERS_DETAIL);
            }
            None => {}
        }

        info!(
            entity = %request.entity,
            records = report.records,
            files = report.written.len(),
            failures = report.failures.len(),
            "Projected entity"
        );
        Ok(report)
    }

    /// Snapshot of the save-back map.
    pub fn save_map(&self) -> SaveMap {
        self.tracker.lock().export()
    }

    /// Build the PATCH for an edited file.
    ///
    /// The request is built from what the session last saw of the record.
    /// Once the host has sent it, [`Session::commit_save`] makes the saved
    /// text part of that view.
    pub fn save_request(&self, path: &VirtualPath, text: &str, org_url: &str) -> Result<SaveRequest, SaveError> {
        self.tracker.lock().save_request(path, text, org_url)
    }

    /// Mark `text` as saved for `path` so later saves of the same record
    /// carry it.
    pub fn commit_save(&self, path: &VirtualPath, text: &str) -> Result<usize, SaveError> {
        self.tracker.lock().commit(path, text)
    }

    fn report_fetch_error(&self, error: &FetchError) {
        match error {
            FetchError::Unauthorized { .. } => self
                .notifier
                .show_error(messages::UNAUTHORIZED, messages::UNAUTHORIZED_DETAIL),
            FetchError::EmptyResponse { .. } => self.notifier.show_info(messages::EMPTY_RESPONSE),
            _ => self
                .notifier
                .show_error(messages::INVALID_PARAMETERS, messages::INVALID_PARAMETERS_DETAIL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::geo::{candidate_urls, ServiceStamp};
    use crate::host::tests::{RecordingNotifier, RecordingSaveProvider};
    use crate::host::StaticToken;
    use crate::http::tests::MockHttpClient;
    use crate::http::HttpError;
    use crate::policy::Endpoint;
    use crate::telemetry::MemorySink;
    use crate::vfs::MemoryFs;

    const TENANT: &str = "c7809087-d9b8-4a00-a78a-a4b901caa23f";
    const ORG: &str = "https://contoso.crm.dynamics.com";
    const PAGE_ID: &str = "0d2f7c43-1111-2222-3333-444455556666";

    struct Harness {
        session: Session<MockHttpClient, StaticToken, MemoryFs>,
        sink: Arc<MemorySink>,
        notifier: Arc<RecordingNotifier>,
        saves: Arc<RecordingSaveProvider>,
    }

    fn harness(http: MockHttpClient, version: SchemaVersion) -> Harness {
        let sink = Arc::new(MemorySink::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let saves = Arc::new(RecordingSaveProvider::default());
        let session = Session::builder(
            Arc::new(http),
            Arc::new(StaticToken::new("token")),
            Arc::new(MemoryFs::new()),
        )
        .with_sink(sink.clone())
        .with_notifier(notifier.clone())
        .with_save_provider(saves.clone())
        .with_schema_version(version)
        .build();

        Harness {
            session,
            sink,
            notifier,
            saves,
        }
    }

    fn page_request() -> EntityRequest {
        EntityRequest {
            entity: "webpages".to_string(),
            entity_id: PAGE_ID.to_string(),
            site: SiteContext::new(ORG, "contoso", "site-1"),
        }
    }

    fn page_url(version: SchemaVersion) -> String {
        let entity = match version {
            SchemaVersion::V1 => "webpages",
            SchemaVersion::V2 => COMPONENT_ENTITY,
        };
        SchemaRegistry::new(version)
            .request_url(ORG, entity, PAGE_ID, HttpMethod::Get)
            .unwrap()
    }

    fn prod_url() -> String {
        let tenant = TenantId::parse(TENANT).unwrap();
        candidate_urls(&tenant)
            .iter()
            .find(|c| c.stamp == ServiceStamp::Prod)
            .map(|c| c.url.clone())
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_v1_entity() {
        let body = json!({ "value": [
            { "adx_webpageid": PAGE_ID, "adx_name": "Home", "adx_copy": "<h1>Home</h1>" },
        ]});
        let http = MockHttpClient::new().with_response(page_url(SchemaVersion::V1), body.to_string());
        let h = harness(http, SchemaVersion::V1);

        let report = h.session.open_entity(&page_request()).await.unwrap();

        assert_eq!(report.written.len(), 3);
        assert_eq!(*h.notifier.infos.lock(), vec![messages::FETCHING_FILE.to_string()]);
        assert_eq!(
            *h.notifier.opened.lock(),
            vec![VirtualPath::new("/contoso/web-pages/home/home.en-US.webpage.copy.html")]
        );

        let registrations = h.saves.registrations.lock();
        assert_eq!(registrations.len(), 1);
        assert_eq!(registrations[0].len(), 3);
        assert_eq!(h.sink.count("ApiSuccess"), 1);
    }

    #[tokio::test]
    async fn test_open_v2_entity_and_save_back() {
        let body = json!({
            "powerpagecomponentid": PAGE_ID,
            "name": "Home",
            "content": r#"{"copy":"<p>old</p>"}"#,
        });
        let http = MockHttpClient::new().with_response(page_url(SchemaVersion::V2), body.to_string());
        let h = harness(http, SchemaVersion::V2);

        h.session.open_entity(&page_request()).await.unwrap();

        let path = VirtualPath::new("/contoso/web-pages/home/home.en-US.webpage.copy.html");
        let request = h.session.save_request(&path, "<p>new</p>", ORG).unwrap();
        assert_eq!(
            request.url,
            format!("{}/api/data/v9.2/powerpagecomponents({})", ORG, PAGE_ID)
        );
        assert_eq!(request.body["content"], json!(r#"{"copy":"<p>new</p>"}"#));
    }

    #[tokio::test]
    async fn test_unauthorized_shows_reauth_dialog() {
        let url = page_url(SchemaVersion::V1);
        let http = MockHttpClient::new().with_error(url.clone(), HttpError::from_status(403, &url));
        let h = harness(http, SchemaVersion::V1);

        let err = h.session.open_entity(&page_request()).await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(
            *h.notifier.errors.lock(),
            vec![(messages::UNAUTHORIZED.to_string(), messages::UNAUTHORIZED_DETAIL.to_string())]
        );
        assert_eq!(h.sink.count("ApiFailure"), 1);
        assert!(h.saves.registrations.lock().is_empty());
    }

    #[tokio::test]
    async fn test_other_failure_shows_parameter_dialog() {
        let h = harness(MockHttpClient::new(), SchemaVersion::V1);

        h.session.open_entity(&page_request()).await.unwrap_err();

        assert_eq!(h.notifier.errors.lock()[0].0, messages::INVALID_PARAMETERS);
    }

    #[tokio::test]
    async fn test_empty_list_notifies() {
        let http = MockHttpClient::new().with_response(page_url(SchemaVersion::V1), r#"{"value":[]}"#);
        let h = harness(http, SchemaVersion::V1);

        let err = h.session.open_entity(&page_request()).await.unwrap_err();

        assert!(matches!(err, FetchError::EmptyResponse { .. }));
        assert!(h.notifier.infos.lock().contains(&messages::EMPTY_RESPONSE.to_string()));
        assert!(h.notifier.opened.lock().is_empty());
    }

    #[tokio::test]
    async fn test_missing_name_reported_per_record() {
        let body = json!({ "value": [
            { "adx_webpageid": "a", "adx_copy": "nameless" },
            { "adx_webpageid": "b", "adx_name": "Kept", "adx_copy": "kept" },
        ]});
        let http = MockHttpClient::new().with_response(page_url(SchemaVersion::V1), body.to_string());
        let h = harness(http, SchemaVersion::V1);

        let report = h.session.open_entity(&page_request()).await.unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.written.len(), 3);
        assert_eq!(h.notifier.errors.lock()[0].0, messages::FILE_NOT_AVAILABLE);
        assert_eq!(h.sink.count("EmptyFileName"), 1);
        assert_eq!(h.notifier.opened.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_intelligence_endpoint_not_resolved() {
        let h = harness(MockHttpClient::new(), SchemaVersion::V1);
        let tenant = TenantId::parse(TENANT).unwrap();

        let result = h.session.intelligence_endpoint(&tenant, "env-1").await;

        assert_eq!(result, IntelligenceEndpoint::not_resolved());
        assert_eq!(h.sink.count("ClusterResolutionFailed"), 1);
        assert_eq!(h.sink.count("CrossGeoFlagFetched") + h.sink.count("CrossGeoFlagFailed"), 0);
    }

    #[tokio::test]
    async fn test_intelligence_endpoint_supported_geo() {
        let http = MockHttpClient::new().with_response(
            prod_url(),
            r#"{"geoName":"eu","environment":"prod","clusterNumber":"104"}"#,
        );
        let h = harness(http, SchemaVersion::V1);
        let tenant = TenantId::parse(TENANT).unwrap();

        // The policy lookup has no scripted response, so the flag reads as false.
        let result = h.session.intelligence_endpoint(&tenant, "env-1").await;

        assert_eq!(result.geo_name.as_deref(), Some("eu"));
        assert!(!result.cross_geo_enabled);
        assert_eq!(
            result.endpoint,
            Endpoint::Available(format!(
                "https://aibuildertextapiservice.eu-il104.gateway.prod.island.powerapps.com/v1.0/{}/appintelligence/chat",
                TENANT
            ))
        );
        assert_eq!(h.sink.count("CrossGeoFlagFailed"), 1);
    }

    #[tokio::test]
    async fn test_sequential_saves_of_sibling_component_files() {
        let body = json!({
            "powerpagecomponentid": PAGE_ID,
            "name": "Home",
            "content": r#"{"copy":"old copy","customcss":"old css"}"#,
        });
        let http = MockHttpClient::new().with_response(page_url(SchemaVersion::V2), body.to_string());
        let h = harness(http, SchemaVersion::V2);
        h.session.open_entity(&page_request()).await.unwrap();

        let copy = VirtualPath::new("/contoso/web-pages/home/home.en-US.webpage.copy.html");
        let css = VirtualPath::new("/contoso/web-pages/home/home.en-US.webpage.custom_css.css");

        h.session.save_request(&copy, "new copy", ORG).unwrap();
        h.session.commit_save(&copy, "new copy").unwrap();
        let second = h.session.save_request(&css, "new css", ORG).unwrap();

        let content: serde_json::Value =
            serde_json::from_str(second.body["content"].as_str().unwrap()).unwrap();
        assert_eq!(content["copy"], "new copy");
        assert_eq!(content["customcss"], "new css");
    }

    #[tokio::test]
    async fn test_unwritable_record_shows_parameter_dialog() {
        let body = json!({ "powerpagecomponentid": PAGE_ID, "name": "Home", "content": "{broken" });
        let http = MockHttpClient::new().with_response(page_url(SchemaVersion::V2), body.to_string());
        let h = harness(http, SchemaVersion::V2);

        let report = h.session.open_entity(&page_request()).await.unwrap();

        assert!(report.written.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            *h.notifier.errors.lock(),
            vec![(
                messages::INVALID_PARAMETERS.to_string(),
                messages::INVALID_PARAMETERS_DETAIL.to_string()
            )]
        );
        assert!(h.notifier.opened.lock().is_empty());
        assert!(h.saves.registrations.lock().is_empty());
    }
}
