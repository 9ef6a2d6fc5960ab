//! Point set, search and material catalogue over PostgREST.

use async_trait::async_trait;
use serde_json::json;
use trashmap_core::{
    ConnectivityProbe, Material, MaterialSource, MaterialSourceError, Point, PointSource,
    RemoteFetchError, SearchError, SearchQuery, SearchSource,
};

use super::SupabaseClient;

/// Remote procedure returning every collection point.
pub const POINTS_PROCEDURE: &str = "rpc/listar_pontos_mapa";

/// View joining places with their coordinates and materials.
pub const SEARCH_VIEW: &str = "places_with_coordinates";

/// Table holding the material catalogue.
pub const MATERIALS_TABLE: &str = "materials";

const SEARCH_COLUMNS: &str = "id,name,latitude,longitude,accepted_materials,accepted_materials_id";

/// [`PointSource`] calling the point listing procedure.
#[derive(Debug, Clone)]
pub struct HttpPointSource {
    client: SupabaseClient,
}

impl HttpPointSource {
    /// Read points through `client`.
    pub const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl PointSource for HttpPointSource {
    async fn fetch_points(&self) -> Result<Vec<Point>, RemoteFetchError> {
        let url = self.client.config().rest_url(POINTS_PROCEDURE);
        self.client.post_json(&url, &json!({})).await
    }
}

/// [`SearchSource`] querying the places view.
#[derive(Debug, Clone)]
pub struct HttpSearchSource {
    client: SupabaseClient,
}

impl HttpSearchSource {
    /// Query the search view through `client`.
    pub const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

/// PostgREST query parameters for `query`.
///
/// The name filter is a case-insensitive substring match; a material filter
/// requires the id array to contain every selected id.
pub fn search_params(query: &SearchQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", SEARCH_COLUMNS.to_owned()),
        ("name", format!("ilike.*{}*", query.text())),
    ];
    if !query.materials().is_empty() {
        let ids: Vec<String> = query.materials().ids().map(|id| id.to_string()).collect();
        params.push(("accepted_materials_id", format!("cs.{{{}}}", ids.join(","))));
    }
    params
}

#[async_trait(?Send)]
impl SearchSource for HttpSearchSource {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Point>, SearchError> {
        let url = self.client.config().rest_url(SEARCH_VIEW);
        self.client
            .get_json(&url, &search_params(query))
            .await
            .map_err(|err| match err {
                RemoteFetchError::Decode { message, .. } => SearchError::Decode { message },
                other => SearchError::Unavailable {
                    url,
                    message: other.to_string(),
                },
            })
    }
}

/// [`MaterialSource`] reading the catalogue in creation order.
#[derive(Debug, Clone)]
pub struct HttpMaterialSource {
    client: SupabaseClient,
}

impl HttpMaterialSource {
    /// List materials through `client`.
    pub const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl MaterialSource for HttpMaterialSource {
    async fn fetch_materials(&self) -> Result<Vec<Material>, MaterialSourceError> {
        let url = self.client.config().rest_url(MATERIALS_TABLE);
        let params = [
            ("select", "*".to_owned()),
            ("order", "created_at.asc".to_owned()),
        ];
        self.client
            .get_json(&url, &params)
            .await
            .map_err(|err| match err {
                RemoteFetchError::Decode { message, .. } => MaterialSourceError::Decode { message },
                other => MaterialSourceError::Unavailable {
                    url,
                    message: other.to_string(),
                },
            })
    }
}

/// [`ConnectivityProbe`] treating any answer from the REST root as online.
#[derive(Debug, Clone)]
pub struct HttpConnectivityProbe {
    client: SupabaseClient,
}

impl HttpConnectivityProbe {
    /// Probe reachability through `client`.
    pub const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl ConnectivityProbe for HttpConnectivityProbe {
    async fn is_online(&self) -> bool {
        self.client.probe().await
    }
}
