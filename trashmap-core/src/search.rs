//! Name and material search over the remote point catalogue.
//!
//! Search is independent of the map's live point set. Choosing a result only
//! publishes a navigation handoff; the map decides how to select it.

use async_trait::async_trait;
use log::warn;
use thiserror::Error;

use crate::{HandoffId, MaterialFilter, NavigationChannel, Point};

/// A validated, non-blank search.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use trashmap_core::{MaterialFilter, Point, SearchQuery};
///
/// assert!(SearchQuery::new("   ", MaterialFilter::default()).is_none());
///
/// let query = SearchQuery::new(" pet ", MaterialFilter::default()).unwrap();
/// let point = Point::new("1", "Petshop Verde", Coord { x: 0.0, y: 0.0 });
/// assert!(query.matches(&point));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    materials: MaterialFilter,
}

impl SearchQuery {
    /// Build a query, or `None` when `text` is blank.
    pub fn new(text: &str, materials: MaterialFilter) -> Option<Self> {
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| Self {
            text: trimmed.to_owned(),
            materials,
        })
    }

    /// Trimmed search text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Material ids every match must accept.
    pub const fn materials(&self) -> &MaterialFilter {
        &self.materials
    }

    /// Case-insensitive name substring match plus the material filter.
    pub fn matches(&self, point: &Point) -> bool {
        point
            .name
            .to_lowercase()
            .contains(&self.text.to_lowercase())
            && self.materials.matches(point)
    }
}

/// Errors from [`SearchSource::search`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The query endpoint could not be reached or answered with an error.
    #[error("search request to {url} failed: {message}")]
    Unavailable { url: String, message: String },
    /// The response was not a point array.
    #[error("failed to decode search results: {message}")]
    Decode { message: String },
}

/// Query endpoint over the point catalogue.
#[async_trait(?Send)]
pub trait SearchSource {
    /// Return points whose name contains the query text and whose material
    /// ids include every filtered id.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Point>, SearchError>;
}

/// Search surface logic.
pub struct SearchFilter {
    source: Box<dyn SearchSource>,
    navigation: NavigationChannel,
}

impl std::fmt::Debug for SearchFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchFilter")
            .field("navigation", &self.navigation)
            .finish_non_exhaustive()
    }
}

impl SearchFilter {
    /// Search `source` and hand chosen results to `navigation`.
    pub fn new(source: Box<dyn SearchSource>, navigation: NavigationChannel) -> Self {
        Self { source, navigation }
    }

    /// Run a search; blank text yields no results and failures are logged.
    pub async fn search(&self, text: &str, materials: &MaterialFilter) -> Vec<Point> {
        match self.try_search(text, materials).await {
            Ok(points) => points,
            Err(err) => {
                warn!("search for {text:?} failed: {err}");
                Vec::new()
            }
        }
    }

    /// Run a search, reporting source failures.
    pub async fn try_search(
        &self,
        text: &str,
        materials: &MaterialFilter,
    ) -> Result<Vec<Point>, SearchError> {
        let Some(query) = SearchQuery::new(text, materials.clone()) else {
            return Ok(Vec::new());
        };
        let mut points = self.source.search(&query).await?;
        // Sources may match more loosely than the local policy.
        points.retain(|point| query.matches(point));
        Ok(points)
    }

    /// Hand `point` to the map surface.
    pub fn select_result(&self, point: Point) -> HandoffId {
        self.navigation.navigate_with(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemorySearchSource, StubSearchSource};
    use crate::{MaterialId, Point};
    use geo::Coord;
    use rstest::{fixture, rstest};

    #[fixture]
    fn catalogue() -> Vec<Point> {
        vec![
            Point::new("1", "Petshop Verde", Coord { x: 0.0, y: 0.0 })
                .with_materials(["Plástico", "Metal"], [MaterialId(1), MaterialId(2)]),
            Point::new("2", "Super Mercado", Coord { x: 1.0, y: 1.0 })
                .with_materials(["Pilhas"], [MaterialId(3)]),
        ]
    }

    fn filter_over(points: Vec<Point>) -> SearchFilter {
        SearchFilter::new(
            Box::new(MemorySearchSource::new(points)),
            NavigationChannel::default(),
        )
    }

    fn names(points: &[Point]) -> Vec<&str> {
        points.iter().map(|point| point.name.as_str()).collect()
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn blank_text_returns_nothing(catalogue: Vec<Point>, #[case] text: &str) {
        let search = filter_over(catalogue);
        let everything = MaterialFilter::from_iter([MaterialId(1)]);
        assert!(search.search(text, &MaterialFilter::default()).await.is_empty());
        assert!(search.search(text, &everything).await.is_empty());
    }

    #[rstest]
    #[case("pet")]
    #[case("PET")]
    #[case("shop ver")]
    #[tokio::test]
    async fn matches_name_substrings_ignoring_case(catalogue: Vec<Point>, #[case] text: &str) {
        let results = filter_over(catalogue)
            .search(text, &MaterialFilter::default())
            .await;
        assert_eq!(names(&results), ["Petshop Verde"]);
    }

    #[rstest]
    #[tokio::test]
    async fn unsatisfied_material_filter_empties_results(catalogue: Vec<Point>) {
        let filter = MaterialFilter::from_iter([MaterialId(3)]);
        assert!(filter_over(catalogue).search("pet", &filter).await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn material_filter_requires_all_ids(catalogue: Vec<Point>) {
        let search = filter_over(catalogue);
        let both = MaterialFilter::from_iter([MaterialId(1), MaterialId(2)]);
        let too_many = MaterialFilter::from_iter([MaterialId(1), MaterialId(3)]);
        assert_eq!(names(&search.search("e", &both).await), ["Petshop Verde"]);
        assert!(search.search("e", &too_many).await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn loose_sources_are_narrowed_locally(catalogue: Vec<Point>) {
        let search = SearchFilter::new(
            Box::new(StubSearchSource::with_points(catalogue)),
            NavigationChannel::default(),
        );
        let results = search.search("mercado", &MaterialFilter::default()).await;
        assert_eq!(names(&results), ["Super Mercado"]);
    }

    #[rstest]
    #[tokio::test]
    async fn source_failures_yield_no_results() {
        let search = SearchFilter::new(
            Box::new(StubSearchSource::with_error(SearchError::Unavailable {
                url: "https://example.org/rest/v1/places_with_coordinates".into(),
                message: "timeout".into(),
            })),
            NavigationChannel::default(),
        );
        assert!(search.search("pet", &MaterialFilter::default()).await.is_empty());
    }

    #[rstest]
    fn selecting_a_result_publishes_a_handoff(catalogue: Vec<Point>) {
        let navigation = NavigationChannel::default();
        let search = SearchFilter::new(
            Box::new(MemorySearchSource::new(Vec::new())),
            navigation.clone(),
        );
        let chosen = catalogue.into_iter().next().expect("catalogue entry");

        let id = search.select_result(chosen.clone());

        let handoff = navigation.current().expect("handoff published");
        assert_eq!(handoff.id(), id);
        assert_eq!(handoff.point(), &chosen);
    }
}
