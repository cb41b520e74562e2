use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use hazex_core::{zonal_stats, Hazard, ZonalAggregate};

use crate::AppState;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "hazex-serve",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Serialize)]
pub struct CountryInfo {
    pub name: String,
    pub iso_3: String,
    pub available_admin_levels: usize,
}

/// Countries covered by the loaded admin boundaries, with the number of
/// admin levels the boundary file carries.
pub async fn country_list(State(state): State<AppState>) -> Json<Vec<CountryInfo>> {
    let boundaries = &state.boundaries;
    let levels = ["adm0_src", "adm1_src", "adm2_src"]
        .iter()
        .filter(|&&col| boundaries.has_column(col))
        .count();

    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for zi in 0..boundaries.len() {
        let code = boundaries
            .attribute(zi, "adm0_src")
            .unwrap_or_default()
            .to_string();
        let name = boundaries
            .attribute(zi, "adm0_name")
            .map(str::to_string)
            .unwrap_or_else(|| code.clone());
        seen.entry(code).or_insert(name);
    }

    Json(
        seen.into_iter()
            .map(|(iso_3, name)| CountryInfo {
                name,
                iso_3,
                available_admin_levels: levels,
            })
            .collect(),
    )
}

#[derive(Deserialize)]
pub struct FormatParam {
    pub format: Option<String>,
}

/// Per-country hazard table: `?format=csv` streams the exported CSV,
/// `?format=geojson` the admin boundary file; anything else gets an HTML
/// greeting echoing the request.
pub async fn hazard_table(
    Path((country, hazard, admin_level)): Path<(String, String, String)>,
    Query(params): Query<FormatParam>,
    State(state): State<AppState>,
) -> Response {
    let hazard: Hazard = match hazard.parse() {
        Ok(h) => h,
        Err(e) => return (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    };

    match params.format.as_deref() {
        Some("csv") => {
            let path = state.config.output_path(hazard);
            match std::fs::read_to_string(&path) {
                Ok(body) => ([(header::CONTENT_TYPE, "text/csv")], body).into_response(),
                Err(_) => (
                    StatusCode::NOT_FOUND,
                    format!(
                        "no exported table at {} (run the analyze tool first)",
                        path.display()
                    ),
                )
                    .into_response(),
            }
        }
        Some("geojson") => {
            let path = &state.config.admin_boundaries;
            match std::fs::read_to_string(path) {
                Ok(body) => {
                    ([(header::CONTENT_TYPE, "application/geo+json")], body).into_response()
                }
                Err(_) => (
                    StatusCode::NOT_FOUND,
                    format!("no boundary file at {}", path.display()),
                )
                    .into_response(),
            }
        }
        _ => Html(format!(
            "<p>You are requesting {} exposure for {} at admin level {}.</p>",
            hazard.name(),
            country,
            admin_level
        ))
        .into_response(),
    }
}

/// Population sums per admin region (zonal Sum over the population raster,
/// nodata masked), keyed by the deepest admin name column.
pub async fn population_totals(State(state): State<AppState>) -> Json<BTreeMap<String, i64>> {
    let boundaries = &state.boundaries;
    let sums = zonal_stats(&state.population, &boundaries.zones, ZonalAggregate::Sum);
    let name_col = boundaries.deepest_name_column();

    let mut out = BTreeMap::new();
    let mut grand_total = 0.0f64;
    for (zi, sum) in sums.iter().enumerate() {
        let Some(name) = boundaries.attribute(zi, name_col) else {
            continue;
        };
        let v = sum.unwrap_or(0.0);
        grand_total += v;
        out.insert(name.to_string(), v.round() as i64);
    }
    tracing::info!(grand_total, "population totals computed");
    Json(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;

    use hazex_core::boundaries::Zone;
    use hazex_core::{AdminBoundaries, Grid, PipelineConfig};

    /// Two-zone state over a 2x2 population grid: the west column sums to
    /// 2.6 people, the east to 2.2. Output dir points into the temp dir,
    /// with no exports written yet.
    fn test_state(dir: &std::path::Path) -> AppState {
        let mut config = PipelineConfig::default();
        config.output_dir = dir.join("out");
        config.admin_boundaries = dir.join("admin.geojson");

        let boundaries = AdminBoundaries {
            columns: ["adm0_src", "adm0_name", "adm1_src", "adm1_name"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            attributes: vec![
                ["TST", "Testland", "TST-W", "West"].iter().map(|s| s.to_string()).collect(),
                ["TST", "Testland", "TST-E", "East"].iter().map(|s| s.to_string()).collect(),
            ],
            zones: vec![
                Zone::from_rings(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 2.0], [0.0, 2.0]]]),
                Zone::from_rings(vec![vec![[1.0, 0.0], [2.0, 0.0], [2.0, 2.0], [1.0, 2.0]]]),
            ],
        };

        let mut population = Grid::new(2, 2, 0.0, 2.0, 0.0, 2.0, 0.0);
        population.set(0, 0, 1.3);
        population.set(1, 0, 1.3);
        population.set(0, 1, 1.2);
        population.set(1, 1, 1.0);

        AppState {
            config: Arc::new(config),
            boundaries: Arc::new(boundaries),
            population: Arc::new(population),
        }
    }

    fn request(
        hazard: &str,
        format: Option<&str>,
        state: AppState,
    ) -> impl std::future::Future<Output = Response> {
        hazard_table(
            Path(("TST".to_string(), hazard.to_string(), "1".to_string())),
            Query(FormatParam {
                format: format.map(str::to_string),
            }),
            State(state),
        )
    }

    #[tokio::test]
    async fn unknown_hazard_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let resp = request("volcano", Some("csv"), test_state(dir.path())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_export_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let resp = request("flood", Some("csv"), test_state(dir.path())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn exported_table_is_served_as_csv() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let path = state.config.output_path(Hazard::Flood);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "adm0_src,pop_exp\nTST,400\n").unwrap();

        let resp = request("flood", Some("csv"), state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/csv");
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), b"adm0_src,pop_exp\nTST,400\n");
    }

    #[tokio::test]
    async fn population_sums_round_and_key_by_deepest_name() {
        let dir = tempfile::tempdir().unwrap();
        let Json(totals) = population_totals(State(test_state(dir.path()))).await;
        assert_eq!(totals.get("West"), Some(&3)); // 2.6 rounds up
        assert_eq!(totals.get("East"), Some(&2)); // 2.2 rounds down
        assert_eq!(totals.len(), 2);
    }
}
