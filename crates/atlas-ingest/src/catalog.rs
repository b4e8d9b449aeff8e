//! # Published Source Catalogs
//!
//! The per-country tables of where each layer comes from and how its
//! attributes resolve. These are data, maintained by release: endpoint
//! descriptors for the configured portals, and the `LayerSpec` each
//! layer normalizes under, including the attribute-name churn observed
//! across vintages (`GEOID` vs `GEOID20`, `NAMELSAD` vs `NAME`).
//!
//! Nothing here fetches. A catalog entry plus a `FetchClient` makes a
//! `SourceAdapter`; the engine decides which entries a build uses.

use std::collections::BTreeMap;

use atlas_core::{AtlasError, AuthorityLevel, CountryCode, LayerType};

use crate::layer_spec::{LayerSpec, RegionRule};
use crate::provider::{EndpointDescriptor, LayerConfig, ProviderKind};

/// One configured upstream source with its layers and specs.
#[derive(Debug, Clone)]
pub struct SourceCatalogEntry {
    /// Stable source name, used in records and reports.
    pub name: String,
    /// The dialect the portal speaks.
    pub kind: ProviderKind,
    /// Publishing organization, bound into provenance.
    pub organization: String,
    /// The layers this source serves.
    pub layers: Vec<(LayerConfig, LayerSpec)>,
}

/// The published catalog for a country.
pub fn catalog_for(country: &CountryCode) -> Result<Vec<SourceCatalogEntry>, AtlasError> {
    match country.as_str() {
        "US" => Ok(us_catalog()),
        "GB" => Ok(gb_catalog()),
        other => Err(AtlasError::InvalidInput(format!(
            "no published source catalog for country {other}"
        ))),
    }
}

fn authority(level: u8) -> AuthorityLevel {
    AuthorityLevel::new(level).expect("catalog levels are static literals in 1..=5")
}

fn tigerweb_endpoint(layer_path: &str) -> EndpointDescriptor {
    EndpointDescriptor {
        base_url: "https://tigerweb.geo.census.gov/arcgis/rest/services/TIGERweb".into(),
        resource: Some(layer_path.to_string()),
        extra_params: BTreeMap::new(),
    }
}

/// US state FIPS translation, shared by every TIGERweb layer spec.
fn us_state_fips_map() -> BTreeMap<String, String> {
    [
        ("01", "US-AL"), ("02", "US-AK"), ("04", "US-AZ"), ("05", "US-AR"),
        ("06", "US-CA"), ("08", "US-CO"), ("09", "US-CT"), ("10", "US-DE"),
        ("11", "US-DC"), ("12", "US-FL"), ("13", "US-GA"), ("15", "US-HI"),
        ("16", "US-ID"), ("17", "US-IL"), ("18", "US-IN"), ("19", "US-IA"),
        ("20", "US-KS"), ("21", "US-KY"), ("22", "US-LA"), ("23", "US-ME"),
        ("24", "US-MD"), ("25", "US-MA"), ("26", "US-MI"), ("27", "US-MN"),
        ("28", "US-MS"), ("29", "US-MO"), ("30", "US-MT"), ("31", "US-NE"),
        ("32", "US-NV"), ("33", "US-NH"), ("34", "US-NJ"), ("35", "US-NM"),
        ("36", "US-NY"), ("37", "US-NC"), ("38", "US-ND"), ("39", "US-OH"),
        ("40", "US-OK"), ("41", "US-OR"), ("42", "US-PA"), ("44", "US-RI"),
        ("45", "US-SC"), ("46", "US-SD"), ("47", "US-TN"), ("48", "US-TX"),
        ("49", "US-UT"), ("50", "US-VT"), ("51", "US-VA"), ("53", "US-WA"),
        ("54", "US-WV"), ("55", "US-WI"), ("56", "US-WY"),
    ]
    .into_iter()
    .map(|(fips, region)| (fips.to_string(), region.to_string()))
    .collect()
}

fn us_layer_spec(layer: LayerType, vintage: u16, level: u8) -> LayerSpec {
    LayerSpec {
        layer,
        country: CountryCode::new("US").expect("static code"),
        // The census bureau renamed these columns across the 2010/2020
        // vintages; priority order prefers the current name.
        id_attributes: vec![
            "GEOID".into(),
            "GEOID20".into(),
            "GEOID10".into(),
            "DISTRICT".into(),
        ],
        name_attributes: vec!["NAMELSAD".into(), "NAME".into(), "BASENAME".into()],
        region_rule: RegionRule::Attribute {
            attribute: "STATEFP".into(),
            map: us_state_fips_map(),
        },
        allow_unknown_region: false,
        vintage,
        authority_level: authority(level),
    }
}

fn us_layer(
    layer: LayerType,
    display_name: &str,
    expected_count: Option<u32>,
    tiger_path: &str,
    vintage: u16,
    level: u8,
) -> (LayerConfig, LayerSpec) {
    (
        LayerConfig {
            layer,
            display_name: display_name.into(),
            expected_count,
            vintage,
            authority_level: authority(level),
            endpoint: tigerweb_endpoint(tiger_path),
        },
        us_layer_spec(layer, vintage, level),
    )
}

/// The US catalog: TIGERweb for every federal layer, the block-group
/// partition layer included (it normalizes like any other layer and is
/// consumed by the assembler, not committed).
fn us_catalog() -> Vec<SourceCatalogEntry> {
    vec![SourceCatalogEntry {
        name: "census-tigerweb".into(),
        kind: ProviderKind::ArcGisRest,
        organization: "US Census Bureau".into(),
        layers: vec![
            us_layer(
                LayerType::Congressional,
                "Congressional Districts (118th)",
                Some(435),
                "Legislative/MapServer/0",
                2024,
                5,
            ),
            us_layer(
                LayerType::StateUpper,
                "State Legislative Districts - Upper",
                None,
                "Legislative/MapServer/1",
                2024,
                5,
            ),
            us_layer(
                LayerType::StateLower,
                "State Legislative Districts - Lower",
                None,
                "Legislative/MapServer/2",
                2024,
                5,
            ),
            us_layer(
                LayerType::County,
                "Counties",
                Some(3143),
                "State_County/MapServer/11",
                2024,
                5,
            ),
            us_layer(
                LayerType::City,
                "Incorporated Places",
                None,
                "Places_CouSub_ConCity_SubMCD/MapServer/4",
                2024,
                4,
            ),
            us_layer(
                LayerType::SchoolUnified,
                "Unified School Districts",
                None,
                "School/MapServer/2",
                2024,
                4,
            ),
            us_layer(
                LayerType::SchoolElementary,
                "Elementary School Districts",
                None,
                "School/MapServer/0",
                2024,
                4,
            ),
            us_layer(
                LayerType::SchoolSecondary,
                "Secondary School Districts",
                None,
                "School/MapServer/1",
                2024,
                4,
            ),
            us_layer(
                LayerType::CensusTract,
                "Census Tracts",
                None,
                "Tracts_Blocks/MapServer/0",
                2024,
                5,
            ),
        ],
    }]
}

/// The GB catalog: ONS open geography for constituencies, OS Boundary-Line
/// over WFS as the independent second source.
fn gb_catalog() -> Vec<SourceCatalogEntry> {
    let gb = CountryCode::new("GB").expect("static code");
    let ons_spec = LayerSpec {
        layer: LayerType::Congressional,
        country: gb.clone(),
        id_attributes: vec!["PCON24CD".into(), "PCON21CD".into(), "pcon19cd".into()],
        name_attributes: vec!["PCON24NM".into(), "PCON21NM".into(), "pcon19nm".into()],
        // ONS codes carry their nation in the leading letter.
        region_rule: RegionRule::IdPrefix(vec![
            ("E".into(), "GB-ENG".into()),
            ("W".into(), "GB-WLS".into()),
            ("S".into(), "GB-SCT".into()),
            ("N".into(), "GB-NIR".into()),
        ]),
        allow_unknown_region: false,
        vintage: 2024,
        authority_level: authority(5),
    };
    let boundary_line_spec = LayerSpec {
        id_attributes: vec!["CODE".into(), "ONS_CODE".into()],
        name_attributes: vec!["NAME".into()],
        authority_level: authority(4),
        ..ons_spec.clone()
    };

    vec![
        SourceCatalogEntry {
            name: "ons-open-geography".into(),
            kind: ProviderKind::ArcGisRest,
            organization: "Office for National Statistics".into(),
            layers: vec![(
                LayerConfig {
                    layer: LayerType::Congressional,
                    display_name: "Westminster Parliamentary Constituencies".into(),
                    expected_count: Some(650),
                    vintage: 2024,
                    authority_level: authority(5),
                    endpoint: EndpointDescriptor {
                        base_url:
                            "https://services1.arcgis.com/ESMARspQHYMw9BZ9/arcgis/rest/services"
                                .into(),
                        resource: Some("PCON_JULY_2024_UK_BFC/FeatureServer/0".into()),
                        extra_params: BTreeMap::new(),
                    },
                },
                ons_spec,
            )],
        },
        SourceCatalogEntry {
            name: "os-boundary-line".into(),
            kind: ProviderKind::OgcWfs,
            organization: "Ordnance Survey".into(),
            layers: vec![(
                LayerConfig {
                    layer: LayerType::Congressional,
                    display_name: "Boundary-Line Westminster Constituencies".into(),
                    expected_count: Some(650),
                    vintage: 2024,
                    authority_level: authority(4),
                    endpoint: EndpointDescriptor {
                        base_url: "https://api.os.uk/features/v1/wfs".into(),
                        resource: Some("Zoomstack_Boundaries:westminster_const".into()),
                        extra_params: BTreeMap::new(),
                    },
                },
                boundary_line_spec,
            )],
        },
    ]
}
