//! Built-in reference dataset for an empty catalog.
//!
//! Mirrors the production seed: five provinces with generated regencies
//! and districts, the staple commodities with their common varieties,
//! the pest/disease reference entries, and per-province distribution
//! facts for the recent years. Runs once, only when the database holds
//! no rows.

use anyhow::Result;
use chrono::Datelike;
use serde_json::json;
use tania_common::catalog_db::CatalogDb;
use tania_common::models::{Commodity, Distribution, GeoUnit, Pest, PestType, Variety};
use tracing::info;

struct PestSeed {
    name: &'static str,
    scientific_name: &'static str,
    pest_type: PestType,
    description: &'static str,
    symptoms: &'static [&'static str],
    affected: &'static [&'static str],
    control_methods: &'static [&'static str],
    insecticides: &'static [&'static str],
    environmental: &'static [&'static str],
}

const PROVINCES: &[(&str, &str, f64, f64)] = &[
    ("West Java", "JB", -6.9175, 107.6191),
    ("Central Java", "JT", -7.1509, 110.1403),
    ("East Java", "JI", -7.5360, 112.2384),
    ("North Sumatra", "SU", 3.5952, 98.6722),
    ("South Sulawesi", "SN", -3.6687, 119.9740),
];

const COMMODITIES: &[(&str, &str, &str, &str)] = &[
    (
        "Rice",
        "Oryza sativa",
        "food crop",
        "Staple food crop grown in irrigated lowland and rainfed fields.",
    ),
    (
        "Corn",
        "Zea mays",
        "food crop",
        "Major cereal crop for food and animal feed.",
    ),
    (
        "Coffee",
        "Coffea spp.",
        "plantation",
        "Smallholder plantation crop, arabica in the highlands and robusta below.",
    ),
    (
        "Tomato",
        "Solanum lycopersicum",
        "horticulture",
        "Widely grown vegetable crop for fresh markets.",
    ),
    (
        "Chili",
        "Capsicum annuum",
        "horticulture",
        "High-value vegetable crop sensitive to price swings.",
    ),
];

const VARIETIES: &[(&str, &str, &str, i64, f64)] = &[
    (
        "Rice",
        "IR64",
        "Widely planted lowland variety with good eating quality.",
        115,
        6.0,
    ),
    (
        "Rice",
        "Ciherang",
        "Popular IR64 successor with better blast tolerance.",
        120,
        6.5,
    ),
    (
        "Corn",
        "Pioneer 21",
        "Hybrid corn with high yield potential under intensive management.",
        103,
        9.2,
    ),
    (
        "Tomato",
        "Servo F1",
        "Determinate hybrid for lowland cultivation.",
        75,
        4.5,
    ),
];

const PESTS: &[PestSeed] = &[
    PestSeed {
        name: "Brown Planthopper",
        scientific_name: "Nilaparvata lugens",
        pest_type: PestType::Pest,
        description: "A major pest of rice that causes hopperburn and transmits viral diseases.",
        symptoms: &[
            "Yellowing and drying of rice plants",
            "Stunted growth",
            "Honeydew deposits on leaves",
            "Sooty mold on plants",
        ],
        affected: &["Rice"],
        control_methods: &[
            "Use resistant varieties",
            "Proper water management",
            "Avoid excessive nitrogen fertilization",
            "Biological control with spiders and parasitoids",
            "Targeted insecticide application",
        ],
        insecticides: &[
            "Imidacloprid 17.8 SL @ 0.3 ml/L",
            "Buprofezin 25 SC @ 2 ml/L",
            "Clothianidin 50 WDG @ 0.3 g/L",
        ],
        environmental: &[
            "High humidity favors development",
            "Temperature range 25-30C optimal",
            "Dense planting increases infestation",
        ],
    },
    PestSeed {
        name: "Fall Armyworm",
        scientific_name: "Spodoptera frugiperda",
        pest_type: PestType::Pest,
        description: "An invasive pest that attacks various crops including corn, rice, and vegetables.",
        symptoms: &[
            "Feeding damage on leaves creating window panes",
            "Damage to growing point (whorl)",
            "Presence of frass in whorl",
            "Ragged holes in leaves",
        ],
        affected: &["Corn", "Rice"],
        control_methods: &[
            "Early detection and monitoring",
            "Pheromone traps",
            "Egg mass destruction",
            "Biological control with natural enemies",
            "Targeted insecticide spray",
        ],
        insecticides: &[
            "Emamectin benzoate 5 SG @ 0.4 g/L",
            "Chlorantraniliprole 18.5 SC @ 0.3 ml/L",
            "Spinetoram 11.7 SC @ 0.5 ml/L",
        ],
        environmental: &[
            "Warm temperatures accelerate development",
            "Can spread rapidly with wind",
            "Multiple host plants available",
        ],
    },
    PestSeed {
        name: "Rice Blast",
        scientific_name: "Pyricularia oryzae",
        pest_type: PestType::Disease,
        description: "A fungal disease that causes significant yield losses in rice production.",
        symptoms: &[
            "Diamond-shaped lesions on leaves",
            "Gray center with brown borders",
            "Neck rot causing panicle death",
            "Node infection causing stem breakage",
        ],
        affected: &["Rice"],
        control_methods: &[
            "Use resistant varieties",
            "Proper seed treatment",
            "Balanced fertilization",
            "Field sanitation",
            "Fungicide application",
        ],
        insecticides: &[
            "Tricyclazole 75 WP @ 0.6 g/L",
            "Azoxystrobin 23 SC @ 1 ml/L",
            "Isoprothiolane 40 EC @ 1.5 ml/L",
        ],
        environmental: &[
            "High humidity and moderate temperature",
            "Water stress favors infection",
            "Dense canopy increases disease pressure",
        ],
    },
    PestSeed {
        name: "Bacterial Wilt",
        scientific_name: "Ralstonia solanacearum",
        pest_type: PestType::Disease,
        description: "A bacterial disease affecting tomato, potato, and other solanaceous crops.",
        symptoms: &[
            "Sudden wilting of plants",
            "Yellow lower leaves",
            "Brown vascular discoloration",
            "Bacterial ooze from cut stems",
        ],
        affected: &["Tomato", "Chili"],
        control_methods: &[
            "Use resistant varieties",
            "Crop rotation with non-host plants",
            "Soil solarization",
            "Proper drainage",
            "Avoid mechanical damage to roots",
        ],
        insecticides: &[
            "Copper hydroxide 77 WP @ 2 g/L",
            "Streptomycin sulfate 9% + Tetracycline 1% @ 0.5 g/L",
            "Bordeaux mixture @ 1%",
        ],
        environmental: &[
            "High soil moisture and temperature",
            "Soil pH between 6.0-7.0 favors disease",
            "Poor drainage increases incidence",
        ],
    },
    PestSeed {
        name: "Aphids",
        scientific_name: "Various species",
        pest_type: PestType::Pest,
        description: "Small sap-sucking insects that attack a wide range of crops.",
        symptoms: &[
            "Curled and yellowing leaves",
            "Stunted plant growth",
            "Honeydew deposits",
            "Sooty mold development",
            "Transmission of viral diseases",
        ],
        affected: &["Tomato", "Chili", "Corn"],
        control_methods: &[
            "Regular monitoring",
            "Natural predators conservation",
            "Reflective mulch",
            "Neem-based products",
            "Selective insecticides",
        ],
        insecticides: &[
            "Imidacloprid 200 SL @ 0.3 ml/L",
            "Acetamiprid 20 SP @ 0.2 g/L",
            "Neem oil @ 5 ml/L",
        ],
        environmental: &[
            "Cool weather favors population growth",
            "Water stress increases susceptibility",
            "Over-fertilization with nitrogen",
        ],
    },
    PestSeed {
        name: "Coffee Berry Borer",
        scientific_name: "Hypothenemus hampei",
        pest_type: PestType::Pest,
        description: "A major pest of coffee that bores into coffee berries.",
        symptoms: &[
            "Small holes in coffee berries",
            "Premature berry drop",
            "Reduced coffee quality",
            "Presence of bore dust",
        ],
        affected: &["Coffee"],
        control_methods: &[
            "Timely harvesting",
            "Field sanitation",
            "Pheromone traps",
            "Biological control agents",
            "Targeted insecticide application",
        ],
        insecticides: &[
            "Endosulfan 35 EC @ 2 ml/L",
            "Chlorpyrifos 20 EC @ 2 ml/L",
        ],
        environmental: &[
            "High altitude and moderate temperature",
            "High humidity favors development",
            "Presence of mature berries",
        ],
    },
];

/// Populate an empty database. Returns the number of pest entries.
pub fn seed(db: &CatalogDb) -> Result<usize> {
    let mut commodity_ids: Vec<(String, i64)> = Vec::new();
    let mut province_ids: Vec<i64> = Vec::new();

    for (name, code, lat, lon) in PROVINCES {
        let province_id = db.insert_province(&GeoUnit {
            id: 0,
            parent_id: None,
            name: name.to_string(),
            code: code.to_string(),
            latitude: Some(*lat),
            longitude: Some(*lon),
            boundaries: None,
        })?;
        province_ids.push(province_id);

        for n in 1..=3 {
            let regency_id = db.insert_regency(&GeoUnit {
                id: 0,
                parent_id: Some(province_id),
                name: format!("{} Regency {}", name, n),
                code: format!("{}{:02}", code, n),
                latitude: None,
                longitude: None,
                boundaries: None,
            })?;
            for d in 1..=2 {
                db.insert_district(&GeoUnit {
                    id: 0,
                    parent_id: Some(regency_id),
                    name: format!("{} Regency {} District {}", name, n, d),
                    code: format!("{}{:02}{:03}", code, n, d),
                    latitude: None,
                    longitude: None,
                    boundaries: None,
                })?;
            }
        }
    }

    for (name, scientific_name, category, description) in COMMODITIES {
        let id = db.insert_commodity(&Commodity {
            id: 0,
            name: name.to_string(),
            scientific_name: Some(scientific_name.to_string()),
            description: Some(description.to_string()),
            category: category.to_string(),
            image_url: None,
            growing_conditions: Some(json!({
                "climate": "tropical",
                "altitude_m": if *name == "Coffee" { "700-1600" } else { "0-800" },
            })),
            harvest_info: None,
        })?;
        commodity_ids.push((name.to_string(), id));
    }

    let commodity_id = |name: &str| -> i64 {
        commodity_ids
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
            .unwrap_or(0)
    };

    for (commodity, name, description, maturity_days, potential_yield) in VARIETIES {
        db.insert_variety(&Variety {
            id: 0,
            commodity_id: commodity_id(commodity),
            name: name.to_string(),
            description: Some(description.to_string()),
            agronomic_traits: None,
            pest_susceptibility: None,
            maturity_days: Some(*maturity_days),
            potential_yield: Some(*potential_yield),
            yield_unit: "tons".to_string(),
            image_url: None,
        })?;
    }

    let now = chrono::Utc::now().timestamp();
    for (index, entry) in PESTS.iter().enumerate() {
        let to_vec = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        db.insert_pest(&Pest {
            id: 0,
            name: entry.name.to_string(),
            scientific_name: Some(entry.scientific_name.to_string()),
            pest_type: entry.pest_type,
            description: Some(entry.description.to_string()),
            symptoms: to_vec(entry.symptoms),
            affected_commodities: entry.affected.iter().map(|n| commodity_id(n)).collect(),
            control_methods: to_vec(entry.control_methods),
            insecticide_recommendations: to_vec(entry.insecticides),
            image_url: None,
            environmental_factors: to_vec(entry.environmental),
            // Spread creation times so the recent listing has an order.
            created_at: now - ((PESTS.len() - index) as i64) * 86_400,
        })?;
    }

    // Province-level production facts for the last three years.
    let current_year = chrono::Utc::now().year() as i64;
    for year in (current_year - 2)..=current_year {
        for (p_index, province_id) in province_ids.iter().enumerate() {
            for (c_index, (_, commodity_id)) in commodity_ids.iter().enumerate() {
                let area = 1_000.0 + (p_index as f64) * 350.0 + (c_index as f64) * 120.0;
                let production = area * (3.5 + (c_index as f64) * 0.6);
                db.insert_distribution(&Distribution {
                    id: 0,
                    commodity_id: *commodity_id,
                    province_id: Some(*province_id),
                    regency_id: None,
                    district_id: None,
                    area_hectares: Some(area),
                    production_tons: Some(production),
                    productivity: Some(production / area),
                    year,
                    environmental_data: Some(json!({
                        "avg_temperature_c": 26.5,
                        "annual_rainfall_mm": 2100,
                    })),
                })?;
            }
        }
    }

    let counts = db.counts()?;
    info!(
        "  Seeded catalog: {} provinces, {} commodities, {} pests, {} distributions",
        counts.provinces, counts.commodities, counts.pests, counts.distributions
    );
    Ok(PESTS.len())
}
