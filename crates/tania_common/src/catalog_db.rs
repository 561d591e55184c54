//! Catalog database - SQLite-backed agricultural reference store.
//!
//! Holds the four record kinds plus the distribution fact table:
//! - provinces / regencies / districts: the 3-level administrative tree
//! - commodities and their varieties
//! - pests (pest/disease catalog with JSON symptom/control lists)
//! - commodity_distributions: Commodity x GeographicUnit x Year facts
//!
//! The API surface only reads; inserts exist for seeding and tests.
//! JSON columns are stored as serialized TEXT, matching the original
//! schema's json() columns.

use crate::api::TableCounts;
use crate::models::{
    Commodity, CommodityDetail, CommoditySummary, CommodityWithVarieties, Distribution,
    DistributionDetail, GeoSummary, GeoUnit, IdName, Pest, PestType, Variety,
    VarietyWithCommodity,
};
use crate::symptom_matcher::{self, PestFilter};
use anyhow::Result;
use rusqlite::{params, Connection, Row};
use serde_json::Value;
use std::path::Path;

/// Validated distribution filter with the year already defaulted.
#[derive(Debug, Clone, Default)]
pub struct DistributionFilter {
    pub commodity_id: Option<i64>,
    pub province_id: Option<i64>,
    pub regency_id: Option<i64>,
    pub district_id: Option<i64>,
    pub year: i64,
}

/// SQLite-backed catalog store.
pub struct CatalogDb {
    conn: Connection,
}

impl CatalogDb {
    /// Open or create the catalog database at a path.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::init(conn)
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        // WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS provinces (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                code TEXT NOT NULL UNIQUE,
                latitude REAL,
                longitude REAL,
                boundaries TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_provinces_name ON provinces(name);

            CREATE TABLE IF NOT EXISTS regencies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                province_id INTEGER NOT NULL REFERENCES provinces(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                code TEXT NOT NULL UNIQUE,
                latitude REAL,
                longitude REAL,
                boundaries TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_regencies_province_name ON regencies(province_id, name);

            CREATE TABLE IF NOT EXISTS districts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                regency_id INTEGER NOT NULL REFERENCES regencies(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                code TEXT NOT NULL UNIQUE,
                latitude REAL,
                longitude REAL,
                boundaries TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_districts_regency_name ON districts(regency_id, name);

            CREATE TABLE IF NOT EXISTS commodities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                scientific_name TEXT,
                description TEXT,
                category TEXT NOT NULL,
                image_url TEXT,
                growing_conditions TEXT,
                harvest_info TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_commodities_name ON commodities(name);
            CREATE INDEX IF NOT EXISTS idx_commodities_category_name ON commodities(category, name);

            CREATE TABLE IF NOT EXISTS varieties (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                commodity_id INTEGER NOT NULL REFERENCES commodities(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                agronomic_traits TEXT,
                pest_susceptibility TEXT,
                maturity_days INTEGER,
                potential_yield REAL,
                yield_unit TEXT NOT NULL DEFAULT 'tons',
                image_url TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_varieties_commodity_name ON varieties(commodity_id, name);

            CREATE TABLE IF NOT EXISTS pests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                scientific_name TEXT,
                type TEXT NOT NULL CHECK (type IN ('pest', 'disease')),
                description TEXT,
                symptoms TEXT,
                affected_commodities TEXT,
                control_methods TEXT,
                insecticide_recommendations TEXT,
                image_url TEXT,
                environmental_factors TEXT,
                created_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_pests_type_name ON pests(type, name);

            CREATE TABLE IF NOT EXISTS commodity_distributions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                commodity_id INTEGER NOT NULL REFERENCES commodities(id) ON DELETE CASCADE,
                province_id INTEGER REFERENCES provinces(id) ON DELETE CASCADE,
                regency_id INTEGER REFERENCES regencies(id) ON DELETE CASCADE,
                district_id INTEGER REFERENCES districts(id) ON DELETE CASCADE,
                area_hectares REAL,
                production_tons REAL,
                productivity REAL,
                year INTEGER NOT NULL,
                environmental_data TEXT,
                UNIQUE (commodity_id, province_id, regency_id, district_id, year)
            );
            CREATE INDEX IF NOT EXISTS idx_distributions_commodity_year
                ON commodity_distributions(commodity_id, year);
            CREATE INDEX IF NOT EXISTS idx_distributions_year
                ON commodity_distributions(year);
            "#,
        )?;

        Ok(Self { conn })
    }

    // ========================================================================
    // Seeding inserts (the query surface never mutates)
    // ========================================================================

    pub fn insert_province(&self, unit: &GeoUnit) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO provinces (name, code, latitude, longitude, boundaries)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &unit.name,
                &unit.code,
                unit.latitude,
                unit.longitude,
                json_text(&unit.boundaries)
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_regency(&self, unit: &GeoUnit) -> Result<i64> {
        let province_id = unit
            .parent_id
            .ok_or_else(|| anyhow::anyhow!("regency requires a parent province"))?;
        self.conn.execute(
            "INSERT INTO regencies (province_id, name, code, latitude, longitude, boundaries)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                province_id,
                &unit.name,
                &unit.code,
                unit.latitude,
                unit.longitude,
                json_text(&unit.boundaries)
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_district(&self, unit: &GeoUnit) -> Result<i64> {
        let regency_id = unit
            .parent_id
            .ok_or_else(|| anyhow::anyhow!("district requires a parent regency"))?;
        self.conn.execute(
            "INSERT INTO districts (regency_id, name, code, latitude, longitude, boundaries)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                regency_id,
                &unit.name,
                &unit.code,
                unit.latitude,
                unit.longitude,
                json_text(&unit.boundaries)
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_commodity(&self, commodity: &Commodity) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO commodities
                 (name, scientific_name, description, category, image_url,
                  growing_conditions, harvest_info)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &commodity.name,
                &commodity.scientific_name,
                &commodity.description,
                &commodity.category,
                &commodity.image_url,
                json_text(&commodity.growing_conditions),
                json_text(&commodity.harvest_info)
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_variety(&self, variety: &Variety) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO varieties
                 (commodity_id, name, description, agronomic_traits,
                  pest_susceptibility, maturity_days, potential_yield,
                  yield_unit, image_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                variety.commodity_id,
                &variety.name,
                &variety.description,
                json_text(&variety.agronomic_traits),
                json_text(&variety.pest_susceptibility),
                variety.maturity_days,
                variety.potential_yield,
                &variety.yield_unit,
                &variety.image_url
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_pest(&self, pest: &Pest) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO pests
                 (name, scientific_name, type, description, symptoms,
                  affected_commodities, control_methods,
                  insecticide_recommendations, image_url,
                  environmental_factors, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                &pest.name,
                &pest.scientific_name,
                pest.pest_type.as_str(),
                &pest.description,
                serde_json::to_string(&pest.symptoms)?,
                serde_json::to_string(&pest.affected_commodities)?,
                serde_json::to_string(&pest.control_methods)?,
                serde_json::to_string(&pest.insecticide_recommendations)?,
                &pest.image_url,
                serde_json::to_string(&pest.environmental_factors)?,
                pest.created_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_distribution(&self, distribution: &Distribution) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO commodity_distributions
                 (commodity_id, province_id, regency_id, district_id,
                  area_hectares, production_tons, productivity, year,
                  environmental_data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                distribution.commodity_id,
                distribution.province_id,
                distribution.regency_id,
                distribution.district_id,
                distribution.area_hectares,
                distribution.production_tons,
                distribution.productivity,
                distribution.year,
                json_text(&distribution.environmental_data)
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ========================================================================
    // Existence checks (referential validation)
    // ========================================================================

    pub fn commodity_exists(&self, id: i64) -> Result<bool> {
        self.id_exists("commodities", id)
    }

    pub fn province_exists(&self, id: i64) -> Result<bool> {
        self.id_exists("provinces", id)
    }

    pub fn regency_exists(&self, id: i64) -> Result<bool> {
        self.id_exists("regencies", id)
    }

    pub fn district_exists(&self, id: i64) -> Result<bool> {
        self.id_exists("districts", id)
    }

    fn id_exists(&self, table: &str, id: i64) -> Result<bool> {
        // Table names come from the fixed set above, never from input.
        let sql = format!("SELECT 1 FROM {} WHERE id = ?1 LIMIT 1", table);
        let mut stmt = self.conn.prepare(&sql)?;
        Ok(stmt.exists(params![id])?)
    }

    /// True when no table holds any row (fresh database, pre-seed).
    pub fn is_empty(&self) -> Result<bool> {
        let counts = self.counts()?;
        Ok(counts.provinces == 0
            && counts.commodities == 0
            && counts.pests == 0
            && counts.distributions == 0)
    }

    pub fn counts(&self) -> Result<TableCounts> {
        let count = |table: &str| -> Result<u64> {
            let sql = format!("SELECT COUNT(*) FROM {}", table);
            Ok(self.conn.query_row(&sql, [], |row| row.get::<_, i64>(0))? as u64)
        };
        Ok(TableCounts {
            provinces: count("provinces")?,
            regencies: count("regencies")?,
            districts: count("districts")?,
            commodities: count("commodities")?,
            varieties: count("varieties")?,
            pests: count("pests")?,
            distributions: count("commodity_distributions")?,
        })
    }

    // ========================================================================
    // Geography
    // ========================================================================

    pub fn provinces_summary(&self) -> Result<Vec<GeoSummary>> {
        self.geo_summaries("SELECT id, name, code FROM provinces ORDER BY name", None)
    }

    /// Regencies of a province, `{id, name, code}` ordered by name.
    pub fn regencies_of(&self, province_id: i64) -> Result<Vec<GeoSummary>> {
        self.geo_summaries(
            "SELECT id, name, code FROM regencies WHERE province_id = ?1 ORDER BY name",
            Some(province_id),
        )
    }

    /// Districts of a regency, `{id, name, code}` ordered by name.
    pub fn districts_of(&self, regency_id: i64) -> Result<Vec<GeoSummary>> {
        self.geo_summaries(
            "SELECT id, name, code FROM districts WHERE regency_id = ?1 ORDER BY name",
            Some(regency_id),
        )
    }

    fn geo_summaries(&self, sql: &str, id: Option<i64>) -> Result<Vec<GeoSummary>> {
        let mut stmt = self.conn.prepare(sql)?;
        let map = |row: &Row| -> rusqlite::Result<GeoSummary> {
            Ok(GeoSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                code: row.get(2)?,
            })
        };
        let rows = match id {
            Some(id) => stmt.query_map(params![id], map)?,
            None => stmt.query_map([], map)?,
        };
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ========================================================================
    // Distributions
    // ========================================================================

    /// Filtered distribution facts with related records attached.
    ///
    /// No ORDER BY: row order is whatever the store yields, as in the
    /// original. The cap is applied via LIMIT.
    pub fn filter_distributions(
        &self,
        filter: &DistributionFilter,
        limit: u32,
    ) -> Result<Vec<DistributionDetail>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.id, d.commodity_id, d.province_id, d.regency_id, d.district_id,
                    d.area_hectares, d.production_tons, d.productivity, d.year,
                    d.environmental_data,
                    c.name, c.category,
                    p.name, p.code, r.name, r.code, t.name, t.code
             FROM commodity_distributions d
             JOIN commodities c ON c.id = d.commodity_id
             LEFT JOIN provinces p ON p.id = d.province_id
             LEFT JOIN regencies r ON r.id = d.regency_id
             LEFT JOIN districts t ON t.id = d.district_id
             WHERE d.year = ?1
               AND (?2 IS NULL OR d.commodity_id = ?2)
               AND (?3 IS NULL OR d.province_id = ?3)
               AND (?4 IS NULL OR d.regency_id = ?4)
               AND (?5 IS NULL OR d.district_id = ?5)
             LIMIT ?6",
        )?;
        let rows = stmt.query_map(
            params![
                filter.year,
                filter.commodity_id,
                filter.province_id,
                filter.regency_id,
                filter.district_id,
                limit
            ],
            distribution_detail_from_row,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// All distribution facts of one commodity, any year (detail page).
    pub fn distributions_of_commodity(&self, commodity_id: i64) -> Result<Vec<DistributionDetail>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.id, d.commodity_id, d.province_id, d.regency_id, d.district_id,
                    d.area_hectares, d.production_tons, d.productivity, d.year,
                    d.environmental_data,
                    c.name, c.category,
                    p.name, p.code, r.name, r.code, t.name, t.code
             FROM commodity_distributions d
             JOIN commodities c ON c.id = d.commodity_id
             LEFT JOIN provinces p ON p.id = d.province_id
             LEFT JOIN regencies r ON r.id = d.regency_id
             LEFT JOIN districts t ON t.id = d.district_id
             WHERE d.commodity_id = ?1",
        )?;
        let rows = stmt.query_map(params![commodity_id], distribution_detail_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ========================================================================
    // Pests
    // ========================================================================

    /// Apply a validated pest filter. The store loads the table; the
    /// matching policy itself lives in [`crate::symptom_matcher`].
    /// Results are sorted by name ascending, case-insensitively.
    pub fn search_pests(&self, filter: &PestFilter) -> Result<Vec<Pest>> {
        let mut pests: Vec<Pest> = self
            .all_pests()?
            .into_iter()
            .filter(|pest| symptom_matcher::matches(pest, filter))
            .collect();
        pests.sort_by_key(|pest| pest.name.to_lowercase());
        Ok(pests)
    }

    fn all_pests(&self) -> Result<Vec<Pest>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pests",
            PEST_COLUMNS
        ))?;
        let rows = stmt.query_map([], pest_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_pest(&self, id: i64) -> Result<Option<Pest>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pests WHERE id = ?1",
            PEST_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![id], pest_from_row)?;
        Ok(rows.next().transpose()?)
    }

    /// Most recently added pests (detection page), newest first.
    pub fn recent_pests(&self, limit: u32) -> Result<Vec<Pest>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pests ORDER BY created_at DESC LIMIT ?1",
            PEST_COLUMNS
        ))?;
        let rows = stmt.query_map(params![limit], pest_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ========================================================================
    // Commodities and varieties
    // ========================================================================

    pub fn commodity_summaries(&self) -> Result<Vec<CommoditySummary>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, category FROM commodities ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(CommoditySummary {
                id: row.get(0)?,
                name: row.get(1)?,
                category: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// `{id, name}` pairs for dropdowns, ordered by name.
    pub fn commodity_names(&self) -> Result<Vec<IdName>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM commodities ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(IdName {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Distinct commodity categories, ordered.
    pub fn categories(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT category FROM commodities ORDER BY category")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// One page of commodities (12 per page) with varieties attached.
    /// `search` is an ORed LIKE over name/scientific_name/category;
    /// `category` is exact. Returns the page plus the total match count.
    pub fn commodities_page(
        &self,
        search: Option<&str>,
        category: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<CommodityWithVarieties>, u64)> {
        const WHERE: &str = "(?1 IS NULL
                 OR name LIKE '%' || ?1 || '%'
                 OR scientific_name LIKE '%' || ?1 || '%'
                 OR category LIKE '%' || ?1 || '%')
               AND (?2 IS NULL OR category = ?2)";

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM commodities WHERE {}", WHERE),
            params![search, category],
            |row| row.get(0),
        )?;

        // page comes straight from the query string; widen before the
        // multiply so absurd page numbers yield an empty page, not an
        // overflow.
        let offset = u64::from(page.saturating_sub(1)) * u64::from(per_page);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name, scientific_name, description, category, image_url,
                    growing_conditions, harvest_info
             FROM commodities
             WHERE {}
             ORDER BY name
             LIMIT ?3 OFFSET ?4",
            WHERE
        ))?;
        let rows = stmt.query_map(
            params![search, category, per_page, offset],
            commodity_from_row,
        )?;
        let commodities = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        let mut items = Vec::with_capacity(commodities.len());
        for commodity in commodities {
            let varieties = self.varieties_of(commodity.id)?;
            items.push(CommodityWithVarieties {
                commodity,
                varieties,
            });
        }
        Ok((items, total as u64))
    }

    pub fn get_commodity(&self, id: i64) -> Result<Option<CommodityDetail>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, scientific_name, description, category, image_url,
                    growing_conditions, harvest_info
             FROM commodities WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], commodity_from_row)?;
        let commodity = match rows.next().transpose()? {
            Some(commodity) => commodity,
            None => return Ok(None),
        };
        let varieties = self.varieties_of(id)?;
        let distributions = self.distributions_of_commodity(id)?;
        Ok(Some(CommodityDetail {
            commodity,
            varieties,
            distributions,
        }))
    }

    fn varieties_of(&self, commodity_id: i64) -> Result<Vec<Variety>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM varieties WHERE commodity_id = ?1 ORDER BY name",
            VARIETY_COLUMNS
        ))?;
        let rows = stmt.query_map(params![commodity_id], variety_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// One page of varieties with the parent commodity attached.
    /// `search` ORs over variety name/description and commodity name.
    pub fn varieties_page(
        &self,
        search: Option<&str>,
        commodity_id: Option<i64>,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<VarietyWithCommodity>, u64)> {
        const WHERE: &str = "(?1 IS NULL
                 OR v.name LIKE '%' || ?1 || '%'
                 OR v.description LIKE '%' || ?1 || '%'
                 OR c.name LIKE '%' || ?1 || '%')
               AND (?2 IS NULL OR v.commodity_id = ?2)";

        let total: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM varieties v
                 JOIN commodities c ON c.id = v.commodity_id
                 WHERE {}",
                WHERE
            ),
            params![search, commodity_id],
            |row| row.get(0),
        )?;

        let offset = u64::from(page.saturating_sub(1)) * u64::from(per_page);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT v.id, v.commodity_id, v.name, v.description, v.agronomic_traits,
                    v.pest_susceptibility, v.maturity_days, v.potential_yield,
                    v.yield_unit, v.image_url,
                    c.name, c.category
             FROM varieties v
             JOIN commodities c ON c.id = v.commodity_id
             WHERE {}
             ORDER BY v.name
             LIMIT ?3 OFFSET ?4",
            WHERE
        ))?;
        let rows = stmt.query_map(params![search, commodity_id, per_page, offset], |row| {
            let variety = variety_from_row(row)?;
            let commodity = CommoditySummary {
                id: variety.commodity_id,
                name: row.get(10)?,
                category: row.get(11)?,
            };
            Ok(VarietyWithCommodity {
                variety,
                commodity: Some(commodity),
            })
        })?;
        let items = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((items, total as u64))
    }

    pub fn get_variety(&self, id: i64) -> Result<Option<VarietyWithCommodity>> {
        let mut stmt = self.conn.prepare(
            "SELECT v.id, v.commodity_id, v.name, v.description, v.agronomic_traits,
                    v.pest_susceptibility, v.maturity_days, v.potential_yield,
                    v.yield_unit, v.image_url,
                    c.name, c.category
             FROM varieties v
             JOIN commodities c ON c.id = v.commodity_id
             WHERE v.id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], |row| {
            let variety = variety_from_row(row)?;
            let commodity = CommoditySummary {
                id: variety.commodity_id,
                name: row.get(10)?,
                category: row.get(11)?,
            };
            Ok(VarietyWithCommodity {
                variety,
                commodity: Some(commodity),
            })
        })?;
        Ok(rows.next().transpose()?)
    }
}

const PEST_COLUMNS: &str = "id, name, scientific_name, type, description, symptoms, \
     affected_commodities, control_methods, insecticide_recommendations, \
     image_url, environmental_factors, created_at";

const VARIETY_COLUMNS: &str = "id, commodity_id, name, description, agronomic_traits, \
     pest_susceptibility, maturity_days, potential_yield, yield_unit, image_url";

// ============================================================================
// Row mapping
// ============================================================================

fn json_text(value: &Option<Value>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}

fn parse_json_value(raw: Option<String>) -> Option<Value> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
}

fn parse_string_list(raw: Option<String>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

fn parse_id_list(raw: Option<String>) -> Vec<i64> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

fn pest_from_row(row: &Row) -> rusqlite::Result<Pest> {
    let raw_type: String = row.get(3)?;
    let pest_type = PestType::parse(&raw_type).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown pest type: {}", raw_type).into(),
        )
    })?;
    Ok(Pest {
        id: row.get(0)?,
        name: row.get(1)?,
        scientific_name: row.get(2)?,
        pest_type,
        description: row.get(4)?,
        symptoms: parse_string_list(row.get(5)?),
        affected_commodities: parse_id_list(row.get(6)?),
        control_methods: parse_string_list(row.get(7)?),
        insecticide_recommendations: parse_string_list(row.get(8)?),
        image_url: row.get(9)?,
        environmental_factors: parse_string_list(row.get(10)?),
        created_at: row.get(11)?,
    })
}

fn commodity_from_row(row: &Row) -> rusqlite::Result<Commodity> {
    Ok(Commodity {
        id: row.get(0)?,
        name: row.get(1)?,
        scientific_name: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        image_url: row.get(5)?,
        growing_conditions: parse_json_value(row.get(6)?),
        harvest_info: parse_json_value(row.get(7)?),
    })
}

fn variety_from_row(row: &Row) -> rusqlite::Result<Variety> {
    Ok(Variety {
        id: row.get(0)?,
        commodity_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        agronomic_traits: parse_json_value(row.get(4)?),
        pest_susceptibility: parse_json_value(row.get(5)?),
        maturity_days: row.get(6)?,
        potential_yield: row.get(7)?,
        yield_unit: row.get(8)?,
        image_url: row.get(9)?,
    })
}

fn distribution_detail_from_row(row: &Row) -> rusqlite::Result<DistributionDetail> {
    let distribution = Distribution {
        id: row.get(0)?,
        commodity_id: row.get(1)?,
        province_id: row.get(2)?,
        regency_id: row.get(3)?,
        district_id: row.get(4)?,
        area_hectares: row.get(5)?,
        production_tons: row.get(6)?,
        productivity: row.get(7)?,
        year: row.get(8)?,
        environmental_data: parse_json_value(row.get(9)?),
    };

    let commodity = Some(CommoditySummary {
        id: distribution.commodity_id,
        name: row.get(10)?,
        category: row.get(11)?,
    });
    let province = geo_summary_at(row, distribution.province_id, 12)?;
    let regency = geo_summary_at(row, distribution.regency_id, 14)?;
    let district = geo_summary_at(row, distribution.district_id, 16)?;

    Ok(DistributionDetail {
        distribution,
        commodity,
        province,
        regency,
        district,
    })
}

fn geo_summary_at(
    row: &Row,
    id: Option<i64>,
    index: usize,
) -> rusqlite::Result<Option<GeoSummary>> {
    match id {
        Some(id) => Ok(Some(GeoSummary {
            id,
            name: row.get(index)?,
            code: row.get(index + 1)?,
        })),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoUnit;

    fn geo(name: &str, code: &str, parent_id: Option<i64>) -> GeoUnit {
        GeoUnit {
            id: 0,
            parent_id,
            name: name.to_string(),
            code: code.to_string(),
            latitude: None,
            longitude: None,
            boundaries: None,
        }
    }

    fn commodity(name: &str, category: &str) -> Commodity {
        Commodity {
            id: 0,
            name: name.to_string(),
            scientific_name: None,
            description: None,
            category: category.to_string(),
            image_url: None,
            growing_conditions: None,
            harvest_info: None,
        }
    }

    fn pest(name: &str, pest_type: PestType, affected: Vec<i64>, created_at: i64) -> Pest {
        Pest {
            id: 0,
            name: name.to_string(),
            scientific_name: None,
            pest_type,
            description: Some(format!("{} description", name)),
            symptoms: vec!["yellowing leaves".to_string()],
            affected_commodities: affected,
            control_methods: vec![],
            insecticide_recommendations: vec![],
            image_url: None,
            environmental_factors: vec![],
            created_at,
        }
    }

    fn fixture() -> CatalogDb {
        let db = CatalogDb::open_in_memory().unwrap();
        let province = db.insert_province(&geo("Jawa Barat", "32", None)).unwrap();
        let regency = db
            .insert_regency(&geo("Bandung", "32.04", Some(province)))
            .unwrap();
        db.insert_district(&geo("Ciwidey", "32.04.01", Some(regency)))
            .unwrap();
        db.insert_district(&geo("Lembang", "32.04.02", Some(regency)))
            .unwrap();

        let rice = db.insert_commodity(&commodity("Rice", "food crop")).unwrap();
        let coffee = db
            .insert_commodity(&commodity("Coffee", "plantation"))
            .unwrap();

        db.insert_variety(&Variety {
            id: 0,
            commodity_id: rice,
            name: "IR64".to_string(),
            description: Some("Widely planted lowland variety".to_string()),
            agronomic_traits: None,
            pest_susceptibility: None,
            maturity_days: Some(115),
            potential_yield: Some(6.0),
            yield_unit: "tons".to_string(),
            image_url: None,
        })
        .unwrap();

        db.insert_pest(&pest("Brown Planthopper", PestType::Pest, vec![rice], 100))
            .unwrap();
        db.insert_pest(&pest("Rice Blast", PestType::Disease, vec![rice], 200))
            .unwrap();
        db.insert_pest(&pest("Coffee Berry Borer", PestType::Pest, vec![coffee], 300))
            .unwrap();

        db.insert_distribution(&Distribution {
            id: 0,
            commodity_id: rice,
            province_id: Some(province),
            regency_id: None,
            district_id: None,
            area_hectares: Some(1000.0),
            production_tons: Some(5500.0),
            productivity: Some(5.5),
            year: 2024,
            environmental_data: None,
        })
        .unwrap();
        db.insert_distribution(&Distribution {
            id: 0,
            commodity_id: coffee,
            province_id: Some(province),
            regency_id: Some(regency),
            district_id: None,
            area_hectares: Some(200.0),
            production_tons: Some(150.0),
            productivity: Some(0.75),
            year: 2023,
            environmental_data: None,
        })
        .unwrap();
        db
    }

    #[test]
    fn children_listings_ordered_by_name() {
        let db = fixture();
        let regencies = db.regencies_of(1).unwrap();
        assert_eq!(regencies.len(), 1);
        assert_eq!(regencies[0].name, "Bandung");

        let districts = db.districts_of(regencies[0].id).unwrap();
        let names: Vec<_> = districts.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Ciwidey", "Lembang"]);
    }

    #[test]
    fn existence_checks() {
        let db = fixture();
        assert!(db.commodity_exists(1).unwrap());
        assert!(!db.commodity_exists(999).unwrap());
        assert!(db.province_exists(1).unwrap());
        assert!(!db.district_exists(999).unwrap());
    }

    #[test]
    fn distribution_filter_by_year_and_commodity() {
        let db = fixture();
        let hits = db
            .filter_distributions(
                &DistributionFilter {
                    year: 2024,
                    ..Default::default()
                },
                200,
            )
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distribution.year, 2024);
        // Eager-loaded relations are attached.
        assert_eq!(hits[0].commodity.as_ref().unwrap().name, "Rice");
        assert_eq!(hits[0].province.as_ref().unwrap().code, "32");
        assert!(hits[0].regency.is_none());

        let misses = db
            .filter_distributions(
                &DistributionFilter {
                    year: 2024,
                    commodity_id: Some(2),
                    ..Default::default()
                },
                200,
            )
            .unwrap();
        assert!(misses.is_empty());
    }

    #[test]
    fn distribution_limit_caps_results() {
        let db = fixture();
        let rice = 1;
        for district in db.districts_of(1).unwrap() {
            db.insert_distribution(&Distribution {
                id: 0,
                commodity_id: rice,
                province_id: None,
                regency_id: None,
                district_id: Some(district.id),
                area_hectares: Some(10.0),
                production_tons: Some(50.0),
                productivity: Some(5.0),
                year: 2024,
                environmental_data: None,
            })
            .unwrap();
        }
        let filter = DistributionFilter {
            year: 2024,
            ..Default::default()
        };
        assert_eq!(db.filter_distributions(&filter, 200).unwrap().len(), 3);
        assert_eq!(db.filter_distributions(&filter, 2).unwrap().len(), 2);
    }

    #[test]
    fn pest_search_type_filter_and_ordering() {
        let db = fixture();
        let all = db.search_pests(&PestFilter::default()).unwrap();
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        // No filter returns the whole set, name ascending.
        assert_eq!(
            names,
            vec!["Brown Planthopper", "Coffee Berry Borer", "Rice Blast"]
        );

        let diseases = db
            .search_pests(&PestFilter {
                pest_type: Some(PestType::Disease),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(diseases.len(), 1);
        assert_eq!(diseases[0].name, "Rice Blast");
    }

    #[test]
    fn pest_search_commodity_membership() {
        let db = fixture();
        let rice_pests = db
            .search_pests(&PestFilter {
                commodity_id: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(rice_pests.len(), 2);
        assert!(rice_pests
            .iter()
            .all(|p| p.affected_commodities.contains(&1)));
    }

    #[test]
    fn pest_search_is_idempotent() {
        let db = fixture();
        let filter = PestFilter {
            symptoms: Some("yellowing".to_string()),
            ..Default::default()
        };
        let first = db.search_pests(&filter).unwrap();
        let second = db.search_pests(&filter).unwrap();
        let ids = |v: &[Pest]| v.iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn recent_pests_newest_first() {
        let db = fixture();
        let recent = db.recent_pests(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].name, "Coffee Berry Borer");
        assert_eq!(recent[1].name, "Rice Blast");
    }

    #[test]
    fn commodity_pagination_and_search() {
        let db = fixture();
        let (page, total) = db.commodities_page(None, None, 1, 12).unwrap();
        assert_eq!(total, 2);
        assert_eq!(page[0].commodity.name, "Coffee");
        assert_eq!(page[1].commodity.name, "Rice");
        assert_eq!(page[1].varieties.len(), 1);

        let (hits, total) = db.commodities_page(Some("rice"), None, 1, 12).unwrap();
        assert_eq!(total, 1);
        assert_eq!(hits[0].commodity.name, "Rice");

        let (hits, total) = db
            .commodities_page(None, Some("plantation"), 1, 12)
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(hits[0].commodity.name, "Coffee");

        // Page past the end is empty but keeps the total.
        let (empty, total) = db.commodities_page(None, None, 2, 12).unwrap();
        assert!(empty.is_empty());
        assert_eq!(total, 2);
    }

    #[test]
    fn huge_page_number_yields_empty_page_not_overflow() {
        // The page number is client-supplied; the offset multiply must
        // not wrap even at u32::MAX.
        let db = fixture();
        let (items, total) = db.commodities_page(None, None, 400_000_000, 12).unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 2);

        let (items, total) = db.commodities_page(None, None, u32::MAX, 12).unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 2);

        let (items, total) = db.varieties_page(None, None, u32::MAX, 12).unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 1);
    }

    #[test]
    fn variety_search_spans_commodity_name() {
        let db = fixture();
        let (hits, total) = db.varieties_page(Some("rice"), None, 1, 12).unwrap();
        assert_eq!(total, 1);
        assert_eq!(hits[0].variety.name, "IR64");
        assert_eq!(hits[0].commodity.as_ref().unwrap().name, "Rice");
    }

    #[test]
    fn commodity_detail_loads_relations() {
        let db = fixture();
        let detail = db.get_commodity(1).unwrap().unwrap();
        assert_eq!(detail.commodity.name, "Rice");
        assert_eq!(detail.varieties.len(), 1);
        assert_eq!(detail.distributions.len(), 1);
        assert!(db.get_commodity(999).unwrap().is_none());
    }

    #[test]
    fn counts_and_emptiness() {
        let empty = CatalogDb::open_in_memory().unwrap();
        assert!(empty.is_empty().unwrap());

        let db = fixture();
        assert!(!db.is_empty().unwrap());
        let counts = db.counts().unwrap();
        assert_eq!(counts.pests, 3);
        assert_eq!(counts.distributions, 2);
        assert_eq!(counts.districts, 2);
    }

    #[test]
    fn duplicate_distribution_fact_rejected() {
        // NULL geographic ids are distinct under SQLite UNIQUE, so the
        // duplicate guard only bites on a fully specified tuple.
        let db = fixture();
        let fact = Distribution {
            id: 0,
            commodity_id: 1,
            province_id: Some(1),
            regency_id: Some(1),
            district_id: Some(1),
            area_hectares: None,
            production_tons: None,
            productivity: None,
            year: 2024,
            environmental_data: None,
        };
        assert!(db.insert_distribution(&fact).is_ok());
        assert!(db.insert_distribution(&fact).is_err());
    }

    #[test]
    fn reopening_a_database_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");

        let db = CatalogDb::open_at(&path).unwrap();
        db.insert_commodity(&commodity("Rice", "food crop")).unwrap();
        drop(db);

        let db = CatalogDb::open_at(&path).unwrap();
        assert!(!db.is_empty().unwrap());
        assert!(db.commodity_exists(1).unwrap());
    }
}
