//! Command handlers for tanictl.

use anyhow::Result;
use owo_colors::OwoColorize;
use tania_common::{DistributionDetail, Pest, PestSearchRequest};

use crate::client::TaniaClient;

pub async fn health(client: &TaniaClient) -> Result<()> {
    let health = client.health().await?;

    println!();
    println!("{} v{}", "taniad".bold(), health.version);
    println!("  status          {}", health.status.green());
    println!("  uptime          {}s", health.uptime_seconds);
    println!();
    println!("  provinces       {}", health.counts.provinces);
    println!("  regencies       {}", health.counts.regencies);
    println!("  districts       {}", health.counts.districts);
    println!("  commodities     {}", health.counts.commodities);
    println!("  varieties       {}", health.counts.varieties);
    println!("  pests           {}", health.counts.pests);
    println!("  distributions   {}", health.counts.distributions);
    Ok(())
}

pub async fn children(
    client: &TaniaClient,
    province_id: Option<i64>,
    regency_id: Option<i64>,
) -> Result<()> {
    let units = match (province_id, regency_id) {
        (Some(id), _) => client.regencies(id).await?,
        (None, Some(id)) => client.districts(id).await?,
        (None, None) => anyhow::bail!("pass --province or --regency"),
    };

    for unit in &units {
        println!("{:>6}  {:<10} {}", unit.id, unit.code.dimmed(), unit.name);
    }
    if units.is_empty() {
        println!("{}", "(no children)".dimmed());
    }
    Ok(())
}

pub async fn distributions(
    client: &TaniaClient,
    commodity_id: Option<i64>,
    province_id: Option<i64>,
    regency_id: Option<i64>,
    district_id: Option<i64>,
    year: Option<i64>,
) -> Result<()> {
    let rows = client
        .distributions(commodity_id, province_id, regency_id, district_id, year)
        .await?;

    for row in &rows {
        print_distribution(row);
    }
    println!();
    println!("{} distribution facts", rows.len());
    Ok(())
}

fn print_distribution(row: &DistributionDetail) {
    let commodity = row
        .commodity
        .as_ref()
        .map(|c| c.name.as_str())
        .unwrap_or("?");
    let place = [&row.district, &row.regency, &row.province]
        .into_iter()
        .flatten()
        .next()
        .map(|g| g.name.as_str())
        .unwrap_or("?");
    let area = row.distribution.area_hectares.unwrap_or(0.0);
    let production = row.distribution.production_tons.unwrap_or(0.0);

    println!(
        "  {}  {:<10} {:<28} {:>10.1} ha  {:>10.1} t",
        row.distribution.year.dimmed(),
        commodity.bold(),
        place,
        area,
        production
    );
}

pub async fn search(
    client: &TaniaClient,
    symptoms: Option<String>,
    commodity_id: Option<i64>,
    pest_type: Option<String>,
) -> Result<()> {
    let req = PestSearchRequest {
        symptoms,
        commodity_id,
        pest_type,
    };
    let pests = client.search_pests(&req).await?;

    for pest in &pests {
        print_pest_line(pest);
    }
    println!();
    println!("{} matches", pests.len());
    Ok(())
}

pub async fn chat(client: &TaniaClient, message: String) -> Result<()> {
    let reply = client.chat(&message).await?;

    println!();
    println!("{}", reply.response);
    println!();
    println!("{}", "You could also ask:".dimmed());
    for suggestion in &reply.suggestions {
        println!("  - {}", suggestion.dimmed());
    }
    Ok(())
}

pub async fn recent(client: &TaniaClient) -> Result<()> {
    let recent = client.recent_pests().await?;
    for pest in &recent.pests {
        print_pest_line(pest);
    }
    Ok(())
}

pub async fn pest(client: &TaniaClient, id: i64) -> Result<()> {
    let pest = client.pest(id).await?;

    println!();
    println!(
        "{}  {}",
        pest.name.bold(),
        pest.scientific_name.as_deref().unwrap_or("").italic()
    );
    println!("  type: {}", pest.pest_type.as_str());
    if let Some(description) = &pest.description {
        println!("  {}", description);
    }
    print_list("symptoms", &pest.symptoms);
    print_list("control methods", &pest.control_methods);
    print_list("insecticides", &pest.insecticide_recommendations);
    print_list("environmental factors", &pest.environmental_factors);
    Ok(())
}

fn print_pest_line(pest: &Pest) {
    println!(
        "{:>6}  {:<8} {:<24} {}",
        pest.id,
        pest.pest_type.as_str().dimmed(),
        pest.name.bold(),
        pest.scientific_name.as_deref().unwrap_or("").italic()
    );
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {}:", label.dimmed());
    for item in items {
        println!("    - {}", item);
    }
}

pub async fn commodities(
    client: &TaniaClient,
    search: Option<String>,
    category: Option<String>,
    page: Option<u32>,
) -> Result<()> {
    let listing = client
        .commodities(search.as_deref(), category.as_deref(), page)
        .await?;

    for commodity in &listing.commodities.items {
        let varieties: Vec<&str> = commodity
            .varieties
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        println!(
            "{:>6}  {:<12} {:<14} {}",
            commodity.commodity.id,
            commodity.commodity.name.bold(),
            commodity.commodity.category.dimmed(),
            varieties.join(", ")
        );
    }
    println!();
    println!(
        "page {} - {} of {} commodities",
        listing.commodities.page,
        listing.commodities.items.len(),
        listing.commodities.total
    );
    println!("categories: {}", listing.categories.join(", ").dimmed());
    Ok(())
}

pub async fn commodity(client: &TaniaClient, id: i64) -> Result<()> {
    let detail = client.commodity(id).await?;

    println!();
    println!(
        "{}  {}",
        detail.commodity.name.bold(),
        detail
            .commodity
            .scientific_name
            .as_deref()
            .unwrap_or("")
            .italic()
    );
    println!("  category: {}", detail.commodity.category);
    if let Some(description) = &detail.commodity.description {
        println!("  {}", description);
    }
    if !detail.varieties.is_empty() {
        println!("  {}:", "varieties".dimmed());
        for variety in &detail.varieties {
            println!(
                "    - {} ({} days, {} {})",
                variety.name,
                variety.maturity_days.unwrap_or(0),
                variety.potential_yield.unwrap_or(0.0),
                variety.yield_unit
            );
        }
    }
    for row in &detail.distributions {
        print_distribution(row);
    }
    Ok(())
}

pub async fn varieties(
    client: &TaniaClient,
    commodity_id: Option<i64>,
    search: Option<String>,
    page: Option<u32>,
) -> Result<()> {
    let listing = client
        .varieties(commodity_id, search.as_deref(), page)
        .await?;

    for variety in &listing.varieties.items {
        let commodity = variety
            .commodity
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("?");
        println!(
            "{:>6}  {:<12} {}",
            variety.variety.id,
            variety.variety.name.bold(),
            commodity.dimmed()
        );
    }
    println!();
    println!(
        "page {} - {} of {} varieties",
        listing.varieties.page,
        listing.varieties.items.len(),
        listing.varieties.total
    );
    Ok(())
}

pub async fn variety(client: &TaniaClient, id: i64) -> Result<()> {
    let detail = client.variety(id).await?;

    println!();
    println!("{}", detail.variety.name.bold());
    if let Some(commodity) = &detail.commodity {
        println!("  commodity: {}", commodity.name);
    }
    if let Some(description) = &detail.variety.description {
        println!("  {}", description);
    }
    if let Some(days) = detail.variety.maturity_days {
        println!("  maturity: {} days", days);
    }
    if let Some(potential) = detail.variety.potential_yield {
        println!(
            "  potential yield: {} {}",
            potential, detail.variety.yield_unit
        );
    }
    Ok(())
}
