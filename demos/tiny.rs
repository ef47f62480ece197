//! Build a tiny recipe graph and print it in every format
//!
//! Run with: cargo run --example tiny

use nock::Partition;
use serde_json::json;

const RECIPE: &str = "https://www.food.com/recipe/327593";
const RECIPE_CLASS: &str = "http://purl.org/heals/food/Recipe";
const USES: &str = "http://purl.org/heals/food/uses_ingredient";
const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("🦀 nock tiny example\n");

    // 1. Build the graph
    println!("📊 Building recipe graph...");
    let mut part = Partition::new(0);

    let recipe = part.find_or_create_node(RECIPE)?;
    recipe.is_rdf = true;
    recipe.label_set.insert("Recipe".to_string());
    recipe.prop_map.insert("name".to_string(), json!("anytime crepes"));
    recipe.prop_map.insert("minutes".to_string(), json!(8));
    let recipe = recipe.node_id;

    let class = part.find_or_create_node(RECIPE_CLASS)?;
    class.is_rdf = true;
    class.label_set.insert("top_level".to_string());
    let class = class.node_id;
    part.create_edge(recipe, RDF_TYPE, class)?;

    for name in ["ChickenEgg", "CowMilk", "WholeWheatFlour"] {
        let ingredient = part.find_or_create_node(&format!("http://purl.org/heals/ingredient/{name}"))?;
        ingredient.is_rdf = true;
        ingredient.label_set.insert("Ingredient".to_string());
        if name == "WholeWheatFlour" {
            ingredient.prop_map.insert("vegan".to_string(), json!(true));
        }
        let ingredient = ingredient.node_id;

        part.create_edge(recipe, USES, ingredient)?;
    }

    println!(
        "  ✅ Graph built: {} nodes, {} edges, {} relations\n",
        part.num_nodes(),
        part.num_edges(),
        part.relations().len()
    );

    // 2. Sorted CSV
    println!("📄 Sorted CSV:");
    print!("{}", part.to_csv_string(true)?);

    // 3. RDF projection
    println!("\n🔗 RDF triples:");
    for triple in part.to_triples(true)? {
        println!("  {triple}");
    }

    // 4. Persist to Parquet and back
    println!("\n💾 Saving to Parquet...");
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tiny.parquet");
    part.save_file_parquet(&path, true).await?;
    println!("  ✅ Saved to {}", path.display());

    let mut loaded = Partition::new(1);
    loaded.load_parquet(&path).await?;
    println!(
        "  ✅ Loaded: {} nodes, {} edges",
        loaded.num_nodes(),
        loaded.num_edges()
    );

    // Verify roundtrip
    assert_eq!(loaded.to_csv_string(true)?, part.to_csv_string(true)?);

    println!("\n✨ Example complete!");

    Ok(())
}
