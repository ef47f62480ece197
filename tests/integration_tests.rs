//! Integration tests for nock
//!
//! Tests real-world usage scenarios (recipe knowledge graphs) across the
//! CSV, Parquet and RDF adapters

use nock::consts::{BASED_LOCAL, NOT_FOUND, PROPS_NONE};
use nock::{GraphError, Partition, PlaceholderPolicy, RawRow, RelId, Truth};
use oxrdfio::RdfFormat;
use serde_json::json;
use std::path::PathBuf;
use tempfile::tempdir;

const RECIPE: &str = "https://www.food.com/recipe/327593";
const RECIPE_CLASS: &str = "http://purl.org/heals/food/Recipe";
const USES: &str = "http://purl.org/heals/food/uses_ingredient";
const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const EGG: &str = "http://purl.org/heals/ingredient/ChickenEgg";
const MILK: &str = "http://purl.org/heals/ingredient/CowMilk";
const FLOUR: &str = "http://purl.org/heals/ingredient/WholeWheatFlour";

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn tiny_csv() -> String {
    std::fs::read_to_string(data_path("tiny.csv")).unwrap()
}

fn edge_lines(csv: &str) -> Vec<&str> {
    csv.lines().filter(|line| !line.contains(",-1,\"\",\"\",")).collect()
}

/// Build the recipe graph through the programmatic API
fn build_tiny() -> Partition {
    let mut part = Partition::new(0);

    let recipe = part.find_or_create_node(RECIPE).unwrap();
    recipe.is_rdf = true;
    recipe.label_set.insert("Recipe".to_string());
    recipe.prop_map.insert("name".to_string(), json!("anytime crepes"));
    recipe.prop_map.insert("minutes".to_string(), json!(8));
    let recipe = recipe.node_id;

    let ingredient = |part: &mut Partition, name: &str| {
        let node = part.find_or_create_node(name).unwrap();
        node.is_rdf = true;
        node.label_set.insert("Ingredient".to_string());
        node.node_id
    };

    // Insertion order differs from sorted order on purpose
    let flour = ingredient(&mut part, FLOUR);
    let egg = ingredient(&mut part, EGG);
    let milk = ingredient(&mut part, MILK);
    part.node_mut(flour)
        .unwrap()
        .prop_map
        .insert("vegan".to_string(), json!(true));

    let class = part.find_or_create_node(RECIPE_CLASS).unwrap();
    class.is_rdf = true;
    class.label_set.insert("top_level".to_string());
    let class = class.node_id;

    part.create_edge(recipe, RDF_TYPE, class).unwrap();
    part.create_edge(recipe, USES, milk).unwrap();
    part.create_edge(recipe, USES, flour).unwrap();
    part.create_edge(recipe, USES, egg).unwrap();

    part
}

#[test]
fn test_programmatic_build_matches_reference() {
    let part = build_tiny();

    assert_eq!(part.num_nodes(), 5);
    assert_eq!(part.num_edges(), 4);
    assert_eq!(part.to_csv_string(true).unwrap(), tiny_csv());
}

#[test]
fn test_csv_parse_roundtrip() {
    let mut part = Partition::new(0);
    part.load_csv(data_path("tiny.csv")).unwrap();

    assert_eq!(part.num_nodes(), 5);
    assert_eq!(part.num_edges(), 4);
    assert_eq!(part.relations().len(), 3);

    let flour = part.lookup_node(FLOUR).unwrap();
    assert_eq!(flour.prop_map.get("vegan"), Some(&json!(true)));

    assert_eq!(part.to_csv_string(true).unwrap(), tiny_csv());
}

#[test]
fn test_csv_file_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("copy.csv");

    let mut part = Partition::new(0);
    part.load_csv(data_path("tiny.csv")).unwrap();
    part.save_file_csv(&path, true).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), tiny_csv());
}

#[test]
fn test_single_block_creates_placeholders() {
    let node = RawRow {
        src_name: RECIPE.to_string(),
        edge_id: NOT_FOUND,
        rel_name: None,
        dst_name: None,
        truth: 1.0,
        shadow: BASED_LOCAL,
        is_rdf: true,
        labels: Some("Recipe".to_string()),
        props: r#"{"minutes":8,"name":"anytime crepes"}"#.to_string(),
    };
    let edge = |edge_id: i64, rel: &str, dst: &str| RawRow {
        edge_id,
        rel_name: Some(rel.to_string()),
        dst_name: Some(dst.to_string()),
        labels: None,
        props: PROPS_NONE.to_string(),
        ..node.clone()
    };

    let rows = vec![
        node.clone(),
        edge(0, USES, EGG),
        edge(1, USES, MILK),
        edge(2, USES, FLOUR),
        edge(3, RDF_TYPE, RECIPE_CLASS),
    ];

    let mut part = Partition::new(0);
    part.parse_rows((0_u64..).zip(rows)).unwrap();

    assert_eq!(part.num_nodes(), 5);
    assert_eq!(part.num_edges(), 4);
    assert_eq!(part.relations().len(), 3);
    assert_eq!(part.relations().label(RelId(0)), Some(""));

    let recipe = part.lookup_node(RECIPE).unwrap();
    assert_eq!(recipe.num_edges(), 4);

    for name in [EGG, MILK, FLOUR, RECIPE_CLASS] {
        let placeholder = part.lookup_node(name).unwrap();
        assert!(placeholder.is_rdf);
        assert!(placeholder.label_set.is_empty());
        assert!(placeholder.prop_map.is_empty());
        assert_eq!(placeholder.num_edges(), 0);
    }

    // Edge rows are reproduced exactly
    let text = part.to_csv_string(true).unwrap();
    assert_eq!(edge_lines(&text), edge_lines(&tiny_csv()));
}

#[test]
fn test_sequencing_violation_rejected() {
    let text = tiny_csv();
    let mut lines: Vec<&str> = text.lines().collect();
    // Edge-row for the recipe while an ingredient block is active
    let stray = lines.remove(6);
    lines.insert(3, stray);
    let shuffled = lines.join("\n");

    let mut part = Partition::new(0);
    let err = part
        .try_parse_rows(nock::storage::iter_load_csv(shuffled.as_bytes()).unwrap())
        .unwrap_err();

    assert_eq!(err.row_num(), Some(2));
    assert!(matches!(err.root(), GraphError::Sequencing { .. }));
    assert!(err.to_string().contains(RECIPE));
}

#[tokio::test]
async fn test_parquet_matches_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tiny.parquet");

    let mut part = Partition::new(0);
    part.load_csv(data_path("tiny.csv")).unwrap();
    part.save_file_parquet(&path, true).await.unwrap();

    let mut loaded = Partition::new(0);
    loaded.load_parquet(&path).await.unwrap();

    assert_eq!(loaded.to_csv_string(true).unwrap(), tiny_csv());
}

#[tokio::test]
async fn test_rdf_and_parquet_paths_agree() {
    let dir = tempdir().unwrap();
    let parquet = dir.path().join("from_rdf.parquet");

    let mut from_rdf = Partition::new(0);
    from_rdf
        .load_rdf(data_path("tiny.ttl"), RdfFormat::Turtle)
        .unwrap();
    let rdf_csv = from_rdf.to_csv_string(true).unwrap();

    // Relations and edges survive the lossy projection unchanged
    assert_eq!(edge_lines(&rdf_csv), edge_lines(&tiny_csv()));

    from_rdf.save_file_parquet(&parquet, true).await.unwrap();
    let mut from_parquet = Partition::new(1);
    from_parquet.load_parquet(&parquet).await.unwrap();

    assert_eq!(from_parquet.to_csv_string(true).unwrap(), rdf_csv);
}

#[test]
fn test_rdf_export_reimports() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tiny.nt");

    let mut part = Partition::new(0);
    part.load_csv(data_path("tiny.csv")).unwrap();
    part.save_file_rdf(&path, RdfFormat::NTriples, true).unwrap();

    let mut reloaded = Partition::new(0);
    reloaded.load_rdf(&path, RdfFormat::NTriples).unwrap();

    assert_eq!(reloaded.num_nodes(), 5);
    assert_eq!(reloaded.num_edges(), 4);
    assert_eq!(reloaded.to_triples(true).unwrap(), part.to_triples(true).unwrap());
}

#[test]
fn test_fill_policy_completes_forward_references() {
    let text = tiny_csv();
    let lines: Vec<&str> = text.lines().collect();
    // Recipe block first, then the full definitions of its targets
    let reordered = [&lines[..1], &lines[5..], &lines[1..5]].concat().join("\n");

    let mut keep_first = Partition::new(0);
    keep_first
        .try_parse_rows(nock::storage::iter_load_csv(reordered.as_bytes()).unwrap())
        .unwrap();
    assert!(keep_first.lookup_node(EGG).unwrap().label_set.is_empty());

    let mut fill = Partition::new(0).with_policy(PlaceholderPolicy::Fill);
    fill.try_parse_rows(nock::storage::iter_load_csv(reordered.as_bytes()).unwrap())
        .unwrap();
    assert!(fill.lookup_node(EGG).unwrap().label_set.contains("Ingredient"));
    assert_eq!(fill.to_csv_string(true).unwrap(), tiny_csv());
}

#[test]
fn test_concurrent_partitions_are_independent() {
    let text = tiny_csv();

    let outputs: Vec<String> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|part_id| {
                let text = &text;
                s.spawn(move || {
                    let mut part = Partition::new(part_id);
                    part.try_parse_rows(nock::storage::iter_load_csv(text.as_bytes()).unwrap())
                        .unwrap();

                    // Each partition gets its own extra node
                    let extra = part.find_or_create_node(&format!("extra-{part_id}")).unwrap();
                    extra.truth = Truth::new(0.5).unwrap();

                    part.to_csv_string(true).unwrap()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (part_id, output) in outputs.iter().enumerate() {
        assert!(output.contains(&format!("extra-{part_id}")));
        assert_eq!(output.lines().filter(|l| l.contains("extra-")).count(), 1);
    }
}

#[test]
fn test_unsorted_emission_follows_insertion() {
    let part = build_tiny();
    let text = part.to_csv_string(false).unwrap();
    let names: Vec<&str> = text
        .lines()
        .skip(1)
        .filter_map(|line| line.split(',').next())
        .collect();

    assert_eq!(names[0], format!("\"{RECIPE}\""));
    // First relation interned on the recipe node was rdf:type
    assert!(text.lines().nth(2).unwrap().contains(RDF_TYPE));
}
