//! RDF file source and sink
//!
//! Any serialization `oxrdfio` knows (Turtle, N-Triples, N-Quads, TriG,
//! RDF/XML, N3) can be read; graph names are dropped on import.

use crate::error::GraphError;
use crate::partition::Partition;
use anyhow::{bail, Context, Result};
use oxrdf::Triple;
use oxrdfio::{RdfFormat, RdfParser, RdfSerializer};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Resolve a format from a short name (`ttl`, `nt`, `xml`) or a media type
///
/// # Errors
///
/// Returns error if the name is unknown
pub fn rdf_format_from_name(name: &str) -> Result<RdfFormat> {
    if let Some(format) = RdfFormat::from_extension(name) {
        return Ok(format);
    }
    if let Some(format) = RdfFormat::from_media_type(name) {
        return Ok(format);
    }
    bail!("The RDF format '{name}' is unknown")
}

/// Guess a format from a file extension
///
/// # Errors
///
/// Returns error if the path has no extension or it is unknown
pub fn rdf_format_from_path(path: &Path) -> Result<RdfFormat> {
    let Some(ext) = path.extension().and_then(OsStr::to_str) else {
        bail!(
            "The path {} has no extension to guess an RDF format from",
            path.display()
        )
    };

    RdfFormat::from_extension(ext).with_context(|| format!("The file extension '{ext}' is unknown"))
}

/// Parse every triple from a reader
///
/// # Errors
///
/// Returns [`GraphError::Schema`] on the first syntax error
pub fn parse_triples<R: Read>(reader: R, format: RdfFormat) -> Result<Vec<Triple>, GraphError> {
    let mut triples = Vec::new();

    for quad in RdfParser::from_format(format).for_reader(reader) {
        let quad = quad.map_err(|e| GraphError::Schema(format!("RDF parse error: {e}")))?;

        if !quad.graph_name.is_default_graph() {
            debug!(graph = %quad.graph_name, "graph name dropped");
        }

        triples.push(Triple::new(quad.subject, quad.predicate, quad.object));
    }

    Ok(triples)
}

/// Serialize triples to a writer
///
/// # Errors
///
/// Returns error if the writer fails
pub fn serialize_triples<W: Write>(triples: &[Triple], format: RdfFormat, writer: W) -> Result<W> {
    let mut serializer = RdfSerializer::from_format(format).for_writer(writer);

    for triple in triples {
        serializer.serialize_triple(triple)?;
    }

    Ok(serializer.finish()?)
}

/// Read every triple from an RDF file
///
/// # Errors
///
/// Returns error if the file cannot be opened or parsed
pub fn read_triples<P: AsRef<Path>>(path: P, format: RdfFormat) -> Result<Vec<Triple>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    parse_triples(BufReader::new(file), format)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write triples to an RDF file
///
/// # Errors
///
/// Returns error if file I/O fails
pub fn write_triples<P: AsRef<Path>>(path: P, format: RdfFormat, triples: &[Triple]) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    serialize_triples(triples, format, BufWriter::new(file))?
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))
}

impl Partition {
    /// Ingest an RDF file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be parsed or any row fails to ingest
    pub fn load_rdf<P: AsRef<Path>>(&mut self, path: P, format: RdfFormat) -> Result<()> {
        let path = path.as_ref();
        let triples = read_triples(path, format)?;
        let count = triples.len();

        self.parse_triples(triples)
            .with_context(|| format!("Failed to load {}", path.display()))?;

        info!(path = %path.display(), %format, triples = count, "loaded RDF");

        Ok(())
    }

    /// Write the RDF projection of the partition
    ///
    /// # Errors
    ///
    /// Returns error if a name is not a valid RDF term or file I/O fails
    pub fn save_file_rdf<P: AsRef<Path>>(&self, path: P, format: RdfFormat, sort: bool) -> Result<()> {
        let path = path.as_ref();
        let triples = self.to_triples(sort)?;

        write_triples(path, format, &triples)?;

        info!(path = %path.display(), %format, triples = triples.len(), "saved RDF");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TTL: &str = r#"@prefix ind: <http://purl.org/heals/ingredient/> .
@prefix wtm: <http://purl.org/heals/food/> .

<https://www.food.com/recipe/327593> a wtm:Recipe ;
    wtm:uses_ingredient ind:ChickenEgg, ind:CowMilk .
"#;

    #[test]
    fn test_format_from_name() {
        assert_eq!(rdf_format_from_name("ttl").unwrap(), RdfFormat::Turtle);
        assert_eq!(rdf_format_from_name("nt").unwrap(), RdfFormat::NTriples);
        assert_eq!(
            rdf_format_from_name("text/turtle").unwrap(),
            RdfFormat::Turtle
        );
        assert!(rdf_format_from_name("parquet").is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            rdf_format_from_path(Path::new("dat/recipes.ttl")).unwrap(),
            RdfFormat::Turtle
        );
        assert!(rdf_format_from_path(Path::new("recipes")).is_err());
    }

    #[test]
    fn test_parse_turtle() {
        let triples = parse_triples(TTL.as_bytes(), RdfFormat::Turtle).unwrap();
        assert_eq!(triples.len(), 3);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_triples("<a> <b".as_bytes(), RdfFormat::Turtle).unwrap_err();
        assert!(matches!(err, GraphError::Schema(_)));
    }

    #[test]
    fn test_literal_objects_survive_export() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("literals.ttl");
        let dst = dir.path().join("literals.nt");
        std::fs::write(
            &src,
            r#"@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
<http://x/s> <http://x/p> "42"^^xsd:integer , "chat"@fr .
"#,
        )
        .unwrap();

        let mut part = Partition::new(0);
        part.load_rdf(&src, RdfFormat::Turtle).unwrap();
        assert_eq!(part.num_nodes(), 3);

        part.save_file_rdf(&dst, RdfFormat::NTriples, true).unwrap();

        let mut reloaded = Partition::new(1);
        reloaded.load_rdf(&dst, RdfFormat::NTriples).unwrap();
        assert_eq!(reloaded.num_edges(), 2);
        assert!(reloaded.lookup_node("42").is_some());
        assert!(reloaded.lookup_node("chat").is_some());
        assert_eq!(
            reloaded.to_csv_string(true).unwrap(),
            part.to_csv_string(true).unwrap()
        );
    }

    #[test]
    fn test_rdf_file_roundtrip() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("in.ttl");
        let dst = dir.path().join("out.nt");
        std::fs::write(&src, TTL).unwrap();

        let mut part = Partition::new(0);
        part.load_rdf(&src, RdfFormat::Turtle).unwrap();
        assert_eq!(part.num_nodes(), 4);
        assert_eq!(part.num_edges(), 3);

        part.save_file_rdf(&dst, RdfFormat::NTriples, true).unwrap();

        let mut reloaded = Partition::new(1);
        reloaded.load_rdf(&dst, RdfFormat::NTriples).unwrap();
        assert_eq!(
            reloaded.to_csv_string(true).unwrap(),
            part.to_csv_string(true).unwrap()
        );
    }
}
