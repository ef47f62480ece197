//! RDF triple adapter
//!
//! Translates triples into the canonical row stream and back. This sits
//! outside the [`Partition`]: ingestion sees ordinary rows.
//!
//! # Mapping
//!
//! ```text
//! (s, p, o)  →  node-row  src_name=s  edge_id=-1  is_rdf=true   (once per subject)
//!               edge-row  src_name=s  rel_name=p  dst_name=o    (once per triple)
//! ```
//!
//! Export is a lossy projection: only `is_rdf` rows are written, and labels,
//! properties, truth and shadow values have no RDF counterpart.

use crate::codec::{RawRow, Row};
use crate::consts::{BASED_LOCAL, DEFAULT_TRUTH, NOT_FOUND, PROPS_NONE};
use crate::error::{GraphError, Result};
use crate::partition::Partition;
use oxrdf::{BlankNode, Literal, NamedNode, Subject, Term, Triple};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::warn;

const BLANK_NODE_PREFIX: &str = "_:";

/// Node name for an RDF subject: the IRI, or `_:id` for a blank node
#[must_use]
pub fn subject_name(subject: &Subject) -> String {
    match subject {
        Subject::NamedNode(node) => node.as_str().to_string(),
        other => other.to_string(),
    }
}

/// Node name for an RDF object: the IRI, `_:id`, or a literal's lexical value
///
/// Datatype and language tag are dropped. An empty literal (`""`) yields an
/// empty name, which ingestion rejects as an empty destination.
#[must_use]
pub fn term_name(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        other => other.to_string(),
    }
}

fn blank_node(name: &str) -> Option<Result<BlankNode>> {
    name.strip_prefix(BLANK_NODE_PREFIX).map(|id| {
        BlankNode::new(id)
            .map_err(|e| GraphError::Schema(format!("|{name}| is not a blank node id: {e}")))
    })
}

fn subject_from_name(name: &str) -> Result<Subject> {
    if let Some(blank) = blank_node(name) {
        return Ok(blank?.into());
    }

    NamedNode::new(name)
        .map(Into::into)
        .map_err(|e| GraphError::Schema(format!("subject |{name}| is not an IRI: {e}")))
}

fn object_from_name(name: &str) -> Result<Term> {
    if let Some(blank) = blank_node(name) {
        return Ok(blank?.into());
    }

    // Names that are not IRIs came from literals on import
    Ok(NamedNode::new(name).map_or_else(
        |_| Literal::new_simple_literal(name).into(),
        Into::into,
    ))
}

/// Decode triples into a numbered row stream
///
/// One node-row per distinct subject (in first-seen order), followed by one
/// edge-row per distinct triple of that subject. Duplicate triples collapse.
#[must_use]
pub fn triples_to_rows<I>(triples: I) -> Vec<(u64, RawRow)>
where
    I: IntoIterator<Item = Triple>,
{
    let mut subjects: Vec<(String, Vec<(String, String)>)> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut seen: FxHashSet<Triple> = FxHashSet::default();

    for triple in triples {
        if !seen.insert(triple.clone()) {
            continue;
        }

        let subj = subject_name(&triple.subject);
        let slot = *index.entry(subj.clone()).or_insert_with(|| {
            subjects.push((subj, Vec::new()));
            subjects.len() - 1
        });

        subjects[slot].1.push((
            triple.predicate.as_str().to_string(),
            term_name(&triple.object),
        ));
    }

    let mut rows = Vec::with_capacity(subjects.len() + seen.len());

    for (subj, edges) in subjects {
        rows.push(RawRow {
            src_name: subj.clone(),
            edge_id: NOT_FOUND,
            rel_name: None,
            dst_name: None,
            truth: DEFAULT_TRUTH,
            shadow: BASED_LOCAL,
            is_rdf: true,
            labels: None,
            props: PROPS_NONE.to_string(),
        });

        for (edge_id, (pred, objt)) in (0_i64..).zip(edges) {
            rows.push(RawRow {
                src_name: subj.clone(),
                edge_id,
                rel_name: Some(pred),
                dst_name: Some(objt),
                truth: DEFAULT_TRUTH,
                shadow: BASED_LOCAL,
                is_rdf: true,
                labels: None,
                props: PROPS_NONE.to_string(),
            });
        }
    }

    (0_u64..).zip(rows).collect()
}

/// Encode a generated row stream as triples
///
/// `is_rdf` node-rows open the current subject; `is_rdf` edge-rows add one
/// triple each. Non-RDF rows are skipped, as are blank-relation edges (there
/// is no predicate IRI to write). Duplicate triples collapse.
///
/// A subject name is only converted once it has an edge to write, so nodes
/// named by a literal's lexical value (placeholders for literal objects)
/// pass through.
///
/// # Errors
///
/// - [`GraphError::Schema`] for a subject or predicate that is not an IRI
/// - [`GraphError::Sequencing`] for an RDF edge-row with no RDF subject
pub fn rows_to_triples<I>(rows: I) -> Result<Vec<Triple>>
where
    I: IntoIterator<Item = Row>,
{
    let mut subject: Option<(String, Option<Subject>)> = None;
    let mut seen: FxHashSet<Triple> = FxHashSet::default();
    let mut triples = Vec::new();

    for row in rows {
        match row {
            Row::Node(node) => {
                subject = node.is_rdf.then(|| (node.name, None));
            }
            Row::Edge(edge) if edge.is_rdf => {
                if edge.rel_name.is_empty() {
                    warn!(src = %edge.src_name, dst = %edge.dst_name, "blank relation skipped on RDF export");
                    continue;
                }

                let Some((name, resolved)) = subject.as_mut() else {
                    return Err(GraphError::Sequencing {
                        found: edge.src_name,
                        active: None,
                    });
                };

                let subj = match resolved.take() {
                    Some(subj) => subj,
                    None => subject_from_name(name)?,
                };
                *resolved = Some(subj.clone());

                let pred = NamedNode::new(edge.rel_name.as_str()).map_err(|e| {
                    GraphError::Schema(format!("relation |{}| is not an IRI: {e}", edge.rel_name))
                })?;

                let triple = Triple::new(subj, pred, object_from_name(&edge.dst_name)?);

                if seen.insert(triple.clone()) {
                    triples.push(triple);
                }
            }
            Row::Edge(_) => {}
        }
    }

    Ok(triples)
}

impl Partition {
    /// Ingest RDF triples through the row codec
    ///
    /// # Errors
    ///
    /// Returns the first row failure, as [`Partition::parse_rows`] does
    pub fn parse_triples<I>(&mut self, triples: I) -> Result<()>
    where
        I: IntoIterator<Item = Triple>,
    {
        self.parse_rows(triples_to_rows(triples))
    }

    /// Project the partition onto RDF triples
    ///
    /// # Errors
    ///
    /// Returns emission faults and the errors of [`rows_to_triples`]
    pub fn to_triples(&self, sort: bool) -> Result<Vec<Triple>> {
        let rows = self.iter_gen_rows(sort).collect::<Result<Vec<_>>>()?;
        rows_to_triples(rows)
    }
}
