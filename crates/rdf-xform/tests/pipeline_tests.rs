//! End-to-end runs against the in-memory store, plus fault injection.

use std::cell::Cell;

use rdf_xform::config::TransformConfig;
use rdf_xform::emitter::NQuadsEmitter;
use rdf_xform::model::vocab::standard::RDF_TYPE;
use rdf_xform::model::{ResultRow, Term, Triple};
use rdf_xform::pipeline::Pipeline;
use rdf_xform::registry::PrefixRegistry;
use rdf_xform::store::memory::MemoryStore;
use rdf_xform::store::{ResultStream, Selection, TripleStore};
use rdf_xform::transform::{Expand, ExpandMode, Split};
use rdf_xform::Error;

const DRUG: &str = "http://example.org/vocab/Drug";
const GENE: &str = "http://example.org/vocab/Gene";
const XREF: &str = "http://example.org/vocab/xref";
const X_DRUGBANK: &str = "http://example.org/vocab/x-drugbank";
const X_REF: &str = "http://example.org/vocab/x-ref";
const SYN: &str = "http://example.org/vocab/synonym";
const G: &str = "http://example.org/graph";
const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

fn s(n: u32) -> Term {
    Term::iri(format!("http://example.org/drug/{n}"))
}

fn typed(store: &MemoryStore, subject: Term, class: &str, graph: &str) {
    store.add(Triple::new(subject, RDF_TYPE, Term::iri(class), graph));
}

fn lit(subject: Term, predicate: &str, value: &str) -> Triple {
    Triple::new(subject, predicate, Term::literal(value), G)
}

fn drugbank() -> PrefixRegistry {
    let mut r = PrefixRegistry::empty();
    r.insert("drugbank", "http://identifiers.org/drugbank/");
    r
}

fn drug_store() -> MemoryStore {
    let store = MemoryStore::new();
    typed(&store, s(1), DRUG, G);
    store.add(lit(s(1), XREF, "DrugBank:DB00001"));
    store
}

// ---------------------------------------------------------------------------
// Expand
// ---------------------------------------------------------------------------

#[test]
fn expand_infer_resolves_and_deletes_original() {
    let store = drug_store();
    let config = TransformConfig::default();
    let expand = Expand::new(DRUG, XREF, ExpandMode::infer(drugbank())).with_delete(true);

    let report = Pipeline::new(&store, &config).run(&expand).unwrap();

    assert_eq!(report.rows, 1);
    assert_eq!(report.writes.triples_written, 1);
    assert!(report.deleted);
    assert!(store.contains(&Triple::new(
        s(1),
        X_DRUGBANK,
        Term::iri("http://identifiers.org/drugbank/DB00001"),
        G,
    )));
    assert!(!store.contains(&lit(s(1), XREF, "DrugBank:DB00001")));
    // the class assertion is untouched
    assert!(store.contains(&Triple::new(s(1), RDF_TYPE, Term::iri(DRUG), G)));
}

#[test]
fn expand_infer_with_empty_registry_falls_back_to_x_ref() {
    let store = drug_store();
    let config = TransformConfig::default();
    let expand = Expand::new(DRUG, XREF, ExpandMode::infer(PrefixRegistry::empty())).with_delete(true);

    Pipeline::new(&store, &config).run(&expand).unwrap();

    assert!(store.contains(&lit(s(1), X_REF, "DrugBank:DB00001")));
    assert!(!store.contains(&lit(s(1), XREF, "DrugBank:DB00001")));
}

#[test]
fn expand_twice_with_delete_is_idempotent() {
    let store = drug_store();
    store.add(lit(s(1), XREF, "12345"));
    typed(&store, s(2), DRUG, G);
    store.add(lit(s(2), XREF, "PharmGKB:PA1"));
    let config = TransformConfig::default().with_buffer_size(1);
    let expand = Expand::new(DRUG, XREF, ExpandMode::infer(drugbank())).with_delete(true);
    let pipeline = Pipeline::new(&store, &config);

    let first = pipeline.run(&expand).unwrap();
    let after_first = store.triples();
    let second = pipeline.run(&expand).unwrap();

    assert_eq!(first.rows, 3);
    // only the value without an identifier is selected again, and rewritten unchanged
    assert_eq!(second.rows, 1);
    assert_eq!(store.triples(), after_first);
    assert!(store.contains(&lit(s(1), XREF, "12345")));
    assert!(store.contains(&lit(s(2), X_REF, "PharmGKB:PA1")));
}

#[test]
fn expand_manual_twice_selects_nothing_the_second_time() {
    let store = drug_store();
    let config = TransformConfig::default();
    let expand = Expand::new(DRUG, XREF, ExpandMode::Manual("http://ids.org/".into())).with_delete(true);
    let pipeline = Pipeline::new(&store, &config);

    pipeline.run(&expand).unwrap();
    let after_first = store.triples();
    let second = pipeline.run(&expand).unwrap();

    assert_eq!(second.rows, 0);
    assert_eq!(store.triples(), after_first);
    assert!(store.contains(&Triple::new(
        s(1),
        XREF,
        Term::iri("http://ids.org/DrugBank:DB00001"),
        G
    )));
}

#[test]
fn expand_without_delete_keeps_original() {
    let store = drug_store();
    let config = TransformConfig::default();
    let expand = Expand::new(DRUG, XREF, ExpandMode::infer(drugbank()));

    let report = Pipeline::new(&store, &config).run(&expand).unwrap();

    assert!(!report.deleted);
    assert!(store.contains(&lit(s(1), XREF, "DrugBank:DB00001")));
    assert_eq!(store.len(), 3);
}

#[test]
fn only_instances_of_the_class_in_the_same_graph_are_selected() {
    let store = drug_store();
    typed(&store, s(2), GENE, G);
    store.add(lit(s(2), XREF, "DrugBank:DB00002"));
    // typed as Drug, but in another graph than the value
    typed(&store, s(3), DRUG, "http://example.org/other");
    store.add(lit(s(3), XREF, "DrugBank:DB00003"));

    let config = TransformConfig::default();
    let expand = Expand::new(DRUG, XREF, ExpandMode::infer(drugbank())).with_delete(true);
    let report = Pipeline::new(&store, &config).run(&expand).unwrap();

    assert_eq!(report.rows, 1);
    assert!(store.contains(&lit(s(2), XREF, "DrugBank:DB00002")));
    assert!(store.contains(&lit(s(3), XREF, "DrugBank:DB00003")));
}

#[test]
fn expand_infer_delete_removes_rewritten_plain_values() {
    let store = MemoryStore::new();
    typed(&store, s(1), DRUG, G);
    store.add(lit(s(1), XREF, "Aspirin (brand)"));
    store.add(Triple::new(s(1), XREF, Term::lang_literal("aspirin", "en"), G));
    store.add(Triple::new(
        s(1),
        XREF,
        Term::typed_literal("7", format!("{XSD}integer")),
        G,
    ));
    store.add(lit(s(1), XREF, "12345"));
    let config = TransformConfig::default();
    let expand = Expand::new(DRUG, XREF, ExpandMode::infer(PrefixRegistry::empty())).with_delete(true);

    Pipeline::new(&store, &config).run(&expand).unwrap();

    let values: Vec<Term> = store
        .triples()
        .into_iter()
        .filter(|t| t.predicate == XREF)
        .map(|t| t.object)
        .collect();
    assert_eq!(
        values,
        vec![
            Term::literal("12345"),
            Term::literal("7"),
            Term::literal("Aspirin "),
            Term::literal("aspirin"),
        ]
    );
}

#[test]
fn expand_coerce_delete_removes_typed_and_iri_objects() {
    let store = MemoryStore::new();
    typed(&store, s(1), DRUG, G);
    store.add(Triple::new(
        s(1),
        XREF,
        Term::typed_literal("42", format!("{XSD}integer")),
        G,
    ));
    store.add(Triple::new(s(1), XREF, Term::iri("http://ids.org/DB00001"), G));
    store.add(lit(s(1), XREF, "plain"));
    let config = TransformConfig::default();
    let expand = Expand::new(DRUG, XREF, ExpandMode::Coerce).with_delete(true);

    let report = Pipeline::new(&store, &config).run(&expand).unwrap();

    assert_eq!(report.rows, 3);
    let values: Vec<Term> = store
        .triples()
        .into_iter()
        .filter(|t| t.predicate == XREF)
        .map(|t| t.object)
        .collect();
    assert_eq!(
        values,
        vec![
            Term::literal("42"),
            Term::literal("http://ids.org/DB00001"),
            Term::literal("plain"),
        ]
    );
}

#[test]
fn output_graph_override_applies_to_every_triple() {
    let store = drug_store();
    let config = TransformConfig::default().with_output_graph("http://example.org/out");
    let expand = Expand::new(DRUG, XREF, ExpandMode::infer(drugbank()));

    Pipeline::new(&store, &config).run(&expand).unwrap();

    assert!(store.contains(&Triple::new(
        s(1),
        X_DRUGBANK,
        Term::iri("http://identifiers.org/drugbank/DB00001"),
        "http://example.org/out",
    )));
}

// ---------------------------------------------------------------------------
// Split
// ---------------------------------------------------------------------------

#[test]
fn split_writes_fragments_and_deletes_original() {
    let store = MemoryStore::new();
    typed(&store, s(1), DRUG, G);
    store.add(lit(s(1), SYN, "a|b|c"));
    store.add(lit(s(1), SYN, "plain"));
    let config = TransformConfig::default();
    let split = Split::new(DRUG, SYN, '|').with_delete(true);

    let report = Pipeline::new(&store, &config).run(&split).unwrap();

    assert_eq!(report.rows, 1);
    assert_eq!(report.writes.triples_written, 3);
    for v in ["a", "b", "c", "plain"] {
        assert!(store.contains(&lit(s(1), SYN, v)), "missing {v}");
    }
    assert!(!store.contains(&lit(s(1), SYN, "a|b|c")));
}

#[test]
fn sequential_expand_then_split() {
    let store = drug_store();
    store.add(lit(s(1), SYN, "x;y"));
    let config = TransformConfig::default();
    let pipeline = Pipeline::new(&store, &config);

    pipeline
        .run(&Expand::new(DRUG, XREF, ExpandMode::infer(drugbank())).with_delete(true))
        .unwrap();
    pipeline
        .run(&Split::new(DRUG, SYN, ';').with_delete(true))
        .unwrap();

    assert!(store.contains(&lit(s(1), SYN, "x")));
    assert!(store.contains(&lit(s(1), SYN, "y")));
    assert!(!store.contains(&lit(s(1), XREF, "DrugBank:DB00001")));
}

// ---------------------------------------------------------------------------
// Configuration and dry runs
// ---------------------------------------------------------------------------

#[test]
fn zero_buffer_size_is_rejected_before_selection() {
    let store = drug_store();
    let config = TransformConfig::default().with_buffer_size(0);
    let expand = Expand::new(DRUG, XREF, ExpandMode::Coerce);
    let err = Pipeline::new(&store, &config).run(&expand).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn dry_run_writes_nquads_and_leaves_store_untouched() {
    let store = drug_store();
    let before = store.triples();
    let config = TransformConfig::default();
    let expand = Expand::new(DRUG, XREF, ExpandMode::infer(drugbank())).with_delete(true);

    let mut emitter = NQuadsEmitter::new(Vec::new());
    let report = Pipeline::new(&store, &config)
        .run_into(&expand, &mut emitter)
        .unwrap();

    assert!(!report.deleted);
    assert_eq!(store.triples(), before);
    let out = String::from_utf8(emitter.into_inner()).unwrap();
    assert_eq!(
        out,
        "<http://example.org/drug/1> <http://example.org/vocab/x-drugbank> \
         <http://identifiers.org/drugbank/DB00001> <http://example.org/graph> .\n"
    );
}

// ---------------------------------------------------------------------------
// Fault injection
// ---------------------------------------------------------------------------

/// Wraps a [`MemoryStore`] and injects failures.
#[derive(Default)]
struct FaultyStore {
    inner: MemoryStore,
    reject_select: bool,
    /// The stream fails after yielding this many rows.
    fail_after_rows: Option<usize>,
    /// The n-th insert (1-based) is rejected.
    fail_insert_on: Option<usize>,
    inserts: Cell<usize>,
    deletes: Cell<usize>,
    closes: Cell<usize>,
}

struct FaultyStream<'a> {
    inner: Box<dyn ResultStream + 'a>,
    remaining: Option<usize>,
    closes: &'a Cell<usize>,
}

impl ResultStream for FaultyStream<'_> {
    fn next_row(&mut self) -> rdf_xform::Result<Option<ResultRow>> {
        match self.remaining {
            Some(0) => Err(Error::StreamFault {
                reason: "connection reset".into(),
            }),
            Some(ref mut n) => {
                *n -= 1;
                self.inner.next_row()
            }
            None => self.inner.next_row(),
        }
    }

    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
        self.inner.close();
    }
}

impl TripleStore for FaultyStore {
    fn select(&self, selection: &Selection) -> rdf_xform::Result<Box<dyn ResultStream + '_>> {
        if self.reject_select {
            return Err(Error::MalformedSelection {
                query: selection.select_query(),
                reason: "HTTP 400".into(),
            });
        }
        Ok(Box::new(FaultyStream {
            inner: self.inner.select(selection)?,
            remaining: self.fail_after_rows,
            closes: &self.closes,
        }))
    }

    fn insert(&self, graph: &str, triples: &[Triple]) -> rdf_xform::Result<()> {
        self.inserts.set(self.inserts.get() + 1);
        if self.fail_insert_on == Some(self.inserts.get()) {
            return Err(Error::WriteFailure {
                graph: graph.to_string(),
                reason: "HTTP 500".into(),
            });
        }
        self.inner.insert(graph, triples)
    }

    fn delete(&self, selection: &Selection) -> rdf_xform::Result<()> {
        self.deletes.set(self.deletes.get() + 1);
        self.inner.delete(selection)
    }

    fn update(&self, sparql: &str) -> rdf_xform::Result<()> {
        self.inner.update(sparql)
    }
}

fn faulty_split_store(rows: u32) -> FaultyStore {
    let store = FaultyStore::default();
    for n in 0..rows {
        typed(&store.inner, s(n), DRUG, G);
        store.inner.add(lit(s(n), SYN, "a|b"));
    }
    store
}

#[test]
fn successful_run_closes_stream_once_and_deletes_once() {
    let store = faulty_split_store(5);
    let config = TransformConfig::default().with_buffer_size(3);
    let split = Split::new(DRUG, SYN, '|').with_delete(true);

    let report = Pipeline::new(&store, &config).run(&split).unwrap();

    assert_eq!(report.rows, 5);
    assert_eq!(store.closes.get(), 1);
    assert_eq!(store.deletes.get(), 1);
    // 10 triples at threshold 3
    assert_eq!(store.inserts.get(), 4);
}

#[test]
fn stream_fault_closes_stream_and_skips_delete() {
    let store = FaultyStore {
        fail_after_rows: Some(2),
        ..faulty_split_store(5)
    };
    let config = TransformConfig::default();
    let split = Split::new(DRUG, SYN, '|').with_delete(true);

    let err = Pipeline::new(&store, &config).run(&split).unwrap_err();

    assert!(matches!(err, Error::StreamFault { .. }));
    assert_eq!(store.closes.get(), 1);
    assert_eq!(store.deletes.get(), 0);
}

#[test]
fn write_failure_keeps_committed_batches_and_skips_delete() {
    let store = FaultyStore {
        fail_insert_on: Some(2),
        ..faulty_split_store(4)
    };
    let config = TransformConfig::default().with_buffer_size(2);
    let split = Split::new(DRUG, SYN, '|').with_delete(true);

    let err = Pipeline::new(&store, &config).run(&split).unwrap_err();

    assert!(matches!(err, Error::WriteFailure { .. }));
    assert_eq!(store.deletes.get(), 0);
    assert_eq!(store.closes.get(), 1);
    // the first batch (subject 0) is committed, originals are still there
    assert!(store.inner.contains(&lit(s(0), SYN, "a")));
    assert!(store.inner.contains(&lit(s(0), SYN, "a|b")));
}

#[test]
fn rejected_selection_writes_nothing() {
    let store = FaultyStore {
        reject_select: true,
        ..faulty_split_store(2)
    };
    let config = TransformConfig::default();
    let split = Split::new(DRUG, SYN, '|').with_delete(true);

    let err = Pipeline::new(&store, &config).run(&split).unwrap_err();

    match err {
        Error::MalformedSelection { query, .. } => assert!(query.contains("SELECT")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.inserts.get(), 0);
    assert_eq!(store.deletes.get(), 0);
}
