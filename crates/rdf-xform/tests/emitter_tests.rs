use rdf_xform::emitter::NQuadsEmitter;
use rdf_xform::model::{Term, Triple};
use rdf_xform::store::TripleSink;

fn quad(object: Term) -> Triple {
    Triple::new(
        Term::iri("http://example.org/s"),
        "http://example.org/p",
        object,
        "http://example.org/g",
    )
}

fn emit(triples: &[Triple]) -> String {
    let mut em = NQuadsEmitter::new(Vec::new());
    em.write_batch("http://example.org/g", triples).unwrap();
    String::from_utf8(em.into_inner()).unwrap()
}

// ---------------------------------------------------------------------------
// N-Quads tests
// ---------------------------------------------------------------------------

#[test]
fn nq_iri_object() {
    assert_eq!(
        emit(&[quad(Term::iri("http://example.org/o"))]),
        "<http://example.org/s> <http://example.org/p> <http://example.org/o> <http://example.org/g> .\n"
    );
}

#[test]
fn nq_literal_object() {
    assert_eq!(
        emit(&[quad(Term::literal("hello world"))]),
        "<http://example.org/s> <http://example.org/p> \"hello world\" <http://example.org/g> .\n"
    );
}

#[test]
fn nq_typed_and_lang_literals() {
    let out = emit(&[
        quad(Term::typed_literal(
            "42",
            "http://www.w3.org/2001/XMLSchema#integer",
        )),
        quad(Term::lang_literal("chat", "fr")),
    ]);
    assert!(out.contains("\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>"));
    assert!(out.contains("\"chat\"@fr"));
}

#[test]
fn nq_blank_subject() {
    let t = Triple::new(
        Term::blank("b1"),
        "http://example.org/p",
        Term::literal("x"),
        "http://example.org/g",
    );
    assert!(emit(&[t]).starts_with("_:b1 "));
}

#[test]
fn nq_escape_special_chars() {
    let out = emit(&[quad(Term::literal("line\n\"end\\\ttab\u{1}"))]);
    assert!(out.contains("\\n"), "Expected escaped newline: {out}");
    assert!(out.contains("\\\""), "Expected escaped quote: {out}");
    assert!(out.contains("\\\\"), "Expected escaped backslash: {out}");
    assert!(out.contains("\\t"), "Expected escaped tab: {out}");
    assert!(out.contains("\\u0001"), "Expected escaped control char: {out}");
    assert_eq!(out.lines().count(), 1);
}

#[test]
fn nq_graph_comes_from_the_batch() {
    let mut em = NQuadsEmitter::new(Vec::new());
    em.write_batch("http://example.org/other", &[quad(Term::literal("x"))])
        .unwrap();
    let out = String::from_utf8(em.into_inner()).unwrap();
    assert!(out.ends_with("<http://example.org/other> .\n"), "{out}");
}

#[test]
fn nq_quad_count() {
    let mut em = NQuadsEmitter::new(Vec::new());
    em.write_batch("http://example.org/g", &[quad(Term::literal("a")), quad(Term::literal("b"))])
        .unwrap();
    em.write_batch("http://example.org/g", &[quad(Term::literal("c"))])
        .unwrap();
    assert_eq!(em.quad_count(), 3);
}

#[test]
fn nq_empty_batch_writes_nothing() {
    assert_eq!(emit(&[]), "");
}
