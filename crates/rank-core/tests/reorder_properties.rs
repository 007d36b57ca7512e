//! Property tests for the reorder engine.
//!
//! Each case builds a ranked list, picks a random selection and drop
//! position, and checks the ordering invariants of the result.
//!
//! `PROPTEST_CASES` overrides the case count (default: 64).

use proptest::prelude::*;
use rank_core::{
    Document, FractionalKey, MoveDescriptor, Orderable, RankGenerator, RankScheme, ReorderEngine,
    ReorderError, ReorderOutcome, Selection,
};
use std::collections::HashSet;
use std::env;

const DEFAULT_PROPTEST_CASES: u32 = 64;

fn proptest_config() -> ProptestConfig {
    let cases = env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PROPTEST_CASES);
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

/// A list length, a selection mask and a (source, destination) pair.
fn arb_move() -> impl Strategy<Value = (usize, Vec<bool>, usize, usize)> {
    (2usize..24).prop_flat_map(|len| {
        (
            Just(len),
            prop::collection::vec(any::<bool>(), len),
            0..len,
            0..len,
        )
    })
}

fn ranked_list<G: RankGenerator>(ranks: &G, len: usize) -> Vec<Document> {
    ranks
        .spread_keys(len)
        .expect("seed keys")
        .into_iter()
        .enumerate()
        .map(|(i, key)| Document::new(format!("doc-{i}"), key).with_field("position", i))
        .collect()
}

fn run<G: RankGenerator>(
    ranks: G,
    len: usize,
    mask: &[bool],
    source: usize,
    destination: usize,
) -> Option<(Vec<Document>, Selection, ReorderOutcome<Document>)> {
    let docs = ranked_list(&ranks, len);
    let selection: Selection = docs
        .iter()
        .zip(mask)
        .filter(|(_, picked)| **picked)
        .map(|(d, _)| d.id.clone())
        .collect();

    match ReorderEngine::new(ranks).reorder(
        docs.clone(),
        &selection,
        MoveDescriptor::new(source, destination),
    ) {
        Ok(outcome) => Some((docs, selection, outcome)),
        // Empty selections and drops onto a selected row are rejected.
        Err(ReorderError::EmptySelection) | Err(ReorderError::AnchorSelected { .. }) => None,
        Err(other) => panic!("unexpected error: {other}"),
    }
}

fn check_invariants(
    docs: &[Document],
    selection: &Selection,
    outcome: &ReorderOutcome<Document>,
    destination: usize,
    moving_up: bool,
) -> Result<(), TestCaseError> {
    // Cardinality
    prop_assert_eq!(outcome.new_order.len(), docs.len());
    let selected_in_order: Vec<&str> = docs
        .iter()
        .map(Orderable::id)
        .filter(|id| selection.contains(id))
        .collect();
    prop_assert_eq!(outcome.changes.len(), selected_in_order.len());

    // Order invariant and idempotent re-sort
    for pair in outcome.new_order.windows(2) {
        prop_assert!(pair[0].order_key() <= pair[1].order_key());
    }
    let mut resorted = outcome.new_order.clone();
    resorted.sort_by(|a, b| a.order_key().cmp(b.order_key()));
    prop_assert_eq!(&resorted, &outcome.new_order);

    // Non-movement of others
    for original in docs.iter().filter(|d| !selection.contains(&d.id)) {
        let after = outcome.new_order.iter().find(|d| d.id == original.id).unwrap();
        prop_assert_eq!(&after.order_rank, &original.order_rank);
    }

    // Relative order preserved, changes follow it
    let moved_in_output: Vec<&str> = outcome
        .new_order
        .iter()
        .map(Orderable::id)
        .filter(|id| selection.contains(id))
        .collect();
    prop_assert_eq!(&moved_in_output, &selected_in_order);
    let changed: Vec<&str> = outcome.changes.iter().map(|c| c.id.as_str()).collect();
    prop_assert_eq!(&changed, &selected_in_order);

    // The block sits right beside the anchor
    let anchor = &docs[destination].id;
    let anchor_pos = outcome.new_order.iter().position(|d| &d.id == anchor).unwrap();
    let count = selected_in_order.len();
    let block: Vec<&str> = if moving_up {
        outcome.new_order[anchor_pos - count..anchor_pos]
            .iter()
            .map(Orderable::id)
            .collect()
    } else {
        outcome.new_order[anchor_pos + 1..=anchor_pos + count]
            .iter()
            .map(Orderable::id)
            .collect()
    };
    prop_assert_eq!(block, selected_in_order);

    // Keys are fresh
    let distinct: HashSet<&str> = outcome.new_order.iter().map(Orderable::order_key).collect();
    prop_assert_eq!(distinct.len(), docs.len());
    Ok(())
}

#[test]
fn prop_lexorank_moves_keep_invariants() {
    proptest!(proptest_config(), |((len, mask, source, destination) in arb_move())| {
        if let Some((docs, selection, outcome)) =
            run(RankScheme::default(), len, &mask, source, destination)
        {
            check_invariants(&docs, &selection, &outcome, destination, source > destination)?;
        }
    });
}

#[test]
fn prop_fractional_moves_keep_invariants() {
    proptest!(proptest_config(), |((len, mask, source, destination) in arb_move())| {
        if let Some((docs, selection, outcome)) =
            run(FractionalKey, len, &mask, source, destination)
        {
            check_invariants(&docs, &selection, &outcome, destination, source > destination)?;
        }
    });
}

#[test]
fn prop_boundary_moves_land_outside_former_ends() {
    proptest!(proptest_config(), |(len in 2usize..16, pick in 0usize..16)| {
        let ranks = RankScheme::default();
        let docs = ranked_list(&ranks, len);
        let pick = pick % len;
        let selection: Selection = [docs[pick].id.clone()].into_iter().collect();

        if pick != 0 {
            let first = docs[0].order_rank.clone();
            let outcome = ReorderEngine::new(ranks)
                .reorder(docs.clone(), &selection, MoveDescriptor::new(pick, 0))
                .unwrap();
            prop_assert!(outcome.changes[0].order_key < first);
            prop_assert_eq!(&outcome.new_order[0].id, &docs[pick].id);
        }
        if pick != len - 1 {
            let last = docs[len - 1].order_rank.clone();
            let outcome = ReorderEngine::new(ranks)
                .reorder(docs.clone(), &selection, MoveDescriptor::new(pick, len - 1))
                .unwrap();
            prop_assert!(outcome.changes[0].order_key > last);
            prop_assert_eq!(&outcome.new_order[len - 1].id, &docs[pick].id);
        }
    });
}

#[test]
fn repeated_moves_to_the_same_gap_keep_working() {
    // Drag the last document to position 1 over and over; the gap after the
    // first document keeps shrinking but never closes.
    let ranks = FractionalKey;
    let mut docs = ranked_list(&ranks, 5);
    let engine = ReorderEngine::new(ranks);
    for _ in 0..100 {
        let last = docs.len() - 1;
        let selection: Selection = [docs[last].id.clone()].into_iter().collect();
        let outcome = engine
            .reorder(docs, &selection, MoveDescriptor::new(last, 1))
            .expect("gap should never close");
        for pair in outcome.new_order.windows(2) {
            assert!(pair[0].order_key() < pair[1].order_key());
        }
        docs = outcome.new_order;
    }
}
