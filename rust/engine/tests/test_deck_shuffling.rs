use std::collections::HashSet;

use greenfelt_engine::cards::{full_deck, Card};
use greenfelt_engine::deck::Deck;

#[test]
fn deck_reset_has_52_unique_cards() {
    let mut deck = Deck::new_with_seed(42);
    deck.reset();
    let mut set = HashSet::new();
    for i in 0..52 {
        let c = deck.deal_card().expect("should have 52 cards");
        assert!(set.insert(c), "card {:?} duplicated at position {}", c, i);
    }
    assert!(
        deck.deal_card().is_none(),
        "after 52 cards, deck should be empty"
    );
}

#[test]
fn shuffle_is_a_permutation_of_the_full_deck() {
    let mut deck = Deck::new_with_seed(9);
    deck.shuffle();
    let mut dealt: Vec<Card> = Vec::with_capacity(52);
    while let Some(c) = deck.deal_card() {
        dealt.push(c);
    }
    assert_eq!(dealt.len(), 52);
    let dealt_set: HashSet<Card> = dealt.iter().copied().collect();
    let full_set: HashSet<Card> = full_deck().into_iter().collect();
    assert_eq!(dealt_set, full_set, "no card may be lost or duplicated");
}

#[test]
fn shuffle_is_deterministic_with_same_seed() {
    let mut d1 = Deck::new_with_seed(12345);
    let mut d2 = Deck::new_with_seed(12345);
    d1.shuffle();
    d2.shuffle();
    // Compare first 10 cards
    let a: Vec<Card> = (0..10).map(|_| d1.deal_card().unwrap()).collect();
    let b: Vec<Card> = (0..10).map(|_| d2.deal_card().unwrap()).collect();
    assert_eq!(a, b, "same seed must yield identical order");
}

#[test]
fn shuffle_differs_with_different_seed() {
    let mut d1 = Deck::new_with_seed(1);
    let mut d2 = Deck::new_with_seed(2);
    d1.shuffle();
    d2.shuffle();
    let a: Vec<Card> = (0..10).map(|_| d1.deal_card().unwrap()).collect();
    let b: Vec<Card> = (0..10).map(|_| d2.deal_card().unwrap()).collect();
    assert_ne!(
        a, b,
        "different seeds should produce different orders (high probability)"
    );
}

#[test]
fn reshuffling_starts_a_fresh_full_deck() {
    let mut deck = Deck::new_with_seed(77);
    deck.shuffle();
    for _ in 0..20 {
        deck.deal_card().unwrap();
    }
    assert_eq!(deck.remaining(), 32);
    deck.shuffle();
    assert_eq!(deck.remaining(), 52, "shuffle rebuilds the whole deck");
}
