use greenfelt_engine::errors::GameError;
use greenfelt_engine::history::{GameKind, Outcome};
use greenfelt_engine::slots::{line_multiplier, SlotsMachine, Symbol, ALL_SYMBOLS};
use greenfelt_engine::wallet::{ChipWallet, Wallet};

#[test]
fn paytable_matches_the_machine_face() {
    let table = [
        (Symbol::Cherry, 5),
        (Symbol::Lemon, 10),
        (Symbol::Orange, 15),
        (Symbol::Grape, 20),
        (Symbol::Star, 50),
        (Symbol::Diamond, 100),
        (Symbol::Bell, 200),
        (Symbol::Seven, 500),
    ];
    for (symbol, multiplier) in table {
        assert_eq!(symbol.triple_multiplier(), multiplier);
        assert_eq!(line_multiplier(&[symbol; 3]), multiplier);
    }
}

#[test]
fn triple_diamonds_at_ten_chips_pays_a_thousand() {
    assert_eq!(line_multiplier(&[Symbol::Diamond; 3]), 100);
    assert_eq!(10 * line_multiplier(&[Symbol::Diamond; 3]), 1000);
}

#[test]
fn mixed_lines_pay_nothing() {
    assert_eq!(
        line_multiplier(&[Symbol::Diamond, Symbol::Diamond, Symbol::Cherry]),
        0
    );
    assert_eq!(
        line_multiplier(&[Symbol::Seven, Symbol::Bell, Symbol::Seven]),
        0
    );
    assert_eq!(
        line_multiplier(&[Symbol::Cherry, Symbol::Lemon, Symbol::Orange]),
        0
    );
}

#[test]
fn every_symbol_has_a_distinct_glyph() {
    let glyphs: std::collections::HashSet<&str> =
        ALL_SYMBOLS.iter().map(|s| s.glyph()).collect();
    assert_eq!(glyphs.len(), ALL_SYMBOLS.len());
}

#[test]
fn spin_pairs_one_debit_with_one_credit() {
    let mut wallet = ChipWallet::new(10_000);
    let mut machine = SlotsMachine::new(Some(99));
    let mut expected = 10_000u64;
    for _ in 0..200 {
        let result = machine.spin(10, &mut wallet).unwrap();
        assert_eq!(result.payout, 10 * line_multiplier(&result.reels));
        expected = expected - 10 + result.payout;
        assert_eq!(wallet.balance(), expected);
        match result.outcome {
            Outcome::Win => assert!(result.payout > 0),
            Outcome::Lose => assert_eq!(result.payout, 0),
            Outcome::Push => panic!("slots never push"),
        }
    }
    assert_eq!(machine.spin_count(), 200);
}

#[test]
fn spins_are_deterministic_under_a_seed() {
    let mut a = SlotsMachine::new(Some(7));
    let mut b = SlotsMachine::new(Some(7));
    let mut wa = ChipWallet::new(1000);
    let mut wb = ChipWallet::new(1000);
    for _ in 0..50 {
        let ra = a.spin(1, &mut wa).unwrap();
        let rb = b.spin(1, &mut wb).unwrap();
        assert_eq!(ra.reels, rb.reels);
    }
    assert_eq!(wa.balance(), wb.balance());
}

#[test]
fn zero_stake_is_rejected_without_spinning() {
    let mut wallet = ChipWallet::new(100);
    let mut machine = SlotsMachine::new(Some(1));
    assert_eq!(
        machine.spin(0, &mut wallet),
        Err(GameError::InvalidStake { stake: 0 })
    );
    assert_eq!(machine.spin_count(), 0);
    assert!(machine.last_spin().is_none());
    assert_eq!(wallet.balance(), 100);
}

#[test]
fn short_balance_is_rejected_without_spinning() {
    let mut wallet = ChipWallet::new(5);
    let mut machine = SlotsMachine::new(Some(1));
    assert_eq!(
        machine.spin(10, &mut wallet),
        Err(GameError::InsufficientBalance {
            required: 10,
            available: 5
        })
    );
    assert_eq!(machine.spin_count(), 0);
    assert_eq!(wallet.balance(), 5);
}

#[test]
fn summary_mirrors_the_last_spin() {
    let mut wallet = ChipWallet::new(100);
    let mut machine = SlotsMachine::new(Some(3));
    assert!(machine.summary().is_none());
    let result = machine.spin(10, &mut wallet).unwrap();
    let summary = machine.summary().unwrap();
    assert_eq!(summary.game, GameKind::Slots);
    assert_eq!(summary.stake, 10);
    assert_eq!(summary.payout, result.payout);
    assert_eq!(summary.outcome, result.outcome);
    assert_eq!(machine.last_spin(), Some(result));
}

#[test]
fn all_symbols_eventually_appear_on_the_reels() {
    // uniform draws over 8 symbols across 600 reel stops
    let mut wallet = ChipWallet::new(1_000_000);
    let mut machine = SlotsMachine::new(Some(42));
    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
        let result = machine.spin(1, &mut wallet).unwrap();
        seen.extend(result.reels);
    }
    assert_eq!(seen.len(), ALL_SYMBOLS.len());
}
